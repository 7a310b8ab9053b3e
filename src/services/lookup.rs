use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

pub const DEFAULT_LOOKUP_URL: &str = "https://en.wikipedia.org/w/api.php";

/// A single lookup of the summary text for a subject.
///
/// `Ok(None)` means the lookup succeeded but the subject has no extract.
#[async_trait]
pub trait ExtractSource: Send + Sync {
    async fn fetch_extract(&self, subject: &str) -> Result<Option<String>, FetchError>;
}

/// Client for the Wikipedia action API `prop=extracts` query.
pub struct WikipediaClient {
    http: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct QueryResponse {
    query: QueryResult,
}

#[derive(Deserialize)]
struct QueryResult {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Deserialize)]
struct Page {
    extract: Option<String>,
}

/// Pulls the first page's extract out of a `formatversion=2` query response.
pub fn parse_extract(body: &str) -> Result<Option<String>, FetchError> {
    let response: QueryResponse = serde_json::from_str(body)?;
    Ok(response
        .query
        .pages
        .into_iter()
        .next()
        .and_then(|page| page.extract))
}

impl WikipediaClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl ExtractSource for WikipediaClient {
    async fn fetch_extract(&self, subject: &str) -> Result<Option<String>, FetchError> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", subject),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_extract(&body)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("Failed to parse lookup response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Transport failure reported by a non-reqwest source.
    #[error("{0}")]
    Transport(String),
}
