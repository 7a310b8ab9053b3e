//! Test helper utilities: scripted lookup sources, in-memory harness, and an
//! HTTP server on an ephemeral port.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use bird_extract::{
    app_state::AppState,
    db::memory::{MemoryCounters, MemoryJobStore},
    models::job::Job,
    routes,
    services::{
        fetcher::{RetryConfig, RetryingFetcher},
        lookup::{ExtractSource, FetchError},
        metrics::Metrics,
        processor::JobProcessor,
        worker::Worker,
    },
};

/// One scripted lookup outcome.
#[derive(Debug, Clone, Copy)]
pub enum Reply {
    Extract(&'static str),
    NoExtract,
    NetworkError,
    Status(u16),
}

impl Reply {
    fn into_result(self) -> Result<Option<String>, FetchError> {
        match self {
            Reply::Extract(text) => Ok(Some(text.to_string())),
            Reply::NoExtract => Ok(None),
            Reply::NetworkError => Err(FetchError::Transport("Network error".to_string())),
            Reply::Status(code) => Err(FetchError::Status(code)),
        }
    }
}

/// Replays `script` in order, then repeats `fallback` forever.
pub struct ScriptedSource {
    script: Mutex<VecDeque<Reply>>,
    fallback: Reply,
    calls: AtomicU32,
}

impl ScriptedSource {
    pub fn always(reply: Reply) -> Arc<Self> {
        Self::sequence(Vec::new(), reply)
    }

    pub fn sequence(script: Vec<Reply>, fallback: Reply) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: AtomicU32::new(0),
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExtractSource for ScriptedSource {
    async fn fetch_extract(&self, _subject: &str) -> Result<Option<String>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or(self.fallback).into_result()
    }
}

/// In-memory store, counters and processor wired together.
pub struct Harness {
    pub store: Arc<MemoryJobStore>,
    pub counters: Arc<MemoryCounters>,
    pub processor: Arc<JobProcessor>,
}

impl Harness {
    pub fn new(source: Arc<dyn ExtractSource>) -> Self {
        Self::with_retry(source, RetryConfig::DEFAULT)
    }

    pub fn with_retry(source: Arc<dyn ExtractSource>, retry: RetryConfig) -> Self {
        let store = Arc::new(MemoryJobStore::new());
        let counters = Arc::new(MemoryCounters::new());
        let processor = Arc::new(JobProcessor::new(
            store.clone(),
            RetryingFetcher::new(source, retry),
            Metrics::new(counters.clone()),
        ));
        Self {
            store,
            counters,
            processor,
        }
    }

    pub fn worker(&self, id: u32, shutdown: CancellationToken) -> Worker {
        Worker::new(
            id,
            self.store.clone(),
            self.processor.clone(),
            Duration::from_millis(1000),
            shutdown,
        )
    }

    pub fn app_state(&self) -> AppState {
        AppState::new(self.store.clone(), self.counters.clone())
    }

    pub fn counter(&self, key: &str) -> u64 {
        self.counters.snapshot().get(key).copied().unwrap_or(0)
    }

    /// Queue a job directly in the store, bypassing the API.
    pub fn queue(&self, name: &str) -> Job {
        let job = Job::new(name);
        self.store.transaction(|table| table.insert(job.id, job.clone()));
        job
    }

    pub fn job(&self, id: uuid::Uuid) -> Job {
        self.store
            .transaction(|table| table.get(&id).cloned())
            .expect("job missing from store")
    }
}

/// Serve the API router on 127.0.0.1 and return its base URL.
pub async fn spawn_app(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("listener has no address");
    let app = routes::router(state);

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server error");
    });

    format!("http://{}", addr)
}
