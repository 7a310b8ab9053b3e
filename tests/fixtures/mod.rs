//! Canned lookup responses in the Wikipedia `formatversion=2` shape.

pub const ROBIN_EXTRACT: &str = "The robin is a small bird.";

pub const ROBIN_PAGE: &str =
    r#"{"batchcomplete":true,"query":{"pages":[{"pageid":1,"ns":0,"title":"Robin","extract":"The robin is a small bird."}]}}"#;

pub const ROBIN_PAGE_WITHOUT_EXTRACT: &str =
    r#"{"batchcomplete":true,"query":{"pages":[{"pageid":1,"ns":0,"title":"Robin"}]}}"#;

pub const MISSING_PAGE: &str =
    r#"{"batchcomplete":true,"query":{"pages":[{"ns":0,"title":"Snark","missing":true}]}}"#;

pub const BIRD_NAMES: &[&str] = &[
    "Robin", "Wren", "Eagle", "Sparrow", "Magpie", "Kestrel", "Heron", "Jay", "Finch", "Swift",
];
