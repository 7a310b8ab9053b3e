pub mod claim;
pub mod fetcher;
pub mod lookup;
pub mod metrics;
pub mod processor;
pub mod worker;
