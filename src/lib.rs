//! Subject lookup job service
//!
//! Jobs are created through the HTTP API with a subject name, claimed
//! atomically by polling workers, and completed with the subject's Wikipedia
//! summary. Lookups are retried with exponential backoff before a job is
//! marked failed.

pub mod app_state;
pub mod config;
pub mod db;
pub mod models;
pub mod routes;
pub mod services;
