//! Data ingestion layer for the desk activity dashboard.
//!
//! Responsible for reading the service-request and messaging CSV exports,
//! normalizing them into activity records, aggregating roster and pivot
//! views and running the top-level analysis pipeline.

pub mod aggregator;
pub mod analysis;
pub mod cache;
pub mod normalizer;
pub mod reader;

pub use desk_core as core;
