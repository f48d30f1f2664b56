pub mod batch;
pub mod config;
pub mod consolidation;
pub mod error;
pub mod model;
pub mod output;
pub mod query;
pub mod scoring;
pub mod stats;
pub mod store;

pub use error::ScoreError;
