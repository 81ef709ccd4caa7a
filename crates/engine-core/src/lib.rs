pub mod config;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod sink;
pub mod summary;
