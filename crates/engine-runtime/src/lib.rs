//! Cross-request state: import jobs, their registry and lease expiry.

pub mod factory;
pub mod job;
pub mod lease;
pub mod registry;
