pub mod column;
pub mod core;
pub mod error;
pub mod records;
