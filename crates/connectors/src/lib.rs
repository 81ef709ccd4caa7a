pub mod file;
pub mod metadata;
pub mod sql;
