pub mod common;
pub mod create_index;
pub mod create_table;
pub mod drop;
pub mod expr;
pub mod insert;
pub mod select;
