pub mod cell;
pub mod data_type;
pub mod identifiers;
pub mod sentinel;
pub mod value;
