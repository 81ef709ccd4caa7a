use crate::core::data_type::DataType;
use serde::{Deserialize, Serialize};

/// Reserved count-bearing columns. They are always integer typed and never
/// take part in the uniqueness index or the grand-total predicate.
pub const AGGREGATE_COLUMNS: [&str; 3] = ["cnt", "cnt_min", "cnt_max"];

/// The column the grand total is read from.
pub const TOTAL_COLUMN: &str = "cnt";

pub fn is_aggregate(name: &str) -> bool {
    AGGREGATE_COLUMNS.contains(&name)
}

/// Resolved metadata for one column. Immutable once a job has resolved it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub label: String,
    pub description: String,
    pub data_type: DataType,
}

impl ColumnDescriptor {
    pub fn new(name: &str, label: &str, description: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            description: description.to_string(),
            data_type,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        is_aggregate(&self.name)
    }
}
