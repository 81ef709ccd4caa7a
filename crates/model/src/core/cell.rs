use serde::{Deserialize, Serialize};

/// One parsed field of a delimited line.
///
/// A quoted empty field (`""`) is kept apart from an unquoted empty one: the
/// former is a real empty string, the latter is logically absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    Value(String),
    ExplicitEmpty,
}

impl Cell {
    pub fn as_str(&self) -> &str {
        match self {
            Cell::Value(v) => v,
            Cell::ExplicitEmpty => "",
        }
    }

    /// True for an unquoted empty field.
    pub fn is_absent(&self) -> bool {
        matches!(self, Cell::Value(v) if v.is_empty())
    }

    pub fn into_string(self) -> String {
        match self {
            Cell::Value(v) => v,
            Cell::ExplicitEmpty => String::new(),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Value(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Value(value)
    }
}
