use crate::core::value::{FieldValue, Value};
use serde::{Deserialize, Serialize};

/// A row read back from the database, fields in select-list order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowData {
    pub field_values: Vec<FieldValue>,
}

impl RowData {
    pub fn new(field_values: Vec<FieldValue>) -> Self {
        RowData { field_values }
    }

    /// Looks a field up by its result column name. Postgres folds unquoted
    /// aliases to lower case, so the match ignores ASCII case.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.field_values
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
            .map(|f| &f.value)
    }

    /// Like [`RowData::value`], reading a missing field as NULL.
    pub fn value_or_null(&self, name: &str) -> Value {
        self.value(name).cloned().unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case_and_defaults_to_null() {
        let row = RowData::new(vec![FieldValue {
            name: "Total".into(),
            value: Value::Int(3),
        }]);
        assert_eq!(row.value("total"), Some(&Value::Int(3)));
        assert_eq!(row.value_or_null("missing"), Value::Null);
    }
}
