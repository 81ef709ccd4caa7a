//! Defines the `Dialect` trait for database-specific SQL syntax.

use model::core::data_type::DataType;

pub trait Dialect: Send + Sync {
    /// Wraps an identifier (like a table or column name) in the correct
    /// quotation marks for the dialect, escaping embedded quote characters.
    ///
    /// Identifiers can never be bound as parameters, so every name that
    /// reaches this method must already have passed
    /// [`validate_identifier`](model::core::identifiers::validate_identifier).
    fn quote_identifier(&self, ident: &str) -> String;

    /// Returns the placeholder for a parameterized query.
    ///
    /// - PostgreSQL uses `$1`, `$2`, etc.
    fn get_placeholder(&self, index: usize) -> String;

    /// Renders a generic `DataType` into a database-specific SQL type string.
    fn render_data_type(&self, data_type: &DataType) -> String;

    /// Returns the name of the dialect (e.g., "PostgreSQL").
    fn name(&self) -> String;

    /// Largest number of bind parameters a single statement may carry.
    fn max_params(&self) -> usize;
}

#[derive(Debug, Clone)]
pub struct Postgres;

impl Dialect for Postgres {
    fn quote_identifier(&self, ident: &str) -> String {
        format!(r#""{}""#, ident.replace('"', r#""""#))
    }

    fn get_placeholder(&self, index: usize) -> String {
        // PostgreSQL uses $1, $2, etc.
        format!("${}", index + 1)
    }

    fn render_data_type(&self, data_type: &DataType) -> String {
        data_type.postgres_name().into_owned()
    }

    fn name(&self) -> String {
        "PostgreSQL".into()
    }

    fn max_params(&self) -> usize {
        u16::MAX as usize
    }
}
