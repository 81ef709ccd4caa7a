//! Turns statement ASTs into SQL text plus bound parameters.
//!
//! Identifiers are always quoted through the dialect and values are always
//! bound, never inlined, so no user input reaches the SQL text unescaped.

use crate::query::{ast::common::TableRef, dialect::Dialect};
use model::core::value::Value;

pub mod create_index;
pub mod create_table;
pub mod drop;
pub mod expr;
pub mod insert;
pub mod select;

pub trait Render {
    fn render(&self, renderer: &mut Renderer);
}

/// Accumulates the statement text and its parameters, numbering
/// placeholders in the order values are pushed.
pub struct Renderer<'a> {
    pub sql: String,
    pub params: Vec<Value>,
    pub dialect: &'a dyn Dialect,
}

impl<'a> Renderer<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            sql: String::new(),
            params: Vec::new(),
            dialect,
        }
    }

    pub fn finish(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }

    /// Binds `value` and writes its placeholder.
    pub fn add_param(&mut self, value: Value) {
        let index = self.params.len();
        self.params.push(value);
        let placeholder = self.dialect.get_placeholder(index);
        self.sql.push_str(&placeholder);
    }

    pub fn push_identifier(&mut self, name: &str) {
        let quoted = self.dialect.quote_identifier(name);
        self.sql.push_str(&quoted);
    }

    pub fn render_table_ref(&mut self, table: &TableRef) {
        if let Some(schema) = &table.schema {
            self.push_identifier(schema);
            self.sql.push('.');
        }
        self.push_identifier(&table.name);
    }

    pub fn push_quoted_list(&mut self, names: &[String]) {
        self.comma_separated(names, |r, name| r.push_identifier(name));
    }

    /// Renders `items` with `each`, separated by `", "`.
    pub fn comma_separated<T>(&mut self, items: &[T], mut each: impl FnMut(&mut Self, &T)) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            each(self, item);
        }
    }
}

pub fn render<T: Render>(ast: &T, dialect: &dyn Dialect) -> (String, Vec<Value>) {
    let mut renderer = Renderer::new(dialect);
    ast.render(&mut renderer);
    renderer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::dialect::Postgres;

    #[test]
    fn numbers_placeholders_in_push_order() {
        let mut r = Renderer::new(&Postgres);
        r.add_param(Value::Int(1));
        r.sql.push_str(", ");
        r.add_param(Value::Int(2));
        let (sql, params) = r.finish();
        assert_eq!(sql, "$1, $2");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn quotes_schema_and_name() {
        let mut r = Renderer::new(&Postgres);
        r.render_table_ref(&TableRef::qualified("public", "we\"ird"));
        assert_eq!(r.finish().0, r#""public"."we""ird""#);
    }
}
