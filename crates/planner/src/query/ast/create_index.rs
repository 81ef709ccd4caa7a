//! Defines the AST for a CREATE INDEX statement.

use crate::query::ast::common::{NullsOrder, TableRef};

#[derive(Debug, Clone, Default)]
pub struct CreateIndex {
    pub name: String,
    pub table: TableRef,
    pub columns: Vec<IndexColumn>,
    pub unique: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexColumn {
    pub name: String,
    pub nulls: Option<NullsOrder>,
}
