//! Defines the AST for a CREATE TABLE statement.

use crate::query::ast::common::TableRef;

/// Represents a complete CREATE TABLE statement.
#[derive(Debug, Clone, Default)]
pub struct CreateTable {
    pub table: TableRef,
    pub columns: Vec<ColumnDef>,
    pub if_not_exists: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    /// Already rendered for the target dialect, e.g. `BIGINT`.
    pub type_name: String,
    pub is_nullable: bool,
    pub is_primary_key: bool,
}
