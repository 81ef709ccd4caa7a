//! Multi-row INSERT, optionally turned into an upsert.

use crate::query::ast::{common::TableRef, expr::Expr};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Insert {
    pub table: TableRef,
    pub columns: Vec<String>,
    /// One entry per row, each with one expression per column.
    pub rows: Vec<Vec<Expr>>,
    pub upsert: Option<Upsert>,
}

/// `ON CONFLICT (key) DO UPDATE SET c = EXCLUDED.c` for every column in
/// `update`; `DO NOTHING` when `update` is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Upsert {
    pub key: Vec<String>,
    pub update: Vec<String>,
}
