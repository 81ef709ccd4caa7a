use crate::query::ast::common::TableRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Table,
    Index,
}

impl ObjectKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            ObjectKind::Table => "TABLE",
            ObjectKind::Index => "INDEX",
        }
    }
}

/// `DROP TABLE` or `DROP INDEX`. An index is addressed through the schema of
/// the table it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct DropObject {
    pub kind: ObjectKind,
    pub target: TableRef,
    pub if_exists: bool,
}

impl DropObject {
    /// `DROP TABLE IF EXISTS`.
    pub fn table(target: TableRef) -> Self {
        Self {
            kind: ObjectKind::Table,
            target,
            if_exists: true,
        }
    }

    /// `DROP INDEX IF EXISTS`.
    pub fn index(target: TableRef) -> Self {
        Self {
            kind: ObjectKind::Index,
            target,
            if_exists: true,
        }
    }
}
