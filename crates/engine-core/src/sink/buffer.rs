use model::{
    column::ColumnDescriptor,
    core::{
        cell::Cell,
        data_type::DataType,
        identifiers::TableName,
        sentinel::{self, ABSENT},
        value::Value,
    },
    error::ValidationError,
};
use planner::query::{
    ast::{common::TableRef, expr::Expr},
    builder::insert::InsertBuilder,
    dialect::{Dialect, Postgres},
    renderer::render,
    value,
};

/// A rendered cell, ready to bind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlCell {
    Null,
    Text(String),
}

/// Turns one parsed cell into what is stored for `column`.
///
/// An absent cell becomes NULL. A quoted empty string is kept as an empty
/// string in text columns and otherwise validated like any other input.
/// Sentinel values bypass validation: [`ABSENT`] is always NULL, other
/// markers are kept verbatim in text columns and stored as NULL elsewhere.
pub fn render_cell(cell: Cell, column: &ColumnDescriptor) -> Result<SqlCell, ValidationError> {
    let data_type = column.data_type;
    if cell.is_absent() {
        return Ok(SqlCell::Null);
    }
    let raw = match cell {
        Cell::ExplicitEmpty if data_type == DataType::String => {
            return Ok(SqlCell::Text(String::new()));
        }
        cell => cell.into_string(),
    };

    if sentinel::is_sentinel(&raw) {
        return Ok(match (raw.as_str(), data_type) {
            (ABSENT, _) => SqlCell::Null,
            (_, DataType::String) => SqlCell::Text(raw),
            _ => SqlCell::Null,
        });
    }

    let stored = data_type.set(&raw)?;
    if stored.is_empty() {
        Ok(SqlCell::Null)
    } else {
        Ok(SqlCell::Text(stored))
    }
}

/// Rows pending insert, in input order.
#[derive(Debug, Clone)]
pub struct RowBuffer {
    rows: Vec<Vec<SqlCell>>,
    capacity: usize,
}

impl RowBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            rows: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, row: Vec<SqlCell>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.rows.len() >= self.capacity
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Multi-row INSERTs covering every buffered row. Rows are split across
    /// statements only when one statement would exceed the bind limit.
    pub fn insert_statements(
        &self,
        table: &TableName,
        columns: &[ColumnDescriptor],
    ) -> Vec<(String, Vec<Value>)> {
        let dialect = Postgres;
        let names: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
        let casts: Vec<Option<String>> = columns
            .iter()
            .map(|c| match c.data_type {
                DataType::String => None,
                other => Some(dialect.render_data_type(&other)),
            })
            .collect();

        let rows_per_statement = (dialect.max_params() / columns.len().max(1)).max(1);
        self.rows
            .chunks(rows_per_statement)
            .map(|chunk| {
                let rows = chunk.iter().map(|row| {
                    row.iter()
                        .zip(&casts)
                        .map(|(cell, cast)| cell_expr(cell, cast.as_deref()))
                        .collect::<Vec<Expr>>()
                });
                let ast = InsertBuilder::new(TableRef::new(table.as_str()), &names)
                    .rows(rows)
                    .build();
                render(&ast, &dialect)
            })
            .collect()
    }
}

/// Values are bound as text and cast server-side, so one parameter type
/// serves every column.
fn cell_expr(cell: &SqlCell, cast: Option<&str>) -> Expr {
    match (cell, cast) {
        (SqlCell::Null, _) => Expr::Null,
        (SqlCell::Text(text), None) => value(Value::String(text.clone())),
        (SqlCell::Text(text), Some(type_name)) => {
            value(Value::String(text.clone())).cast("TEXT").cast(type_name)
        }
    }
}
