//! Reads the grand total: the one row whose dimension columns are all NULL.

use crate::error::{ConsistencyError, IngestError};
use connectors::sql::base::adapter::SqlAdapter;
use model::{
    column::TOTAL_COLUMN,
    core::{data_type::DataType, identifiers::TableName, value::Value},
    records::row::RowData,
};
use planner::query::{
    ast::{common::TableRef, expr::Expr},
    builder::select::SelectBuilder,
    dialect::Postgres,
    ident,
    renderer::render,
};

const TOTAL_ALIAS: &str = "total";

/// Fetches at most two candidate rows so an ambiguous total is detected
/// without scanning further.
pub fn grand_total_query(table: &TableName, dimensions: &[String]) -> String {
    let predicate = Expr::And(dimensions.iter().map(|d| ident(d).is_null()).collect());
    let ast = SelectBuilder::new(vec![ident(TOTAL_COLUMN).cast("TEXT").alias(TOTAL_ALIAS)])
        .from(TableRef::new(table.as_str()))
        .where_clause(predicate)
        .limit(2)
        .build();
    render(&ast, &Postgres).0
}

pub fn read_total(table: &TableName, rows: &[RowData]) -> Result<i64, IngestError> {
    let row = match rows {
        [row] => row,
        [] => {
            return Err(ConsistencyError::MissingTotal {
                table: table.to_string(),
            }
            .into());
        }
        _ => {
            return Err(ConsistencyError::AmbiguousTotal {
                table: table.to_string(),
            }
            .into());
        }
    };

    let missing = || ConsistencyError::MissingTotalCount {
        table: table.to_string(),
    };
    match row.value_or_null(TOTAL_ALIAS) {
        Value::String(stored) => match DataType::Integer.get(&stored)? {
            Value::Int(total) => Ok(total),
            _ => Err(missing().into()),
        },
        Value::Int(total) => Ok(total),
        _ => Err(missing().into()),
    }
}

pub async fn grand_total(
    adapter: &dyn SqlAdapter,
    table: &TableName,
    dimensions: &[String],
) -> Result<i64, IngestError> {
    let rows = adapter
        .query_rows(&grand_total_query(table, dimensions), Vec::new())
        .await?;
    read_total(table, &rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::core::value::FieldValue;

    fn total_row(value: Value) -> RowData {
        RowData::new(vec![FieldValue {
            name: TOTAL_ALIAS.to_string(),
            value,
        }])
    }

    fn table() -> TableName {
        TableName::new("cube_x").unwrap()
    }

    #[test]
    fn query_excludes_aggregates_from_predicate() {
        assert_eq!(
            grand_total_query(&table(), &["a".to_string(), "b".to_string()]),
            r#"SELECT "cnt"::TEXT AS "total" FROM "cube_x" WHERE "a" IS NULL AND "b" IS NULL LIMIT 2;"#
        );
    }

    #[test]
    fn exactly_one_row_yields_its_count() {
        let rows = vec![total_row(Value::String("1500".into()))];
        assert_eq!(read_total(&table(), &rows).unwrap(), 1500);
    }

    #[test]
    fn zero_or_many_rows_fail() {
        assert!(matches!(
            read_total(&table(), &[]),
            Err(IngestError::Consistency(ConsistencyError::MissingTotal { .. }))
        ));
        let two = vec![
            total_row(Value::String("1".into())),
            total_row(Value::String("2".into())),
        ];
        assert!(matches!(
            read_total(&table(), &two),
            Err(IngestError::Consistency(ConsistencyError::AmbiguousTotal { .. }))
        ));
    }

    #[test]
    fn null_count_fails() {
        assert!(matches!(
            read_total(&table(), &[total_row(Value::Null)]),
            Err(IngestError::Consistency(ConsistencyError::MissingTotalCount { .. }))
        ));
    }
}
