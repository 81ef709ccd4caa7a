//! The provenance record written once an import completes.

use chrono::{DateTime, Utc};
use connectors::sql::base::{adapter::SqlAdapter, error::DbError};
use model::{
    column::ColumnDescriptor,
    core::{
        identifiers::{JobId, TableName},
        value::Value,
    },
};
use planner::query::{
    ast::{
        common::TableRef,
        create_table::{ColumnDef, CreateTable},
    },
    builder::insert::InsertBuilder,
    dialect::Postgres,
    renderer::render,
    value,
};
use serde::Serialize;
use tracing::debug;

use crate::error::IngestError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportSummary {
    pub job_id: JobId,
    pub table: TableName,
    pub columns: Vec<ColumnDescriptor>,
    /// Count read from the grand total row.
    pub total: i64,
    pub rows_inserted: u64,
    pub completed_at: DateTime<Utc>,
}

const META_COLUMNS: [&str; 5] = [
    "table_name",
    "columns",
    "total",
    "rows_inserted",
    "completed_at",
];

/// DDL for the metadata table; a no-op when it already exists.
pub fn metadata_table_ddl(metadata_table: &str) -> String {
    let def = |name: &str, type_name: &str, pk: bool| ColumnDef {
        name: name.to_string(),
        type_name: type_name.to_string(),
        is_nullable: !pk,
        is_primary_key: pk,
    };
    let ast = CreateTable {
        table: TableRef::new(metadata_table),
        columns: vec![
            def("table_name", "TEXT", true),
            def("columns", "JSONB", false),
            def("total", "BIGINT", false),
            def("rows_inserted", "BIGINT", false),
            def("completed_at", "TIMESTAMPTZ", false),
        ],
        if_not_exists: true,
    };
    render(&ast, &Postgres).0
}

/// Upserts the record for `summary.table`. A re-import replaces the
/// previous record of the same table.
pub fn metadata_upsert(
    metadata_table: &str,
    summary: &ImportSummary,
) -> Result<(String, Vec<Value>), IngestError> {
    let columns = serde_json::to_value(&summary.columns)
        .map_err(|e| DbError::Write(format!("failed to encode column metadata: {e}")))?;
    let names: Vec<String> = META_COLUMNS.iter().map(|c| c.to_string()).collect();

    let ast = InsertBuilder::new(TableRef::new(metadata_table), &names)
        .row(vec![
            value(Value::String(summary.table.to_string())),
            value(Value::Json(columns)),
            value(Value::Int(summary.total)),
            value(Value::Int(summary.rows_inserted as i64)),
            value(Value::Timestamp(summary.completed_at)),
        ])
        .upsert_on(&names[..1])
        .build();

    Ok(render(&ast, &Postgres))
}

pub async fn persist(
    adapter: &dyn SqlAdapter,
    metadata_table: &str,
    summary: &ImportSummary,
) -> Result<(), IngestError> {
    adapter.exec(&metadata_table_ddl(metadata_table)).await?;
    let (sql, params) = metadata_upsert(metadata_table, summary)?;
    adapter.exec_params(&sql, params).await?;
    debug!(table = %summary.table, total = summary.total, "Metadata record written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::core::data_type::DataType;

    fn summary() -> ImportSummary {
        ImportSummary {
            job_id: JobId::new("job"),
            table: TableName::new("cube_x").unwrap(),
            columns: vec![ColumnDescriptor::new("cnt", "Count", "", DataType::Integer)],
            total: 42,
            rows_inserted: 7,
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn renders_metadata_ddl() {
        assert_eq!(
            metadata_table_ddl("cubeload_imports"),
            concat!(
                r#"CREATE TABLE IF NOT EXISTS "cubeload_imports" ("table_name" TEXT NOT NULL, "#,
                r#""columns" JSONB, "total" BIGINT, "rows_inserted" BIGINT, "#,
                r#""completed_at" TIMESTAMPTZ, PRIMARY KEY ("table_name"));"#
            )
        );
    }

    #[test]
    fn upsert_binds_record_fields() {
        let (sql, params) = metadata_upsert("cubeload_imports", &summary()).unwrap();
        assert!(sql.starts_with(r#"INSERT INTO "cubeload_imports""#));
        assert!(sql.contains(r#"ON CONFLICT ("table_name") DO UPDATE SET"#));
        assert_eq!(params[0], Value::String("cube_x".into()));
        assert_eq!(params[2], Value::Int(42));
        match &params[1] {
            Value::Json(json) => assert_eq!(json[0]["data_type"], "integer"),
            other => panic!("unexpected param {other:?}"),
        }
    }
}
