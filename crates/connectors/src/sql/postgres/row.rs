use crate::sql::base::error::DbError;
use chrono::{DateTime, NaiveDate, Utc};
use model::{
    core::value::{FieldValue, Value},
    records::row::RowData,
};
use tokio_postgres::{Row as PgRow, types::Type};

/// Converts a result row into [`RowData`], mapping each column by its wire type.
/// Types without a native mapping must be cast to `TEXT` by the query.
pub(crate) fn to_row_data(row: &PgRow) -> Result<RowData, DbError> {
    let fields = row
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let value = read_value(row, idx, column.type_())?;
            Ok(FieldValue {
                name: column.name().to_string(),
                value,
            })
        })
        .collect::<Result<Vec<_>, DbError>>()?;
    Ok(RowData::new(fields))
}

fn read_value(row: &PgRow, idx: usize, ty: &Type) -> Result<Value, DbError> {
    let value = match *ty {
        Type::INT2 => row.try_get::<_, Option<i16>>(idx)?.map(|v| Value::Int(v.into())),
        Type::INT4 => row.try_get::<_, Option<i32>>(idx)?.map(|v| Value::Int(v.into())),
        Type::INT8 => row.try_get::<_, Option<i64>>(idx)?.map(Value::Int),
        Type::FLOAT4 => row
            .try_get::<_, Option<f32>>(idx)?
            .map(|v| Value::Float(v.into())),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx)?.map(Value::Float),
        Type::BOOL => row.try_get::<_, Option<bool>>(idx)?.map(Value::Boolean),
        Type::DATE => row.try_get::<_, Option<NaiveDate>>(idx)?.map(Value::Date),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)?
            .map(Value::Timestamp),
        Type::JSON | Type::JSONB => row
            .try_get::<_, Option<serde_json::Value>>(idx)?
            .map(Value::Json),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
            row.try_get::<_, Option<String>>(idx)?.map(Value::String)
        }
        ref other => {
            return Err(DbError::Conversion(format!(
                "unsupported column type {other} at position {idx}"
            )));
        }
    };
    Ok(value.unwrap_or(Value::Null))
}
