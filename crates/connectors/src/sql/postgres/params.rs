use bytes::BytesMut;
use model::core::value::Value;
use std::error::Error;
use tokio_postgres::types::{IsNull, Json, ToSql, Type};

/// Borrows a [`Value`] as a bind parameter.
///
/// The type check is delegated to the native Rust type of each variant, so a
/// value that cannot be encoded for the column type fails with the driver's
/// own `WrongType` error.
#[derive(Debug)]
pub struct Bind<'a>(pub &'a Value);

impl<'a> Bind<'a> {
    pub fn all(values: &'a [Value]) -> Vec<Bind<'a>> {
        values.iter().map(Bind).collect()
    }
}

impl ToSql for Bind<'_> {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self.0 {
            Value::Int(v) => v.to_sql(ty, out),
            Value::Float(v) => v.to_sql(ty, out),
            Value::String(v) => v.to_sql(ty, out),
            Value::Boolean(v) => v.to_sql(ty, out),
            Value::Json(v) => Json(v).to_sql(ty, out),
            Value::Date(v) => v.to_sql(ty, out),
            Value::Timestamp(v) => v.to_sql(ty, out),
            Value::Null => Ok(IsNull::Yes),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    fn to_sql_checked(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self.0 {
            Value::Int(v) => v.to_sql_checked(ty, out),
            Value::Float(v) => v.to_sql_checked(ty, out),
            Value::String(v) => v.to_sql_checked(ty, out),
            Value::Boolean(v) => v.to_sql_checked(ty, out),
            Value::Json(v) => Json(v).to_sql_checked(ty, out),
            Value::Date(v) => v.to_sql_checked(ty, out),
            Value::Timestamp(v) => v.to_sql_checked(ty, out),
            Value::Null => Ok(IsNull::Yes),
        }
    }
}

pub fn as_refs<'b>(binds: &'b [Bind<'_>]) -> Vec<&'b (dyn ToSql + Sync)> {
    binds.iter().map(|b| b as &(dyn ToSql + Sync)).collect()
}
