use crate::sql::base::error::{ConnectorError, DbError};
use async_trait::async_trait;
use model::{core::value::Value, records::row::RowData};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseKind {
    Postgres,
    Other(String),
}

/// The storage operations an import needs: DDL, parameterized DML, reading
/// rows back, and explicit transaction control on a single session.
///
/// An adapter owns one session. Statements issued between [`begin`] and
/// [`commit`]/[`rollback`] run inside that transaction.
///
/// [`begin`]: SqlAdapter::begin
/// [`commit`]: SqlAdapter::commit
/// [`rollback`]: SqlAdapter::rollback
#[async_trait]
pub trait SqlAdapter: Send + Sync {
    async fn connect(url: &str) -> Result<Self, ConnectorError>
    where
        Self: Sized;

    // Exec / Params
    async fn exec(&self, query: &str) -> Result<(), DbError>;
    async fn exec_params(&self, query: &str, params: Vec<Value>) -> Result<u64, DbError>;

    async fn query_rows(&self, query: &str, params: Vec<Value>) -> Result<Vec<RowData>, DbError>;

    // Transactions
    async fn begin(&self) -> Result<(), DbError>;
    async fn commit(&self) -> Result<(), DbError>;
    async fn rollback(&self) -> Result<(), DbError>;

    fn kind(&self) -> DatabaseKind;
}
