use crate::sql::{
    base::{
        adapter::{DatabaseKind, SqlAdapter},
        error::{ConnectorError, DbError},
    },
    postgres::{
        params::{Bind, as_refs},
        row::to_row_data,
        utils::connect_client,
    },
};
use async_trait::async_trait;
use model::{core::value::Value, records::row::RowData};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_postgres::Client;
use tracing::debug;

/// A single Postgres session. Transactions are driven with plain
/// `BEGIN`/`COMMIT`/`ROLLBACK` so the adapter can be held across requests
/// without borrowing the client.
pub struct PgAdapter {
    client: Client,
    in_transaction: AtomicBool,
}

impl PgAdapter {
    pub fn from_client(client: Client) -> Self {
        Self {
            client,
            in_transaction: AtomicBool::new(false),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.client.is_closed()
    }
}

#[async_trait]
impl SqlAdapter for PgAdapter {
    async fn connect(url: &str) -> Result<Self, ConnectorError> {
        Ok(Self::from_client(connect_client(url).await?))
    }

    async fn exec(&self, query: &str) -> Result<(), DbError> {
        debug!(sql = query, "exec");
        self.client.batch_execute(query).await?;
        Ok(())
    }

    async fn exec_params(&self, query: &str, params: Vec<Value>) -> Result<u64, DbError> {
        debug!(params = params.len(), "exec_params");
        let binds = Bind::all(&params);
        Ok(self.client.execute(query, &as_refs(&binds)).await?)
    }

    async fn query_rows(&self, query: &str, params: Vec<Value>) -> Result<Vec<RowData>, DbError> {
        let binds = Bind::all(&params);
        let rows = self.client.query(query, &as_refs(&binds)).await?;
        rows.iter().map(to_row_data).collect()
    }

    async fn begin(&self) -> Result<(), DbError> {
        if self.in_transaction.swap(true, Ordering::SeqCst) {
            return Err(DbError::Transaction("transaction already open".into()));
        }
        if let Err(err) = self.client.batch_execute("BEGIN").await {
            self.in_transaction.store(false, Ordering::SeqCst);
            return Err(err.into());
        }
        Ok(())
    }

    async fn commit(&self) -> Result<(), DbError> {
        if !self.in_transaction.swap(false, Ordering::SeqCst) {
            return Err(DbError::Transaction("no open transaction to commit".into()));
        }
        self.client.batch_execute("COMMIT").await?;
        Ok(())
    }

    async fn rollback(&self) -> Result<(), DbError> {
        if !self.in_transaction.swap(false, Ordering::SeqCst) {
            return Err(DbError::Transaction("no open transaction to roll back".into()));
        }
        self.client.batch_execute("ROLLBACK").await?;
        Ok(())
    }

    fn kind(&self) -> DatabaseKind {
        DatabaseKind::Postgres
    }
}
