#![allow(dead_code)]

use async_trait::async_trait;
use connectors::{
    metadata::hints::ColumnHints,
    sql::base::{
        adapter::{DatabaseKind, SqlAdapter},
        error::{ConnectorError, DbError},
    },
};
use engine_core::{config::IngestConfig, error::IngestError, sink::TableSink};
use engine_runtime::factory::ConnectionFactory;
use model::{
    core::{
        identifiers::TableName,
        value::{FieldValue, Value},
    },
    records::row::RowData,
};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

/// One call observed by a [`MemoryAdapter`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Begin,
    Commit,
    Rollback,
    Exec(String),
    ExecParams(String, Vec<Value>),
    Query(String),
}

#[derive(Debug, Default)]
struct Recorded {
    calls: Vec<Call>,
    total_rows: Vec<RowData>,
    fail_on: Option<String>,
}

/// An adapter that records every statement instead of running it.
///
/// Clones share one log, so a test can hand a clone to a factory and still
/// inspect what every job did. Queries answer with the configured grand
/// total rows; statements containing the `fail_on` fragment fail.
#[derive(Debug, Clone, Default)]
pub struct MemoryAdapter {
    recorded: Arc<Mutex<Recorded>>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers the grand total query with one row holding `total`.
    pub fn with_total(self, total: i64) -> Self {
        self.with_total_rows(vec![total_row(total)])
    }

    pub fn with_total_rows(self, rows: Vec<RowData>) -> Self {
        self.recorded.lock().unwrap().total_rows = rows;
        self
    }

    /// Fails any statement whose SQL contains `fragment`.
    pub fn fail_on(self, fragment: &str) -> Self {
        self.recorded.lock().unwrap().fail_on = Some(fragment.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.recorded.lock().unwrap().calls.clone()
    }

    /// SQL of every DDL statement, in order.
    pub fn ddl(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Exec(sql) => Some(sql),
                _ => None,
            })
            .collect()
    }

    /// Parameterized inserts into `table`, in order.
    pub fn inserts_into(&self, table: &str) -> Vec<(String, Vec<Value>)> {
        let prefix = format!("INSERT INTO \"{table}\"");
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::ExecParams(sql, params) if sql.starts_with(&prefix) => Some((sql, params)),
                _ => None,
            })
            .collect()
    }

    pub fn queries(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Query(sql) => Some(sql),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &Call) -> usize {
        self.calls().iter().filter(|call| *call == wanted).count()
    }

    fn record(&self, call: Call, sql: Option<&str>) -> Result<(), DbError> {
        let mut recorded = self.recorded.lock().unwrap();
        if let (Some(fragment), Some(sql)) = (&recorded.fail_on, sql)
            && sql.contains(fragment.as_str())
        {
            return Err(DbError::Write(format!("injected failure on {fragment}")));
        }
        recorded.calls.push(call);
        Ok(())
    }
}

#[async_trait]
impl SqlAdapter for MemoryAdapter {
    async fn connect(_url: &str) -> Result<Self, ConnectorError> {
        Ok(Self::new())
    }

    async fn exec(&self, query: &str) -> Result<(), DbError> {
        self.record(Call::Exec(query.to_string()), Some(query))
    }

    async fn exec_params(&self, query: &str, params: Vec<Value>) -> Result<u64, DbError> {
        self.record(Call::ExecParams(query.to_string(), params), Some(query))?;
        Ok(1)
    }

    async fn query_rows(&self, query: &str, _params: Vec<Value>) -> Result<Vec<RowData>, DbError> {
        self.record(Call::Query(query.to_string()), Some(query))?;
        Ok(self.recorded.lock().unwrap().total_rows.clone())
    }

    async fn begin(&self) -> Result<(), DbError> {
        self.record(Call::Begin, None)
    }

    async fn commit(&self) -> Result<(), DbError> {
        self.record(Call::Commit, None)
    }

    async fn rollback(&self) -> Result<(), DbError> {
        self.record(Call::Rollback, None)
    }

    fn kind(&self) -> DatabaseKind {
        DatabaseKind::Other("memory".into())
    }
}

/// Hands every job a clone of the same [`MemoryAdapter`].
pub struct MemoryFactory {
    adapter: MemoryAdapter,
    connects: AtomicUsize,
}

impl MemoryFactory {
    pub fn new(adapter: MemoryAdapter) -> Arc<Self> {
        Arc::new(Self {
            adapter,
            connects: AtomicUsize::new(0),
        })
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectionFactory for MemoryFactory {
    async fn connect(&self) -> Result<Box<dyn SqlAdapter>, IngestError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.adapter.clone()))
    }
}

pub fn total_row(total: i64) -> RowData {
    RowData::new(vec![FieldValue {
        name: "total".to_string(),
        value: Value::String(total.to_string()),
    }])
}

/// A sink resolving columns the way a job does: through the configured
/// dictionary, the embedded one by default.
pub fn sink(table: &str, hints: ColumnHints, config: &IngestConfig) -> TableSink {
    TableSink::new(
        TableName::new(table).unwrap(),
        Arc::new(config.resolver().unwrap()),
        hints,
        config,
    )
}

/// A CSV body with a `region` header followed by `rows` distinct rows.
pub fn region_body(rows: usize) -> String {
    let mut body = String::from("region\n");
    for i in 0..rows {
        body.push_str(&format!("r{i}\n"));
    }
    body
}

/// Yields to every ready task so spawned work can settle.
pub async fn settle() {
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
}
