//! Materializes parsed lines into a typed table.
//!
//! The sink moves through `AwaitingHeader -> AcceptingRows -> Finalizing ->
//! Done`. The first line fixes the columns and creates the schema; every
//! later line is a row. Rows are buffered and written with multi-row
//! INSERTs. A sink may be fed across several requests: its columns and state
//! survive between them, so only the first request carries a header.

pub mod buffer;
pub mod finalize;
pub mod schema;

use crate::{
    config::IngestConfig,
    error::{ConsistencyError, IngestError, LifecycleError},
    metrics::{Counter, Metrics},
    summary::{self, ImportSummary},
};
use buffer::{RowBuffer, SqlCell, render_cell};
use chrono::Utc;
use connectors::{
    metadata::{hints::ColumnHints, resolver::ColumnResolver},
    sql::base::adapter::SqlAdapter,
};
use model::{
    column::ColumnDescriptor,
    core::{
        cell::Cell,
        identifiers::{JobId, TableName},
    },
};
use schema::SchemaPlan;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkState {
    AwaitingHeader,
    AcceptingRows,
    Finalizing,
    Done,
}

impl SinkState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SinkState::AwaitingHeader => "awaiting header",
            SinkState::AcceptingRows => "accepting rows",
            SinkState::Finalizing => "finalizing",
            SinkState::Done => "done",
        }
    }
}

pub struct TableSink {
    table: TableName,
    resolver: Arc<ColumnResolver>,
    hints: ColumnHints,
    metadata_table: String,
    state: SinkState,
    columns: Vec<ColumnDescriptor>,
    schema: Option<SchemaPlan>,
    buffer: RowBuffer,
    rows_inserted: u64,
    metrics: Metrics,
}

impl TableSink {
    pub fn new(
        table: TableName,
        resolver: Arc<ColumnResolver>,
        hints: ColumnHints,
        config: &IngestConfig,
    ) -> Self {
        Self {
            table,
            resolver,
            hints,
            metadata_table: config.metadata_table.clone(),
            state: SinkState::AwaitingHeader,
            columns: Vec::new(),
            schema: None,
            buffer: RowBuffer::new(config.batch_size),
            rows_inserted: 0,
            metrics: Metrics::new(),
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }

    pub fn state(&self) -> SinkState {
        self.state
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn rows_inserted(&self) -> u64 {
        self.rows_inserted
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Routes a parsed line to the header or row handler.
    pub async fn accept(
        &mut self,
        adapter: &dyn SqlAdapter,
        cells: Vec<Cell>,
        line: usize,
    ) -> Result<(), IngestError> {
        self.metrics.add(Counter::Lines, 1);
        match self.state {
            SinkState::AwaitingHeader => self.on_header(adapter, cells).await,
            _ => self.on_row(adapter, cells, line).await,
        }
    }

    /// Resolves the columns and creates the table and its unique index.
    pub async fn on_header(
        &mut self,
        adapter: &dyn SqlAdapter,
        cells: Vec<Cell>,
    ) -> Result<(), IngestError> {
        self.expect_state(SinkState::AwaitingHeader, "accept a header")?;

        let header: Vec<String> = cells.into_iter().map(Cell::into_string).collect();
        let columns = self.resolver.resolve(&header, &self.hints)?;
        let plan = SchemaPlan::new(&self.table, &columns);

        for statement in plan.statements() {
            adapter.exec(&statement).await?;
        }

        info!(
            table = %self.table,
            columns = columns.len(),
            dimensions = plan.dimensions().len(),
            "Created import table"
        );

        self.columns = columns;
        self.schema = Some(plan);
        self.state = SinkState::AcceptingRows;
        Ok(())
    }

    /// Validates one row and buffers it, flushing when the buffer is full.
    /// Short rows are padded with absent cells.
    pub async fn on_row(
        &mut self,
        adapter: &dyn SqlAdapter,
        mut cells: Vec<Cell>,
        line: usize,
    ) -> Result<(), IngestError> {
        self.expect_state(SinkState::AcceptingRows, "accept a row")?;

        let expected = self.columns.len();
        if cells.len() > expected {
            return Err(ConsistencyError::TooManyCells {
                line,
                expected,
                actual: cells.len(),
            }
            .into());
        }
        cells.resize(expected, Cell::Value(String::new()));

        let row = cells
            .into_iter()
            .zip(&self.columns)
            .map(|(cell, column)| render_cell(cell, column))
            .collect::<Result<Vec<SqlCell>, _>>()?;

        self.buffer.push(row);
        self.metrics.add(Counter::Rows, 1);

        if self.buffer.is_full() {
            self.flush(adapter).await?;
        }
        Ok(())
    }

    /// Writes every buffered row. The buffer is cleared only once all
    /// statements succeeded; returns the number of rows written.
    pub async fn flush(&mut self, adapter: &dyn SqlAdapter) -> Result<usize, IngestError> {
        if self.buffer.is_empty() {
            return Ok(0);
        }

        for (sql, params) in self.buffer.insert_statements(&self.table, &self.columns) {
            adapter.exec_params(&sql, params).await?;
        }

        let rows = self.buffer.len();
        self.buffer.clear();
        self.rows_inserted += rows as u64;
        self.metrics.add(Counter::Batches, 1);
        debug!(table = %self.table, rows, total = self.rows_inserted, "Flushed batch");
        Ok(rows)
    }

    /// Flushes the remainder, reads the grand total and persists the
    /// metadata record.
    pub async fn finish(
        &mut self,
        adapter: &dyn SqlAdapter,
        job_id: &JobId,
    ) -> Result<ImportSummary, IngestError> {
        self.expect_state(SinkState::AcceptingRows, "finish")?;
        self.flush(adapter).await?;
        self.state = SinkState::Finalizing;

        let dimensions = self
            .schema
            .as_ref()
            .map(|plan| plan.dimensions().to_vec())
            .unwrap_or_default();
        let total = finalize::grand_total(adapter, &self.table, &dimensions).await?;

        let summary = ImportSummary {
            job_id: job_id.clone(),
            table: self.table.clone(),
            columns: self.columns.clone(),
            total,
            rows_inserted: self.rows_inserted,
            completed_at: Utc::now(),
        };
        summary::persist(adapter, &self.metadata_table, &summary).await?;

        self.state = SinkState::Done;
        info!(
            job_id = %job_id,
            table = %self.table,
            total,
            rows = self.rows_inserted,
            "Import finalized"
        );
        Ok(summary)
    }

    fn expect_state(&self, expected: SinkState, action: &'static str) -> Result<(), IngestError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(LifecycleError::InvalidState {
                action,
                state: self.state.as_str(),
            }
            .into())
        }
    }
}
