use connectors::{file::csv::parser::LineParser, sql::base::adapter::SqlAdapter};
use engine_core::{
    error::IngestError,
    metrics::{Counter, MetricsSnapshot},
    pipeline::{self, StreamStats},
    sink::TableSink,
    summary::ImportSummary,
};
use model::core::identifiers::{JobId, TableName};
use std::{fmt, time::Duration};
use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Active,
    Committed,
    RolledBack,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JobState::Active => "active",
            JobState::Committed => "committed",
            JobState::RolledBack => "rolled back",
        })
    }
}

/// What a caller learns after a request against a job.
#[derive(Debug, Clone, PartialEq)]
pub enum HandleOutcome {
    /// More data is expected. The job stays open until `lease` elapses
    /// without another request.
    Parked {
        job_id: JobId,
        lease: Duration,
        stats: StreamStats,
    },
    Committed(ImportSummary),
}

impl HandleOutcome {
    pub fn job_id(&self) -> &JobId {
        match self {
            HandleOutcome::Parked { job_id, .. } => job_id,
            HandleOutcome::Committed(summary) => &summary.job_id,
        }
    }
}

/// One import: an exclusively owned session with an open transaction, the
/// sink accumulating into it, and the lease generation guarding expiry.
pub struct ImportJob {
    id: JobId,
    adapter: Box<dyn SqlAdapter>,
    sink: TableSink,
    state: JobState,
    lease_generation: u64,
    requests: u64,
}

impl ImportJob {
    /// Begins the job's transaction.
    pub async fn open(
        id: JobId,
        adapter: Box<dyn SqlAdapter>,
        sink: TableSink,
    ) -> Result<Self, IngestError> {
        adapter.begin().await?;
        Ok(Self {
            id,
            adapter,
            sink,
            state: JobState::Active,
            lease_generation: 0,
            requests: 0,
        })
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn table(&self) -> &TableName {
        self.sink.table()
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn requests(&self) -> u64 {
        self.requests
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.sink.metrics().snapshot()
    }

    pub(crate) fn lease_generation(&self) -> u64 {
        self.lease_generation
    }

    /// Invalidates any lease armed so far and returns the new generation.
    pub(crate) fn renew_lease(&mut self) -> u64 {
        self.lease_generation += 1;
        self.lease_generation
    }

    /// Streams one request body into the sink inside the open transaction.
    pub async fn feed<R>(
        &mut self,
        body: R,
        parser: &LineParser,
        max_line_length: usize,
        cancel: &CancellationToken,
    ) -> Result<StreamStats, IngestError>
    where
        R: AsyncRead + Send,
    {
        self.requests += 1;
        pipeline::run(
            body,
            &mut self.sink,
            self.adapter.as_ref(),
            parser,
            max_line_length,
            cancel,
        )
        .await
    }

    /// Finalizes the sink, then commits. The metadata record is written
    /// inside the transaction, so it is visible only if the commit succeeds.
    pub async fn commit(&mut self) -> Result<ImportSummary, IngestError> {
        let summary = self.sink.finish(self.adapter.as_ref(), &self.id).await?;
        self.adapter.commit().await?;
        self.state = JobState::Committed;
        Ok(summary)
    }

    /// Rolls back if still active. Failures are logged, never returned, so
    /// they cannot mask the error that caused the rollback.
    pub async fn rollback(&mut self) {
        if self.state != JobState::Active {
            return;
        }
        self.state = JobState::RolledBack;
        self.sink.metrics().add(Counter::Failures, 1);
        if let Err(err) = self.adapter.rollback().await {
            error!(job_id = %self.id, error = %err, "Rollback failed");
        }
    }
}
