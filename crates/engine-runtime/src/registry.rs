//! Process-wide table of open import jobs.
//!
//! A [`JobRegistry`] is owned by the server (or CLI) and shared by clone.
//! Lookups and evictions take the map lock only briefly; each job sits
//! behind its own mutex so that requests against one job id are
//! serialized while requests against different ids proceed in parallel.
//! When both locks are needed the job lock is taken first.

use crate::{
    factory::ConnectionFactory,
    job::{HandleOutcome, ImportJob, JobState},
    lease::{ExpiryHandler, LeaseTimer},
};
use connectors::{
    file::csv::parser::LineParser,
    metadata::{error::MetadataError, hints::ColumnHints, resolver::ColumnResolver},
};
use engine_core::{
    config::IngestConfig,
    error::{ConfigError, IngestError, LifecycleError},
    sink::TableSink,
};
use futures::FutureExt;
use model::core::identifiers::{JobId, TableName};
use std::{
    collections::HashMap,
    sync::{Arc, Weak},
    time::Duration,
};
use tokio::{
    io::AsyncRead,
    sync::{Mutex, RwLock},
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

type SharedJob = Arc<Mutex<ImportJob>>;

#[derive(Clone)]
pub struct JobRegistry {
    inner: Arc<Inner>,
}

struct Inner {
    jobs: RwLock<HashMap<JobId, SharedJob>>,
    config: IngestConfig,
    resolver: Arc<ColumnResolver>,
    parser: LineParser,
    factory: Arc<dyn ConnectionFactory>,
    lease: LeaseTimer,
    cancel: CancellationToken,
}

impl JobRegistry {
    /// Builds a registry and starts its lease reaper. Must be called from
    /// within a tokio runtime.
    pub fn new(
        config: IngestConfig,
        factory: Arc<dyn ConnectionFactory>,
    ) -> Result<Self, ConfigError> {
        let resolver = config.resolver()?;
        Ok(Self::with_resolver(config, resolver, factory))
    }

    pub fn with_resolver(
        config: IngestConfig,
        resolver: ColumnResolver,
        factory: Arc<dyn ConnectionFactory>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let parser = LineParser::new(config.parser_config());

        let inner = Arc::new_cyclic(|weak: &Weak<Inner>| {
            let weak = weak.clone();
            let on_expire: ExpiryHandler = Arc::new(move |id, generation| {
                let weak = weak.clone();
                async move {
                    if let Some(inner) = weak.upgrade() {
                        inner.expire(id, generation).await;
                    }
                }
                .boxed()
            });
            let (lease, _reaper) = LeaseTimer::spawn(on_expire, cancel.clone());

            Inner {
                jobs: RwLock::new(HashMap::new()),
                config,
                resolver: Arc::new(resolver),
                parser,
                factory,
                lease,
                cancel,
            }
        });

        Self { inner }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.inner.config
    }

    pub fn lease(&self) -> Duration {
        self.inner.config.lease
    }

    pub async fn len(&self) -> usize {
        self.inner.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.jobs.read().await.is_empty()
    }

    pub async fn contains(&self, id: &JobId) -> bool {
        self.inner.jobs.read().await.contains_key(id)
    }

    /// Opens a session and a transaction for a new import into the table of
    /// `subscription`, and registers the job under a fresh id. The lease
    /// starts immediately, so a job that never receives a request is
    /// reclaimed too.
    pub async fn create(
        &self,
        subscription: &str,
        hints: ColumnHints,
    ) -> Result<JobId, IngestError> {
        let inner = &self.inner;
        let table = TableName::for_subscription(&inner.config.table_prefix, subscription)
            .map_err(MetadataError::from)?;

        let adapter = inner.factory.connect().await?;
        let sink = TableSink::new(table.clone(), inner.resolver.clone(), hints, &inner.config);
        let id = JobId::generate();
        let mut job = ImportJob::open(id.clone(), adapter, sink).await?;
        let generation = job.renew_lease();

        inner
            .jobs
            .write()
            .await
            .insert(id.clone(), Arc::new(Mutex::new(job)));
        inner.lease.arm(&id, generation, inner.config.lease);

        info!(job_id = %id, table = %table, "Import job created");
        Ok(id)
    }

    /// Streams one request body into job `id`.
    ///
    /// With `continue_` set the job is parked and its lease re-armed;
    /// otherwise it is finalized, committed and evicted. Any failure rolls
    /// the job back, evicts it and returns the error as raised.
    pub async fn handle<R>(
        &self,
        id: &JobId,
        body: R,
        continue_: bool,
    ) -> Result<HandleOutcome, IngestError>
    where
        R: AsyncRead + Send,
    {
        let inner = &self.inner;
        let job = inner.get(id).await?;
        let mut job = job.lock().await;

        if job.state() != JobState::Active {
            return Err(LifecycleError::JobNotActive {
                id: id.clone(),
                state: job.state().to_string(),
            }
            .into());
        }

        inner.lease.disarm(id);
        let generation = job.renew_lease();
        if job.requests() > 0 {
            info!(job_id = %id, request = job.requests() + 1, "Import job resumed");
        }

        let cancel = inner.cancel.child_token();
        let result = match job
            .feed(body, &inner.parser, inner.config.max_line_length, &cancel)
            .await
        {
            Ok(stats) if continue_ => Ok(HandleOutcome::Parked {
                job_id: id.clone(),
                lease: inner.config.lease,
                stats,
            }),
            Ok(_) => job.commit().await.map(HandleOutcome::Committed),
            Err(err) => Err(err),
        };

        match result {
            Ok(outcome @ HandleOutcome::Parked { .. }) => {
                inner.lease.arm(id, generation, inner.config.lease);
                info!(
                    job_id = %id,
                    lease_secs = inner.config.lease.as_secs(),
                    "Import job parked"
                );
                Ok(outcome)
            }
            Ok(outcome) => {
                inner.evict(id).await;
                info!(job_id = %id, metrics = ?job.metrics(), "Import job committed");
                Ok(outcome)
            }
            Err(err) => {
                job.rollback().await;
                inner.evict(id).await;
                warn!(job_id = %id, kind = %err.kind(), error = %err, "Import job rolled back");
                Err(err)
            }
        }
    }

    /// Creates a job and feeds it its first body in one call.
    pub async fn submit<R>(
        &self,
        subscription: &str,
        hints: ColumnHints,
        body: R,
        continue_: bool,
    ) -> Result<HandleOutcome, IngestError>
    where
        R: AsyncRead + Send,
    {
        let id = self.create(subscription, hints).await?;
        self.handle(&id, body, continue_).await
    }

    /// Stops the reaper, interrupts in-flight requests and rolls back every
    /// job still registered.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let jobs: Vec<(JobId, SharedJob)> = self.inner.jobs.write().await.drain().collect();
        for (id, job) in jobs {
            let mut job = job.lock().await;
            if job.state() == JobState::Active {
                job.rollback().await;
                info!(job_id = %id, "Import job rolled back on shutdown");
            }
        }
    }
}

impl Inner {
    async fn get(&self, id: &JobId) -> Result<SharedJob, IngestError> {
        self.jobs
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| LifecycleError::JobNotFound(id.clone()).into())
    }

    async fn evict(&self, id: &JobId) {
        self.lease.disarm(id);
        self.jobs.write().await.remove(id);
    }

    /// Rolls back a job whose lease ran out. A lease armed before the job's
    /// latest request is stale and ignored.
    async fn expire(&self, id: JobId, generation: u64) {
        let Ok(job) = self.get(&id).await else {
            return;
        };
        let mut job = job.lock().await;
        if job.state() != JobState::Active || job.lease_generation() != generation {
            return;
        }

        job.rollback().await;
        self.jobs.write().await.remove(&id);
        info!(job_id = %id, table = %job.table(), "Import job lease expired");
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
