//! Lease deadlines for parked jobs, kept in a single timer wheel.

use futures::future::BoxFuture;
use model::core::identifiers::JobId;
use std::{collections::HashMap, future::poll_fn, sync::Arc, time::Duration};
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::{
    sync::CancellationToken,
    time::{DelayQueue, delay_queue::Key},
};
use tracing::debug;

#[derive(Debug)]
pub(crate) enum LeaseCommand {
    Arm {
        id: JobId,
        generation: u64,
        after: Duration,
    },
    Disarm {
        id: JobId,
    },
}

/// Called with the job id and the generation the lease was armed with.
pub(crate) type ExpiryHandler = Arc<dyn Fn(JobId, u64) -> BoxFuture<'static, ()> + Send + Sync>;

/// Handle to the reaper task.
#[derive(Debug, Clone)]
pub(crate) struct LeaseTimer {
    tx: mpsc::UnboundedSender<LeaseCommand>,
}

impl LeaseTimer {
    /// Spawns the reaper. It stops when `cancel` fires or every handle
    /// has been dropped.
    pub(crate) fn spawn(
        on_expire: ExpiryHandler,
        cancel: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_reaper(rx, on_expire, cancel));
        (Self { tx }, handle)
    }

    /// Arms or re-arms the lease of `id`. An earlier deadline is replaced.
    pub(crate) fn arm(&self, id: &JobId, generation: u64, after: Duration) {
        let _ = self.tx.send(LeaseCommand::Arm {
            id: id.clone(),
            generation,
            after,
        });
    }

    pub(crate) fn disarm(&self, id: &JobId) {
        let _ = self.tx.send(LeaseCommand::Disarm { id: id.clone() });
    }
}

async fn run_reaper(
    mut rx: mpsc::UnboundedReceiver<LeaseCommand>,
    on_expire: ExpiryHandler,
    cancel: CancellationToken,
) {
    let mut queue: DelayQueue<(JobId, u64)> = DelayQueue::new();
    let mut keys: HashMap<JobId, Key> = HashMap::new();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            command = rx.recv() => match command {
                Some(LeaseCommand::Arm { id, generation, after }) => {
                    if let Some(key) = keys.remove(&id) {
                        queue.remove(&key);
                    }
                    let key = queue.insert((id.clone(), generation), after);
                    keys.insert(id, key);
                }
                Some(LeaseCommand::Disarm { id }) => {
                    if let Some(key) = keys.remove(&id) {
                        queue.remove(&key);
                    }
                }
                None => break,
            },
            Some(expired) = poll_fn(|cx| queue.poll_expired(cx)), if !queue.is_empty() => {
                let (id, generation) = expired.into_inner();
                keys.remove(&id);
                debug!(job_id = %id, generation, "Lease expired");
                tokio::spawn(on_expire(id, generation));
            }
        }
    }
    debug!(pending = queue.len(), "Lease reaper stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::sync::Mutex;

    fn recorder() -> (ExpiryHandler, Arc<Mutex<Vec<(String, u64)>>>) {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let sink = fired.clone();
        let handler: ExpiryHandler = Arc::new(move |id: JobId, generation| {
            let sink = sink.clone();
            async move {
                sink.lock().unwrap().push((id.to_string(), generation));
            }
            .boxed()
        });
        (handler, fired)
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fires_after_deadline() {
        let (handler, fired) = recorder();
        let (timer, _handle) = LeaseTimer::spawn(handler, CancellationToken::new());

        timer.arm(&JobId::new("a"), 1, Duration::from_secs(30));
        settle().await;
        tokio::time::advance(Duration::from_secs(29)).await;
        settle().await;
        assert!(fired.lock().unwrap().is_empty());

        tokio::time::advance(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(*fired.lock().unwrap(), vec![("a".to_string(), 1)]);
    }

    #[tokio::test(start_paused = true)]
    async fn rearm_replaces_deadline_and_disarm_cancels() {
        let (handler, fired) = recorder();
        let (timer, _handle) = LeaseTimer::spawn(handler, CancellationToken::new());

        timer.arm(&JobId::new("a"), 1, Duration::from_secs(10));
        timer.arm(&JobId::new("b"), 1, Duration::from_secs(10));
        settle().await;
        tokio::time::advance(Duration::from_secs(5)).await;
        timer.arm(&JobId::new("a"), 2, Duration::from_secs(10));
        timer.disarm(&JobId::new("b"));
        settle().await;

        tokio::time::advance(Duration::from_secs(6)).await;
        settle().await;
        assert!(fired.lock().unwrap().is_empty());

        tokio::time::advance(Duration::from_secs(5)).await;
        settle().await;
        assert_eq!(*fired.lock().unwrap(), vec![("a".to_string(), 2)]);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_on_cancel() {
        let (handler, _fired) = recorder();
        let cancel = CancellationToken::new();
        let (_timer, handle) = LeaseTimer::spawn(handler, cancel.clone());
        cancel.cancel();
        handle.await.unwrap();
    }
}
