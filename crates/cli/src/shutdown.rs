use engine_runtime::registry::JobRegistry;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Rolls back every open job when the process is asked to stop.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
    requested: Arc<AtomicBool>,
}

impl ShutdownCoordinator {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Spawns a watcher that triggers shutdown on SIGINT or SIGTERM. The
    /// watcher exits quietly once the coordinator's token is cancelled.
    pub fn register_handlers(&self, registry: JobRegistry) {
        let coordinator = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                name = termination_signal() => {
                    info!(signal = name, "Shutting down, rolling back open jobs");
                    coordinator.trigger(&registry).await;
                }
                _ = coordinator.token.cancelled() => {}
            }
        });
    }

    pub async fn trigger(&self, registry: &JobRegistry) {
        self.requested.store(true, Ordering::SeqCst);
        self.token.cancel();
        registry.shutdown().await;
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

/// Resolves with the name of the first termination signal received. A
/// handler that cannot be installed never fires.
async fn termination_signal() -> &'static str {
    let interrupt = async {
        match signal::ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(err) => {
                error!(%err, "Failed to install SIGINT handler");
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                "SIGTERM"
            }
            Err(err) => {
                error!(%err, "Failed to install SIGTERM handler");
                std::future::pending().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&'static str>();

    tokio::select! {
        name = interrupt => name,
        name = terminate => name,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    /// 128 + SIGINT.
    ShutdownRequested = 130,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_runtime::factory::PgConnectionFactory;
    use engine_core::config::IngestConfig;

    #[tokio::test]
    async fn trigger_marks_shutdown_and_cancels() {
        let token = CancellationToken::new();
        let coordinator = ShutdownCoordinator::new(token.clone());
        let registry = JobRegistry::new(
            IngestConfig::default(),
            Arc::new(PgConnectionFactory::new("postgres://unused")),
        )
        .unwrap();

        assert!(!coordinator.is_shutdown_requested());
        coordinator.trigger(&registry).await;

        assert!(coordinator.is_shutdown_requested());
        assert!(token.is_cancelled());
        assert!(registry.is_empty().await);
    }

    #[test]
    fn exit_codes() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::ShutdownRequested.as_i32(), 130);
    }
}
