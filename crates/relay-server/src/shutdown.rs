//! Shutdown coordination for the serve and connection tasks.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// How long [`ShutdownCoordinator::graceful`] waits for tasks to drain.
const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Fans a single cancellation signal out to every server task.
pub struct ShutdownCoordinator {
    token: CancellationToken,
}

impl ShutdownCoordinator {
    /// Create a coordinator with an unfired token.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// A token clone for a task to observe.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Fire the shutdown signal. Idempotent.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Whether shutdown has been requested.
    pub fn is_shutting_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Signal shutdown and wait for `handles` to finish, up to
    /// `timeout` (default 10s). Tasks still running afterwards are left
    /// to die with the process.
    pub async fn graceful(&self, handles: Vec<JoinHandle<()>>, timeout: Option<Duration>) {
        let timeout = timeout.unwrap_or(DEFAULT_DRAIN_TIMEOUT);
        self.shutdown();
        info!(tasks = handles.len(), "draining server tasks");
        let drain = futures::future::join_all(handles);
        if tokio::time::timeout(timeout, drain).await.is_err() {
            warn!(
                timeout_secs = timeout.as_secs(),
                "drain timed out, some tasks may still be running"
            );
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unfired() {
        let coord = ShutdownCoordinator::new();
        assert!(!coord.is_shutting_down());
    }

    #[test]
    fn shutdown_is_idempotent() {
        let coord = ShutdownCoordinator::new();
        coord.shutdown();
        coord.shutdown();
        assert!(coord.is_shutting_down());
    }

    #[test]
    fn tokens_observe_the_signal() {
        let coord = ShutdownCoordinator::new();
        let token = coord.token();
        assert!(!token.is_cancelled());
        coord.shutdown();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn graceful_waits_for_tasks() {
        let coord = ShutdownCoordinator::new();
        let token = coord.token();
        let task = tokio::spawn(async move {
            token.cancelled().await;
        });
        coord
            .graceful(vec![task], Some(Duration::from_secs(1)))
            .await;
        assert!(coord.is_shutting_down());
    }

    #[tokio::test(start_paused = true)]
    async fn graceful_gives_up_on_stuck_tasks() {
        let coord = ShutdownCoordinator::new();
        let stuck = tokio::spawn(async {
            std::future::pending::<()>().await;
        });
        // Returns despite the task never finishing
        coord
            .graceful(vec![stuck], Some(Duration::from_millis(50)))
            .await;
        assert!(coord.is_shutting_down());
    }
}
