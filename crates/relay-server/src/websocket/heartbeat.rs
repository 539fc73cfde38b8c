//! Periodic logical ping/pong liveness probing.

use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::connection::ClientConnection;

/// Why a heartbeat loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatOutcome {
    /// The client missed a full probe window and should be terminated.
    TimedOut,
    /// The connection is shutting down for another reason.
    Cancelled,
}

/// Probe `conn` every `interval` until it misses a window or the token
/// fires.
///
/// Each tick first checks the flag from the previous cycle: a
/// connection still pending did not answer the last ping and is
/// declared dead. Otherwise the flag flips to pending and a fresh
/// `{"type":"ping"}` goes out. A client therefore gets exactly one full
/// interval to answer — at most two missed windows from its last
/// activity.
pub async fn run_heartbeat(
    conn: Arc<ClientConnection>,
    interval: Duration,
    cancel: CancellationToken,
) -> HeartbeatOutcome {
    let mut ticks = time::interval(interval);
    // interval fires immediately; the first real probe is one period out
    let _ = ticks.tick().await;

    loop {
        tokio::select! {
            _ = ticks.tick() => {
                if !conn.is_alive() {
                    return HeartbeatOutcome::TimedOut;
                }
                conn.mark_pending();
                if !conn.ping() {
                    debug!(client_id = %conn.id, "failed to queue ping");
                }
            }
            () = cancel.cancelled() => return HeartbeatOutcome::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    const INTERVAL: Duration = Duration::from_secs(3);

    fn make_conn() -> (Arc<ClientConnection>, mpsc::Receiver<Arc<String>>) {
        let (tx, rx) = mpsc::channel(16);
        (Arc::new(ClientConnection::new("hb".into(), tx)), rx)
    }

    #[tokio::test(start_paused = true)]
    async fn silent_client_dies_on_the_second_cycle() {
        let (conn, mut rx) = make_conn();
        let started = tokio::time::Instant::now();

        let outcome = run_heartbeat(conn, INTERVAL, CancellationToken::new()).await;

        assert_eq!(outcome, HeartbeatOutcome::TimedOut);
        // one ping went out on the first cycle, the second killed it
        assert_eq!(started.elapsed(), INTERVAL * 2);
        assert_eq!(&**rx.try_recv().unwrap(), r#"{"type":"ping"}"#);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn answering_client_keeps_running() {
        let (conn, mut rx) = make_conn();
        let cancel = CancellationToken::new();
        let probe = tokio::spawn(run_heartbeat(
            Arc::clone(&conn),
            INTERVAL,
            cancel.clone(),
        ));

        // answer four probe cycles; sleep slightly past each tick so the
        // probe task runs first
        for _ in 0..4 {
            tokio::time::sleep(INTERVAL + Duration::from_millis(10)).await;
            assert!(rx.try_recv().is_ok());
            conn.mark_alive();
        }

        cancel.cancel();
        assert_eq!(probe.await.unwrap(), HeartbeatOutcome::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn pong_resets_the_window() {
        let (conn, _rx) = make_conn();
        let cancel = CancellationToken::new();
        let probe = tokio::spawn(run_heartbeat(
            Arc::clone(&conn),
            INTERVAL,
            cancel.clone(),
        ));

        // answer the first probe, then go silent
        tokio::time::sleep(INTERVAL + Duration::from_millis(10)).await;
        conn.mark_alive();

        // two more full windows: silent through the second one
        tokio::time::sleep(INTERVAL * 2).await;
        let outcome = probe.await.unwrap();
        assert_eq!(outcome, HeartbeatOutcome::TimedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_probe_never_fires_again() {
        let (conn, mut rx) = make_conn();
        let cancel = CancellationToken::new();
        let probe = tokio::spawn(run_heartbeat(Arc::clone(&conn), INTERVAL, cancel.clone()));

        cancel.cancel();
        assert_eq!(probe.await.unwrap(), HeartbeatOutcome::Cancelled);

        // no ping arrives after cancellation, however long we wait
        tokio::time::sleep(INTERVAL * 3).await;
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn outcome_is_comparable() {
        assert_eq!(HeartbeatOutcome::TimedOut, HeartbeatOutcome::TimedOut);
        assert_ne!(HeartbeatOutcome::TimedOut, HeartbeatOutcome::Cancelled);
    }
}
