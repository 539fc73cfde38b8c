//! Per-client `WebSocket` connection state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;
use relay_protocol::{SessionId, ping};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// A connected relay client.
///
/// Holds the liveness flag, the outbound frame channel, and a cached
/// back-reference to the session the client belongs to. Membership
/// itself is owned by [`super::session::Session`]; the back-reference
/// only enables O(1) reverse lookup on disconnect and is cleared
/// atomically with removal from the member set.
pub struct ClientConnection {
    /// Unique connection id, assigned at accept time.
    pub id: String,
    /// Back-reference to the session this connection is a member of.
    session: Mutex<Option<SessionId>>,
    /// Outbound channel to the socket write task.
    tx: mpsc::Sender<Arc<String>>,
    /// Liveness flag: `true` = alive, `false` = pending a pong.
    alive: AtomicBool,
    /// Stops the heartbeat and write tasks; cancelled exactly once.
    cancel: CancellationToken,
    /// When the connection was accepted.
    pub connected_at: Instant,
    /// Frames dropped because the outbound channel was full or closed.
    dropped_frames: AtomicU64,
}

impl ClientConnection {
    /// Create a connection in the alive state, in no session.
    pub fn new(id: String, tx: mpsc::Sender<Arc<String>>) -> Self {
        Self {
            id,
            session: Mutex::new(None),
            tx,
            alive: AtomicBool::new(true),
            cancel: CancellationToken::new(),
            connected_at: Instant::now(),
            dropped_frames: AtomicU64::new(0),
        }
    }

    /// Queue a frame for delivery.
    ///
    /// Fire-and-forget: a full or closed channel drops the frame,
    /// bumps the drop counter, and returns `false`. Never blocks.
    pub fn send(&self, frame: Arc<String>) -> bool {
        if self.tx.try_send(frame).is_ok() {
            true
        } else {
            let _ = self.dropped_frames.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    /// Serialize `value` and queue it.
    pub fn send_json<T: serde::Serialize>(&self, value: &T) -> bool {
        match serde_json::to_string(value) {
            Ok(json) => self.send(Arc::new(json)),
            Err(_) => false,
        }
    }

    /// Queue a `{"type":"ping"}` probe.
    pub fn ping(&self) -> bool {
        self.send_json(&ping())
    }

    /// Close the connection.
    ///
    /// Cancels the token observed by the write and heartbeat tasks,
    /// which closes the socket. Idempotent. Does not touch session
    /// membership; that is the disconnect path's responsibility.
    pub fn terminate(&self) {
        self.cancel.cancel();
    }

    /// Token observed by the write, read, and heartbeat tasks.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether [`terminate`](Self::terminate) has been called.
    pub fn is_terminated(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Record a liveness response.
    pub fn mark_alive(&self) {
        self.alive.store(true, Ordering::Relaxed);
    }

    /// Open a probe window: the client must answer before the next tick.
    pub fn mark_pending(&self) {
        self.alive.store(false, Ordering::Relaxed);
    }

    /// Whether the client answered since the last probe window opened.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    /// The session this connection currently belongs to, if any.
    pub fn session_id(&self) -> Option<SessionId> {
        self.session.lock().clone()
    }

    pub(crate) fn set_session(&self, id: Option<SessionId>) {
        *self.session.lock() = id;
    }

    /// Total frames dropped for this connection.
    pub fn drop_count(&self) -> u64 {
        self.dropped_frames.load(Ordering::Relaxed)
    }
}
