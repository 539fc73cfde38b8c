//! Session lookup, creation, and cleanup under one coarse lock.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use relay_protocol::SessionId;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::connection::ClientConnection;
use super::session::Session;
use crate::error::RelayError;

/// Owns every live session, keyed by normalized identifier.
///
/// A single mutex covers lookup/create, member add/remove, and
/// delete-if-empty, so a join can never race a disconnect into an
/// inconsistent member set. Nothing inside the lock blocks: frames are
/// queued with `try_send`. A session reachable from the registry is
/// always non-empty.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Move `conn` into the session named by `raw_id`.
    ///
    /// The identifier is normalized first, so `"5"` and `5` land in the
    /// same session. Joining the current session is a no-op. Otherwise
    /// the target session is created on demand, the connection leaves
    /// its previous session (removing that session from the registry if
    /// it emptied), and joins the target's member set. On error the
    /// connection keeps whatever session it had.
    pub fn join(
        &self,
        conn: &Arc<ClientConnection>,
        raw_id: &Value,
    ) -> Result<SessionId, RelayError> {
        let id = SessionId::normalize(raw_id).ok_or(RelayError::MissingSessionId)?;
        let mut sessions = self.sessions.lock();

        if conn.session_id().as_ref() == Some(&id) {
            return Ok(id);
        }

        if let Some(previous) = conn.session_id() {
            Self::remove_member(&mut sessions, &previous, conn)?;
        }

        let session = sessions
            .entry(id.as_str().to_owned())
            .or_insert_with(|| Session::new(id.clone()));
        session.insert(Arc::clone(conn));
        info!(
            client_id = %conn.id,
            session_id = %id,
            members = session.len(),
            "client joined session"
        );
        Ok(id)
    }

    /// Drop `conn` from whatever session it belongs to.
    ///
    /// Part of disconnect cleanup: safe to call repeatedly and for
    /// connections that never joined anything.
    pub fn disconnect(&self, conn: &ClientConnection) {
        let Some(id) = conn.session_id() else {
            return;
        };
        let mut sessions = self.sessions.lock();
        if let Err(e) = Self::remove_member(&mut sessions, &id, conn) {
            warn!(client_id = %conn.id, error = %e, "disconnect cleanup skipped a leave");
        }
    }

    /// Leave plus delete-if-empty, for one removal point.
    fn remove_member(
        sessions: &mut HashMap<String, Session>,
        id: &SessionId,
        conn: &ClientConnection,
    ) -> Result<(), RelayError> {
        let Some(session) = sessions.get_mut(id.as_str()) else {
            // Back-reference names a session the registry no longer has.
            return Err(RelayError::NotInSession {
                client_id: conn.id.clone(),
                session_id: id.to_string(),
            });
        };
        session.leave(conn)?;
        debug!(
            client_id = %conn.id,
            session_id = %id,
            remaining = session.len(),
            "client left session"
        );
        if session.is_empty() {
            let _ = sessions.remove(id.as_str());
            info!(session_id = %id, "removed empty session");
        }
        Ok(())
    }

    /// Broadcast `message` to every member of `id`.
    ///
    /// Returns the number of members the frame was queued for; zero for
    /// unknown sessions.
    pub fn broadcast_to<T: Serialize>(&self, id: &SessionId, message: &T) -> usize {
        let sessions = self.sessions.lock();
        sessions.get(id.as_str()).map_or(0, |s| s.broadcast(message))
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Member count of `id`, if that session exists.
    pub fn member_count(&self, id: &SessionId) -> Option<usize> {
        self.sessions.lock().get(id.as_str()).map(Session::len)
    }

    /// Whether a session with `id` currently exists.
    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.lock().contains_key(id.as_str())
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
