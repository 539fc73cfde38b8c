//! A named group of connections sharing broadcast scope.

use std::collections::HashMap;
use std::sync::Arc;

use metrics::counter;
use relay_protocol::SessionId;
use serde::Serialize;
use tracing::warn;

use super::connection::ClientConnection;
use crate::error::RelayError;

/// A session: the set of connections that receive each other's
/// broadcasts.
///
/// Mutation happens only through [`super::registry::SessionRegistry`],
/// whose lock serializes member changes against broadcasts.
pub struct Session {
    id: SessionId,
    members: HashMap<String, Arc<ClientConnection>>,
}

impl Session {
    pub(crate) fn new(id: SessionId) -> Self {
        Self {
            id,
            members: HashMap::new(),
        }
    }

    /// The normalized session identifier.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Current member count.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the member set is empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether `client_id` is a member.
    pub fn contains(&self, client_id: &str) -> bool {
        self.members.contains_key(client_id)
    }

    /// Add a connection and point its back-reference here.
    pub(crate) fn insert(&mut self, conn: Arc<ClientConnection>) {
        conn.set_session(Some(self.id.clone()));
        let _ = self.members.insert(conn.id.clone(), conn);
    }

    /// Deliver one copy of `message` to every current member.
    ///
    /// The frame is serialized once and queued per member in
    /// unspecified order; a member whose channel is full is skipped
    /// without aborting the rest of the fan-out. The sender, if a
    /// member, receives its own broadcast. Returns the number of
    /// members the frame was queued for.
    pub fn broadcast<T: Serialize>(&self, message: &T) -> usize {
        let json = match serde_json::to_string(message) {
            Ok(j) => Arc::new(j),
            Err(e) => {
                warn!(session_id = %self.id, error = %e, "failed to serialize broadcast");
                return 0;
            }
        };
        let mut delivered = 0;
        for member in self.members.values() {
            if member.send(Arc::clone(&json)) {
                delivered += 1;
            } else {
                counter!(crate::metrics::WS_BROADCAST_DROPS_TOTAL).increment(1);
                warn!(
                    session_id = %self.id,
                    client_id = %member.id,
                    "dropped broadcast frame (channel full or closed)"
                );
            }
        }
        delivered
    }

    /// Remove `conn` from the member set and clear its back-reference.
    ///
    /// Fails with [`RelayError::NotInSession`] when the connection's
    /// back-reference does not name this session; the member set is
    /// left untouched in that case.
    pub(crate) fn leave(&mut self, conn: &ClientConnection) -> Result<(), RelayError> {
        if conn.session_id().as_ref() != Some(&self.id) {
            return Err(RelayError::NotInSession {
                client_id: conn.id.clone(),
                session_id: self.id.to_string(),
            });
        }
        let _ = self.members.remove(&conn.id);
        conn.set_session(None);
        Ok(())
    }
}
