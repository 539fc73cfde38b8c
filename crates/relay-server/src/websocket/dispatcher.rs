//! Inbound envelope parsing and protocol state transitions.

use std::sync::Arc;

use relay_protocol::{Envelope, JOIN_SESSION, PONG, Response};
use serde_json::json;
use tracing::{debug, warn};

use super::connection::ClientConnection;
use super::registry::SessionRegistry;

/// Handle one raw inbound text frame for `conn`.
///
/// Each message type is handled exclusively. Malformed frames and
/// unknown types are logged and ignored; nothing a client sends can
/// take the dispatcher down or disturb other sessions.
pub fn handle_frame(registry: &SessionRegistry, conn: &Arc<ClientConnection>, raw: &str) {
    let envelope: Envelope = match serde_json::from_str(raw) {
        Ok(e) => e,
        Err(e) => {
            warn!(client_id = %conn.id, error = %e, "ignoring malformed envelope");
            return;
        }
    };

    match envelope.kind.as_str() {
        JOIN_SESSION => handle_join(registry, conn, &envelope),
        PONG => {
            conn.mark_alive();
            debug!(client_id = %conn.id, "pong");
        }
        other => {
            debug!(client_id = %conn.id, kind = other, "unhandled message type");
        }
    }
}

/// `join-session`: move the connection, then reply directly with the
/// normalized identifier. On failure the connection keeps its previous
/// session and no reply is sent.
fn handle_join(registry: &SessionRegistry, conn: &Arc<ClientConnection>, envelope: &Envelope) {
    match registry.join(conn, &envelope.data["sessionId"]) {
        Ok(id) => {
            let reply = Response::reply(envelope, json!({ "sessionId": id }));
            if !conn.send_json(&reply) {
                debug!(client_id = %conn.id, "failed to queue join reply");
            }
        }
        Err(e) => {
            warn!(client_id = %conn.id, error = %e, "join-session rejected");
        }
    }
}
