//! `WebSocket` upgrade and per-connection lifecycle, from accept to
//! disconnect cleanup.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use metrics::{counter, gauge, histogram};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::connection::ClientConnection;
use super::dispatcher;
use super::heartbeat::{HeartbeatOutcome, run_heartbeat};
use crate::metrics::{
    WS_CONNECTION_DURATION_SECONDS, WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL,
    WS_DISCONNECTIONS_TOTAL, WS_PROBE_TIMEOUTS_TOTAL,
};
use crate::server::AppState;

/// GET /ws — upgrade and hand the socket to [`run_socket`].
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.max_message_size(state.config.max_message_size)
        .on_upgrade(move |socket| run_socket(socket, state))
}

/// Drive one client from accept to disconnect cleanup.
///
/// Spawns a write task (drains the connection's frame channel to the
/// socket) and a heartbeat task, then reads inbound frames in
/// transport-delivery order, handing each to the dispatcher. Exiting
/// for any reason — close frame, socket error, probe timeout — runs the
/// same idempotent cleanup: leave the session, cancel the timer, close
/// the socket.
#[instrument(skip_all, fields(client_id))]
pub async fn run_socket(socket: WebSocket, state: AppState) {
    let client_id = Uuid::now_v7().to_string();
    let _ = tracing::Span::current().record("client_id", client_id.as_str());

    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Arc<String>>(state.config.send_buffer);
    let conn = Arc::new(ClientConnection::new(client_id, tx));

    info!("client connected");
    counter!(WS_CONNECTIONS_TOTAL).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE).increment(1.0);
    let _ = state.connections.fetch_add(1, Ordering::Relaxed);

    // Write task: forwards queued frames until the connection terminates.
    let write_cancel = conn.cancel_token();
    let writer = tokio::spawn(async move {
        loop {
            tokio::select! {
                frame = rx.recv() => {
                    match frame {
                        Some(text) => {
                            if ws_tx.send(Message::Text(text.as_str().into())).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                () = write_cancel.cancelled() => {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    // Liveness probing; a timeout terminates the connection.
    let probe_conn = Arc::clone(&conn);
    let probe_cancel = conn.cancel_token();
    let interval = state.config.ping_interval();
    let heartbeat = tokio::spawn(async move {
        if run_heartbeat(Arc::clone(&probe_conn), interval, probe_cancel).await
            == HeartbeatOutcome::TimedOut
        {
            warn!(client_id = %probe_conn.id, "liveness probe timed out, terminating");
            counter!(WS_PROBE_TIMEOUTS_TOTAL).increment(1);
            probe_conn.terminate();
        }
    });

    // Read loop: one frame at a time, in delivery order.
    let read_cancel = conn.cancel_token();
    loop {
        tokio::select! {
            frame = ws_rx.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        dispatcher::handle_frame(&state.registry, &conn, text.as_str());
                    }
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => conn.mark_alive(),
                    Some(Ok(Message::Binary(_))) => debug!("ignoring binary frame"),
                    Some(Ok(Message::Close(_))) => {
                        debug!("client sent close frame");
                        break;
                    }
                    Some(Err(e)) => {
                        debug!(error = %e, "socket error");
                        break;
                    }
                    None => break,
                }
            }
            () = read_cancel.cancelled() => break,
        }
    }

    // Disconnect cleanup: membership first, then the timer and socket.
    state.registry.disconnect(&conn);
    conn.terminate();
    let _ = heartbeat.await;
    let _ = writer.await;

    let _ = state.connections.fetch_sub(1, Ordering::Relaxed);
    counter!(WS_DISCONNECTIONS_TOTAL).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE).decrement(1.0);
    histogram!(WS_CONNECTION_DURATION_SECONDS).record(conn.connected_at.elapsed().as_secs_f64());
    info!("client disconnected");
}

// Socket-level behavior is covered end-to-end in tests/integration.rs;
// the state transitions themselves are unit tested in dispatcher,
// registry, and heartbeat.
