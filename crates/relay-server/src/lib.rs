//! # relay-server
//!
//! Axum HTTP + `WebSocket` session relay.
//!
//! - `/ws` gateway: connection management, heartbeat, message dispatch
//! - Named session groups with broadcast fan-out to every member
//! - `/health` and `/metrics` endpoints
//! - Graceful shutdown via `tokio::signal` + `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod health;
pub mod metrics;
pub mod server;
pub mod shutdown;
pub mod websocket;
