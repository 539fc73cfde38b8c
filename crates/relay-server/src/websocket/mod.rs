//! `WebSocket` connection management, session groups, heartbeat, and
//! message dispatch.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `connection` | Per-client state: liveness flag, send channel, session back-reference |
//! | `session` | A named member group with broadcast fan-out |
//! | `registry` | Session lookup/create/cleanup under one coarse lock |
//! | `dispatcher` | Inbound envelope parsing and protocol state transitions |
//! | `heartbeat` | Periodic logical ping/pong liveness probing |
//! | `gateway` | `WebSocket` upgrade, read/write loops, disconnect cleanup |
//!
//! ## Data flow
//!
//! `gateway` reads a frame → `dispatcher` parses and mutates
//! `connection`/`registry` state → direct replies and broadcasts are
//! queued on each member's send channel → `gateway`'s write task drains
//! them to the socket.

pub mod connection;
pub mod dispatcher;
pub mod gateway;
pub mod heartbeat;
pub mod registry;
pub mod session;
