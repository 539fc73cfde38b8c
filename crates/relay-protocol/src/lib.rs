//! # relay-protocol
//!
//! Logical wire format shared by the relay server and its clients.
//!
//! - [`Envelope`]: the inbound `{ "type": ..., "data": ... }` wrapper
//! - [`Response`]: the outbound reply echoing the original envelope
//! - [`SessionId`]: string-normalized session identifiers

#![deny(unsafe_code)]

mod envelope;
mod session_id;

pub use envelope::{Envelope, Response, JOIN_SESSION, PING, PONG, ping};
pub use session_id::SessionId;
