//! Logical message envelopes exchanged over the transport.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message type of a server liveness probe.
pub const PING: &str = "ping";
/// Message type of a client liveness response.
pub const PONG: &str = "pong";
/// Message type of a group join request.
pub const JOIN_SESSION: &str = "join-session";

/// Inbound logical message: `{ "type": string, "data": object }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Message type discriminator (e.g. `join-session`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Message payload; absent payloads deserialize to `null`.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl Envelope {
    /// Build an envelope carrying `data`.
    pub fn new(kind: impl Into<String>, data: Value) -> Self {
        Self {
            kind: kind.into(),
            data,
        }
    }
}

/// Outbound reply to an inbound envelope.
///
/// Echoes the message that triggered it so clients can correlate
/// replies without separate request ids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// Mirrors the original message type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Whether the request succeeded.
    pub success: bool,
    /// The inbound envelope being answered.
    pub original_message: Envelope,
    /// Reply payload.
    pub data: Value,
}

impl Response {
    /// Build a success reply to `original`.
    pub fn reply(original: &Envelope, data: Value) -> Self {
        Self {
            kind: original.kind.clone(),
            success: true,
            original_message: original.clone(),
            data,
        }
    }
}

/// The `{"type":"ping"}` probe envelope.
pub fn ping() -> Envelope {
    Envelope {
        kind: PING.into(),
        data: Value::Null,
    }
}
