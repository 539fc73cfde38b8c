//! String-normalized session identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A session identifier in canonical string form.
///
/// Clients may send the identifier as a JSON string or number; both
/// normalize to the same value, so `"5"` and `5` never name two
/// different sessions.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Normalize a raw JSON value into a session id.
    ///
    /// Accepts strings and numbers; anything else yields `None`.
    pub fn normalize(raw: &Value) -> Option<Self> {
        match raw {
            Value::String(s) => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }

    /// The canonical string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}
