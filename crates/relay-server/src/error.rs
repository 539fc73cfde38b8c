//! Server error types.

use thiserror::Error;

/// Errors surfaced by relay state transitions.
///
/// Nothing here is fatal: callers log the error and keep the process
/// (and every other session) running.
#[derive(Debug, Error)]
pub enum RelayError {
    /// A leave was attempted for a connection whose back-reference does
    /// not name that session. Indicates a bug in the caller; the member
    /// set is left untouched.
    #[error("client '{client_id}' is not a member of session '{session_id}'")]
    NotInSession {
        /// Connection identifier.
        client_id: String,
        /// Session the caller tried to remove it from.
        session_id: String,
    },

    /// A `join-session` payload carried no usable `sessionId` (neither
    /// a string nor a number).
    #[error("join-session payload has no usable sessionId")]
    MissingSessionId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_in_session_names_both_parties() {
        let err = RelayError::NotInSession {
            client_id: "c1".into(),
            session_id: "room1".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("c1"));
        assert!(msg.contains("room1"));
    }

    #[test]
    fn missing_session_id_message() {
        let msg = RelayError::MissingSessionId.to_string();
        assert!(msg.contains("sessionId"));
    }
}
