//! `/health` endpoint.

use std::time::Instant;

use serde::Serialize;

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the server is running.
    pub status: String,
    /// Seconds since the server started.
    pub uptime_secs: u64,
    /// Currently open `WebSocket` connections (members or not).
    pub connections: usize,
    /// Live sessions in the registry.
    pub active_sessions: usize,
}

/// Build a health response from live counters.
pub fn health_check(start_time: Instant, connections: usize, sessions: usize) -> HealthResponse {
    HealthResponse {
        status: "ok".into(),
        uptime_secs: start_time.elapsed().as_secs(),
        connections,
        active_sessions: sessions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_ok() {
        assert_eq!(health_check(Instant::now(), 0, 0).status, "ok");
    }

    #[test]
    fn counters_pass_through() {
        let resp = health_check(Instant::now(), 4, 2);
        assert_eq!(resp.connections, 4);
        assert_eq!(resp.active_sessions, 2);
    }

    #[test]
    fn uptime_reflects_start_time() {
        let started = Instant::now()
            .checked_sub(std::time::Duration::from_secs(30))
            .unwrap();
        assert!(health_check(started, 0, 0).uptime_secs >= 29);
    }

    #[test]
    fn serializes_expected_fields() {
        let json = serde_json::to_value(health_check(Instant::now(), 1, 1)).unwrap();
        assert_eq!(json["status"], "ok");
        assert!(json["uptime_secs"].is_number());
        assert_eq!(json["connections"], 1);
        assert_eq!(json["active_sessions"], 1);
    }
}
