//! JSON response shapes shared by the gateway and the client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::input::FieldError;

/// Uniform `{success, message?, data?}` wrapper around every response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Item count, on list responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Per-field validation failures.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
    /// Underlying failure detail, only when the server exposes it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            count: None,
            data: Some(data),
            errors: Vec::new(),
            error: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

impl Envelope<()> {
    /// Successful response carrying only a message.
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            count: None,
            data: None,
            errors: Vec::new(),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            count: None,
            data: None,
            errors: Vec::new(),
            error: None,
        }
    }

    pub fn with_errors(mut self, errors: Vec<FieldError>) -> Self {
        self.errors = errors;
        self
    }

    pub fn with_error_detail(mut self, detail: impl Into<String>) -> Self {
        self.error = Some(detail.into());
        self
    }
}

/// Store connection state as reported by the health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseState {
    Connected,
    Disconnected,
}

impl DatabaseState {
    pub fn from_connected(connected: bool) -> Self {
        if connected { Self::Connected } else { Self::Disconnected }
    }
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    #[serde(default = "default_true")]
    pub success: bool,
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub database: DatabaseState,
}

impl HealthReport {
    pub const STATUS_OK: &'static str = "OK";

    pub fn new(database: DatabaseState, timestamp: DateTime<Utc>) -> Self {
        Self {
            success: true,
            status: Self::STATUS_OK.to_string(),
            timestamp,
            database,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Self::STATUS_OK
    }
}

fn default_true() -> bool {
    true
}

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiInfo {
    pub success: bool,
    pub message: String,
    pub version: String,
    pub endpoints: ApiEndpoints,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEndpoints {
    pub students: String,
    pub health: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_parts_are_omitted() {
        let body = serde_json::to_value(Envelope::failure("Route not found")).unwrap();
        assert_eq!(body, json!({"success": false, "message": "Route not found"}));
    }

    #[test]
    fn list_envelope_carries_count() {
        let body = serde_json::to_value(Envelope::ok(vec![1, 2]).with_count(2)).unwrap();
        assert_eq!(body, json!({"success": true, "count": 2, "data": [1, 2]}));
    }

    #[test]
    fn health_report_round_trips_database_label() {
        let report = HealthReport::new(DatabaseState::Disconnected, Utc::now());
        let body = serde_json::to_value(&report).unwrap();
        assert_eq!(body["database"], "Disconnected");
        assert_eq!(body["status"], "OK");
    }
}
