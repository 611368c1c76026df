use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use roster_api::envelope::Envelope;
use roster_engine::ServiceError;

/// A failed request, rendered as a `success: false` envelope.
#[derive(Debug)]
pub enum ApiError {
    /// A record operation failed. `op` is the message shown for server-side
    /// failures of that operation.
    Service {
        op: &'static str,
        source: ServiceError,
        expose: bool,
    },
    /// The request body was not valid JSON.
    MalformedBody(String),
    RouteNotFound,
}

impl ApiError {
    pub(crate) fn service(op: &'static str, expose: bool) -> impl FnOnce(ServiceError) -> Self {
        move |source| ApiError::Service { op, source, expose }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Service { source, .. } => match source {
                ServiceError::Validation(_) | ServiceError::Duplicate { .. } => StatusCode::BAD_REQUEST,
                ServiceError::NotFound => StatusCode::NOT_FOUND,
                ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::RouteNotFound => StatusCode::NOT_FOUND,
        }
    }

    fn envelope(self) -> Envelope<()> {
        match self {
            ApiError::Service { op, source, expose } => match source {
                ServiceError::Validation(v) => {
                    Envelope::failure(v.message()).with_errors(v.field_errors().to_vec())
                }
                ServiceError::Duplicate { .. } => Envelope::failure("Email already exists"),
                ServiceError::NotFound => Envelope::failure("Student not found"),
                ServiceError::Store(e) => {
                    tracing::error!(error = %e, "{op}");
                    let body = Envelope::failure(op);
                    if expose { body.with_error_detail(e.to_string()) } else { body }
                }
            },
            ApiError::MalformedBody(detail) => {
                tracing::debug!(%detail, "rejected request body");
                Envelope::failure("Malformed JSON body")
            }
            ApiError::RouteNotFound => Envelope::failure("Route not found"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self.envelope())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use roster_api::error::StoreError;
    use roster_api::input::StudentPayload;
    use roster_api::input::ValidationRules;
    use serde_json::json;

    use super::*;

    fn store_failure(expose: bool) -> ApiError {
        ApiError::service("Error fetching students", expose)(ServiceError::Store(StoreError::io("disk gone")))
    }

    #[test]
    fn store_failures_hide_detail_unless_exposed() {
        let hidden = serde_json::to_value(store_failure(false).envelope()).unwrap();
        assert_eq!(hidden, json!({"success": false, "message": "Error fetching students"}));

        let shown = serde_json::to_value(store_failure(true).envelope()).unwrap();
        assert!(shown["error"].as_str().unwrap().contains("disk gone"));
        assert_eq!(store_failure(true).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_lists_every_field() {
        let err = StudentPayload::from_value(json!({"name": "A"}))
            .unwrap()
            .into_new_student(&ValidationRules::default())
            .unwrap_err();
        let api = ApiError::service("Error creating student", false)(ServiceError::Validation(err));
        assert_eq!(api.status(), StatusCode::BAD_REQUEST);

        let body = serde_json::to_value(api.envelope()).unwrap();
        assert_eq!(body["message"], "All fields are required");
        let fields: Vec<_> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(fields, ["email", "branch", "marks"]);
    }

    #[test]
    fn conflicts_and_missing_records() {
        let dup = ApiError::service("Error updating student", false)(ServiceError::Duplicate { field: "email" });
        assert_eq!(dup.status(), StatusCode::BAD_REQUEST);
        assert_eq!(dup.envelope().message.as_deref(), Some("Email already exists"));

        let missing = ApiError::service("Error fetching student", false)(ServiceError::NotFound);
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(missing.envelope().message.as_deref(), Some("Student not found"));
    }
}
