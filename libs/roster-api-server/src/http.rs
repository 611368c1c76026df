use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::Value;

use roster_api::envelope::{ApiEndpoints, ApiInfo, Envelope, HealthReport};
use roster_api::record::Student;

use super::AppState;
use crate::error::ApiError;

const ERR_LIST: &str = "Error fetching students";
const ERR_CREATE: &str = "Error creating student";
const ERR_GET: &str = "Error fetching student";
const ERR_UPDATE: &str = "Error updating student";
const ERR_DELETE: &str = "Error deleting student";

type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

/// Unwrap a JSON body. A request without a JSON content type is read as an
/// empty object, so it fails field validation rather than parsing.
fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(Value::Object(Default::default())),
        Err(e) => Err(ApiError::MalformedBody(e.body_text())),
    }
}

// ═══════════════════════════════════════════════════════════════
//  GET /  and  GET /api/health
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_info() -> Json<ApiInfo> {
    Json(ApiInfo {
        success: true,
        message: "Student Management API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: ApiEndpoints {
            students: "/api/students".to_string(),
            health: "/api/health".to_string(),
        },
    })
}

pub(crate) async fn handle_health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.service.health())
}

// ═══════════════════════════════════════════════════════════════
//  /api/students
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_list(State(state): State<AppState>) -> ApiResult<Vec<Student>> {
    let students = state
        .service
        .list()
        .await
        .map_err(ApiError::service(ERR_LIST, state.expose_error_details))?;
    let count = students.len();
    Ok(Json(Envelope::ok(students).with_count(count)))
}

pub(crate) async fn handle_create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<Student>>), ApiError> {
    let body = json_body(body)?;
    let student = state
        .service
        .create(body)
        .await
        .map_err(ApiError::service(ERR_CREATE, state.expose_error_details))?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(student).with_message("Student created successfully")),
    ))
}

// ═══════════════════════════════════════════════════════════════
//  /api/students/{id}
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Student> {
    let student = state
        .service
        .get(&id)
        .await
        .map_err(ApiError::service(ERR_GET, state.expose_error_details))?;
    Ok(Json(Envelope::ok(student)))
}

pub(crate) async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Student> {
    let body = json_body(body)?;
    let student = state
        .service
        .update(&id, body)
        .await
        .map_err(ApiError::service(ERR_UPDATE, state.expose_error_details))?;
    Ok(Json(
        Envelope::ok(student).with_message("Student updated successfully"),
    ))
}

pub(crate) async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state
        .service
        .delete(&id)
        .await
        .map_err(ApiError::service(ERR_DELETE, state.expose_error_details))?;
    Ok(Json(Envelope::done("Student deleted successfully")))
}

pub(crate) async fn handle_not_found() -> ApiError {
    ApiError::RouteNotFound
}
