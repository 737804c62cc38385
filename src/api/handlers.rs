//! HTTP request handlers for the payroll engine API.
//!
//! This module contains the handler functions for all API endpoints. Engine
//! calls block on storage, so each one runs on tokio's blocking pool.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::{get, post, put},
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::attendance::{AttendanceEntry, AttendanceRow};
use crate::engine::Engine;
use crate::error::EngineResult;
use crate::models::{Actor, Compensation, Department, Employee};

use super::request::{AttendanceBatchRequest, GeneratePayrollRequest, StatusChangeRequest};
use super::response::{ApiError, ApiErrorResponse, RecordedResponse};
use super::state::AppState;

/// Header naming the user on whose behalf a write runs.
pub const ACTOR_HEADER: &str = "x-actor";

type ApiResult<T> = Result<T, ApiErrorResponse>;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/departments", post(register_department))
        .route("/employees", post(register_employee))
        .route("/employees/:id/compensation", put(update_compensation))
        .route("/employees/:id/status", put(set_employee_status))
        .route("/employees/:id/payroll", get(employee_payroll))
        .route(
            "/employees/:id/attendance/:year/:month",
            get(attendance_summary),
        )
        .route("/attendance", post(record_attendance))
        .route("/attendance/batch", post(ingest_attendance_batch))
        .route("/attendance/:year/:month", get(period_attendance))
        .route("/payroll/runs", post(generate_payroll))
        .route("/payroll/:year/:month", get(payroll_summary))
        .with_state(state)
}

/// Reads the acting user from the `X-Actor` header.
fn actor_from(headers: &HeaderMap) -> ApiResult<Actor> {
    let value = headers
        .get(ACTOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiErrorResponse::bad_request(ApiError::missing_actor()))?;
    Actor::new(value).map_err(|_| ApiErrorResponse::bad_request(ApiError::missing_actor()))
}

/// Runs `op` against the engine on the blocking pool.
async fn run_blocking<T, F>(state: &AppState, op: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&Engine) -> EngineResult<T> + Send + 'static,
{
    let engine = state.engine_handle();
    tokio::task::spawn_blocking(move || op(engine.as_ref()))
        .await
        .map_err(|e| ApiErrorResponse::internal(format!("engine task failed: {}", e)))?
        .map_err(ApiErrorResponse::from)
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: T) -> axum::response::Response {
    (status, [(header::CONTENT_TYPE, "application/json")], Json(body)).into_response()
}

/// Logs a failed request and passes the error through.
fn log_failure(correlation_id: Uuid, operation: &str, err: ApiErrorResponse) -> ApiErrorResponse {
    warn!(
        correlation_id = %correlation_id,
        operation,
        status = err.status.as_u16(),
        code = %err.error.code,
        message = %err.error.message,
        "Request failed"
    );
    err
}

// ─── Departments & employees ─────────────────────────────────────────────────

/// Handler for POST /departments.
async fn register_department(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Department>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let correlation_id = Uuid::new_v4();
    let actor = actor_from(&headers)?;
    let Json(department) = payload?;
    let result = run_blocking(&state, move |engine| engine.register_department(department, &actor))
        .await
        .map_err(|e| log_failure(correlation_id, "register_department", e))?;

    info!(correlation_id = %correlation_id, department_id = %result.id, "Department created");
    Ok(json_response(StatusCode::CREATED, result))
}

/// Handler for POST /employees.
async fn register_employee(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Employee>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let correlation_id = Uuid::new_v4();
    let actor = actor_from(&headers)?;
    let Json(employee) = payload?;
    let result = run_blocking(&state, move |engine| engine.register_employee(employee, &actor))
        .await
        .map_err(|e| log_failure(correlation_id, "register_employee", e))?;

    info!(correlation_id = %correlation_id, employee_id = %result.id, "Employee created");
    Ok(json_response(StatusCode::CREATED, result))
}

/// Handler for PUT /employees/:id/compensation.
async fn update_compensation(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<Compensation>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let correlation_id = Uuid::new_v4();
    let actor = actor_from(&headers)?;
    let Json(compensation) = payload?;
    let result = run_blocking(&state, move |engine| {
        engine.update_compensation(&employee_id, compensation, &actor)
    })
    .await
    .map_err(|e| log_failure(correlation_id, "update_compensation", e))?;

    Ok(json_response(StatusCode::OK, result))
}

/// Handler for PUT /employees/:id/status.
async fn set_employee_status(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<StatusChangeRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let correlation_id = Uuid::new_v4();
    let actor = actor_from(&headers)?;
    let Json(request) = payload?;
    let result = run_blocking(&state, move |engine| {
        engine.set_employee_status(&employee_id, request.status, &actor)
    })
    .await
    .map_err(|e| log_failure(correlation_id, "set_employee_status", e))?;

    Ok(json_response(StatusCode::OK, result))
}

/// Handler for GET /employees/:id/payroll.
async fn employee_payroll(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let records = run_blocking(&state, move |engine| engine.employee_payroll(&employee_id)).await?;
    Ok(json_response(StatusCode::OK, records))
}

/// Handler for GET /employees/:id/attendance/:year/:month.
async fn attendance_summary(
    State(state): State<AppState>,
    path: Result<Path<(String, i32, u32)>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path((employee_id, year, month)) = path?;
    let summary = run_blocking(&state, move |engine| {
        engine.attendance_summary(&employee_id, month, year)
    })
    .await?;
    Ok(json_response(StatusCode::OK, summary))
}

// ─── Attendance ──────────────────────────────────────────────────────────────

/// Handler for POST /attendance.
async fn record_attendance(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AttendanceEntry>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let correlation_id = Uuid::new_v4();
    let actor = actor_from(&headers)?;
    let Json(entry) = payload?;
    let recorded = run_blocking(&state, move |engine| engine.record_attendance(entry, &actor))
        .await
        .map_err(|e| log_failure(correlation_id, "record_attendance", e))?;

    Ok(json_response(
        StatusCode::OK,
        RecordedResponse {
            record: recorded.record,
            replaced: recorded.replaced,
        },
    ))
}

/// Whether a batch body is a CSV upload rather than JSON.
fn is_csv(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/csv"))
}

/// Parses a JSON batch body.
fn json_rows(body: &str) -> ApiResult<Vec<AttendanceRow>> {
    serde_json::from_str::<AttendanceBatchRequest>(body)
        .map(|request| request.rows)
        .map_err(|e| ApiErrorResponse::bad_request(ApiError::malformed_json(e.to_string())))
}

/// Handler for POST /attendance/batch.
///
/// Accepts `application/json` (`{"rows": [...]}`) or `text/csv`. Rows that
/// fail, including unreadable CSV records, are listed in the report; the
/// response is still `200 OK`.
async fn ingest_attendance_batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> ApiResult<impl IntoResponse> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing attendance batch");

    let start_time = Instant::now();
    let actor = actor_from(&headers)?;
    let report = if is_csv(&headers) {
        run_blocking(&state, move |engine| {
            engine.ingest_attendance_csv(&body, &actor)
        })
        .await
    } else {
        let rows = json_rows(&body)?;
        run_blocking(&state, move |engine| {
            engine.ingest_attendance_batch(&rows, &actor)
        })
        .await
    }
    .map_err(|e| log_failure(correlation_id, "ingest_attendance_batch", e))?;

    info!(
        correlation_id = %correlation_id,
        committed = report.committed,
        failed = report.failed.len(),
        duration_us = start_time.elapsed().as_micros(),
        "Attendance batch processed"
    );
    Ok(json_response(StatusCode::OK, report))
}

/// Handler for GET /attendance/:year/:month.
async fn period_attendance(
    State(state): State<AppState>,
    path: Result<Path<(i32, u32)>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path((year, month)) = path?;
    let records = run_blocking(&state, move |engine| engine.period_attendance(month, year)).await?;
    Ok(json_response(StatusCode::OK, records))
}

// ─── Payroll ─────────────────────────────────────────────────────────────────

/// Handler for POST /payroll/runs.
///
/// Returns the run report; per-employee failures give `200 OK` with outcome
/// `partial_failure`.
async fn generate_payroll(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<GeneratePayrollRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payroll run request");

    let start_time = Instant::now();
    let actor = actor_from(&headers)?;
    let Json(request) = payload?;
    let report = run_blocking(&state, move |engine| {
        engine.generate_payroll(request.month, request.year, &actor, request.force)
    })
    .await
    .map_err(|e| log_failure(correlation_id, "generate_payroll", e))?;

    info!(
        correlation_id = %correlation_id,
        run_id = %report.run_id,
        succeeded = report.succeeded,
        failed = report.failed.len(),
        duration_us = start_time.elapsed().as_micros(),
        "Payroll run request completed"
    );
    Ok(json_response(StatusCode::OK, report))
}

/// Handler for GET /payroll/:year/:month.
async fn payroll_summary(
    State(state): State<AppState>,
    path: Result<Path<(i32, u32)>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path((year, month)) = path?;
    let summary = run_blocking(&state, move |engine| engine.get_payroll_summary(month, year)).await?;
    Ok(json_response(StatusCode::OK, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::config::EngineConfig;
    use crate::store::MemoryStore;

    fn create_test_router() -> Router {
        let engine = Engine::new(Arc::new(MemoryStore::new()), EngineConfig::default());
        create_router(AppState::new(engine))
    }

    #[test]
    fn test_actor_header_is_required_and_trimmed() {
        let mut headers = HeaderMap::new();
        assert!(actor_from(&headers).is_err());

        headers.insert(ACTOR_HEADER, "  ".parse().unwrap());
        assert!(actor_from(&headers).is_err());

        headers.insert(ACTOR_HEADER, " hr-admin ".parse().unwrap());
        assert_eq!(actor_from(&headers).unwrap().id(), "hr-admin");
    }

    #[test]
    fn test_batch_body_format() {
        let mut headers = HeaderMap::new();
        assert!(!is_csv(&headers));
        headers.insert(header::CONTENT_TYPE, "text/csv; charset=utf-8".parse().unwrap());
        assert!(is_csv(&headers));
        headers.insert(header::CONTENT_TYPE, "application/json".parse().unwrap());
        assert!(!is_csv(&headers));

        let rows =
            json_rows(r#"{"rows": [{"employee_id": "EMP0001", "date": "2026-03-02"}]}"#).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(json_rows("not json").is_err());
    }

    #[tokio::test]
    async fn test_write_without_actor_is_rejected() {
        let router = create_test_router();

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/departments")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"id": "ENG", "name": "Engineering"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "MISSING_ACTOR");
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let router = create_test_router();

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/payroll/runs")
                    .header("Content-Type", "application/json")
                    .header("X-Actor", "payroll-admin")
                    .body(Body::from("{ not valid json }"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_non_numeric_period_returns_400() {
        let router = create_test_router();

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/payroll/2026/march")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
