//! HTTP API module for the payroll engine.
//!
//! This module exposes the [`Engine`](crate::engine::Engine) over JSON
//! endpoints for a presentation layer. Writes name their actor in the
//! `X-Actor` header.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::{ACTOR_HEADER, create_router};
pub use request::{AttendanceBatchRequest, GeneratePayrollRequest, StatusChangeRequest};
pub use response::{ApiError, ApiErrorResponse, RecordedResponse};
pub use state::AppState;
