//! Request types for the payroll engine API.
//!
//! Registration and attendance endpoints accept the engine's own types
//! ([`Employee`](crate::models::Employee),
//! [`AttendanceEntry`](crate::attendance::AttendanceEntry), ...); the types
//! here cover bodies with no domain counterpart.

use serde::{Deserialize, Serialize};

use crate::attendance::AttendanceRow;
use crate::models::EmployeeStatus;

/// Request body for `POST /payroll/runs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratePayrollRequest {
    /// Month to generate, 1-12.
    pub month: u32,
    /// Year to generate.
    pub year: i32,
    /// Replace existing records as corrections.
    #[serde(default)]
    pub force: bool,
}

/// Request body for `PUT /employees/:id/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangeRequest {
    /// The new status.
    pub status: EmployeeStatus,
}

/// JSON request body for `POST /attendance/batch`.
///
/// The same endpoint accepts `text/csv` with a header line instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceBatchRequest {
    /// Rows to ingest, in order.
    pub rows: Vec<AttendanceRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_force_defaults_to_false() {
        let request: GeneratePayrollRequest =
            serde_json::from_str(r#"{"month": 2, "year": 2024}"#).unwrap();
        assert!(!request.force);
    }

    #[test]
    fn test_batch_rows_allow_missing_times() {
        let request: AttendanceBatchRequest = serde_json::from_str(
            r#"{"rows": [{"employee_id": "EMP0001", "date": "2026-03-02"}]}"#,
        )
        .unwrap();
        assert_eq!(request.rows.len(), 1);
        assert!(request.rows[0].check_in.is_none());
    }

    #[test]
    fn test_status_is_snake_case() {
        let request: StatusChangeRequest =
            serde_json::from_str(r#"{"status": "inactive"}"#).unwrap();
        assert_eq!(request.status, EmployeeStatus::Inactive);
    }
}
