//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every condition that can abort a single engine operation. Partial
//! failures of batch ingestion and payroll runs are not errors; they are
//! reported through [`BatchReport`](crate::models::BatchReport) and
//! [`RunReport`](crate::models::RunReport).

use thiserror::Error;

/// The main error type for the payroll engine.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::NotFound {
///     entity: "employee".to_string(),
///     id: "EMP0042".to_string(),
/// };
/// assert_eq!(error.to_string(), "employee not found: EMP0042");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Input had a bad shape or was out of range.
    #[error("Invalid {field}: {message}")]
    Validation {
        /// The field or input that was rejected.
        field: String,
        /// A description of what made the input invalid.
        message: String,
    },

    /// The operation collides with existing state (duplicate key, completed run).
    #[error("Conflict: {message}")]
    Conflict {
        /// A description of the conflicting state.
        message: String,
    },

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "employee", "department").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// The backing store failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for a [`EngineError::Validation`].
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`EngineError::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Shorthand for a [`EngineError::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

impl From<rusqlite::Error> for EngineError {
    fn from(error: rusqlite::Error) -> Self {
        EngineError::Storage(error.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(error: serde_json::Error) -> Self {
        EngineError::Storage(format!("json: {}", error))
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_displays_field_and_message() {
        let error = EngineError::validation("month", "must be between 1 and 12");
        assert_eq!(error.to_string(), "Invalid month: must be between 1 and 12");
    }

    #[test]
    fn test_conflict_displays_message() {
        let error = EngineError::conflict("payroll for 2026-02 already completed");
        assert_eq!(
            error.to_string(),
            "Conflict: payroll for 2026-02 already completed"
        );
    }

    #[test]
    fn test_not_found_displays_entity_and_id() {
        let error = EngineError::not_found("department", "DEPT9");
        assert_eq!(error.to_string(), "department not found: DEPT9");
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/engine.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/engine.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_rusqlite_error_becomes_storage() {
        let error: EngineError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(error, EngineError::Storage(_)));
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_conflict() -> EngineResult<()> {
            Err(EngineError::conflict("duplicate"))
        }

        fn propagates_error() -> EngineResult<()> {
            returns_conflict()?;
            Ok(())
        }

        assert!(matches!(
            propagates_error(),
            Err(EngineError::Conflict { .. })
        ));
    }
}
