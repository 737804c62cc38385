//! Configuration types for the payroll engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML configuration file. Every section and
//! field has a default, so an empty file is a valid configuration.

use std::path::PathBuf;

use serde::Deserialize;

use crate::models::ProrationMode;

/// Payroll computation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PayrollSettings {
    /// Whether basic salary is prorated by attendance or paid flat.
    pub proration: ProrationMode,
}

/// Attendance reconciliation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AttendanceSettings {
    /// Count days marked `holiday` as payable.
    pub holidays_payable: bool,
}

/// HTTP adapter settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Persistence settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Path of the SQLite database file.
    pub path: PathBuf,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("database/hrms.db"),
        }
    }
}

/// The complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Payroll computation settings.
    pub payroll: PayrollSettings,
    /// Attendance reconciliation settings.
    pub attendance: AttendanceSettings,
    /// HTTP adapter settings.
    pub server: ServerSettings,
    /// Persistence settings.
    pub database: DatabaseSettings,
}
