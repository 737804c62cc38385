//! Configuration loading and management for the payroll engine.
//!
//! This module loads the engine configuration from a YAML file: the payroll
//! proration mode, attendance policy, HTTP bind address and database path.
//!
//! # Example
//!
//! ```
//! use payroll_engine::config::ConfigLoader;
//! use payroll_engine::models::ProrationMode;
//!
//! let loader = ConfigLoader::from_yaml("payroll:\n  proration: flat\n", "inline").unwrap();
//! assert_eq!(loader.config().payroll.proration, ProrationMode::Flat);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{AttendanceSettings, DatabaseSettings, EngineConfig, PayrollSettings, ServerSettings};
