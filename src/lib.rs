//! Payroll Engine for HR Systems
//!
//! This crate reconciles daily attendance into per-employee monthly summaries
//! and turns them into auditable payroll records: prorated basic salary,
//! earnings, deductions and net pay, generated at most once per pay period
//! unless explicitly forced.

#![warn(missing_docs)]

pub mod api;
pub mod attendance;
pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod payroll;
pub mod store;
