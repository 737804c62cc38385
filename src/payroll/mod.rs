//! Payroll run coordination.
//!
//! [`PayrollCoordinator`] owns the run state machine for each pay period,
//! serializes runs per period and recovers runs interrupted by a crash.

mod coordinator;
mod locks;

pub use coordinator::PayrollCoordinator;
