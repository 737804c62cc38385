//! Per-period exclusive locks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

use crate::error::{EngineError, EngineResult};
use crate::models::PayPeriod;

/// One mutex per pay period, created on first use.
///
/// Periods never contend with each other; two callers on the same period do.
#[derive(Debug, Default)]
pub(crate) struct PeriodLocks {
    locks: Mutex<HashMap<PayPeriod, Arc<Mutex<()>>>>,
}

impl PeriodLocks {
    /// The lock for `period`.
    pub(crate) fn for_period(&self, period: PayPeriod) -> EngineResult<Arc<Mutex<()>>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| EngineError::Storage("period lock table poisoned".to_string()))?;
        Ok(Arc::clone(locks.entry(period).or_default()))
    }
}

/// Takes `lock` without waiting, or fails with `Conflict`.
///
/// A poisoned lock belonged to a run that panicked; its guard is recovered
/// since the store still holds the authoritative run state.
pub(crate) fn try_claim(lock: &Mutex<()>, period: PayPeriod) -> EngineResult<MutexGuard<'_, ()>> {
    match lock.try_lock() {
        Ok(guard) => Ok(guard),
        Err(TryLockError::Poisoned(poisoned)) => Ok(poisoned.into_inner()),
        Err(TryLockError::WouldBlock) => Err(EngineError::conflict(format!(
            "payroll for {} is being generated by another request",
            period
        ))),
    }
}
