//! The payroll run coordinator.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::attendance::summarize;
use crate::calculation::compute;
use crate::config::{AttendanceSettings, PayrollSettings};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Actor, Employee, EmployeeFailure, PayPeriod, PayrollRecord, PayrollRun, PayrollSummary,
    PayrollTotals, RunReport, RunState,
};
use crate::store::HrStore;

use super::locks::{PeriodLocks, try_claim};

/// What happened to one employee during a run.
enum EmployeeOutcome {
    Created,
    Corrected,
    Skipped,
}

/// Drives payroll runs through `NotStarted -> InProgress -> Completed`.
///
/// A run holds its period's lock for its whole duration and claims the
/// period in the store before touching any record, so at most one run per
/// period proceeds at a time.
pub struct PayrollCoordinator {
    store: Arc<dyn HrStore>,
    payroll: PayrollSettings,
    attendance: AttendanceSettings,
    locks: PeriodLocks,
}

impl PayrollCoordinator {
    /// Creates a coordinator over `store`.
    pub fn new(
        store: Arc<dyn HrStore>,
        payroll: PayrollSettings,
        attendance: AttendanceSettings,
    ) -> Self {
        Self {
            store,
            payroll,
            attendance,
            locks: PeriodLocks::default(),
        }
    }

    /// Generates payroll for every active employee in `period`.
    ///
    /// Fails with `Conflict` when the period is already being generated, or
    /// was completed and `force` is false. With `force`, existing records are
    /// replaced as corrections. Without it, employees who already hold a
    /// record (left by a failed run) are skipped.
    ///
    /// Per-employee problems such as missing compensation are collected in
    /// the report. A storage failure aborts the run and marks it `Failed`.
    pub fn generate(&self, period: PayPeriod, actor: &Actor, force: bool) -> EngineResult<RunReport> {
        let lock = self.locks.for_period(period)?;
        let _guard = try_claim(&lock, period)?;

        let mut run = PayrollRun::start(period, actor.id(), force);
        self.store.begin_run(&run)?;
        info!(
            run_id = %run.run_id,
            month = period.month(),
            year = period.year(),
            forced = force,
            actor = %actor,
            "Payroll run started"
        );

        match self.process(&run, actor) {
            Ok(report) => {
                run.state = RunState::Completed;
                run.finished_at = Some(Utc::now());
                run.succeeded = report.succeeded;
                run.failed = report.failed.len();
                self.store.finish_run(&run)?;

                info!(
                    run_id = %run.run_id,
                    month = period.month(),
                    year = period.year(),
                    succeeded = report.succeeded,
                    corrected = report.corrected,
                    skipped = report.skipped.len(),
                    failed = report.failed.len(),
                    "Payroll run completed"
                );
                Ok(report)
            }
            Err(e) => {
                error!(run_id = %run.run_id, error = %e, "Payroll run aborted");
                run.state = RunState::Failed;
                run.finished_at = Some(Utc::now());
                if let Err(finish_err) = self.store.finish_run(&run) {
                    warn!(
                        run_id = %run.run_id,
                        error = %finish_err,
                        "Could not mark aborted run as failed"
                    );
                }
                Err(e)
            }
        }
    }

    fn process(&self, run: &PayrollRun, actor: &Actor) -> EngineResult<RunReport> {
        let employees = self.store.active_employees()?;
        let mut succeeded = 0;
        let mut corrected = 0;
        let mut skipped = Vec::new();
        let mut failed = Vec::new();

        for employee in &employees {
            match self.pay_employee(employee, run, actor) {
                Ok(EmployeeOutcome::Created) => succeeded += 1,
                Ok(EmployeeOutcome::Corrected) => {
                    succeeded += 1;
                    corrected += 1;
                }
                Ok(EmployeeOutcome::Skipped) => {
                    debug!(employee_id = %employee.id, "Record exists, skipped");
                    skipped.push(employee.id.clone());
                }
                Err(e @ EngineError::Storage(_)) => return Err(e),
                Err(e) => {
                    warn!(
                        run_id = %run.run_id,
                        employee_id = %employee.id,
                        error = %e,
                        "Employee payroll failed"
                    );
                    failed.push(EmployeeFailure {
                        employee_id: employee.id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(RunReport::new(
            run.run_id,
            run.period,
            succeeded,
            corrected,
            skipped,
            failed,
        ))
    }

    fn pay_employee(
        &self,
        employee: &Employee,
        run: &PayrollRun,
        actor: &Actor,
    ) -> EngineResult<EmployeeOutcome> {
        let period = run.period;
        let existing = self.store.payroll_record(&employee.id, period)?;
        if existing.is_some() && !run.forced {
            return Ok(EmployeeOutcome::Skipped);
        }

        let comp = employee.compensation.resolve()?;
        let records = self.store.employee_attendance(&employee.id, period)?;
        let summary = summarize(&employee.id, period, &records, &self.attendance);
        let figures = compute(&comp, &summary, period.days_in_month(), self.payroll.proration)?;

        let record = PayrollRecord {
            employee_id: employee.id.clone(),
            period,
            figures,
            revision: existing.as_ref().map_or(1, |r| r.revision + 1),
            generated_by: actor.id().to_string(),
            generated_at: Utc::now(),
        };

        match existing {
            Some(_) => {
                self.store.replace_payroll(&record)?;
                info!(
                    employee_id = %employee.id,
                    revision = record.revision,
                    net = %record.figures.net,
                    "Payroll record corrected"
                );
                Ok(EmployeeOutcome::Corrected)
            }
            None => {
                self.store.insert_payroll(&record)?;
                debug!(employee_id = %employee.id, net = %record.figures.net, "Payroll record created");
                Ok(EmployeeOutcome::Created)
            }
        }
    }

    /// Marks runs left `InProgress` by a previous process as `Failed`.
    ///
    /// Call once at startup before serving requests. Returns the recovered
    /// periods; each may then be regenerated (resuming) or forced.
    pub fn recover_stale_runs(&self) -> EngineResult<Vec<PayPeriod>> {
        let recovered = self.store.fail_in_progress_runs()?;
        for period in &recovered {
            warn!(
                month = period.month(),
                year = period.year(),
                "Recovered interrupted payroll run as failed"
            );
        }
        Ok(recovered)
    }

    /// Run state, records and totals for `period`.
    pub fn summary(&self, period: PayPeriod) -> EngineResult<PayrollSummary> {
        let run = self.store.payroll_run(period)?;
        let records = self.store.period_payroll(period)?;
        Ok(PayrollSummary {
            period,
            state: run.as_ref().map_or(RunState::NotStarted, |r| r.state),
            run,
            totals: PayrollTotals::from_records(&records),
            records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AttendanceRecord, AttendanceStatus, Compensation, EmployeeStatus, Outcome, ProrationMode,
    };
    use crate::store::MemoryStore;
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn september() -> PayPeriod {
        PayPeriod::new(9, 2026).unwrap()
    }

    fn actor() -> Actor {
        Actor::new("payroll-admin").unwrap()
    }

    fn employee(id: &str, basic: Option<&str>) -> Employee {
        Employee {
            id: id.to_string(),
            first_name: "Test".to_string(),
            last_name: id.to_string(),
            email: None,
            department_id: None,
            date_of_joining: None,
            compensation: Compensation {
                basic: basic.map(dec),
                housing_allowance: Some(dec("500")),
                conveyance: Some(dec("200")),
                provident_fund: Some(dec("150")),
                insurance: Some(dec("50")),
            },
            status: EmployeeStatus::Active,
        }
    }

    fn attend(store: &dyn HrStore, id: &str, days: std::ops::RangeInclusive<u32>) {
        for day in days {
            store
                .upsert_attendance(&AttendanceRecord {
                    employee_id: id.to_string(),
                    date: NaiveDate::from_ymd_opt(2026, 9, day).unwrap(),
                    check_in: NaiveTime::from_hms_opt(9, 0, 0),
                    check_out: NaiveTime::from_hms_opt(17, 0, 0),
                    hours_worked: Some(Decimal::from(8)),
                    status: AttendanceStatus::Present,
                    recorded_by: "hr-admin".to_string(),
                    recorded_at: Utc::now(),
                })
                .unwrap();
        }
    }

    fn setup() -> (Arc<MemoryStore>, PayrollCoordinator) {
        let store = Arc::new(MemoryStore::new());
        let coordinator = PayrollCoordinator::new(
            store.clone(),
            PayrollSettings::default(),
            AttendanceSettings::default(),
        );
        (store, coordinator)
    }

    #[test]
    fn test_generate_pays_by_attendance() {
        let (store, coordinator) = setup();
        store.insert_employee(&employee("EMP0001", Some("3000"))).unwrap();
        store.insert_employee(&employee("EMP0002", Some("3000"))).unwrap();
        attend(store.as_ref(), "EMP0001", 1..=30);
        attend(store.as_ref(), "EMP0002", 1..=15);

        let report = coordinator.generate(september(), &actor(), false).unwrap();
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.outcome, Outcome::Complete);

        let full = store.payroll_record("EMP0001", september()).unwrap().unwrap();
        assert_eq!(full.figures.net, dec("3500"));
        assert_eq!(full.revision, 1);
        assert_eq!(full.generated_by, "payroll-admin");

        let half = store.payroll_record("EMP0002", september()).unwrap().unwrap();
        assert_eq!(half.figures.gross, dec("2200"));
        assert_eq!(half.figures.net, dec("2000"));

        let run = store.payroll_run(september()).unwrap().unwrap();
        assert_eq!(run.state, RunState::Completed);
        assert_eq!(run.succeeded, 2);
    }

    #[test]
    fn test_second_generate_without_force_conflicts() {
        let (store, coordinator) = setup();
        store.insert_employee(&employee("EMP0001", Some("3000"))).unwrap();
        coordinator.generate(september(), &actor(), false).unwrap();

        let err = coordinator.generate(september(), &actor(), false).unwrap_err();
        assert!(matches!(err, EngineError::Conflict { .. }));
        assert_eq!(store.period_payroll(september()).unwrap().len(), 1);
    }

    #[test]
    fn test_force_replaces_as_correction() {
        let (store, coordinator) = setup();
        store.insert_employee(&employee("EMP0001", Some("3000"))).unwrap();
        coordinator.generate(september(), &actor(), false).unwrap();

        attend(store.as_ref(), "EMP0001", 1..=30);
        let report = coordinator.generate(september(), &actor(), true).unwrap();
        assert_eq!(report.corrected, 1);

        let records = store.period_payroll(september()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].revision, 2);
        assert!(records[0].is_correction());
        assert_eq!(records[0].figures.net, dec("3500"));
    }

    #[test]
    fn test_missing_compensation_is_collected() {
        let (store, coordinator) = setup();
        store.insert_employee(&employee("EMP0001", Some("3000"))).unwrap();
        store.insert_employee(&employee("EMP0002", None)).unwrap();

        let report = coordinator.generate(september(), &actor(), false).unwrap();
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.outcome, Outcome::PartialFailure);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].employee_id, "EMP0002");
        assert!(report.failed[0].reason.contains("basic"));

        let run = store.payroll_run(september()).unwrap().unwrap();
        assert_eq!(run.state, RunState::Completed);
        assert_eq!(run.failed, 1);
    }

    #[test]
    fn test_out_of_range_compensation_does_not_stall_the_run() {
        let store = Arc::new(MemoryStore::new());
        let coordinator = PayrollCoordinator::new(
            store.clone(),
            PayrollSettings {
                proration: ProrationMode::Flat,
            },
            AttendanceSettings::default(),
        );
        let huge = Decimal::MAX.to_string();
        store.insert_employee(&employee("EMP0001", Some(&huge))).unwrap();
        store.insert_employee(&employee("EMP0002", Some("3000"))).unwrap();

        let report = coordinator.generate(september(), &actor(), false).unwrap();
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].employee_id, "EMP0001");

        let run = store.payroll_run(september()).unwrap().unwrap();
        assert_eq!(run.state, RunState::Completed);
        let paid = store.payroll_record("EMP0002", september()).unwrap().unwrap();
        assert_eq!(paid.figures.net, dec("3500"));

        let retry = coordinator.generate(september(), &actor(), true).unwrap();
        assert_eq!(retry.failed.len(), 1);
    }

    #[test]
    fn test_inactive_employees_are_not_paid() {
        let (store, coordinator) = setup();
        let mut leaver = employee("EMP0001", Some("3000"));
        leaver.status = EmployeeStatus::Inactive;
        store.insert_employee(&leaver).unwrap();

        let report = coordinator.generate(september(), &actor(), false).unwrap();
        assert_eq!(report.succeeded, 0);
        assert!(store.period_payroll(september()).unwrap().is_empty());
    }

    #[test]
    fn test_resume_after_crash_skips_existing_records() {
        let (store, coordinator) = setup();
        store.insert_employee(&employee("EMP0001", Some("3000"))).unwrap();
        store.insert_employee(&employee("EMP0002", Some("3000"))).unwrap();

        // Simulate a process that claimed the run, paid one employee and died.
        let crashed = PayrollRun::start(september(), "payroll-admin", false);
        store.begin_run(&crashed).unwrap();
        coordinator
            .pay_employee(&employee("EMP0001", Some("3000")), &crashed, &actor())
            .unwrap();

        let err = coordinator.generate(september(), &actor(), false).unwrap_err();
        assert!(matches!(err, EngineError::Conflict { .. }));

        assert_eq!(coordinator.recover_stale_runs().unwrap(), vec![september()]);
        let report = coordinator.generate(september(), &actor(), false).unwrap();
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.skipped, vec!["EMP0001".to_string()]);
        assert_eq!(store.period_payroll(september()).unwrap().len(), 2);
    }

    #[test]
    fn test_flat_mode_from_settings() {
        let store = Arc::new(MemoryStore::new());
        let coordinator = PayrollCoordinator::new(
            store.clone(),
            PayrollSettings {
                proration: ProrationMode::Flat,
            },
            AttendanceSettings::default(),
        );
        store.insert_employee(&employee("EMP0001", Some("3000"))).unwrap();

        coordinator.generate(september(), &actor(), false).unwrap();
        let record = store.payroll_record("EMP0001", september()).unwrap().unwrap();
        assert_eq!(record.figures.gross, dec("3700"));
        assert_eq!(record.figures.payable_days, 30);
    }

    #[test]
    fn test_summary_totals() {
        let (store, coordinator) = setup();
        let empty = coordinator.summary(september()).unwrap();
        assert_eq!(empty.state, RunState::NotStarted);
        assert!(empty.run.is_none());

        store.insert_employee(&employee("EMP0001", Some("3000"))).unwrap();
        store.insert_employee(&employee("EMP0002", Some("3000"))).unwrap();
        attend(store.as_ref(), "EMP0001", 1..=30);
        attend(store.as_ref(), "EMP0002", 1..=15);
        coordinator.generate(september(), &actor(), false).unwrap();

        let summary = coordinator.summary(september()).unwrap();
        assert_eq!(summary.state, RunState::Completed);
        assert_eq!(summary.totals.employees, 2);
        assert_eq!(summary.totals.gross, dec("5900"));
        assert_eq!(summary.totals.net, dec("5500"));
    }

    #[test]
    fn test_concurrent_generation_of_one_period() {
        let (store, coordinator) = setup();
        for i in 0..50 {
            store
                .insert_employee(&employee(&format!("EMP{:04}", i), Some("3000")))
                .unwrap();
        }
        let coordinator = Arc::new(coordinator);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let coordinator = Arc::clone(&coordinator);
                std::thread::spawn(move || coordinator.generate(september(), &actor(), false))
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, EngineError::Conflict { .. })));
        assert_eq!(store.period_payroll(september()).unwrap().len(), 50);
    }
}
