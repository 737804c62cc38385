//! Behaviour every [`HrStore`] backend must share.
//!
//! Each backend's test module calls [`run_all`] with a factory producing an
//! empty store; every check gets a fresh one.

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::error::EngineError;
use crate::models::{
    AttendanceRecord, AttendanceStatus, Compensation, Deductions, Department, Earnings, Employee,
    EmployeeStatus, PayPeriod, PayrollFigures, PayrollRecord, PayrollRun, ProrationMode,
    RunState,
};

use super::HrStore;

pub(crate) fn run_all<S: HrStore>(make: impl Fn() -> S) {
    departments_are_unique(&make());
    employees_are_unique_by_id_and_email(&make());
    narrow_updates_require_existing_employee(&make());
    narrow_updates_keep_each_other(&make());
    active_employees_are_ordered_and_filtered(&make());
    attendance_upsert_reports_replacement(&make());
    attendance_queries_respect_period_bounds(&make());
    payroll_insert_conflicts_and_replace(&make());
    employee_payroll_is_newest_first(&make());
    run_claims_follow_state(&make());
    finish_run_requires_claim(&make());
    in_progress_runs_fail_on_recovery(&make());
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn period(month: u32, year: i32) -> PayPeriod {
    PayPeriod::new(month, year).unwrap()
}

fn employee(id: &str, email: Option<&str>) -> Employee {
    Employee {
        id: id.to_string(),
        first_name: "Test".to_string(),
        last_name: id.to_string(),
        email: email.map(str::to_string),
        department_id: None,
        date_of_joining: Some(date(2024, 4, 1)),
        compensation: Compensation {
            basic: Some(Decimal::new(3000, 0)),
            housing_allowance: Some(Decimal::new(500, 0)),
            conveyance: None,
            provident_fund: Some(Decimal::new(15050, 2)),
            insurance: None,
        },
        status: EmployeeStatus::Active,
    }
}

fn attendance(employee_id: &str, on: NaiveDate, status: AttendanceStatus) -> AttendanceRecord {
    AttendanceRecord {
        employee_id: employee_id.to_string(),
        date: on,
        check_in: NaiveTime::from_hms_opt(9, 0, 0),
        check_out: NaiveTime::from_hms_opt(17, 30, 0),
        hours_worked: Some(Decimal::new(85, 1)),
        status,
        recorded_by: "hr-admin".to_string(),
        recorded_at: Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap(),
    }
}

fn payroll(employee_id: &str, period: PayPeriod, net: i64, revision: u32) -> PayrollRecord {
    PayrollRecord {
        employee_id: employee_id.to_string(),
        period,
        figures: PayrollFigures {
            payable_days: period.days_in_month(),
            days_in_month: period.days_in_month(),
            proration: ProrationMode::Prorated,
            earnings: Earnings {
                basic: Decimal::new(net, 0),
                housing_allowance: Decimal::ZERO,
                conveyance: Decimal::ZERO,
            },
            gross: Decimal::new(net, 0),
            deductions: Deductions {
                provident_fund: Decimal::ZERO,
                insurance: Decimal::ZERO,
            },
            total_deductions: Decimal::ZERO,
            net: Decimal::new(net, 0),
            audit_steps: Vec::new(),
        },
        revision,
        generated_by: "payroll-admin".to_string(),
        generated_at: Utc.with_ymd_and_hms(2026, 4, 1, 12, 0, 0).unwrap(),
    }
}

fn departments_are_unique(store: &dyn HrStore) {
    let dept = Department {
        id: "ENG".to_string(),
        name: "Engineering".to_string(),
        company: Some("Acme".to_string()),
    };
    store.insert_department(&dept).unwrap();
    assert_eq!(store.department("ENG").unwrap(), Some(dept.clone()));
    assert_eq!(store.department("OPS").unwrap(), None);

    let err = store.insert_department(&dept).unwrap_err();
    assert!(matches!(err, EngineError::Conflict { .. }), "{err:?}");
}

fn employees_are_unique_by_id_and_email(store: &dyn HrStore) {
    let first = employee("EMP0001", Some("a@example.com"));
    store.insert_employee(&first).unwrap();
    assert_eq!(store.employee("EMP0001").unwrap(), Some(first.clone()));

    let err = store.insert_employee(&first).unwrap_err();
    assert!(matches!(err, EngineError::Conflict { .. }), "{err:?}");

    let same_email = employee("EMP0002", Some("a@example.com"));
    let err = store.insert_employee(&same_email).unwrap_err();
    assert!(matches!(err, EngineError::Conflict { .. }), "{err:?}");
    assert_eq!(store.employee("EMP0002").unwrap(), None);

    // Employees without email never collide with each other.
    store.insert_employee(&employee("EMP0003", None)).unwrap();
    store.insert_employee(&employee("EMP0004", None)).unwrap();
}

fn narrow_updates_require_existing_employee(store: &dyn HrStore) {
    let comp = Compensation {
        basic: Some(Decimal::new(4200, 0)),
        ..Compensation::default()
    };
    let err = store.update_compensation("EMP0001", &comp).unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }), "{err:?}");
    let err = store
        .set_employee_status("EMP0001", EmployeeStatus::Inactive)
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }), "{err:?}");
}

fn narrow_updates_keep_each_other(store: &dyn HrStore) {
    let emp = employee("EMP0001", Some("emp1@example.com"));
    store.insert_employee(&emp).unwrap();

    // Each update leaves the columns of the other alone.
    let comp = Compensation {
        basic: Some(Decimal::new(4200, 0)),
        ..emp.compensation.clone()
    };
    let after_status = store
        .set_employee_status("EMP0001", EmployeeStatus::Inactive)
        .unwrap();
    assert_eq!(after_status.status, EmployeeStatus::Inactive);
    assert_eq!(after_status.compensation, emp.compensation);

    let after_comp = store.update_compensation("EMP0001", &comp).unwrap();
    assert_eq!(after_comp.status, EmployeeStatus::Inactive);
    assert_eq!(after_comp.compensation, comp);

    let stored = store.employee("EMP0001").unwrap().unwrap();
    assert_eq!(stored, after_comp);
    assert_eq!(stored.email.as_deref(), Some("emp1@example.com"));
    assert_eq!(stored.date_of_joining, emp.date_of_joining);
}

fn active_employees_are_ordered_and_filtered(store: &dyn HrStore) {
    store.insert_employee(&employee("EMP0003", None)).unwrap();
    store.insert_employee(&employee("EMP0001", None)).unwrap();
    let mut inactive = employee("EMP0002", None);
    inactive.status = EmployeeStatus::Inactive;
    store.insert_employee(&inactive).unwrap();

    let ids: Vec<String> = store
        .active_employees()
        .unwrap()
        .into_iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(ids, vec!["EMP0001", "EMP0003"]);
}

fn attendance_upsert_reports_replacement(store: &dyn HrStore) {
    store.insert_employee(&employee("EMP0001", None)).unwrap();
    let on = date(2026, 3, 2);

    let first = attendance("EMP0001", on, AttendanceStatus::Present);
    assert!(!store.upsert_attendance(&first).unwrap());

    let mut second = attendance("EMP0001", on, AttendanceStatus::Leave);
    second.check_in = None;
    second.check_out = None;
    second.hours_worked = None;
    assert!(store.upsert_attendance(&second).unwrap());

    assert_eq!(store.attendance("EMP0001", on).unwrap(), Some(second));
    assert_eq!(store.period_attendance(period(3, 2026)).unwrap().len(), 1);
}

fn attendance_queries_respect_period_bounds(store: &dyn HrStore) {
    store.insert_employee(&employee("EMP0001", None)).unwrap();
    store.insert_employee(&employee("EMP0002", None)).unwrap();
    for record in [
        attendance("EMP0002", date(2026, 2, 1), AttendanceStatus::Present),
        attendance("EMP0001", date(2026, 2, 28), AttendanceStatus::Present),
        attendance("EMP0001", date(2026, 2, 1), AttendanceStatus::Absent),
        attendance("EMP0001", date(2026, 1, 31), AttendanceStatus::Present),
        attendance("EMP0001", date(2026, 3, 1), AttendanceStatus::Present),
    ] {
        store.upsert_attendance(&record).unwrap();
    }

    let feb = period(2, 2026);
    let dates: Vec<NaiveDate> = store
        .employee_attendance("EMP0001", feb)
        .unwrap()
        .into_iter()
        .map(|r| r.date)
        .collect();
    assert_eq!(dates, vec![date(2026, 2, 1), date(2026, 2, 28)]);

    let keys: Vec<(String, NaiveDate)> = store
        .period_attendance(feb)
        .unwrap()
        .into_iter()
        .map(|r| (r.employee_id, r.date))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("EMP0001".to_string(), date(2026, 2, 1)),
            ("EMP0001".to_string(), date(2026, 2, 28)),
            ("EMP0002".to_string(), date(2026, 2, 1)),
        ]
    );

    assert!(store
        .employee_attendance("EMP0003", feb)
        .unwrap()
        .is_empty());
}

fn payroll_insert_conflicts_and_replace(store: &dyn HrStore) {
    store.insert_employee(&employee("EMP0001", None)).unwrap();
    let march = period(3, 2026);

    let missing = payroll("EMP0001", march, 3500, 2);
    let err = store.replace_payroll(&missing).unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }), "{err:?}");

    let original = payroll("EMP0001", march, 3500, 1);
    store.insert_payroll(&original).unwrap();
    let err = store.insert_payroll(&original).unwrap_err();
    assert!(matches!(err, EngineError::Conflict { .. }), "{err:?}");

    let corrected = payroll("EMP0001", march, 3400, 2);
    store.replace_payroll(&corrected).unwrap();
    assert_eq!(
        store.payroll_record("EMP0001", march).unwrap(),
        Some(corrected.clone())
    );
    assert_eq!(store.period_payroll(march).unwrap(), vec![corrected]);
    assert!(store.period_payroll(period(4, 2026)).unwrap().is_empty());
}

fn employee_payroll_is_newest_first(store: &dyn HrStore) {
    store.insert_employee(&employee("EMP0001", None)).unwrap();
    for (month, year) in [(11, 2025), (2, 2026), (12, 2025)] {
        store
            .insert_payroll(&payroll("EMP0001", period(month, year), 3500, 1))
            .unwrap();
    }

    let periods: Vec<PayPeriod> = store
        .employee_payroll("EMP0001")
        .unwrap()
        .into_iter()
        .map(|r| r.period)
        .collect();
    assert_eq!(
        periods,
        vec![period(2, 2026), period(12, 2025), period(11, 2025)]
    );
}

fn run_claims_follow_state(store: &dyn HrStore) {
    let march = period(3, 2026);
    assert_eq!(store.payroll_run(march).unwrap(), None);

    let mut first = PayrollRun::start(march, "payroll-admin", false);
    store.begin_run(&first).unwrap();

    let err = store
        .begin_run(&PayrollRun::start(march, "someone-else", true))
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict { .. }), "{err:?}");

    first.state = RunState::Completed;
    first.finished_at = Some(Utc::now());
    first.succeeded = 3;
    store.finish_run(&first).unwrap();
    assert_eq!(store.payroll_run(march).unwrap(), Some(first.clone()));

    let err = store
        .begin_run(&PayrollRun::start(march, "payroll-admin", false))
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict { .. }), "{err:?}");

    let forced = PayrollRun::start(march, "payroll-admin", true);
    store.begin_run(&forced).unwrap();
    assert_eq!(
        store.payroll_run(march).unwrap().map(|r| r.run_id),
        Some(forced.run_id)
    );

    // Other periods are independent.
    store
        .begin_run(&PayrollRun::start(period(4, 2026), "payroll-admin", false))
        .unwrap();
}

fn finish_run_requires_claim(store: &dyn HrStore) {
    let mut unclaimed = PayrollRun::start(period(3, 2026), "payroll-admin", false);
    unclaimed.state = RunState::Completed;
    let err = store.finish_run(&unclaimed).unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }), "{err:?}");
}

fn in_progress_runs_fail_on_recovery(store: &dyn HrStore) {
    let march = period(3, 2026);
    let april = period(4, 2026);
    store
        .begin_run(&PayrollRun::start(march, "payroll-admin", false))
        .unwrap();
    let mut done = PayrollRun::start(april, "payroll-admin", false);
    store.begin_run(&done).unwrap();
    done.state = RunState::Completed;
    done.finished_at = Some(Utc::now());
    store.finish_run(&done).unwrap();

    assert_eq!(store.fail_in_progress_runs().unwrap(), vec![march]);
    let recovered = store.payroll_run(march).unwrap().unwrap();
    assert_eq!(recovered.state, RunState::Failed);
    assert!(recovered.finished_at.is_some());
    assert_eq!(
        store.payroll_run(april).unwrap().map(|r| r.state),
        Some(RunState::Completed)
    );
    assert!(store.fail_in_progress_runs().unwrap().is_empty());

    // A failed run no longer blocks the period.
    store
        .begin_run(&PayrollRun::start(march, "payroll-admin", false))
        .unwrap();
}
