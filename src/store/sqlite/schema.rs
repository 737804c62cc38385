//! SQL schema for the SQLite HR store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS departments (
    department_id TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    company       TEXT
);

-- Rows are never deleted; leaving is a status change.
CREATE TABLE IF NOT EXISTS employees (
    employee_id     TEXT PRIMARY KEY,
    first_name      TEXT NOT NULL,
    last_name       TEXT NOT NULL,
    email           TEXT UNIQUE,
    department_id   TEXT REFERENCES departments(department_id),
    date_of_joining TEXT,
    basic_salary    TEXT,            -- decimal strings; NULL when not entered
    hra             TEXT,
    conveyance      TEXT,
    pf              TEXT,
    esic            TEXT,
    status          TEXT NOT NULL DEFAULT 'active'
                    CHECK (status IN ('active', 'inactive'))
);

CREATE TABLE IF NOT EXISTS attendance (
    employee_id  TEXT NOT NULL REFERENCES employees(employee_id),
    date         TEXT NOT NULL,      -- YYYY-MM-DD
    check_in     TEXT,               -- HH:MM:SS
    check_out    TEXT,
    hours_worked TEXT,
    status       TEXT NOT NULL
                 CHECK (status IN ('present', 'absent', 'leave', 'holiday')),
    uploaded_by  TEXT NOT NULL,
    uploaded_at  TEXT NOT NULL,      -- RFC 3339 UTC
    PRIMARY KEY (employee_id, date)
);

CREATE TABLE IF NOT EXISTS payroll (
    employee_id      TEXT NOT NULL REFERENCES employees(employee_id),
    year             INTEGER NOT NULL,
    month            INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
    payable_days     INTEGER NOT NULL CHECK (payable_days >= 0),
    days_in_month    INTEGER NOT NULL CHECK (payable_days <= days_in_month),
    proration        TEXT NOT NULL,
    basic            TEXT NOT NULL,
    hra              TEXT NOT NULL,
    conveyance       TEXT NOT NULL,
    gross            TEXT NOT NULL,
    pf               TEXT NOT NULL,
    esic             TEXT NOT NULL,
    total_deductions TEXT NOT NULL,
    net_salary       TEXT NOT NULL,
    audit_json       TEXT NOT NULL DEFAULT '[]',
    revision         INTEGER NOT NULL DEFAULT 1,
    generated_by     TEXT NOT NULL,
    generated_at     TEXT NOT NULL,
    PRIMARY KEY (employee_id, year, month)
);

-- Latest run per period.
CREATE TABLE IF NOT EXISTS payroll_runs (
    year        INTEGER NOT NULL,
    month       INTEGER NOT NULL,
    run_id      TEXT NOT NULL UNIQUE,
    state       TEXT NOT NULL
                CHECK (state IN ('in_progress', 'completed', 'failed')),
    forced      INTEGER NOT NULL DEFAULT 0,
    started_by  TEXT NOT NULL,
    started_at  TEXT NOT NULL,
    finished_at TEXT,
    succeeded   INTEGER NOT NULL DEFAULT 0,
    failed      INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (year, month)
);

CREATE INDEX IF NOT EXISTS attendance_date_idx ON attendance(date);
CREATE INDEX IF NOT EXISTS payroll_period_idx  ON payroll(year, month);

PRAGMA user_version = 1;
";
