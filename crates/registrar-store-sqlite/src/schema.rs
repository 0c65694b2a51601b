//! SQL schema for the Registrar SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS students (
    roll_no     INTEGER PRIMARY KEY,
    name        TEXT NOT NULL,
    department  TEXT NOT NULL,
    year        INTEGER NOT NULL,   -- cohort year; advanced on promotion
    created_at  TEXT NOT NULL       -- ISO 8601 UTC; server-assigned
);

CREATE TABLE IF NOT EXISTS subjects (
    subject_code TEXT PRIMARY KEY,
    subject_name TEXT NOT NULL,
    credits      INTEGER NOT NULL CHECK (credits > 0),
    is_elective  INTEGER NOT NULL DEFAULT 0,
    department   TEXT
);

CREATE TABLE IF NOT EXISTS semesters (
    sem_no     INTEGER NOT NULL,
    year       INTEGER NOT NULL,
    start_date TEXT NOT NULL,
    end_date   TEXT NOT NULL,
    status     TEXT NOT NULL DEFAULT 'UPCOMING',  -- UPCOMING | ONGOING | COMPLETED
    PRIMARY KEY (sem_no, year)
);

CREATE TABLE IF NOT EXISTS enrollments (
    roll_no      INTEGER NOT NULL REFERENCES students(roll_no) ON DELETE CASCADE,
    subject_code TEXT NOT NULL REFERENCES subjects(subject_code) ON DELETE CASCADE,
    sem_no       INTEGER NOT NULL,
    year         INTEGER NOT NULL,
    PRIMARY KEY (roll_no, subject_code, sem_no, year),
    FOREIGN KEY (sem_no, year) REFERENCES semesters(sem_no, year) ON DELETE CASCADE
);

-- The current grade per key; the only table the ledger ever UPDATEs.
CREATE TABLE IF NOT EXISTS grades (
    roll_no      INTEGER NOT NULL REFERENCES students(roll_no) ON DELETE CASCADE,
    subject_code TEXT NOT NULL REFERENCES subjects(subject_code) ON DELETE CASCADE,
    sem_no       INTEGER NOT NULL,
    year         INTEGER NOT NULL,
    grade        TEXT NOT NULL,
    updated_at   TEXT NOT NULL,
    PRIMARY KEY (roll_no, subject_code, sem_no, year),
    FOREIGN KEY (sem_no, year) REFERENCES semesters(sem_no, year) ON DELETE CASCADE
);

-- Attempt history is strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
-- The primary key rules out duplicate attempt numbers per ledger key.
CREATE TABLE IF NOT EXISTS grade_history (
    roll_no      INTEGER NOT NULL REFERENCES students(roll_no) ON DELETE CASCADE,
    subject_code TEXT NOT NULL REFERENCES subjects(subject_code) ON DELETE CASCADE,
    sem_no       INTEGER NOT NULL,
    year         INTEGER NOT NULL,
    grade        TEXT NOT NULL,
    attempt      INTEGER NOT NULL,
    recorded_at  TEXT NOT NULL,
    PRIMARY KEY (roll_no, subject_code, sem_no, year, attempt),
    FOREIGN KEY (sem_no, year) REFERENCES semesters(sem_no, year) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS spi (
    roll_no INTEGER NOT NULL REFERENCES students(roll_no) ON DELETE CASCADE,
    sem_no  INTEGER NOT NULL,
    year    INTEGER NOT NULL,
    spi     REAL NOT NULL CHECK (spi BETWEEN 0 AND 10),
    PRIMARY KEY (roll_no, sem_no, year),
    FOREIGN KEY (sem_no, year) REFERENCES semesters(sem_no, year) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS cpi (
    roll_no INTEGER NOT NULL REFERENCES students(roll_no) ON DELETE CASCADE,
    sem_no  INTEGER NOT NULL,
    year    INTEGER NOT NULL,
    cpi     REAL NOT NULL CHECK (cpi BETWEEN 0 AND 10),
    PRIMARY KEY (roll_no, sem_no, year),
    FOREIGN KEY (sem_no, year) REFERENCES semesters(sem_no, year) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS students_year_idx  ON students(year);
CREATE INDEX IF NOT EXISTS grades_sem_idx     ON grades(roll_no, sem_no, year);
CREATE INDEX IF NOT EXISTS history_key_idx    ON grade_history(roll_no, subject_code, sem_no, year);
CREATE INDEX IF NOT EXISTS spi_student_idx    ON spi(roll_no, sem_no);
CREATE INDEX IF NOT EXISTS cpi_student_idx    ON cpi(roll_no, sem_no);

PRAGMA user_version = 1;
";
