//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as
//! `YYYY-MM-DD`, grades as their letter codes, and semester status in the
//! upper-case form the registrar's office uses.

use chrono::{DateTime, NaiveDate, Utc};
use registrar_core::{
  grade::Grade,
  ledger::{GradeAttempt, GradeRecord},
  semester::{Semester, SemesterStatus},
  student::Student,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Grade ───────────────────────────────────────────────────────────────────

pub fn encode_grade(g: Grade) -> &'static str { g.as_str() }

pub fn decode_grade(s: &str) -> Result<Grade> {
  Grade::parse(s).map_err(|_| Error::Decode(format!("unknown grade code: {s:?}")))
}

// ─── SemesterStatus ──────────────────────────────────────────────────────────

pub fn encode_status(s: SemesterStatus) -> &'static str {
  match s {
    SemesterStatus::Upcoming => "UPCOMING",
    SemesterStatus::Ongoing => "ONGOING",
    SemesterStatus::Completed => "COMPLETED",
  }
}

pub fn decode_status(s: &str) -> Result<SemesterStatus> {
  match s {
    "UPCOMING" => Ok(SemesterStatus::Upcoming),
    "ONGOING" => Ok(SemesterStatus::Ongoing),
    "COMPLETED" => Ok(SemesterStatus::Completed),
    other => Err(Error::Decode(format!("unknown semester status: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw columns read directly from a `students` row.
pub struct RawStudent {
  pub roll_no:    u32,
  pub name:       String,
  pub department: String,
  pub year:       u16,
  pub created_at: String,
}

impl RawStudent {
  pub fn into_student(self) -> Result<Student> {
    Ok(Student {
      roll_no:    self.roll_no,
      name:       self.name,
      department: self.department,
      year:       self.year,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw columns read directly from a `semesters` row.
pub struct RawSemester {
  pub sem_no:     u16,
  pub year:       u16,
  pub start_date: String,
  pub end_date:   String,
  pub status:     String,
}

impl RawSemester {
  pub fn into_semester(self) -> Result<Semester> {
    Ok(Semester {
      sem_no:     self.sem_no,
      year:       self.year,
      start_date: decode_date(&self.start_date)?,
      end_date:   decode_date(&self.end_date)?,
      status:     decode_status(&self.status)?,
    })
  }
}

/// Raw columns read directly from a `grades` row.
pub struct RawGradeRecord {
  pub roll_no:      u32,
  pub subject_code: String,
  pub sem_no:       u16,
  pub year:         u16,
  pub grade:        String,
  pub updated_at:   String,
}

impl RawGradeRecord {
  pub fn into_record(self) -> Result<GradeRecord> {
    Ok(GradeRecord {
      roll_no:      self.roll_no,
      subject_code: self.subject_code,
      sem_no:       self.sem_no,
      year:         self.year,
      grade:        decode_grade(&self.grade)?,
      updated_at:   decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw columns read directly from a `grade_history` row.
pub struct RawGradeAttempt {
  pub roll_no:      u32,
  pub subject_code: String,
  pub sem_no:       u16,
  pub year:         u16,
  pub grade:        String,
  pub attempt:      u32,
  pub recorded_at:  String,
}

impl RawGradeAttempt {
  pub fn into_attempt(self) -> Result<GradeAttempt> {
    Ok(GradeAttempt {
      roll_no:      self.roll_no,
      subject_code: self.subject_code,
      sem_no:       self.sem_no,
      year:         self.year,
      grade:        decode_grade(&self.grade)?,
      attempt:      self.attempt,
      recorded_at:  decode_dt(&self.recorded_at)?,
    })
  }
}
