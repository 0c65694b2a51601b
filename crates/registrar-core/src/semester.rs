//! Semesters and their lifecycle.
//!
//! A semester is identified by the composite `(sem_no, year)`. Semester
//! numbers run through the whole programme (1, 2, 3, …), so "all semesters
//! up to N" is a plain comparison on `sem_no` regardless of calendar year.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ─── Key ─────────────────────────────────────────────────────────────────────

/// The composite key of a semester.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct SemesterRef {
  pub sem_no: u16,
  pub year:   u16,
}

impl SemesterRef {
  pub fn new(sem_no: u16, year: u16) -> Self { Self { sem_no, year } }
}

impl fmt::Display for SemesterRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({}, {})", self.sem_no, self.year)
  }
}

// ─── Lifecycle ───────────────────────────────────────────────────────────────

/// Where a semester is in its lifecycle. New semesters start `Upcoming`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum SemesterStatus {
  #[default]
  Upcoming,
  Ongoing,
  Completed,
}

// ─── Semester ────────────────────────────────────────────────────────────────

/// A semester row. Must exist before any enrollment, grade, SPI, or CPI
/// record referencing it can be created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Semester {
  pub sem_no:     u16,
  pub year:       u16,
  pub start_date: NaiveDate,
  pub end_date:   NaiveDate,
  pub status:     SemesterStatus,
}

impl Semester {
  pub fn sem(&self) -> SemesterRef { SemesterRef::new(self.sem_no, self.year) }
}

/// Input to [`crate::store::AcademicStore::start_semester`].
/// `status` always starts as [`SemesterStatus::Upcoming`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSemester {
  pub sem_no:     u16,
  pub year:       u16,
  pub start_date: NaiveDate,
  pub end_date:   NaiveDate,
}
