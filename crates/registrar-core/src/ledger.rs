//! Grade ledger types — the current grade per key plus its attempt history.
//!
//! The ledger keeps exactly one mutable grade record per
//! `(student, subject, semester)` key, and an append-only history of every
//! attempt. Attempt numbers start at 1 and are gap-free per key; the
//! highest-attempt history entry always carries the same grade as the
//! current record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{grade::Grade, semester::SemesterRef, student::RollNo};

// ─── Enrollment ──────────────────────────────────────────────────────────────

/// A student taking a subject in a given semester; unique per triple.
/// Enrollment credits are the weighting source for CPI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
  pub roll_no:      RollNo,
  pub subject_code: String,
  pub sem_no:       u16,
  pub year:         u16,
}

/// An enrollment joined with its subject's display fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrolledSubject {
  pub roll_no:      RollNo,
  pub subject_code: String,
  pub subject_name: String,
  pub credits:      u32,
  pub sem_no:       u16,
  pub year:         u16,
}

// ─── Grade record ────────────────────────────────────────────────────────────

/// The current (latest) grade for a key; overwritten in place on retake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRecord {
  pub roll_no:      RollNo,
  pub subject_code: String,
  pub sem_no:       u16,
  pub year:         u16,
  pub grade:        Grade,
  pub updated_at:   DateTime<Utc>,
}

// ─── History ─────────────────────────────────────────────────────────────────

/// One append-only history entry: the grade a key held at a given attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeAttempt {
  pub roll_no:      RollNo,
  pub subject_code: String,
  pub sem_no:       u16,
  pub year:         u16,
  pub grade:        Grade,
  /// 1-based, monotonically increasing per key, no gaps.
  pub attempt:      u32,
  pub recorded_at:  DateTime<Utc>,
}

impl GradeAttempt {
  pub fn sem(&self) -> SemesterRef { SemesterRef::new(self.sem_no, self.year) }
}
