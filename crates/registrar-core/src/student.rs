//! Student records.
//!
//! A student is identified by an institute-assigned roll number. The `year`
//! field is the cohort (enrollment) year and is the only field mutated over
//! the student's lifetime — it advances when a new semester starts and the
//! student is promoted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Institute-assigned roll number; unique across all students.
pub type RollNo = u32;

/// A registered student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
  pub roll_no:    RollNo,
  pub name:       String,
  pub department: String,
  /// Cohort year; advanced on promotion.
  pub year:       u16,
  /// Server-assigned registration timestamp; never changes.
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::AcademicStore::add_student`].
/// `created_at` is always set by the store; it is not accepted from callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStudent {
  pub roll_no:    RollNo,
  pub name:       String,
  pub department: String,
  pub year:       u16,
}

/// A student-year advancement applied when a new semester starts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Promotion {
  pub roll_no:  RollNo,
  pub new_year: u16,
}
