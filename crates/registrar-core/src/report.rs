//! Read-side report models — computed on read, never stored.

use serde::{Deserialize, Serialize};

use crate::{
  grade::Grade,
  index::{CpiRecord, CpiSummary, SpiRecord},
  ledger::EnrolledSubject,
  semester::Semester,
  student::{RollNo, Student},
};

// ─── Index series ────────────────────────────────────────────────────────────

/// All SPI and CPI records for a student up to a semester bound, each
/// ordered ascending by semester number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSeries {
  pub roll_no: RollNo,
  /// The inclusive semester-number bound the series was assembled for.
  pub sem_no:  u16,
  pub spi:     Vec<SpiRecord>,
  pub cpi:     Vec<CpiRecord>,
}

// ─── Student report ──────────────────────────────────────────────────────────

/// A grade row joined with its subject's credit weight, as shown on the
/// grade card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradedSubject {
  pub subject_code: String,
  pub sem_no:       u16,
  pub year:         u16,
  pub grade:        Grade,
  pub credits:      u32,
}

/// The full snapshot handed to the presentation layer for grade-card
/// generation. Pure read-side assembly; nothing here is recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentReport {
  pub student:     Student,
  pub semester:    Semester,
  pub enrollments: Vec<EnrolledSubject>,
  /// Grade rows for all semesters up to the target, semester ascending.
  pub grades:      Vec<GradedSubject>,
  pub spi:         Vec<SpiRecord>,
  pub cpi:         Vec<CpiRecord>,
}

// ─── Batch report ────────────────────────────────────────────────────────────

/// The outcome of a cohort-wide SPI+CPI run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
  pub students_processed: usize,
  pub spi:                Vec<SpiRecord>,
  pub cpi:                Vec<CpiSummary>,
}
