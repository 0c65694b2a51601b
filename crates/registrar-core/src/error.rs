//! Error types for `registrar-core`.

use thiserror::Error;

use crate::{semester::SemesterRef, student::RollNo};

#[derive(Debug, Clone, Error)]
pub enum Error {
  // ── Validation ────────────────────────────────────────────────────────
  #[error("invalid grade code: {0:?}")]
  InvalidGrade(String),

  #[error("invalid roll number: {0:?}")]
  InvalidRollNo(String),

  #[error("subject credits must be a positive integer")]
  InvalidCredits,

  #[error("invalid import file name: {0:?}")]
  InvalidImportFileName(String),

  #[error("no rows found in the import")]
  EmptyImport,

  // ── Referential ───────────────────────────────────────────────────────
  #[error("student {0} not found")]
  StudentNotFound(RollNo),

  #[error("subject {0} not found")]
  SubjectNotFound(String),

  #[error("semester {0} not found")]
  SemesterNotFound(SemesterRef),

  // ── Conflicts ─────────────────────────────────────────────────────────
  #[error("student with roll number {0} already exists")]
  StudentExists(RollNo),

  #[error("subject with code {0} already exists")]
  SubjectExists(String),

  #[error("semester {0} already exists")]
  SemesterExists(SemesterRef),

  #[error("student {roll_no} is already enrolled in {subject_code} for semester {sem}")]
  AlreadyEnrolled {
    roll_no:      RollNo,
    subject_code: String,
    sem:          SemesterRef,
  },

  #[error("semester {0} is completed; no further enrollment")]
  SemesterClosed(SemesterRef),

  // ── Computation ───────────────────────────────────────────────────────
  /// Nothing to average: no grade rows (SPI) or no SPI rows (CPI) for the
  /// requested student and semester bound.
  #[error("no grades found for student {roll_no} up to semester {sem_no}")]
  NoGradesFound { roll_no: RollNo, sem_no: u16 },

  /// SPI rows exist but none carries enrollment credits to weight by.
  #[error("no valid credits found for CPI calculation for student {roll_no}")]
  InsufficientCredits { roll_no: RollNo },

  #[error("no SPI records found for student {roll_no} up to semester {sem_no}")]
  SpiNotFound { roll_no: RollNo, sem_no: u16 },

  #[error("no CPI records found for student {roll_no} up to semester {sem_no}")]
  CpiNotFound { roll_no: RollNo, sem_no: u16 },

  #[error("no students found for cohort year {0}")]
  NoStudentsFound(u16),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
