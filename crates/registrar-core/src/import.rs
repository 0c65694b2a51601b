//! Bulk grade import — the row-tolerant submission path.
//!
//! The caller hands over already-parsed `(roll_no, grade)` string pairs
//! plus the upload's file name; spreadsheet extraction itself lives with
//! the presentation layer. Each row is validated and recorded
//! independently: one bad row never aborts the batch. This is deliberately
//! weaker than the batch index computation, which is all-or-nothing.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  grade::Grade,
  ledger::GradeAttempt,
  semester::SemesterRef,
  store::AcademicStore,
  student::RollNo,
};

// ─── File-name parsing ───────────────────────────────────────────────────────

/// Upload file names carry the grading context:
/// `SUBJECTCODE_semN_YYYY` with an optional extension, e.g.
/// `CS101_sem1_2023.xlsx`.
static FILE_NAME: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^([A-Za-z]+\d+)_sem(\d+)_(\d{4})(?:\.[A-Za-z0-9]+)?$")
    .expect("file name pattern compiles")
});

/// The grading context extracted from an upload's file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSource {
  pub subject_code: String,
  pub sem:          SemesterRef,
}

/// Parse `SUBJECTCODE_semN_YYYY[.ext]` into an [`ImportSource`].
/// The subject code is normalised to upper case.
pub fn parse_file_name(name: &str) -> Result<ImportSource> {
  let caps = FILE_NAME
    .captures(name.trim())
    .ok_or_else(|| Error::InvalidImportFileName(name.to_owned()))?;

  let sem_no = caps[2]
    .parse::<u16>()
    .map_err(|_| Error::InvalidImportFileName(name.to_owned()))?;
  let year = caps[3]
    .parse::<u16>()
    .map_err(|_| Error::InvalidImportFileName(name.to_owned()))?;

  Ok(ImportSource {
    subject_code: caps[1].to_ascii_uppercase(),
    sem:          SemesterRef::new(sem_no, year),
  })
}

// ─── Rows and outcomes ───────────────────────────────────────────────────────

/// One raw row as extracted from the upload. Both fields are untrusted
/// strings; validation happens per row during the import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeRow {
  pub roll_no: String,
  pub grade:   String,
}

/// A successfully recorded row, with the key's full attempt history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedGrade {
  pub roll_no:       RollNo,
  pub subject_code:  String,
  pub sem:           SemesterRef,
  pub current_grade: Grade,
  pub attempt:       u32,
  pub history:       Vec<GradeAttempt>,
}

/// A row that failed validation or recording, kept alongside the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
  pub row:   GradeRow,
  pub error: String,
}

/// The outcome of a bulk import: partial success is a first-class result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
  pub source:     ImportSource,
  pub total_rows: usize,
  pub processed:  Vec<ProcessedGrade>,
  pub errors:     Vec<RowError>,
}

impl ImportReport {
  /// Whether some rows were rejected while others went through.
  pub fn is_partial(&self) -> bool { !self.errors.is_empty() }

  /// Human-readable `processed/total` summary, e.g. `"8/10 rows processed"`.
  pub fn success_rate(&self) -> String {
    format!("{}/{} rows processed", self.processed.len(), self.total_rows)
  }
}

// ─── Import ──────────────────────────────────────────────────────────────────

/// Run a bulk grade import against `store`.
///
/// A malformed file name or an empty row set aborts the import before any
/// write. After that, every row is processed independently: failures are
/// collected into [`ImportReport::errors`] and the remaining rows continue.
pub async fn import_grades<S>(
  store:     &S,
  file_name: &str,
  rows:      Vec<GradeRow>,
) -> Result<ImportReport, S::Error>
where
  S: AcademicStore,
  S::Error: From<Error>,
{
  let source = parse_file_name(file_name)?;
  if rows.is_empty() {
    return Err(Error::EmptyImport.into());
  }

  let total_rows = rows.len();
  let mut processed = Vec::new();
  let mut errors = Vec::new();

  for row in rows {
    match process_row(store, &source, &row).await {
      Ok(p) => processed.push(p),
      Err(e) => errors.push(RowError { row, error: e.to_string() }),
    }
  }

  Ok(ImportReport { source, total_rows, processed, errors })
}

/// Validate and record a single row. The store re-checks referential
/// integrity (student, subject, semester) inside its own transaction.
async fn process_row<S>(
  store:  &S,
  source: &ImportSource,
  row:    &GradeRow,
) -> Result<ProcessedGrade, S::Error>
where
  S: AcademicStore,
  S::Error: From<Error>,
{
  let roll_no: RollNo = row
    .roll_no
    .trim()
    .parse()
    .map_err(|_| Error::InvalidRollNo(row.roll_no.clone()))?;
  let grade = Grade::parse(&row.grade)?;
  // Uploads carry exam results only; pass/fail and incomplete codes are
  // entered through the grade-entry screen, not the spreadsheet path.
  if !grade.is_letter() {
    return Err(Error::InvalidGrade(row.grade.trim().to_owned()).into());
  }

  let recorded = store
    .record_grade(roll_no, &source.subject_code, source.sem, grade)
    .await?;
  let history = store
    .get_grade_history(roll_no, &source.subject_code, source.sem)
    .await?;

  Ok(ProcessedGrade {
    roll_no,
    subject_code: source.subject_code.clone(),
    sem: source.sem,
    current_grade: grade,
    attempt: recorded.attempt,
    history,
  })
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_plain_and_with_extension() {
    let src = parse_file_name("CS101_sem1_2023").unwrap();
    assert_eq!(src.subject_code, "CS101");
    assert_eq!(src.sem, SemesterRef::new(1, 2023));

    let src = parse_file_name("MA101_sem2_2024.xlsx").unwrap();
    assert_eq!(src.subject_code, "MA101");
    assert_eq!(src.sem, SemesterRef::new(2, 2024));
  }

  #[test]
  fn parse_uppercases_subject_code() {
    let src = parse_file_name("cs101_sem1_2023.xlsx").unwrap();
    assert_eq!(src.subject_code, "CS101");
  }

  #[test]
  fn parse_rejects_malformed_names() {
    for name in [
      "CS101.xlsx",
      "CS101_sem1",
      "CS101_sem1_23",
      "CS101-sem1-2023.xlsx",
      "_sem1_2023.xlsx",
      "CS101_semX_2023.xlsx",
    ] {
      assert!(
        matches!(parse_file_name(name), Err(Error::InvalidImportFileName(_))),
        "expected rejection for {name:?}"
      );
    }
  }
}
