//! Performance-index arithmetic: SPI and CPI.
//!
//! The functions here are pure; gathering the inputs and persisting the
//! results is the store's job. SPI weights a single semester's grade points
//! by subject credits; CPI weights the SPI series by enrollment-derived
//! credits. The two credit sources are deliberately distinct and can
//! diverge (enrolled-but-ungraded, graded-but-enrollment-missing).

use serde::{Deserialize, Serialize};

use crate::{
  grade::{Grade, PassGradePolicy},
  student::RollNo,
};

// ─── Records ─────────────────────────────────────────────────────────────────

/// The Semester Performance Index for one `(student, semester)`; a float in
/// `[0, 10]`, overwritten on recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpiRecord {
  pub roll_no: RollNo,
  pub sem_no:  u16,
  pub year:    u16,
  pub spi:     f64,
}

/// The Cumulative Performance Index as of one `(student, semester)`; a
/// float in `[0, 10]`, overwritten on recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CpiRecord {
  pub roll_no: RollNo,
  pub sem_no:  u16,
  pub year:    u16,
  pub cpi:     f64,
}

/// What [`crate::store::AcademicStore::compute_cpi`] hands back to callers:
/// the CPI formatted to two decimals plus the student's display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpiSummary {
  pub roll_no:      RollNo,
  pub student_name: String,
  pub sem_no:       u16,
  pub cpi:          String,
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// One graded subject in a semester: the current grade joined to the
/// subject's credit weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradedCredit {
  pub grade:   Grade,
  pub credits: u32,
}

/// One semester's SPI joined to that semester's total enrollment credits.
/// `credits` is `None` when the student has no enrollment rows for the
/// semester — such rows are skipped, not treated as zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SemesterCredits {
  pub sem_no:  u16,
  pub year:    u16,
  pub spi:     f64,
  pub credits: Option<u32>,
}

// ─── Arithmetic ──────────────────────────────────────────────────────────────

/// Round to two decimal places.
pub fn round2(x: f64) -> f64 { (x * 100.0).round() / 100.0 }

/// Format to two decimal places, as reported on grade cards.
pub fn format2(x: f64) -> String { format!("{x:.2}") }

/// Credit-weighted SPI over one semester's graded subjects, rounded to two
/// decimals. Rows whose grade maps to no points under `policy` drop out of
/// both sums; if no countable credits remain the SPI is 0, never a
/// division error.
pub fn semester_index(rows: &[GradedCredit], policy: PassGradePolicy) -> f64 {
  let mut weighted = 0.0;
  let mut credits = 0u32;

  for row in rows {
    if let Some(points) = row.grade.points(policy) {
      weighted += f64::from(row.credits) * points;
      credits += row.credits;
    }
  }

  if credits == 0 {
    0.0
  } else {
    round2(weighted / f64::from(credits))
  }
}

/// Enrollment-credit-weighted CPI over the SPI series. Rows without
/// credits are skipped. Returns `None` when no credits remain to weight by
/// (the caller reports that as an insufficient-credits condition).
pub fn cumulative_index(rows: &[SemesterCredits]) -> Option<f64> {
  let mut weighted = 0.0;
  let mut credits = 0u64;

  for row in rows {
    let Some(c) = row.credits else { continue };
    if c == 0 {
      continue;
    }
    weighted += row.spi * f64::from(c);
    credits += u64::from(c);
  }

  (credits != 0).then(|| weighted / credits as f64)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn gc(grade: Grade, credits: u32) -> GradedCredit { GradedCredit { grade, credits } }

  #[test]
  fn spi_weighted_average() {
    // 4 credits of AA (10) and 3 credits of BB (8): 64/7 = 9.142857…
    let rows = [gc(Grade::AA, 4), gc(Grade::BB, 3)];
    assert_eq!(semester_index(&rows, PassGradePolicy::OnePoint), 9.14);
  }

  #[test]
  fn spi_fail_counts_credits_at_zero_points() {
    let rows = [gc(Grade::AA, 4), gc(Grade::F, 4)];
    assert_eq!(semester_index(&rows, PassGradePolicy::OnePoint), 5.0);
  }

  #[test]
  fn spi_zero_credit_guard() {
    assert_eq!(semester_index(&[], PassGradePolicy::OnePoint), 0.0);
    // Only non-countable rows behaves the same.
    let rows = [gc(Grade::NP, 2), gc(Grade::I, 4)];
    assert_eq!(semester_index(&rows, PassGradePolicy::OnePoint), 0.0);
  }

  #[test]
  fn spi_pass_policy_diverges() {
    let rows = [gc(Grade::AA, 4), gc(Grade::PP, 2)];
    // OnePoint: (40 + 2) / 6 = 7.0; Excluded: 40 / 4 = 10.0.
    assert_eq!(semester_index(&rows, PassGradePolicy::OnePoint), 7.0);
    assert_eq!(semester_index(&rows, PassGradePolicy::Excluded), 10.0);
  }

  #[test]
  fn spi_stays_in_bounds() {
    let rows = [gc(Grade::AA, 3), gc(Grade::AB, 4), gc(Grade::F, 2)];
    let spi = semester_index(&rows, PassGradePolicy::OnePoint);
    assert!((0.0..=10.0).contains(&spi));
  }

  fn sc(sem_no: u16, spi: f64, credits: Option<u32>) -> SemesterCredits {
    SemesterCredits { sem_no, year: 2023 + sem_no / 2, spi, credits }
  }

  #[test]
  fn cpi_weighted_between_min_and_max() {
    let rows = [sc(1, 9.0, Some(20)), sc(2, 7.0, Some(24))];
    let cpi = cumulative_index(&rows).unwrap();
    assert!(cpi > 7.0 && cpi < 9.0);
    // 9*20 + 7*24 = 348; 348/44 = 7.909090…
    assert_eq!(round2(cpi), 7.91);
  }

  #[test]
  fn cpi_skips_rows_without_credits() {
    let rows = [sc(1, 9.0, Some(20)), sc(2, 2.0, None)];
    assert_eq!(cumulative_index(&rows), Some(9.0));
  }

  #[test]
  fn cpi_none_when_no_credits_at_all() {
    assert_eq!(cumulative_index(&[]), None);
    assert_eq!(cumulative_index(&[sc(1, 8.0, None)]), None);
    assert_eq!(cumulative_index(&[sc(1, 8.0, Some(0))]), None);
  }

  #[test]
  fn format2_pads_decimals() {
    assert_eq!(format2(8.5), "8.50");
    assert_eq!(format2(10.0), "10.00");
  }
}
