//! The grade taxonomy and its mapping onto grade points.
//!
//! Every grade code the institute issues is a variant here; a code outside
//! the taxonomy is a construction-time error, never a silent zero. The
//! mapping onto points is total: codes that do not participate in index
//! arithmetic map to `None` and are excluded from both the numerator and
//! the denominator of a weighted average.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Grade ───────────────────────────────────────────────────────────────────

/// A grade code as it appears on a grade card.
///
/// `AA` through `F` are the scored letter grades. `PP` (pass), `NP`
/// (no pass) and `I` (incomplete) are recognised for pass-fail and
/// incomplete outcomes; the bulk upload path rejects them since exam
/// spreadsheets carry letter grades only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
  AA,
  AB,
  BB,
  BC,
  CC,
  CD,
  DD,
  F,
  PP,
  NP,
  I,
}

impl Grade {
  /// Parse a grade code, tolerating surrounding whitespace and lower case.
  /// Any code outside the taxonomy is an [`Error::InvalidGrade`].
  pub fn parse(s: &str) -> Result<Self> {
    match s.trim().to_ascii_uppercase().as_str() {
      "AA" => Ok(Self::AA),
      "AB" => Ok(Self::AB),
      "BB" => Ok(Self::BB),
      "BC" => Ok(Self::BC),
      "CC" => Ok(Self::CC),
      "CD" => Ok(Self::CD),
      "DD" => Ok(Self::DD),
      "F" => Ok(Self::F),
      "PP" => Ok(Self::PP),
      "NP" => Ok(Self::NP),
      "I" => Ok(Self::I),
      other => Err(Error::InvalidGrade(other.to_owned())),
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::AA => "AA",
      Self::AB => "AB",
      Self::BB => "BB",
      Self::BC => "BC",
      Self::CC => "CC",
      Self::CD => "CD",
      Self::DD => "DD",
      Self::F => "F",
      Self::PP => "PP",
      Self::NP => "NP",
      Self::I => "I",
    }
  }

  /// Whether this code is one of the eight scored letter grades.
  pub fn is_letter(self) -> bool { !matches!(self, Self::PP | Self::NP | Self::I) }

  /// The grade points this code contributes to a weighted average, or
  /// `None` if the code (and its credits) are excluded from the average.
  ///
  /// `F` scores zero but still counts its credits in the denominator. `NP`
  /// and `I` never participate. `PP` is governed by `policy`.
  pub fn points(self, policy: PassGradePolicy) -> Option<f64> {
    match self {
      Self::AA => Some(10.0),
      Self::AB => Some(9.0),
      Self::BB => Some(8.0),
      Self::BC => Some(7.0),
      Self::CC => Some(6.0),
      Self::CD => Some(5.0),
      Self::DD => Some(4.0),
      Self::F => Some(0.0),
      Self::PP => match policy {
        PassGradePolicy::OnePoint => Some(1.0),
        PassGradePolicy::Excluded => None,
      },
      Self::NP | Self::I => None,
    }
  }
}

impl fmt::Display for Grade {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Grade {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

// ─── Pass-grade policy ───────────────────────────────────────────────────────

/// How a `PP` (pass) grade is treated in index arithmetic.
///
/// The two readings of the grading regulations disagree: the legacy point
/// table assigns `PP` one credit-weighted point, while the prose of the
/// grading policy excludes pass grades from the average entirely. Both are
/// kept selectable until the registrar's office settles the question.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PassGradePolicy {
  /// `PP` contributes one grade point, weighted by the subject's credits.
  #[default]
  OnePoint,
  /// `PP` is excluded from both the numerator and the denominator.
  Excluded,
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_normalises_case_and_whitespace() {
    assert_eq!(Grade::parse(" aa ").unwrap(), Grade::AA);
    assert_eq!(Grade::parse("bc").unwrap(), Grade::BC);
    assert_eq!(Grade::parse("F").unwrap(), Grade::F);
  }

  #[test]
  fn parse_rejects_unknown_codes() {
    assert!(matches!(Grade::parse("XY"), Err(Error::InvalidGrade(_))));
    assert!(matches!(Grade::parse(""), Err(Error::InvalidGrade(_))));
    assert!(matches!(Grade::parse("A"), Err(Error::InvalidGrade(_))));
  }

  #[test]
  fn letter_grades_always_score() {
    for g in [
      Grade::AA,
      Grade::AB,
      Grade::BB,
      Grade::BC,
      Grade::CC,
      Grade::CD,
      Grade::DD,
      Grade::F,
    ] {
      assert!(g.is_letter());
      assert!(g.points(PassGradePolicy::OnePoint).is_some());
      assert!(g.points(PassGradePolicy::Excluded).is_some());
    }
  }

  #[test]
  fn pass_grade_follows_policy() {
    assert_eq!(Grade::PP.points(PassGradePolicy::OnePoint), Some(1.0));
    assert_eq!(Grade::PP.points(PassGradePolicy::Excluded), None);
  }

  #[test]
  fn np_and_incomplete_never_score() {
    for policy in [PassGradePolicy::OnePoint, PassGradePolicy::Excluded] {
      assert_eq!(Grade::NP.points(policy), None);
      assert_eq!(Grade::I.points(policy), None);
    }
  }
}
