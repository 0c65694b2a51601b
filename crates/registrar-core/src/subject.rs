//! Subject catalog entries.

use serde::{Deserialize, Serialize};

/// A subject in the catalog, identified by its unique code.
///
/// `credits` is the weight the subject carries in index arithmetic and must
/// be positive. Once a grade references the subject, only non-key fields
/// may change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
  pub subject_code: String,
  pub subject_name: String,
  pub credits:      u32,
  #[serde(default)]
  pub is_elective:  bool,
  pub department:   Option<String>,
}
