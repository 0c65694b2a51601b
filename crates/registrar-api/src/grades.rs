//! Handlers for grade ledger endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/grades` | Body: [`RecordGradeBody`]; returns the ledger row |
//! | `GET`  | `/grades` | `?roll_no&subject_code&sem_no&year` — current grade |
//! | `GET`  | `/grades/history` | Same params — attempt history for the key |
//! | `GET`  | `/students/:roll_no/history` | Full history for a student |
//! | `POST` | `/grades/import` | Body: [`ImportBody`]; 206 on partial success |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use registrar_core::{
  Error as CoreError,
  grade::Grade,
  import::{GradeRow, import_grades},
  ledger::{GradeAttempt, GradeRecord},
  semester::SemesterRef,
  store::AcademicStore,
  student::RollNo,
};
use serde::Deserialize;

use crate::error::ApiError;

// ─── Record ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /grades`. The grade arrives as its letter
/// code and is validated before anything touches the store.
#[derive(Debug, Deserialize)]
pub struct RecordGradeBody {
  pub roll_no:      RollNo,
  pub subject_code: String,
  pub sem_no:       u16,
  pub year:         u16,
  pub grade:        String,
}

/// `POST /grades` — returns 201 + the recorded [`GradeAttempt`].
pub async fn record<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<RecordGradeBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AcademicStore,
  S::Error: Into<ApiError>,
{
  let grade =
    Grade::parse(&body.grade).map_err(|e| ApiError::BadRequest(e.to_string()))?;
  let recorded = store
    .record_grade(
      body.roll_no,
      &body.subject_code,
      SemesterRef::new(body.sem_no, body.year),
      grade,
    )
    .await
    .map_err(Into::into)?;
  Ok((StatusCode::CREATED, Json(recorded)))
}

// ─── Reads ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GradeKeyParams {
  pub roll_no:      RollNo,
  pub subject_code: String,
  pub sem_no:       u16,
  pub year:         u16,
}

/// `GET /grades?roll_no=…&subject_code=…&sem_no=…&year=…`
pub async fn current<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<GradeKeyParams>,
) -> Result<Json<GradeRecord>, ApiError>
where
  S: AcademicStore,
  S::Error: Into<ApiError>,
{
  let record = store
    .get_grade(
      params.roll_no,
      &params.subject_code,
      SemesterRef::new(params.sem_no, params.year),
    )
    .await
    .map_err(Into::into)?
    .ok_or_else(|| {
      ApiError::NotFound(format!(
        "no grade recorded for student {} in {}",
        params.roll_no, params.subject_code
      ))
    })?;
  Ok(Json(record))
}

/// `GET /grades/history?roll_no=…&subject_code=…&sem_no=…&year=…`
pub async fn history<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<GradeKeyParams>,
) -> Result<Json<Vec<GradeAttempt>>, ApiError>
where
  S: AcademicStore,
  S::Error: Into<ApiError>,
{
  let entries = store
    .get_grade_history(
      params.roll_no,
      &params.subject_code,
      SemesterRef::new(params.sem_no, params.year),
    )
    .await
    .map_err(Into::into)?;
  Ok(Json(entries))
}

/// `GET /students/:roll_no/history` — every attempt, ordered by subject,
/// semester, and attempt.
pub async fn student_history<S>(
  State(store): State<Arc<S>>,
  Path(roll_no): Path<RollNo>,
) -> Result<Json<Vec<GradeAttempt>>, ApiError>
where
  S: AcademicStore,
  S::Error: Into<ApiError>,
{
  let entries = store
    .get_student_history(roll_no)
    .await
    .map_err(Into::into)?;
  Ok(Json(entries))
}

// ─── Bulk import ──────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /grades/import`. The rows are the
/// already-extracted spreadsheet pairs; `file_name` carries the subject,
/// semester, and year in its `SUBJECTCODE_semN_YYYY` pattern.
#[derive(Debug, Deserialize)]
pub struct ImportBody {
  pub file_name: String,
  pub rows:      Vec<GradeRow>,
}

/// `POST /grades/import` — 200 on full success, 206 when some rows were
/// rejected (the report carries both the processed rows and the errors).
pub async fn import<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<ImportBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AcademicStore,
  S::Error: Into<ApiError> + From<CoreError>,
{
  let report = import_grades(store.as_ref(), &body.file_name, body.rows)
    .await
    .map_err(Into::into)?;

  let status = if report.is_partial() {
    StatusCode::PARTIAL_CONTENT
  } else {
    StatusCode::OK
  };
  Ok((status, Json(report)))
}
