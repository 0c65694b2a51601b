//! Handler for the grade-card snapshot endpoint.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use registrar_core::{
  report::StudentReport, semester::SemesterRef, store::AcademicStore,
  student::RollNo,
};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ReportParams {
  pub sem_no: u16,
  pub year:   u16,
}

/// `GET /students/:roll_no/report?sem_no=…&year=…` — the read-side
/// snapshot the PDF generator renders from. Nothing is recomputed here.
pub async fn student_report<S>(
  State(store): State<Arc<S>>,
  Path(roll_no): Path<RollNo>,
  Query(params): Query<ReportParams>,
) -> Result<Json<StudentReport>, ApiError>
where
  S: AcademicStore,
  S::Error: Into<ApiError>,
{
  let report = store
    .generate_report(roll_no, SemesterRef::new(params.sem_no, params.year))
    .await
    .map_err(Into::into)?;
  Ok(Json(report))
}
