//! Handlers for SPI/CPI computation and retrieval.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/indices/spi` | Compute + persist one student's SPI |
//! | `POST` | `/indices/cpi` | Compute + persist one student's CPI |
//! | `POST` | `/indices/batch` | Whole-cohort run; atomic by default |
//! | `GET`  | `/indices` | `?roll_no&sem_no&year` — both series |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use registrar_core::{
  index::{CpiSummary, SpiRecord},
  report::{BatchReport, IndexSeries},
  semester::SemesterRef,
  store::AcademicStore,
  student::RollNo,
};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct IndexParams {
  pub roll_no: RollNo,
  pub sem_no:  u16,
  pub year:    u16,
}

/// `POST /indices/spi`
pub async fn spi<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<IndexParams>,
) -> Result<Json<SpiRecord>, ApiError>
where
  S: AcademicStore,
  S::Error: Into<ApiError>,
{
  let record = store
    .compute_spi(body.roll_no, SemesterRef::new(body.sem_no, body.year))
    .await
    .map_err(Into::into)?;
  Ok(Json(record))
}

/// `POST /indices/cpi`
pub async fn cpi<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<IndexParams>,
) -> Result<Json<CpiSummary>, ApiError>
where
  S: AcademicStore,
  S::Error: Into<ApiError>,
{
  let summary = store
    .compute_cpi(body.roll_no, SemesterRef::new(body.sem_no, body.year))
    .await
    .map_err(Into::into)?;
  Ok(Json(summary))
}

#[derive(Debug, Deserialize)]
pub struct BatchParams {
  pub cohort_year: u16,
  pub sem_no:      u16,
  pub year:        u16,
}

/// `POST /indices/batch` — SPI + CPI for every student in the cohort.
pub async fn batch<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<BatchParams>,
) -> Result<Json<BatchReport>, ApiError>
where
  S: AcademicStore,
  S::Error: Into<ApiError>,
{
  let report = store
    .batch_compute(body.cohort_year, SemesterRef::new(body.sem_no, body.year))
    .await
    .map_err(Into::into)?;
  Ok(Json(report))
}

/// `GET /indices?roll_no=…&sem_no=…&year=…`
pub async fn series<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<IndexParams>,
) -> Result<Json<IndexSeries>, ApiError>
where
  S: AcademicStore,
  S::Error: Into<ApiError>,
{
  let series = store
    .get_all_indices(params.roll_no, SemesterRef::new(params.sem_no, params.year))
    .await
    .map_err(Into::into)?;
  Ok(Json(series))
}
