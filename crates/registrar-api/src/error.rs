//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("unprocessable: {0}")]
  Unprocessable(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Map store failures onto HTTP semantics: validation problems are the
/// caller's fault, missing rows are 404s, duplicates are conflicts, and a
/// zero-credit CPI is a data problem rather than a bad request.
impl From<registrar_store_sqlite::Error> for ApiError {
  fn from(e: registrar_store_sqlite::Error) -> Self {
    use registrar_core::Error as Core;
    use registrar_store_sqlite::Error as Store;

    match e {
      Store::Core(core) => match &core {
        Core::InvalidGrade(_)
        | Core::InvalidRollNo(_)
        | Core::InvalidCredits
        | Core::InvalidImportFileName(_)
        | Core::EmptyImport => Self::BadRequest(core.to_string()),

        Core::StudentNotFound(_)
        | Core::SubjectNotFound(_)
        | Core::SemesterNotFound(_)
        | Core::NoGradesFound { .. }
        | Core::SpiNotFound { .. }
        | Core::CpiNotFound { .. }
        | Core::NoStudentsFound(_) => Self::NotFound(core.to_string()),

        Core::StudentExists(_)
        | Core::SubjectExists(_)
        | Core::SemesterExists(_)
        | Core::AlreadyEnrolled { .. }
        | Core::SemesterClosed(_) => Self::Conflict(core.to_string()),

        Core::InsufficientCredits { .. } => Self::Unprocessable(core.to_string()),
      },
      other => Self::Store(Box::new(other)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Unprocessable(m) => (StatusCode::UNPROCESSABLE_ENTITY, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
