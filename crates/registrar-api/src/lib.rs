//! JSON REST API for Registrar.
//!
//! Exposes an axum [`Router`] backed by any
//! [`registrar_core::store::AcademicStore`] whose error converts into
//! [`ApiError`]. Auth, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", registrar_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod grades;
pub mod indices;
pub mod registry;
pub mod reports;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post, put},
};
use registrar_core::{Error as CoreError, store::AcademicStore};
use serde::Deserialize;

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:              String,
  pub port:              u16,
  pub store_path:        PathBuf,
  /// How `PP` grades enter SPI arithmetic; defaults to the legacy
  /// one-point table.
  #[serde(default)]
  pub pass_grade_policy: registrar_core::grade::PassGradePolicy,
  /// Students per batch-computation transaction; absent means the whole
  /// cohort runs in one transaction.
  #[serde(default)]
  pub batch_chunk_size:  Option<usize>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: AcademicStore + Clone + Send + Sync + 'static,
  S::Error: Into<ApiError> + From<CoreError> + Send + Sync + 'static,
{
  Router::new()
    // Registry
    .route("/students", post(registry::create_student::<S>))
    .route("/students/{roll_no}", get(registry::get_student::<S>))
    .route("/students/{roll_no}/history", get(grades::student_history::<S>))
    .route("/students/{roll_no}/report", get(reports::student_report::<S>))
    .route("/subjects", post(registry::create_subject::<S>))
    .route("/subjects/{code}", get(registry::get_subject::<S>))
    .route("/semesters", post(registry::start_semester::<S>))
    .route("/semesters/{sem_no}/{year}", get(registry::get_semester::<S>))
    .route(
      "/semesters/{sem_no}/{year}/status",
      put(registry::set_semester_status::<S>),
    )
    .route("/enrollments", post(registry::enroll::<S>).get(registry::enrollments::<S>))
    // Grade ledger
    .route("/grades", post(grades::record::<S>).get(grades::current::<S>))
    .route("/grades/history", get(grades::history::<S>))
    .route("/grades/import", post(grades::import::<S>))
    // Indices
    .route("/indices", get(indices::series::<S>))
    .route("/indices/spi", post(indices::spi::<S>))
    .route("/indices/cpi", post(indices::cpi::<S>))
    .route("/indices/batch", post(indices::batch::<S>))
    .with_state(store)
}
