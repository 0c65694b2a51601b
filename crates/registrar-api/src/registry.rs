//! Handlers for student, subject, semester, and enrollment endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/students` | Body: [`NewStudent`]; returns 201 + stored student |
//! | `GET`  | `/students/:roll_no` | Single student |
//! | `POST` | `/subjects` | Body: [`Subject`]; returns 201 |
//! | `GET`  | `/subjects/:code` | Single subject |
//! | `POST` | `/semesters` | Body: [`StartSemesterBody`]; returns 201 |
//! | `GET`  | `/semesters/:sem_no/:year` | Single semester |
//! | `PUT`  | `/semesters/:sem_no/:year/status` | Body: `{"status":"ONGOING"}` |
//! | `POST` | `/enrollments` | Body: [`EnrollBody`]; all-or-nothing |
//! | `GET`  | `/enrollments` | `?roll_no&sem_no&year` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use registrar_core::{
  ledger::EnrolledSubject,
  semester::{NewSemester, Semester, SemesterRef, SemesterStatus},
  store::AcademicStore,
  student::{NewStudent, Promotion, RollNo, Student},
  subject::Subject,
};
use serde::Deserialize;

use crate::error::ApiError;

// ─── Students ─────────────────────────────────────────────────────────────────

/// `POST /students` — returns 201 + the stored [`Student`].
pub async fn create_student<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewStudent>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AcademicStore,
  S::Error: Into<ApiError>,
{
  let student = store.add_student(body).await.map_err(Into::into)?;
  Ok((StatusCode::CREATED, Json(student)))
}

/// `GET /students/:roll_no`
pub async fn get_student<S>(
  State(store): State<Arc<S>>,
  Path(roll_no): Path<RollNo>,
) -> Result<Json<Student>, ApiError>
where
  S: AcademicStore,
  S::Error: Into<ApiError>,
{
  let student = store
    .get_student(roll_no)
    .await
    .map_err(Into::into)?
    .ok_or_else(|| ApiError::NotFound(format!("student {roll_no} not found")))?;
  Ok(Json(student))
}

// ─── Subjects ─────────────────────────────────────────────────────────────────

/// `POST /subjects` — returns 201 + the stored [`Subject`].
pub async fn create_subject<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<Subject>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AcademicStore,
  S::Error: Into<ApiError>,
{
  let subject = store.add_subject(body).await.map_err(Into::into)?;
  Ok((StatusCode::CREATED, Json(subject)))
}

/// `GET /subjects/:code`
pub async fn get_subject<S>(
  State(store): State<Arc<S>>,
  Path(code): Path<String>,
) -> Result<Json<Subject>, ApiError>
where
  S: AcademicStore,
  S::Error: Into<ApiError>,
{
  let subject = store
    .get_subject(&code)
    .await
    .map_err(Into::into)?
    .ok_or_else(|| ApiError::NotFound(format!("subject {code} not found")))?;
  Ok(Json(subject))
}

// ─── Semesters ────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /semesters`.
#[derive(Debug, Deserialize)]
pub struct StartSemesterBody {
  #[serde(flatten)]
  pub semester:   NewSemester,
  /// Student-year advancements applied atomically with the creation.
  #[serde(default)]
  pub promotions: Vec<Promotion>,
}

/// `POST /semesters` — returns 201 + the stored [`Semester`].
pub async fn start_semester<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<StartSemesterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AcademicStore,
  S::Error: Into<ApiError>,
{
  let semester = store
    .start_semester(body.semester, body.promotions)
    .await
    .map_err(Into::into)?;
  Ok((StatusCode::CREATED, Json(semester)))
}

/// `GET /semesters/:sem_no/:year`
pub async fn get_semester<S>(
  State(store): State<Arc<S>>,
  Path((sem_no, year)): Path<(u16, u16)>,
) -> Result<Json<Semester>, ApiError>
where
  S: AcademicStore,
  S::Error: Into<ApiError>,
{
  let sem = SemesterRef::new(sem_no, year);
  let semester = store
    .get_semester(sem)
    .await
    .map_err(Into::into)?
    .ok_or_else(|| ApiError::NotFound(format!("semester {sem} not found")))?;
  Ok(Json(semester))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: SemesterStatus,
}

/// `PUT /semesters/:sem_no/:year/status` — body: `{"status":"COMPLETED"}`.
pub async fn set_semester_status<S>(
  State(store): State<Arc<S>>,
  Path((sem_no, year)): Path<(u16, u16)>,
  Json(body): Json<StatusBody>,
) -> Result<StatusCode, ApiError>
where
  S: AcademicStore,
  S::Error: Into<ApiError>,
{
  store
    .set_semester_status(SemesterRef::new(sem_no, year), body.status)
    .await
    .map_err(Into::into)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Enrollment ───────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /enrollments`.
#[derive(Debug, Deserialize)]
pub struct EnrollBody {
  pub roll_no:       RollNo,
  pub subject_codes: Vec<String>,
  pub sem_no:        u16,
  pub year:          u16,
}

/// `POST /enrollments` — enrolls one student in several subjects,
/// all-or-nothing; returns 201 + the enrolled rows.
pub async fn enroll<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<EnrollBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AcademicStore,
  S::Error: Into<ApiError>,
{
  let enrolled = store
    .enroll(
      body.roll_no,
      body.subject_codes,
      SemesterRef::new(body.sem_no, body.year),
    )
    .await
    .map_err(Into::into)?;
  Ok((StatusCode::CREATED, Json(enrolled)))
}

#[derive(Debug, Deserialize)]
pub struct EnrollmentParams {
  pub roll_no: RollNo,
  pub sem_no:  u16,
  pub year:    u16,
}

/// `GET /enrollments?roll_no=101&sem_no=1&year=2023`
pub async fn enrollments<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<EnrollmentParams>,
) -> Result<Json<Vec<EnrolledSubject>>, ApiError>
where
  S: AcademicStore,
  S::Error: Into<ApiError>,
{
  let rows = store
    .get_enrollments(params.roll_no, SemesterRef::new(params.sem_no, params.year))
    .await
    .map_err(Into::into)?;
  Ok(Json(rows))
}
