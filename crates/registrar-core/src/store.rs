//! The `AcademicStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `registrar-store-sqlite`). Higher layers (`registrar-api`, bulk import)
//! depend on this abstraction, not on any concrete backend.
//!
//! Every multi-step write operation (grade recording, index computation,
//! batch runs, enrollment) is atomic: the backend either commits all of its
//! writes or none of them.

use std::future::Future;

use crate::{
  grade::Grade,
  index::{CpiSummary, SpiRecord},
  ledger::{EnrolledSubject, GradeAttempt, GradeRecord},
  report::{BatchReport, IndexSeries, StudentReport},
  semester::{NewSemester, Semester, SemesterRef, SemesterStatus},
  student::{NewStudent, Promotion, RollNo, Student},
  subject::Subject,
};

/// Abstraction over a Registrar storage backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait AcademicStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Students ──────────────────────────────────────────────────────────

  /// Register a new student. Fails on a duplicate roll number.
  fn add_student(
    &self,
    input: NewStudent,
  ) -> impl Future<Output = Result<Student, Self::Error>> + Send + '_;

  /// Retrieve a student by roll number. Returns `None` if not found.
  fn get_student(
    &self,
    roll_no: RollNo,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + '_;

  /// List every student in a cohort year.
  fn list_students_by_year(
    &self,
    year: u16,
  ) -> impl Future<Output = Result<Vec<Student>, Self::Error>> + Send + '_;

  // ── Subjects ──────────────────────────────────────────────────────────

  /// Add a subject to the catalog. Fails on a duplicate code or
  /// non-positive credits.
  fn add_subject(
    &self,
    subject: Subject,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  /// Retrieve a subject by code. Returns `None` if not found.
  fn get_subject<'a>(
    &'a self,
    code: &'a str,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + 'a;

  // ── Semesters ─────────────────────────────────────────────────────────

  /// Create a semester and apply any student-year promotions, atomically.
  /// Fails if the `(sem_no, year)` pair already exists.
  fn start_semester(
    &self,
    input:      NewSemester,
    promotions: Vec<Promotion>,
  ) -> impl Future<Output = Result<Semester, Self::Error>> + Send + '_;

  /// Retrieve a semester by key. Returns `None` if not found.
  fn get_semester(
    &self,
    sem: SemesterRef,
  ) -> impl Future<Output = Result<Option<Semester>, Self::Error>> + Send + '_;

  /// Advance a semester's lifecycle status.
  fn set_semester_status(
    &self,
    sem:    SemesterRef,
    status: SemesterStatus,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Enrollment ────────────────────────────────────────────────────────

  /// Enroll a student in a set of subjects for a semester, all-or-nothing.
  /// Fails on an unknown student/subject/semester, a duplicate triple, or
  /// a completed semester.
  fn enroll(
    &self,
    roll_no:       RollNo,
    subject_codes: Vec<String>,
    sem:           SemesterRef,
  ) -> impl Future<Output = Result<Vec<EnrolledSubject>, Self::Error>> + Send + '_;

  /// The student's enrollments for one semester, joined with subject
  /// display fields.
  fn get_enrollments(
    &self,
    roll_no: RollNo,
    sem:     SemesterRef,
  ) -> impl Future<Output = Result<Vec<EnrolledSubject>, Self::Error>> + Send + '_;

  // ── Grade ledger ──────────────────────────────────────────────────────

  /// Record a grade for `(student, subject, semester)` and return the
  /// ledger row with its attempt number.
  ///
  /// The first grade for a key lands as attempt 1; each further submission
  /// (including an identical grade) overwrites the current record and
  /// appends the next attempt to the history. Attempt numbers are gap-free
  /// and duplicate-free per key. The whole operation is atomic.
  ///
  /// Any [`Grade`] variant is accepted — the enum is the validation
  /// boundary; the bulk-import path additionally restricts submissions to
  /// the scored letter codes.
  fn record_grade<'a>(
    &'a self,
    roll_no:      RollNo,
    subject_code: &'a str,
    sem:          SemesterRef,
    grade:        Grade,
  ) -> impl Future<Output = Result<GradeAttempt, Self::Error>> + Send + 'a;

  /// The current grade for a key. Returns `None` if nothing was recorded.
  fn get_grade<'a>(
    &'a self,
    roll_no:      RollNo,
    subject_code: &'a str,
    sem:          SemesterRef,
  ) -> impl Future<Output = Result<Option<GradeRecord>, Self::Error>> + Send + 'a;

  /// Full attempt history for a key, attempt ascending.
  fn get_grade_history<'a>(
    &'a self,
    roll_no:      RollNo,
    subject_code: &'a str,
    sem:          SemesterRef,
  ) -> impl Future<Output = Result<Vec<GradeAttempt>, Self::Error>> + Send + 'a;

  /// Every history entry for a student, ordered by subject, semester, and
  /// attempt ascending.
  fn get_student_history(
    &self,
    roll_no: RollNo,
  ) -> impl Future<Output = Result<Vec<GradeAttempt>, Self::Error>> + Send + '_;

  // ── Index computation ─────────────────────────────────────────────────

  /// Compute and upsert the SPI for one `(student, semester)`.
  fn compute_spi(
    &self,
    roll_no: RollNo,
    sem:     SemesterRef,
  ) -> impl Future<Output = Result<SpiRecord, Self::Error>> + Send + '_;

  /// Compute and upsert the CPI as of `(student, semester)`, weighting the
  /// SPI series by enrollment-derived credits.
  fn compute_cpi(
    &self,
    roll_no: RollNo,
    sem:     SemesterRef,
  ) -> impl Future<Output = Result<CpiSummary, Self::Error>> + Send + '_;

  /// Compute SPI then CPI for every student in a cohort year,
  /// sequentially. By default the whole cohort runs in one transaction and
  /// any failure rolls the entire batch back.
  fn batch_compute(
    &self,
    cohort_year: u16,
    sem:         SemesterRef,
  ) -> impl Future<Output = Result<BatchReport, Self::Error>> + Send + '_;

  // ── Reporting ─────────────────────────────────────────────────────────

  /// The SPI and CPI series up to a semester bound, semester ascending.
  fn get_all_indices(
    &self,
    roll_no: RollNo,
    sem:     SemesterRef,
  ) -> impl Future<Output = Result<IndexSeries, Self::Error>> + Send + '_;

  /// Assemble the full grade-card snapshot for the presentation layer.
  fn generate_report(
    &self,
    roll_no: RollNo,
    sem:     SemesterRef,
  ) -> impl Future<Output = Result<StudentReport, Self::Error>> + Send + '_;
}
