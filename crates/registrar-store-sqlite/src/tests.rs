//! Integration tests for `SqliteStore` against an in-memory database.

use std::num::NonZeroUsize;

use chrono::NaiveDate;
use registrar_core::{
  Error as CoreError,
  grade::{Grade, PassGradePolicy},
  import::{GradeRow, import_grades},
  semester::{NewSemester, SemesterRef, SemesterStatus},
  store::AcademicStore,
  student::{NewStudent, Promotion},
  subject::Subject,
};

use crate::{Error, SqliteStore, StoreOptions};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn sem(sem_no: u16, year: u16) -> SemesterRef { SemesterRef::new(sem_no, year) }

fn new_semester(sem_no: u16, year: u16) -> NewSemester {
  NewSemester {
    sem_no,
    year,
    start_date: NaiveDate::from_ymd_opt(i32::from(year), 1, 2).unwrap(),
    end_date:   NaiveDate::from_ymd_opt(i32::from(year), 5, 30).unwrap(),
  }
}

fn student(roll_no: u32, name: &str, year: u16) -> NewStudent {
  NewStudent {
    roll_no,
    name: name.into(),
    department: "CSE".into(),
    year,
  }
}

fn subject(code: &str, name: &str, credits: u32) -> Subject {
  Subject {
    subject_code: code.into(),
    subject_name: name.into(),
    credits,
    is_elective: false,
    department: Some("CSE".into()),
  }
}

/// One student (roll 101), one semester (1, 2023), two subjects.
async fn seed(s: &SqliteStore) {
  s.add_student(student(101, "Asha Rao", 2023)).await.unwrap();
  s.start_semester(new_semester(1, 2023), vec![]).await.unwrap();
  s.add_subject(subject("CS101", "Data Structures", 4))
    .await
    .unwrap();
  s.add_subject(subject("MA101", "Calculus", 3)).await.unwrap();
}

fn core_err(err: &Error) -> &CoreError {
  err.as_core().expect("expected a domain error")
}

// ─── Registry ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_student() {
  let s = store().await;
  s.add_student(student(101, "Asha Rao", 2023)).await.unwrap();

  let fetched = s.get_student(101).await.unwrap().unwrap();
  assert_eq!(fetched.roll_no, 101);
  assert_eq!(fetched.name, "Asha Rao");
  assert_eq!(fetched.year, 2023);
}

#[tokio::test]
async fn get_student_missing_returns_none() {
  let s = store().await;
  assert!(s.get_student(404).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_student_conflicts() {
  let s = store().await;
  s.add_student(student(101, "Asha Rao", 2023)).await.unwrap();

  let err = s
    .add_student(student(101, "Imposter", 2023))
    .await
    .unwrap_err();
  assert!(matches!(core_err(&err), CoreError::StudentExists(101)));
}

#[tokio::test]
async fn add_subject_rejects_zero_credits() {
  let s = store().await;
  let err = s.add_subject(subject("CS101", "Broken", 0)).await.unwrap_err();
  assert!(matches!(core_err(&err), CoreError::InvalidCredits));
  assert!(s.get_subject("CS101").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_subject_conflicts() {
  let s = store().await;
  s.add_subject(subject("CS101", "Data Structures", 4))
    .await
    .unwrap();

  let err = s
    .add_subject(subject("CS101", "Other", 3))
    .await
    .unwrap_err();
  assert!(matches!(core_err(&err), CoreError::SubjectExists(_)));
}

#[tokio::test]
async fn start_semester_applies_promotions() {
  let s = store().await;
  s.add_student(student(101, "Asha Rao", 2023)).await.unwrap();

  let semester = s
    .start_semester(
      new_semester(2, 2024),
      vec![Promotion { roll_no: 101, new_year: 2024 }],
    )
    .await
    .unwrap();
  assert_eq!(semester.status, SemesterStatus::Upcoming);

  let promoted = s.get_student(101).await.unwrap().unwrap();
  assert_eq!(promoted.year, 2024);
}

#[tokio::test]
async fn start_semester_unknown_promotee_rolls_back() {
  let s = store().await;
  let err = s
    .start_semester(
      new_semester(1, 2023),
      vec![Promotion { roll_no: 999, new_year: 2024 }],
    )
    .await
    .unwrap_err();
  assert!(matches!(core_err(&err), CoreError::StudentNotFound(999)));

  // The semester insert must have rolled back with the failed promotion.
  assert!(s.get_semester(sem(1, 2023)).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_semester_conflicts() {
  let s = store().await;
  s.start_semester(new_semester(1, 2023), vec![]).await.unwrap();

  let err = s
    .start_semester(new_semester(1, 2023), vec![])
    .await
    .unwrap_err();
  assert!(matches!(core_err(&err), CoreError::SemesterExists(_)));
}

#[tokio::test]
async fn set_semester_status_advances_lifecycle() {
  let s = store().await;
  s.start_semester(new_semester(1, 2023), vec![]).await.unwrap();

  s.set_semester_status(sem(1, 2023), SemesterStatus::Ongoing)
    .await
    .unwrap();
  let fetched = s.get_semester(sem(1, 2023)).await.unwrap().unwrap();
  assert_eq!(fetched.status, SemesterStatus::Ongoing);

  let err = s
    .set_semester_status(sem(9, 2023), SemesterStatus::Ongoing)
    .await
    .unwrap_err();
  assert!(matches!(core_err(&err), CoreError::SemesterNotFound(_)));
}

// ─── Enrollment ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn enroll_and_list() {
  let s = store().await;
  seed(&s).await;

  let enrolled = s
    .enroll(101, vec!["CS101".into(), "MA101".into()], sem(1, 2023))
    .await
    .unwrap();
  assert_eq!(enrolled.len(), 2);

  let listed = s.get_enrollments(101, sem(1, 2023)).await.unwrap();
  assert_eq!(listed.len(), 2);
  assert_eq!(listed[0].subject_code, "CS101");
  assert_eq!(listed[0].subject_name, "Data Structures");
  assert_eq!(listed[0].credits, 4);
}

#[tokio::test]
async fn enroll_duplicate_conflicts() {
  let s = store().await;
  seed(&s).await;
  s.enroll(101, vec!["CS101".into()], sem(1, 2023)).await.unwrap();

  let err = s
    .enroll(101, vec!["CS101".into()], sem(1, 2023))
    .await
    .unwrap_err();
  assert!(matches!(core_err(&err), CoreError::AlreadyEnrolled { .. }));
}

#[tokio::test]
async fn enroll_unknown_subject_rolls_back_all() {
  let s = store().await;
  seed(&s).await;

  let err = s
    .enroll(101, vec!["CS101".into(), "XX999".into()], sem(1, 2023))
    .await
    .unwrap_err();
  assert!(matches!(core_err(&err), CoreError::SubjectNotFound(_)));

  // All-or-nothing: the valid CS101 row must not have been kept.
  assert!(s.get_enrollments(101, sem(1, 2023)).await.unwrap().is_empty());
}

#[tokio::test]
async fn enroll_in_completed_semester_errors() {
  let s = store().await;
  seed(&s).await;
  s.set_semester_status(sem(1, 2023), SemesterStatus::Completed)
    .await
    .unwrap();

  let err = s
    .enroll(101, vec!["CS101".into()], sem(1, 2023))
    .await
    .unwrap_err();
  assert!(matches!(core_err(&err), CoreError::SemesterClosed(_)));
}

// ─── Grade ledger ────────────────────────────────────────────────────────────

#[tokio::test]
async fn first_grade_lands_as_attempt_one() {
  let s = store().await;
  seed(&s).await;

  let recorded = s
    .record_grade(101, "CS101", sem(1, 2023), Grade::AA)
    .await
    .unwrap();
  assert_eq!(recorded.attempt, 1);

  let current = s.get_grade(101, "CS101", sem(1, 2023)).await.unwrap().unwrap();
  assert_eq!(current.grade, Grade::AA);

  let history = s.get_grade_history(101, "CS101", sem(1, 2023)).await.unwrap();
  assert_eq!(history.len(), 1);
  assert_eq!(history[0].attempt, 1);
  assert_eq!(history[0].grade, Grade::AA);
}

#[tokio::test]
async fn record_grade_unknown_student_errors() {
  let s = store().await;
  seed(&s).await;

  let err = s
    .record_grade(999, "CS101", sem(1, 2023), Grade::AA)
    .await
    .unwrap_err();
  assert!(matches!(core_err(&err), CoreError::StudentNotFound(999)));
}

#[tokio::test]
async fn record_grade_unknown_semester_errors() {
  let s = store().await;
  seed(&s).await;

  let err = s
    .record_grade(101, "CS101", sem(5, 2023), Grade::AA)
    .await
    .unwrap_err();
  assert!(matches!(core_err(&err), CoreError::SemesterNotFound(_)));
}

#[tokio::test]
async fn retake_archives_previous_grade() {
  let s = store().await;
  seed(&s).await;

  s.record_grade(101, "CS101", sem(1, 2023), Grade::F).await.unwrap();
  let second = s
    .record_grade(101, "CS101", sem(1, 2023), Grade::BC)
    .await
    .unwrap();
  assert_eq!(second.attempt, 2);

  let history = s.get_grade_history(101, "CS101", sem(1, 2023)).await.unwrap();
  assert_eq!(history.len(), 2);
  assert_eq!((history[0].attempt, history[0].grade), (1, Grade::F));
  assert_eq!((history[1].attempt, history[1].grade), (2, Grade::BC));

  let current = s.get_grade(101, "CS101", sem(1, 2023)).await.unwrap().unwrap();
  assert_eq!(current.grade, Grade::BC);
}

#[tokio::test]
async fn attempt_numbers_stay_monotonic() {
  let s = store().await;
  seed(&s).await;

  let grades = [Grade::F, Grade::DD, Grade::CC, Grade::BB];
  for (i, g) in grades.into_iter().enumerate() {
    let recorded = s.record_grade(101, "CS101", sem(1, 2023), g).await.unwrap();
    assert_eq!(recorded.attempt as usize, i + 1);
  }

  let history = s.get_grade_history(101, "CS101", sem(1, 2023)).await.unwrap();
  assert_eq!(history.len(), grades.len());
  for (i, entry) in history.iter().enumerate() {
    assert_eq!(entry.attempt as usize, i + 1);
    assert_eq!(entry.grade, grades[i]);
  }

  let current = s.get_grade(101, "CS101", sem(1, 2023)).await.unwrap().unwrap();
  assert_eq!(current.grade, Grade::BB);
}

#[tokio::test]
async fn resubmitting_same_grade_creates_new_attempt() {
  let s = store().await;
  seed(&s).await;

  s.record_grade(101, "CS101", sem(1, 2023), Grade::CC).await.unwrap();
  let again = s
    .record_grade(101, "CS101", sem(1, 2023), Grade::CC)
    .await
    .unwrap();
  assert_eq!(again.attempt, 2);

  let history = s.get_grade_history(101, "CS101", sem(1, 2023)).await.unwrap();
  assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn student_history_orders_by_subject_and_attempt() {
  let s = store().await;
  seed(&s).await;

  s.record_grade(101, "MA101", sem(1, 2023), Grade::BB).await.unwrap();
  s.record_grade(101, "CS101", sem(1, 2023), Grade::F).await.unwrap();
  s.record_grade(101, "CS101", sem(1, 2023), Grade::AB).await.unwrap();

  let history = s.get_student_history(101).await.unwrap();
  let keys: Vec<_> = history
    .iter()
    .map(|h| (h.subject_code.as_str(), h.attempt))
    .collect();
  assert_eq!(keys, vec![("CS101", 1), ("CS101", 2), ("MA101", 1)]);
}

// ─── SPI ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn spi_weighted_scenario() {
  let s = store().await;
  seed(&s).await;

  // CS101: 4 credits of AA (10), MA101: 3 credits of BB (8).
  s.record_grade(101, "CS101", sem(1, 2023), Grade::AA).await.unwrap();
  s.record_grade(101, "MA101", sem(1, 2023), Grade::BB).await.unwrap();

  let spi = s.compute_spi(101, sem(1, 2023)).await.unwrap();
  assert_eq!(spi.spi, 9.14); // round(64/7, 2)
  assert!((0.0..=10.0).contains(&spi.spi));
}

#[tokio::test]
async fn spi_no_grades_errors() {
  let s = store().await;
  seed(&s).await;

  let err = s.compute_spi(101, sem(1, 2023)).await.unwrap_err();
  assert!(matches!(
    core_err(&err),
    CoreError::NoGradesFound { roll_no: 101, sem_no: 1 }
  ));
}

#[tokio::test]
async fn spi_recompute_overwrites() {
  let s = store().await;
  seed(&s).await;

  s.record_grade(101, "CS101", sem(1, 2023), Grade::F).await.unwrap();
  let first = s.compute_spi(101, sem(1, 2023)).await.unwrap();
  assert_eq!(first.spi, 0.0);

  // Retake, then recompute: the SPI row is overwritten, not accumulated.
  s.record_grade(101, "CS101", sem(1, 2023), Grade::AA).await.unwrap();
  let second = s.compute_spi(101, sem(1, 2023)).await.unwrap();
  assert_eq!(second.spi, 10.0);

  s.enroll(101, vec!["CS101".into()], sem(1, 2023)).await.unwrap();
  s.compute_cpi(101, sem(1, 2023)).await.unwrap();
  let series = s.get_all_indices(101, sem(1, 2023)).await.unwrap();
  assert_eq!(series.spi.len(), 1);
  assert_eq!(series.spi[0].spi, 10.0);
}

#[tokio::test]
async fn spi_is_deterministic() {
  let s = store().await;
  seed(&s).await;
  s.record_grade(101, "CS101", sem(1, 2023), Grade::BC).await.unwrap();
  s.record_grade(101, "MA101", sem(1, 2023), Grade::CD).await.unwrap();

  let a = s.compute_spi(101, sem(1, 2023)).await.unwrap();
  let b = s.compute_spi(101, sem(1, 2023)).await.unwrap();
  assert_eq!(a.spi, b.spi);
}

#[tokio::test]
async fn spi_pass_policy_one_point_counts_credits() {
  let s = store().await;
  seed(&s).await;

  s.record_grade(101, "CS101", sem(1, 2023), Grade::AA).await.unwrap();
  s.record_grade(101, "MA101", sem(1, 2023), Grade::PP).await.unwrap();

  // (4*10 + 3*1) / 7 = 6.142857…
  let spi = s.compute_spi(101, sem(1, 2023)).await.unwrap();
  assert_eq!(spi.spi, 6.14);
}

#[tokio::test]
async fn spi_pass_policy_excluded_drops_pass_rows() {
  let s = SqliteStore::open_in_memory_with(StoreOptions {
    pass_policy: PassGradePolicy::Excluded,
    ..StoreOptions::default()
  })
  .await
  .unwrap();
  seed(&s).await;

  s.record_grade(101, "CS101", sem(1, 2023), Grade::AA).await.unwrap();
  s.record_grade(101, "MA101", sem(1, 2023), Grade::PP).await.unwrap();

  // PP drops out of both sums: 40/4 = 10.0.
  let spi = s.compute_spi(101, sem(1, 2023)).await.unwrap();
  assert_eq!(spi.spi, 10.0);
}

#[tokio::test]
async fn spi_zero_credit_guard() {
  let s = SqliteStore::open_in_memory_with(StoreOptions {
    pass_policy: PassGradePolicy::Excluded,
    ..StoreOptions::default()
  })
  .await
  .unwrap();
  seed(&s).await;

  // Only a pass grade under the excluded policy: no countable credits.
  s.record_grade(101, "MA101", sem(1, 2023), Grade::PP).await.unwrap();

  let spi = s.compute_spi(101, sem(1, 2023)).await.unwrap();
  assert_eq!(spi.spi, 0.0);
}

// ─── CPI ─────────────────────────────────────────────────────────────────────

/// Grade + enroll + SPI for semester 1 (9.14) and semester 2 (4.0).
async fn seed_two_semesters(s: &SqliteStore) {
  seed(s).await;
  s.start_semester(new_semester(2, 2023), vec![]).await.unwrap();
  s.add_subject(subject("PH201", "Waves", 5)).await.unwrap();

  s.enroll(101, vec!["CS101".into(), "MA101".into()], sem(1, 2023))
    .await
    .unwrap();
  s.record_grade(101, "CS101", sem(1, 2023), Grade::AA).await.unwrap();
  s.record_grade(101, "MA101", sem(1, 2023), Grade::BB).await.unwrap();
  s.compute_spi(101, sem(1, 2023)).await.unwrap();

  s.enroll(101, vec!["PH201".into()], sem(2, 2023)).await.unwrap();
  s.record_grade(101, "PH201", sem(2, 2023), Grade::DD).await.unwrap();
  s.compute_spi(101, sem(2, 2023)).await.unwrap();
}

#[tokio::test]
async fn cpi_weighted_between_contributing_spis() {
  let s = store().await;
  seed_two_semesters(&s).await;

  let summary = s.compute_cpi(101, sem(2, 2023)).await.unwrap();
  assert_eq!(summary.student_name, "Asha Rao");

  // (9.14*7 + 4.0*5) / 12 = 6.998333… -> "7.00"
  assert_eq!(summary.cpi, "7.00");
  let cpi: f64 = summary.cpi.parse().unwrap();
  assert!(cpi > 4.0 && cpi < 9.14);
}

#[tokio::test]
async fn cpi_formats_two_decimals() {
  let s = store().await;
  seed(&s).await;

  s.enroll(101, vec!["CS101".into()], sem(1, 2023)).await.unwrap();
  s.record_grade(101, "CS101", sem(1, 2023), Grade::BB).await.unwrap();
  s.compute_spi(101, sem(1, 2023)).await.unwrap();

  let summary = s.compute_cpi(101, sem(1, 2023)).await.unwrap();
  assert_eq!(summary.cpi, "8.00");
}

#[tokio::test]
async fn cpi_without_spi_errors() {
  let s = store().await;
  seed(&s).await;

  let err = s.compute_cpi(101, sem(1, 2023)).await.unwrap_err();
  assert!(matches!(core_err(&err), CoreError::NoGradesFound { .. }));
}

#[tokio::test]
async fn cpi_without_enrollment_credits_errors() {
  let s = store().await;
  seed(&s).await;

  // Graded and SPI'd, but never enrolled: nothing to weight by.
  s.record_grade(101, "CS101", sem(1, 2023), Grade::AA).await.unwrap();
  s.compute_spi(101, sem(1, 2023)).await.unwrap();

  let err = s.compute_cpi(101, sem(1, 2023)).await.unwrap_err();
  assert!(matches!(
    core_err(&err),
    CoreError::InsufficientCredits { roll_no: 101 }
  ));
}

#[tokio::test]
async fn cpi_skips_semesters_without_enrollment() {
  let s = store().await;
  seed_two_semesters(&s).await;
  s.start_semester(new_semester(3, 2024), vec![]).await.unwrap();

  // Semester 3 is graded (SPI 10.0) but the enrollment row is missing, so
  // it contributes nothing to the weighting.
  s.record_grade(101, "CS101", sem(3, 2024), Grade::AA).await.unwrap();
  s.compute_spi(101, sem(3, 2024)).await.unwrap();

  let bounded = s.compute_cpi(101, sem(2, 2023)).await.unwrap();
  let including = s.compute_cpi(101, sem(3, 2024)).await.unwrap();
  assert_eq!(bounded.cpi, including.cpi);
}

#[tokio::test]
async fn cpi_recompute_overwrites() {
  let s = store().await;
  seed_two_semesters(&s).await;

  s.compute_cpi(101, sem(2, 2023)).await.unwrap();
  s.compute_cpi(101, sem(2, 2023)).await.unwrap();

  let series = s.get_all_indices(101, sem(2, 2023)).await.unwrap();
  assert_eq!(series.cpi.len(), 1);
}

// ─── Batch orchestration ─────────────────────────────────────────────────────

/// Two students in cohort 2023 with grades and enrollments for semester 1.
async fn seed_cohort(s: &SqliteStore) {
  seed(s).await;
  s.add_student(student(102, "Ravi Iyer", 2023)).await.unwrap();

  for roll in [101, 102] {
    s.enroll(roll, vec!["CS101".into(), "MA101".into()], sem(1, 2023))
      .await
      .unwrap();
    s.record_grade(roll, "CS101", sem(1, 2023), Grade::BB).await.unwrap();
    s.record_grade(roll, "MA101", sem(1, 2023), Grade::CC).await.unwrap();
  }
}

#[tokio::test]
async fn batch_computes_whole_cohort() {
  let s = store().await;
  seed_cohort(&s).await;

  let report = s.batch_compute(2023, sem(1, 2023)).await.unwrap();
  assert_eq!(report.students_processed, 2);
  assert_eq!(report.spi.len(), 2);
  assert_eq!(report.cpi.len(), 2);

  // (4*8 + 3*6) / 7 = 7.142857…
  assert!(report.spi.iter().all(|r| r.spi == 7.14));
  assert!(report.cpi.iter().all(|c| c.cpi == "7.14"));

  for roll in [101, 102] {
    let series = s.get_all_indices(roll, sem(1, 2023)).await.unwrap();
    assert_eq!(series.spi.len(), 1);
    assert_eq!(series.cpi.len(), 1);
  }
}

#[tokio::test]
async fn batch_empty_cohort_errors() {
  let s = store().await;
  seed(&s).await;

  let err = s.batch_compute(1999, sem(1, 2023)).await.unwrap_err();
  assert!(matches!(core_err(&err), CoreError::NoStudentsFound(1999)));
}

#[tokio::test]
async fn batch_failure_rolls_back_everything() {
  let s = store().await;
  seed_cohort(&s).await;
  // Student 103 has no grades at all, so their SPI computation fails.
  s.add_student(student(103, "Meera Shah", 2023)).await.unwrap();

  let err = s.batch_compute(2023, sem(1, 2023)).await.unwrap_err();
  assert!(matches!(core_err(&err), CoreError::NoGradesFound { .. }));

  // All-or-nothing: nothing from students 101/102 may have persisted.
  for roll in [101, 102] {
    let err = s.get_all_indices(roll, sem(1, 2023)).await.unwrap_err();
    assert!(matches!(core_err(&err), CoreError::SpiNotFound { .. }));
  }
}

#[tokio::test]
async fn chunked_batch_keeps_completed_chunks() {
  let s = SqliteStore::open_in_memory_with(StoreOptions {
    batch_chunk_size: NonZeroUsize::new(1),
    ..StoreOptions::default()
  })
  .await
  .unwrap();
  seed_cohort(&s).await;
  s.add_student(student(103, "Meera Shah", 2023)).await.unwrap();

  let err = s.batch_compute(2023, sem(1, 2023)).await.unwrap_err();
  assert!(matches!(core_err(&err), CoreError::NoGradesFound { .. }));

  // With single-student chunks, 101 and 102 committed before 103 failed.
  for roll in [101, 102] {
    let series = s.get_all_indices(roll, sem(1, 2023)).await.unwrap();
    assert_eq!(series.spi.len(), 1);
  }
}

// ─── Reporting ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn indices_are_ordered_and_bounded() {
  let s = store().await;
  seed_two_semesters(&s).await;
  s.compute_cpi(101, sem(1, 2023)).await.unwrap();
  s.compute_cpi(101, sem(2, 2023)).await.unwrap();

  let series = s.get_all_indices(101, sem(2, 2023)).await.unwrap();
  assert_eq!(series.spi.iter().map(|r| r.sem_no).collect::<Vec<_>>(), vec![1, 2]);
  assert_eq!(series.cpi.iter().map(|r| r.sem_no).collect::<Vec<_>>(), vec![1, 2]);

  // A tighter bound hides the later semester.
  let bounded = s.get_all_indices(101, sem(1, 2023)).await.unwrap();
  assert_eq!(bounded.spi.len(), 1);
  assert_eq!(bounded.cpi.len(), 1);
}

#[tokio::test]
async fn indices_missing_series_errors() {
  let s = store().await;
  seed(&s).await;

  let err = s.get_all_indices(101, sem(1, 2023)).await.unwrap_err();
  assert!(matches!(core_err(&err), CoreError::SpiNotFound { .. }));

  // SPI present but CPI never computed.
  s.record_grade(101, "CS101", sem(1, 2023), Grade::AA).await.unwrap();
  s.compute_spi(101, sem(1, 2023)).await.unwrap();
  let err = s.get_all_indices(101, sem(1, 2023)).await.unwrap_err();
  assert!(matches!(core_err(&err), CoreError::CpiNotFound { .. }));
}

#[tokio::test]
async fn report_assembles_full_snapshot() {
  let s = store().await;
  seed_two_semesters(&s).await;
  s.compute_cpi(101, sem(2, 2023)).await.unwrap();

  let report = s.generate_report(101, sem(2, 2023)).await.unwrap();
  assert_eq!(report.student.roll_no, 101);
  assert_eq!(report.semester.sem_no, 2);
  assert_eq!(report.enrollments.len(), 1);
  assert_eq!(report.enrollments[0].subject_code, "PH201");

  // Grade rows for both semesters, with credits joined in.
  assert_eq!(report.grades.len(), 3);
  assert!(report.grades.iter().any(|g| g.subject_code == "CS101" && g.credits == 4));

  assert_eq!(report.spi.len(), 2);
  assert_eq!(report.cpi.len(), 1);
}

#[tokio::test]
async fn report_unknown_student_errors() {
  let s = store().await;
  seed(&s).await;

  let err = s.generate_report(999, sem(1, 2023)).await.unwrap_err();
  assert!(matches!(core_err(&err), CoreError::StudentNotFound(999)));
}

#[tokio::test]
async fn report_without_grades_errors() {
  let s = store().await;
  seed(&s).await;

  let err = s.generate_report(101, sem(1, 2023)).await.unwrap_err();
  assert!(matches!(core_err(&err), CoreError::NoGradesFound { .. }));
}

// ─── Bulk import ─────────────────────────────────────────────────────────────

fn rows(pairs: &[(&str, &str)]) -> Vec<GradeRow> {
  pairs
    .iter()
    .map(|(roll_no, grade)| GradeRow {
      roll_no: (*roll_no).into(),
      grade:   (*grade).into(),
    })
    .collect()
}

#[tokio::test]
async fn import_tolerates_bad_rows() {
  let s = store().await;
  seed(&s).await;
  for roll in 102..=108 {
    s.add_student(student(roll, "Cohort Student", 2023)).await.unwrap();
  }

  // 10 rows; 555 and 556 are not registered students.
  let report = import_grades(
    &s,
    "CS101_sem1_2023.xlsx",
    rows(&[
      ("101", "AA"),
      ("102", "AB"),
      ("103", "BB"),
      ("104", "BC"),
      ("555", "CC"),
      ("105", "CC"),
      ("106", "CD"),
      ("556", "DD"),
      ("107", "DD"),
      ("108", "F"),
    ]),
  )
  .await
  .unwrap();

  assert_eq!(report.total_rows, 10);
  assert_eq!(report.processed.len(), 8);
  assert_eq!(report.errors.len(), 2);
  assert!(report.is_partial());
  assert_eq!(report.success_rate(), "8/10 rows processed");

  // The good rows really landed; the bad ones really didn't.
  assert!(s.get_grade(103, "CS101", sem(1, 2023)).await.unwrap().is_some());
  let err = &report.errors[0];
  assert_eq!(err.row.roll_no, "555");
  assert!(err.error.contains("not found"));
}

#[tokio::test]
async fn import_rejects_malformed_file_name() {
  let s = store().await;
  seed(&s).await;

  let err = import_grades(&s, "grades-final.xlsx", rows(&[("101", "AA")]))
    .await
    .unwrap_err();
  assert!(matches!(
    core_err(&err),
    CoreError::InvalidImportFileName(_)
  ));
}

#[tokio::test]
async fn import_rejects_empty_row_set() {
  let s = store().await;
  seed(&s).await;

  let err = import_grades(&s, "CS101_sem1_2023.xlsx", vec![])
    .await
    .unwrap_err();
  assert!(matches!(core_err(&err), CoreError::EmptyImport));
}

#[tokio::test]
async fn import_collects_invalid_grade_rows() {
  let s = store().await;
  seed(&s).await;

  let report = import_grades(
    &s,
    "CS101_sem1_2023.xlsx",
    rows(&[("101", "AA"), ("101", "PP"), ("101", "ZZ"), ("", "AA")]),
  )
  .await
  .unwrap();

  assert_eq!(report.processed.len(), 1);
  assert_eq!(report.errors.len(), 3);
  // Pass codes don't travel through exam spreadsheets.
  assert!(report.errors[0].error.contains("invalid grade"));
}

#[tokio::test]
async fn import_reuses_attempt_numbering() {
  let s = store().await;
  seed(&s).await;

  import_grades(&s, "CS101_sem1_2023.xlsx", rows(&[("101", "F")]))
    .await
    .unwrap();
  let report = import_grades(&s, "CS101_sem1_2023.xlsx", rows(&[("101", "BC")]))
    .await
    .unwrap();

  assert_eq!(report.processed.len(), 1);
  assert_eq!(report.processed[0].attempt, 2);
  assert_eq!(report.processed[0].history.len(), 2);
  assert_eq!(report.processed[0].history[0].grade, Grade::F);
  assert_eq!(report.processed[0].history[1].grade, Grade::BC);
}
