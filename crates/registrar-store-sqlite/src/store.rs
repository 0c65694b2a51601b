//! [`SqliteStore`] — the SQLite implementation of [`AcademicStore`].

use std::{num::NonZeroUsize, path::Path};

use chrono::Utc;
use registrar_core::{
  Error as CoreError,
  grade::{Grade, PassGradePolicy},
  index::{
    CpiRecord, CpiSummary, GradedCredit, SemesterCredits, SpiRecord,
    cumulative_index, format2, round2, semester_index,
  },
  ledger::{EnrolledSubject, GradeAttempt, GradeRecord},
  report::{BatchReport, GradedSubject, IndexSeries, StudentReport},
  semester::{NewSemester, Semester, SemesterRef, SemesterStatus},
  store::AcademicStore,
  student::{NewStudent, Promotion, RollNo, Student},
  subject::Subject,
};
use rusqlite::{OptionalExtension as _, Transaction};

use crate::{
  Error, Result,
  encode::{
    RawGradeAttempt, RawGradeRecord, RawSemester, RawStudent, decode_grade,
    encode_date, encode_dt, encode_grade, encode_status,
  },
  schema::SCHEMA,
};

// ─── Options ─────────────────────────────────────────────────────────────────

/// Store-level tunables, fixed at open time.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreOptions {
  /// How `PP` grades enter SPI arithmetic.
  pub pass_policy:      PassGradePolicy,
  /// Transaction scope for [`AcademicStore::batch_compute`]: `None` runs
  /// the whole cohort in one transaction (all-or-nothing); `Some(n)` runs
  /// chunks of `n` students, each chunk atomic on its own.
  pub batch_chunk_size: Option<NonZeroUsize>,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Registrar academic store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All
/// statements run on the connection's dedicated thread, so writers for the
/// same ledger key can never interleave.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
  opts: StoreOptions,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::open_with(path, StoreOptions::default()).await
  }

  /// Open (or create) a store at `path` with explicit [`StoreOptions`].
  pub async fn open_with(
    path: impl AsRef<Path>,
    opts: StoreOptions,
  ) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, opts };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    Self::open_in_memory_with(StoreOptions::default()).await
  }

  /// Open an in-memory store with explicit [`StoreOptions`].
  pub async fn open_in_memory_with(opts: StoreOptions) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, opts };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` inside one transaction on the connection's thread: commit on
  /// success, roll back on any error, and hand the error back unchanged.
  /// Every multi-step write in this store goes through here, so the
  /// acquire/begin/commit-or-rollback/release discipline holds on every
  /// exit path.
  async fn with_tx<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&Transaction<'_>) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        match f(&tx) {
          Ok(value) => {
            tx.commit()?;
            Ok(Ok(value))
          }
          Err(e) => {
            tx.rollback()?;
            Ok(Err(e))
          }
        }
      })
      .await?
  }
}

// ─── Transaction helpers ─────────────────────────────────────────────────────

fn fetch_student(tx: &Transaction<'_>, roll_no: RollNo) -> Result<Option<Student>> {
  let raw: Option<RawStudent> = tx
    .query_row(
      "SELECT roll_no, name, department, year, created_at
       FROM students WHERE roll_no = ?1",
      rusqlite::params![roll_no],
      |row| {
        Ok(RawStudent {
          roll_no:    row.get(0)?,
          name:       row.get(1)?,
          department: row.get(2)?,
          year:       row.get(3)?,
          created_at: row.get(4)?,
        })
      },
    )
    .optional()?;

  raw.map(RawStudent::into_student).transpose()
}

fn require_student(tx: &Transaction<'_>, roll_no: RollNo) -> Result<Student> {
  fetch_student(tx, roll_no)?
    .ok_or_else(|| CoreError::StudentNotFound(roll_no).into())
}

fn fetch_subject(tx: &Transaction<'_>, code: &str) -> Result<Option<Subject>> {
  let subject: Option<Subject> = tx
    .query_row(
      "SELECT subject_code, subject_name, credits, is_elective, department
       FROM subjects WHERE subject_code = ?1",
      rusqlite::params![code],
      |row| {
        Ok(Subject {
          subject_code: row.get(0)?,
          subject_name: row.get(1)?,
          credits:      row.get(2)?,
          is_elective:  row.get(3)?,
          department:   row.get(4)?,
        })
      },
    )
    .optional()?;
  Ok(subject)
}

fn require_subject(tx: &Transaction<'_>, code: &str) -> Result<Subject> {
  fetch_subject(tx, code)?
    .ok_or_else(|| CoreError::SubjectNotFound(code.to_owned()).into())
}

fn fetch_semester(tx: &Transaction<'_>, sem: SemesterRef) -> Result<Option<Semester>> {
  let raw: Option<RawSemester> = tx
    .query_row(
      "SELECT sem_no, year, start_date, end_date, status
       FROM semesters WHERE sem_no = ?1 AND year = ?2",
      rusqlite::params![sem.sem_no, sem.year],
      |row| {
        Ok(RawSemester {
          sem_no:     row.get(0)?,
          year:       row.get(1)?,
          start_date: row.get(2)?,
          end_date:   row.get(3)?,
          status:     row.get(4)?,
        })
      },
    )
    .optional()?;

  raw.map(RawSemester::into_semester).transpose()
}

fn require_semester(tx: &Transaction<'_>, sem: SemesterRef) -> Result<Semester> {
  fetch_semester(tx, sem)?.ok_or_else(|| CoreError::SemesterNotFound(sem).into())
}

fn insert_history(
  tx:           &Transaction<'_>,
  roll_no:      RollNo,
  subject_code: &str,
  sem:          SemesterRef,
  grade:        Grade,
  attempt:      u32,
  recorded_at:  &str,
) -> Result<()> {
  tx.execute(
    "INSERT INTO grade_history
       (roll_no, subject_code, sem_no, year, grade, attempt, recorded_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    rusqlite::params![
      roll_no,
      subject_code,
      sem.sem_no,
      sem.year,
      encode_grade(grade),
      attempt,
      recorded_at,
    ],
  )?;
  Ok(())
}

/// The ledger write path. Referential checks, the attempt-number decision,
/// the history append(s), and the record upsert all happen on the same
/// transaction, so either everything lands or nothing does.
fn record_grade_tx(
  tx:           &Transaction<'_>,
  roll_no:      RollNo,
  subject_code: &str,
  sem:          SemesterRef,
  grade:        Grade,
) -> Result<GradeAttempt> {
  require_student(tx, roll_no)?;
  require_subject(tx, subject_code)?;
  require_semester(tx, sem)?;

  let now = Utc::now();
  let now_str = encode_dt(now);

  let current: Option<String> = tx
    .query_row(
      "SELECT grade FROM grades
       WHERE roll_no = ?1 AND subject_code = ?2 AND sem_no = ?3 AND year = ?4",
      rusqlite::params![roll_no, subject_code, sem.sem_no, sem.year],
      |row| row.get(0),
    )
    .optional()?;

  let attempt = match current {
    None => {
      tx.execute(
        "INSERT INTO grades (roll_no, subject_code, sem_no, year, grade, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
          roll_no,
          subject_code,
          sem.sem_no,
          sem.year,
          encode_grade(grade),
          now_str,
        ],
      )?;
      insert_history(tx, roll_no, subject_code, sem, grade, 1, &now_str)?;
      1
    }
    Some(current_code) => {
      let current_grade = decode_grade(&current_code)?;

      let latest: Option<(u32, String)> = tx
        .query_row(
          "SELECT attempt, grade FROM grade_history
           WHERE roll_no = ?1 AND subject_code = ?2 AND sem_no = ?3 AND year = ?4
           ORDER BY attempt DESC LIMIT 1",
          rusqlite::params![roll_no, subject_code, sem.sem_no, sem.year],
          |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

      let mut next = latest.as_ref().map(|(a, _)| *a).unwrap_or(0) + 1;

      // Invariant: the max-attempt history entry carries the current
      // record's grade. If the record predates its history (or the two
      // diverged), archive the current grade first.
      let historised = latest
        .as_ref()
        .map(|(_, g)| decode_grade(g))
        .transpose()?
        .is_some_and(|g| g == current_grade);
      if !historised {
        insert_history(tx, roll_no, subject_code, sem, current_grade, next, &now_str)?;
        next += 1;
      }

      insert_history(tx, roll_no, subject_code, sem, grade, next, &now_str)?;
      tx.execute(
        "UPDATE grades SET grade = ?1, updated_at = ?2
         WHERE roll_no = ?3 AND subject_code = ?4 AND sem_no = ?5 AND year = ?6",
        rusqlite::params![
          encode_grade(grade),
          now_str,
          roll_no,
          subject_code,
          sem.sem_no,
          sem.year,
        ],
      )?;
      next
    }
  };

  Ok(GradeAttempt {
    roll_no,
    subject_code: subject_code.to_owned(),
    sem_no: sem.sem_no,
    year: sem.year,
    grade,
    attempt,
    recorded_at: now,
  })
}

/// Current grade rows for one semester, joined to subject credit weights —
/// the SPI credit source.
fn graded_credits(
  tx:      &Transaction<'_>,
  roll_no: RollNo,
  sem:     SemesterRef,
) -> Result<Vec<GradedCredit>> {
  let mut stmt = tx.prepare(
    "SELECT g.grade, s.credits
     FROM grades g
     JOIN subjects s ON s.subject_code = g.subject_code
     WHERE g.roll_no = ?1 AND g.sem_no = ?2 AND g.year = ?3",
  )?;
  let raw = stmt
    .query_map(
      rusqlite::params![roll_no, sem.sem_no, sem.year],
      |row| Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?)),
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  raw
    .into_iter()
    .map(|(grade, credits)| {
      Ok(GradedCredit { grade: decode_grade(&grade)?, credits })
    })
    .collect()
}

fn compute_spi_tx(
  tx:      &Transaction<'_>,
  roll_no: RollNo,
  sem:     SemesterRef,
  policy:  PassGradePolicy,
) -> Result<SpiRecord> {
  let rows = graded_credits(tx, roll_no, sem)?;
  if rows.is_empty() {
    return Err(CoreError::NoGradesFound { roll_no, sem_no: sem.sem_no }.into());
  }

  let spi = semester_index(&rows, policy);
  tx.execute(
    "INSERT INTO spi (roll_no, sem_no, year, spi) VALUES (?1, ?2, ?3, ?4)
     ON CONFLICT (roll_no, sem_no, year) DO UPDATE SET spi = excluded.spi",
    rusqlite::params![roll_no, sem.sem_no, sem.year, spi],
  )?;

  Ok(SpiRecord { roll_no, sem_no: sem.sem_no, year: sem.year, spi })
}

fn compute_cpi_tx(
  tx:      &Transaction<'_>,
  roll_no: RollNo,
  sem:     SemesterRef,
) -> Result<CpiSummary> {
  // Enrollment-derived credits per semester — deliberately NOT the credits
  // behind each SPI's grade rows. The two sources can diverge.
  let mut stmt = tx.prepare(
    "SELECT s.sem_no, s.year, s.spi, SUM(sub.credits) AS credits
     FROM spi s
     LEFT JOIN enrollments e
       ON e.roll_no = s.roll_no AND e.sem_no = s.sem_no AND e.year = s.year
     LEFT JOIN subjects sub ON sub.subject_code = e.subject_code
     WHERE s.roll_no = ?1 AND s.sem_no <= ?2
     GROUP BY s.sem_no, s.year, s.spi
     ORDER BY s.sem_no",
  )?;
  let rows = stmt
    .query_map(rusqlite::params![roll_no, sem.sem_no], |row| {
      Ok(SemesterCredits {
        sem_no:  row.get(0)?,
        year:    row.get(1)?,
        spi:     row.get(2)?,
        credits: row.get(3)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  if rows.is_empty() {
    return Err(CoreError::NoGradesFound { roll_no, sem_no: sem.sem_no }.into());
  }

  let cpi = cumulative_index(&rows)
    .ok_or(CoreError::InsufficientCredits { roll_no })?;
  let cpi = round2(cpi);

  tx.execute(
    "INSERT INTO cpi (roll_no, sem_no, year, cpi) VALUES (?1, ?2, ?3, ?4)
     ON CONFLICT (roll_no, sem_no, year) DO UPDATE SET cpi = excluded.cpi",
    rusqlite::params![roll_no, sem.sem_no, sem.year, cpi],
  )?;

  let student = require_student(tx, roll_no)?;

  Ok(CpiSummary {
    roll_no,
    student_name: student.name,
    sem_no: sem.sem_no,
    cpi: format2(cpi),
  })
}

fn spi_series(
  tx:      &Transaction<'_>,
  roll_no: RollNo,
  sem_no:  u16,
) -> Result<Vec<SpiRecord>> {
  let mut stmt = tx.prepare(
    "SELECT roll_no, sem_no, year, spi FROM spi
     WHERE roll_no = ?1 AND sem_no <= ?2 ORDER BY sem_no",
  )?;
  let rows = stmt
    .query_map(rusqlite::params![roll_no, sem_no], |row| {
      Ok(SpiRecord {
        roll_no: row.get(0)?,
        sem_no:  row.get(1)?,
        year:    row.get(2)?,
        spi:     row.get(3)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn cpi_series(
  tx:      &Transaction<'_>,
  roll_no: RollNo,
  sem_no:  u16,
) -> Result<Vec<CpiRecord>> {
  let mut stmt = tx.prepare(
    "SELECT roll_no, sem_no, year, cpi FROM cpi
     WHERE roll_no = ?1 AND sem_no <= ?2 ORDER BY sem_no",
  )?;
  let rows = stmt
    .query_map(rusqlite::params![roll_no, sem_no], |row| {
      Ok(CpiRecord {
        roll_no: row.get(0)?,
        sem_no:  row.get(1)?,
        year:    row.get(2)?,
        cpi:     row.get(3)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn enrollments_for(
  tx:      &Transaction<'_>,
  roll_no: RollNo,
  sem:     SemesterRef,
) -> Result<Vec<EnrolledSubject>> {
  let mut stmt = tx.prepare(
    "SELECT e.roll_no, e.subject_code, s.subject_name, s.credits, e.sem_no, e.year
     FROM enrollments e
     JOIN subjects s ON s.subject_code = e.subject_code
     WHERE e.roll_no = ?1 AND e.sem_no = ?2 AND e.year = ?3
     ORDER BY e.subject_code",
  )?;
  let rows = stmt
    .query_map(
      rusqlite::params![roll_no, sem.sem_no, sem.year],
      |row| {
        Ok(EnrolledSubject {
          roll_no:      row.get(0)?,
          subject_code: row.get(1)?,
          subject_name: row.get(2)?,
          credits:      row.get(3)?,
          sem_no:       row.get(4)?,
          year:         row.get(5)?,
        })
      },
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

// ─── AcademicStore impl ──────────────────────────────────────────────────────

impl AcademicStore for SqliteStore {
  type Error = Error;

  // ── Students ──────────────────────────────────────────────────────────

  async fn add_student(&self, input: NewStudent) -> Result<Student> {
    self
      .with_tx(move |tx| {
        if fetch_student(tx, input.roll_no)?.is_some() {
          return Err(CoreError::StudentExists(input.roll_no).into());
        }

        let student = Student {
          roll_no:    input.roll_no,
          name:       input.name,
          department: input.department,
          year:       input.year,
          created_at: Utc::now(),
        };
        tx.execute(
          "INSERT INTO students (roll_no, name, department, year, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            student.roll_no,
            student.name,
            student.department,
            student.year,
            encode_dt(student.created_at),
          ],
        )?;
        Ok(student)
      })
      .await
  }

  async fn get_student(&self, roll_no: RollNo) -> Result<Option<Student>> {
    let raw: Option<RawStudent> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT roll_no, name, department, year, created_at
               FROM students WHERE roll_no = ?1",
              rusqlite::params![roll_no],
              |row| {
                Ok(RawStudent {
                  roll_no:    row.get(0)?,
                  name:       row.get(1)?,
                  department: row.get(2)?,
                  year:       row.get(3)?,
                  created_at: row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawStudent::into_student).transpose()
  }

  async fn list_students_by_year(&self, year: u16) -> Result<Vec<Student>> {
    let raws: Vec<RawStudent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT roll_no, name, department, year, created_at
           FROM students WHERE year = ?1 ORDER BY roll_no",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![year], |row| {
            Ok(RawStudent {
              roll_no:    row.get(0)?,
              name:       row.get(1)?,
              department: row.get(2)?,
              year:       row.get(3)?,
              created_at: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawStudent::into_student).collect()
  }

  // ── Subjects ──────────────────────────────────────────────────────────

  async fn add_subject(&self, subject: Subject) -> Result<Subject> {
    if subject.credits == 0 {
      return Err(CoreError::InvalidCredits.into());
    }

    self
      .with_tx(move |tx| {
        if fetch_subject(tx, &subject.subject_code)?.is_some() {
          return Err(CoreError::SubjectExists(subject.subject_code).into());
        }

        tx.execute(
          "INSERT INTO subjects
             (subject_code, subject_name, credits, is_elective, department)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            subject.subject_code,
            subject.subject_name,
            subject.credits,
            subject.is_elective,
            subject.department,
          ],
        )?;
        Ok(subject)
      })
      .await
  }

  async fn get_subject(&self, code: &str) -> Result<Option<Subject>> {
    let code = code.to_owned();
    self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT subject_code, subject_name, credits, is_elective, department
               FROM subjects WHERE subject_code = ?1",
              rusqlite::params![code],
              |row| {
                Ok(Subject {
                  subject_code: row.get(0)?,
                  subject_name: row.get(1)?,
                  credits:      row.get(2)?,
                  is_elective:  row.get(3)?,
                  department:   row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::from)
  }

  // ── Semesters ─────────────────────────────────────────────────────────

  async fn start_semester(
    &self,
    input:      NewSemester,
    promotions: Vec<Promotion>,
  ) -> Result<Semester> {
    self
      .with_tx(move |tx| {
        let sem = SemesterRef::new(input.sem_no, input.year);
        if fetch_semester(tx, sem)?.is_some() {
          return Err(CoreError::SemesterExists(sem).into());
        }

        let semester = Semester {
          sem_no:     input.sem_no,
          year:       input.year,
          start_date: input.start_date,
          end_date:   input.end_date,
          status:     SemesterStatus::Upcoming,
        };
        tx.execute(
          "INSERT INTO semesters (sem_no, year, start_date, end_date, status)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            semester.sem_no,
            semester.year,
            encode_date(semester.start_date),
            encode_date(semester.end_date),
            encode_status(semester.status),
          ],
        )?;

        for promotion in promotions {
          let affected = tx.execute(
            "UPDATE students SET year = ?1 WHERE roll_no = ?2",
            rusqlite::params![promotion.new_year, promotion.roll_no],
          )?;
          if affected == 0 {
            return Err(CoreError::StudentNotFound(promotion.roll_no).into());
          }
        }

        Ok(semester)
      })
      .await
  }

  async fn get_semester(&self, sem: SemesterRef) -> Result<Option<Semester>> {
    let raw: Option<RawSemester> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT sem_no, year, start_date, end_date, status
               FROM semesters WHERE sem_no = ?1 AND year = ?2",
              rusqlite::params![sem.sem_no, sem.year],
              |row| {
                Ok(RawSemester {
                  sem_no:     row.get(0)?,
                  year:       row.get(1)?,
                  start_date: row.get(2)?,
                  end_date:   row.get(3)?,
                  status:     row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSemester::into_semester).transpose()
  }

  async fn set_semester_status(
    &self,
    sem:    SemesterRef,
    status: SemesterStatus,
  ) -> Result<()> {
    self
      .with_tx(move |tx| {
        let affected = tx.execute(
          "UPDATE semesters SET status = ?1 WHERE sem_no = ?2 AND year = ?3",
          rusqlite::params![encode_status(status), sem.sem_no, sem.year],
        )?;
        if affected == 0 {
          return Err(CoreError::SemesterNotFound(sem).into());
        }
        Ok(())
      })
      .await
  }

  // ── Enrollment ────────────────────────────────────────────────────────

  async fn enroll(
    &self,
    roll_no:       RollNo,
    subject_codes: Vec<String>,
    sem:           SemesterRef,
  ) -> Result<Vec<EnrolledSubject>> {
    self
      .with_tx(move |tx| {
        require_student(tx, roll_no)?;
        let semester = require_semester(tx, sem)?;
        if semester.status == SemesterStatus::Completed {
          return Err(CoreError::SemesterClosed(sem).into());
        }

        let mut enrolled = Vec::with_capacity(subject_codes.len());
        for code in subject_codes {
          let subject = require_subject(tx, &code)?;

          let exists: bool = tx
            .query_row(
              "SELECT 1 FROM enrollments
               WHERE roll_no = ?1 AND subject_code = ?2 AND sem_no = ?3 AND year = ?4",
              rusqlite::params![roll_no, code, sem.sem_no, sem.year],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
          if exists {
            return Err(
              CoreError::AlreadyEnrolled { roll_no, subject_code: code, sem }.into(),
            );
          }

          tx.execute(
            "INSERT INTO enrollments (roll_no, subject_code, sem_no, year)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![roll_no, code, sem.sem_no, sem.year],
          )?;
          enrolled.push(EnrolledSubject {
            roll_no,
            subject_code: subject.subject_code,
            subject_name: subject.subject_name,
            credits: subject.credits,
            sem_no: sem.sem_no,
            year: sem.year,
          });
        }

        Ok(enrolled)
      })
      .await
  }

  async fn get_enrollments(
    &self,
    roll_no: RollNo,
    sem:     SemesterRef,
  ) -> Result<Vec<EnrolledSubject>> {
    self.with_tx(move |tx| enrollments_for(tx, roll_no, sem)).await
  }

  // ── Grade ledger ──────────────────────────────────────────────────────

  async fn record_grade(
    &self,
    roll_no:      RollNo,
    subject_code: &str,
    sem:          SemesterRef,
    grade:        Grade,
  ) -> Result<GradeAttempt> {
    let code = subject_code.to_owned();
    self
      .with_tx(move |tx| record_grade_tx(tx, roll_no, &code, sem, grade))
      .await
  }

  async fn get_grade(
    &self,
    roll_no:      RollNo,
    subject_code: &str,
    sem:          SemesterRef,
  ) -> Result<Option<GradeRecord>> {
    let code = subject_code.to_owned();
    let raw: Option<RawGradeRecord> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT roll_no, subject_code, sem_no, year, grade, updated_at
               FROM grades
               WHERE roll_no = ?1 AND subject_code = ?2 AND sem_no = ?3 AND year = ?4",
              rusqlite::params![roll_no, code, sem.sem_no, sem.year],
              |row| {
                Ok(RawGradeRecord {
                  roll_no:      row.get(0)?,
                  subject_code: row.get(1)?,
                  sem_no:       row.get(2)?,
                  year:         row.get(3)?,
                  grade:        row.get(4)?,
                  updated_at:   row.get(5)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawGradeRecord::into_record).transpose()
  }

  async fn get_grade_history(
    &self,
    roll_no:      RollNo,
    subject_code: &str,
    sem:          SemesterRef,
  ) -> Result<Vec<GradeAttempt>> {
    let code = subject_code.to_owned();
    let raws: Vec<RawGradeAttempt> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT roll_no, subject_code, sem_no, year, grade, attempt, recorded_at
           FROM grade_history
           WHERE roll_no = ?1 AND subject_code = ?2 AND sem_no = ?3 AND year = ?4
           ORDER BY attempt ASC",
        )?;
        let rows = stmt
          .query_map(
            rusqlite::params![roll_no, code, sem.sem_no, sem.year],
            |row| {
              Ok(RawGradeAttempt {
                roll_no:      row.get(0)?,
                subject_code: row.get(1)?,
                sem_no:       row.get(2)?,
                year:         row.get(3)?,
                grade:        row.get(4)?,
                attempt:      row.get(5)?,
                recorded_at:  row.get(6)?,
              })
            },
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGradeAttempt::into_attempt).collect()
  }

  async fn get_student_history(&self, roll_no: RollNo) -> Result<Vec<GradeAttempt>> {
    let raws: Vec<RawGradeAttempt> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT roll_no, subject_code, sem_no, year, grade, attempt, recorded_at
           FROM grade_history
           WHERE roll_no = ?1
           ORDER BY subject_code, sem_no, year, attempt ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![roll_no], |row| {
            Ok(RawGradeAttempt {
              roll_no:      row.get(0)?,
              subject_code: row.get(1)?,
              sem_no:       row.get(2)?,
              year:         row.get(3)?,
              grade:        row.get(4)?,
              attempt:      row.get(5)?,
              recorded_at:  row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGradeAttempt::into_attempt).collect()
  }

  // ── Index computation ─────────────────────────────────────────────────

  async fn compute_spi(&self, roll_no: RollNo, sem: SemesterRef) -> Result<SpiRecord> {
    let policy = self.opts.pass_policy;
    self
      .with_tx(move |tx| compute_spi_tx(tx, roll_no, sem, policy))
      .await
  }

  async fn compute_cpi(&self, roll_no: RollNo, sem: SemesterRef) -> Result<CpiSummary> {
    self.with_tx(move |tx| compute_cpi_tx(tx, roll_no, sem)).await
  }

  async fn batch_compute(
    &self,
    cohort_year: u16,
    sem:         SemesterRef,
  ) -> Result<BatchReport> {
    let rolls: Vec<RollNo> = self
      .conn
      .call(move |conn| {
        let mut stmt =
          conn.prepare("SELECT roll_no FROM students WHERE year = ?1 ORDER BY roll_no")?;
        let rows = stmt
          .query_map(rusqlite::params![cohort_year], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    if rolls.is_empty() {
      return Err(CoreError::NoStudentsFound(cohort_year).into());
    }

    let chunk_size = self
      .opts
      .batch_chunk_size
      .map(NonZeroUsize::get)
      .unwrap_or(rolls.len());
    let policy = self.opts.pass_policy;

    tracing::info!(
      cohort_year,
      students = rolls.len(),
      chunk_size,
      "starting batch index computation"
    );

    let mut report =
      BatchReport { students_processed: 0, spi: Vec::new(), cpi: Vec::new() };

    for chunk in rolls.chunks(chunk_size) {
      let chunk = chunk.to_vec();
      let (spi, cpi) = self
        .with_tx(move |tx| {
          let mut spi = Vec::with_capacity(chunk.len());
          let mut cpi = Vec::with_capacity(chunk.len());
          for roll_no in chunk {
            spi.push(compute_spi_tx(tx, roll_no, sem, policy)?);
            cpi.push(compute_cpi_tx(tx, roll_no, sem)?);
          }
          Ok((spi, cpi))
        })
        .await?;

      report.students_processed += spi.len();
      report.spi.extend(spi);
      report.cpi.extend(cpi);
    }

    tracing::info!(students = report.students_processed, "batch index computation done");
    Ok(report)
  }

  // ── Reporting ─────────────────────────────────────────────────────────

  async fn get_all_indices(
    &self,
    roll_no: RollNo,
    sem:     SemesterRef,
  ) -> Result<IndexSeries> {
    self
      .with_tx(move |tx| {
        let spi = spi_series(tx, roll_no, sem.sem_no)?;
        if spi.is_empty() {
          return Err(CoreError::SpiNotFound { roll_no, sem_no: sem.sem_no }.into());
        }

        let cpi = cpi_series(tx, roll_no, sem.sem_no)?;
        if cpi.is_empty() {
          return Err(CoreError::CpiNotFound { roll_no, sem_no: sem.sem_no }.into());
        }

        Ok(IndexSeries { roll_no, sem_no: sem.sem_no, spi, cpi })
      })
      .await
  }

  async fn generate_report(
    &self,
    roll_no: RollNo,
    sem:     SemesterRef,
  ) -> Result<StudentReport> {
    self
      .with_tx(move |tx| {
        let student = require_student(tx, roll_no)?;
        let semester = require_semester(tx, sem)?;

        let raw = {
          let mut stmt = tx.prepare(
            "SELECT g.subject_code, g.sem_no, g.year, g.grade, s.credits
             FROM grades g
             JOIN subjects s ON s.subject_code = g.subject_code
             WHERE g.roll_no = ?1 AND g.sem_no <= ?2
             ORDER BY g.sem_no, g.subject_code",
          )?;
          stmt
            .query_map(rusqlite::params![roll_no, sem.sem_no], |row| {
              Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u16>(1)?,
                row.get::<_, u16>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, u32>(4)?,
              ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        let grades = raw
          .into_iter()
          .map(|(subject_code, sem_no, year, grade, credits)| {
            Ok(GradedSubject {
              subject_code,
              sem_no,
              year,
              grade: decode_grade(&grade)?,
              credits,
            })
          })
          .collect::<Result<Vec<_>>>()?;
        if grades.is_empty() {
          return Err(CoreError::NoGradesFound { roll_no, sem_no: sem.sem_no }.into());
        }

        let spi = spi_series(tx, roll_no, sem.sem_no)?;
        if spi.is_empty() {
          return Err(CoreError::SpiNotFound { roll_no, sem_no: sem.sem_no }.into());
        }
        let cpi = cpi_series(tx, roll_no, sem.sem_no)?;
        if cpi.is_empty() {
          return Err(CoreError::CpiNotFound { roll_no, sem_no: sem.sem_no }.into());
        }

        let enrollments = enrollments_for(tx, roll_no, sem)?;

        Ok(StudentReport { student, semester, enrollments, grades, spi, cpi })
      })
      .await
  }
}
