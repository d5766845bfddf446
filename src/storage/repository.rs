use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::date_util::parse_date;
use crate::query::builder::ClassQuery;
use crate::storage::records::{
    Assignment, AttendanceMark, AttendanceStatus, ClassRecord, Enrollment, Session, Submission,
};

// ── Classes ────────────────────────────────────────────────────────

pub fn query_classes(
    conn: &Connection,
    query: &ClassQuery,
) -> Result<Vec<ClassRecord>, rusqlite::Error> {
    let (sql, params) = query.build_sql();
    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        params.iter().map(|p| p.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs.as_slice(), |row| {
        Ok(ClassRecord {
            class_id: row.get(0)?,
            class_name: row.get(1)?,
            course_id: row.get(2)?,
            course_name: row.get(3)?,
            teacher_id: row.get(4)?,
            teacher_name: row.get(5)?,
            start_date: optional_date_column(row, 6)?,
        })
    })?;
    rows.collect()
}

// ── Enrollments ────────────────────────────────────────────────────

/// Enrolled students of a class, in enrollment order.
pub fn query_enrollments(
    conn: &Connection,
    class_id: i64,
) -> Result<Vec<Enrollment>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT e.enrollment_id, e.class_id, e.student_id, COALESCE(s.name, '')
         FROM enrollments e
         LEFT JOIN students s ON s.student_id = e.student_id
         WHERE e.class_id = ?1
         ORDER BY e.enrollment_id ASC",
    )?;
    let rows = stmt.query_map([class_id], |row| {
        Ok(Enrollment {
            enrollment_id: row.get(0)?,
            class_id: row.get(1)?,
            student_id: row.get(2)?,
            student_name: row.get(3)?,
        })
    })?;
    rows.collect()
}

// ── Sessions & attendance ──────────────────────────────────────────

pub fn query_sessions(conn: &Connection, class_id: i64) -> Result<Vec<Session>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT session_id, class_id, session_date
         FROM class_sessions
         WHERE class_id = ?1
         ORDER BY session_date ASC, session_id ASC",
    )?;
    let rows = stmt.query_map([class_id], |row| {
        Ok(Session {
            session_id: row.get(0)?,
            class_id: row.get(1)?,
            session_date: date_column(row, 2)?,
        })
    })?;
    rows.collect()
}

pub fn query_attendance(
    conn: &Connection,
    session_id: i64,
) -> Result<Vec<AttendanceMark>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT session_id, student_id, status
         FROM attendance
         WHERE session_id = ?1
         ORDER BY student_id ASC",
    )?;
    let rows = stmt.query_map([session_id], |row| {
        let status: String = row.get(2)?;
        Ok(AttendanceMark {
            session_id: row.get(0)?,
            student_id: row.get(1)?,
            status: AttendanceStatus::parse(&status),
        })
    })?;
    rows.collect()
}

// ── Assignments & submissions ──────────────────────────────────────

pub fn query_assignments(
    conn: &Connection,
    class_id: i64,
) -> Result<Vec<Assignment>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT assignment_id, class_id, title
         FROM assignments
         WHERE class_id = ?1
         ORDER BY assignment_id ASC",
    )?;
    let rows = stmt.query_map([class_id], |row| {
        Ok(Assignment {
            assignment_id: row.get(0)?,
            class_id: row.get(1)?,
            title: row.get(2)?,
        })
    })?;
    rows.collect()
}

pub fn query_submissions(
    conn: &Connection,
    assignment_id: i64,
) -> Result<Vec<Submission>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT submission_id, assignment_id, student_id, score
         FROM submissions
         WHERE assignment_id = ?1
         ORDER BY submission_id ASC",
    )?;
    let rows = stmt.query_map([assignment_id], |row| {
        Ok(Submission {
            submission_id: row.get(0)?,
            assignment_id: row.get(1)?,
            student_id: row.get(2)?,
            score: row.get(3)?,
        })
    })?;
    rows.collect()
}

// ── Writes (snapshot import) ───────────────────────────────────────

pub fn upsert_course(conn: &Connection, course_id: i64, name: &str) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO courses (course_id, name) VALUES (?1, ?2)
         ON CONFLICT(course_id) DO UPDATE SET name = excluded.name",
        params![course_id, name],
    )?;
    Ok(())
}

pub fn upsert_teacher(
    conn: &Connection,
    teacher_id: i64,
    name: &str,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO teachers (teacher_id, name) VALUES (?1, ?2)
         ON CONFLICT(teacher_id) DO UPDATE SET name = excluded.name",
        params![teacher_id, name],
    )?;
    Ok(())
}

pub fn upsert_student(
    conn: &Connection,
    student_id: i64,
    name: &str,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO students (student_id, name) VALUES (?1, ?2)
         ON CONFLICT(student_id) DO UPDATE SET name = excluded.name",
        params![student_id, name],
    )?;
    Ok(())
}

pub fn upsert_class(
    conn: &Connection,
    class_id: i64,
    name: &str,
    course_id: i64,
    teacher_id: Option<i64>,
    start_date: Option<NaiveDate>,
) -> Result<(), rusqlite::Error> {
    let start_date = start_date.map(|d| d.format("%Y-%m-%d").to_string());
    conn.execute(
        "INSERT INTO classes (class_id, name, course_id, teacher_id, start_date)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(class_id) DO UPDATE SET
            name = excluded.name, course_id = excluded.course_id,
            teacher_id = excluded.teacher_id, start_date = excluded.start_date",
        params![class_id, name, course_id, teacher_id, start_date],
    )?;
    Ok(())
}

pub fn upsert_enrollment(
    conn: &Connection,
    enrollment_id: i64,
    class_id: i64,
    student_id: i64,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO enrollments (enrollment_id, class_id, student_id)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(enrollment_id) DO UPDATE SET
            class_id = excluded.class_id, student_id = excluded.student_id",
        params![enrollment_id, class_id, student_id],
    )?;
    Ok(())
}

pub fn upsert_session(
    conn: &Connection,
    session_id: i64,
    class_id: i64,
    session_date: NaiveDate,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO class_sessions (session_id, class_id, session_date)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(session_id) DO UPDATE SET
            class_id = excluded.class_id, session_date = excluded.session_date",
        params![session_id, class_id, session_date.format("%Y-%m-%d").to_string()],
    )?;
    Ok(())
}

pub fn upsert_attendance(
    conn: &Connection,
    session_id: i64,
    student_id: i64,
    status: &AttendanceStatus,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO attendance (session_id, student_id, status) VALUES (?1, ?2, ?3)
         ON CONFLICT(session_id, student_id) DO UPDATE SET status = excluded.status",
        params![session_id, student_id, status.as_str()],
    )?;
    Ok(())
}

pub fn upsert_assignment(
    conn: &Connection,
    assignment_id: i64,
    class_id: i64,
    title: &str,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO assignments (assignment_id, class_id, title) VALUES (?1, ?2, ?3)
         ON CONFLICT(assignment_id) DO UPDATE SET
            class_id = excluded.class_id, title = excluded.title",
        params![assignment_id, class_id, title],
    )?;
    Ok(())
}

pub fn upsert_submission(
    conn: &Connection,
    submission_id: i64,
    assignment_id: i64,
    student_id: i64,
    score: Option<f64>,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO submissions (submission_id, assignment_id, student_id, score)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(submission_id) DO UPDATE SET
            assignment_id = excluded.assignment_id, student_id = excluded.student_id,
            score = excluded.score",
        params![submission_id, assignment_id, student_id, score],
    )?;
    Ok(())
}

// ── Config ─────────────────────────────────────────────────────────

pub fn get_config(conn: &Connection, key: &str) -> Result<Option<String>, rusqlite::Error> {
    conn.query_row(
        "SELECT value FROM app_config WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
}

pub fn set_config(conn: &Connection, key: &str, value: &str) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO app_config (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, value],
    )?;
    Ok(())
}

pub fn list_config(conn: &Connection) -> Result<Vec<(String, String)>, rusqlite::Error> {
    let mut stmt = conn.prepare("SELECT key, value FROM app_config ORDER BY key")?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.collect()
}

// ── Status ─────────────────────────────────────────────────────────

/// Row counts for each record table, in a fixed order.
pub fn table_counts(conn: &Connection) -> Result<Vec<(&'static str, i64)>, rusqlite::Error> {
    const TABLES: [&str; 9] = [
        "courses",
        "teachers",
        "students",
        "classes",
        "enrollments",
        "class_sessions",
        "attendance",
        "assignments",
        "submissions",
    ];
    TABLES
        .iter()
        .map(|table| {
            let count: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
            Ok((*table, count))
        })
        .collect()
}

fn date_column(row: &Row<'_>, idx: usize) -> Result<NaiveDate, rusqlite::Error> {
    let raw: String = row.get(idx)?;
    parse_date(&raw).ok_or_else(|| invalid_date(idx, &raw))
}

fn optional_date_column(row: &Row<'_>, idx: usize) -> Result<Option<NaiveDate>, rusqlite::Error> {
    let raw: Option<String> = row.get(idx)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_date(s).map(Some).ok_or_else(|| invalid_date(idx, s)),
    }
}

fn invalid_date(idx: usize, raw: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        Type::Text,
        format!("invalid date '{raw}'").into(),
    )
}
