//! Loading a JSON snapshot of the record tables.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::storage::records::AttendanceStatus;
use crate::storage::{repository, Database};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub courses: Vec<NamedRow>,
    pub teachers: Vec<NamedRow>,
    pub students: Vec<NamedRow>,
    pub classes: Vec<ClassRow>,
    pub enrollments: Vec<EnrollmentRow>,
    pub sessions: Vec<SessionRow>,
    pub attendance: Vec<AttendanceRow>,
    pub assignments: Vec<AssignmentRow>,
    pub submissions: Vec<SubmissionRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedRow {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassRow {
    pub id: i64,
    pub name: String,
    pub course_id: i64,
    pub teacher_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentRow {
    pub id: i64,
    pub class_id: i64,
    pub student_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRow {
    pub id: i64,
    pub class_id: i64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRow {
    pub session_id: i64,
    pub student_id: i64,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentRow {
    pub id: i64,
    pub class_id: i64,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRow {
    pub id: i64,
    pub assignment_id: i64,
    pub student_id: i64,
    pub score: Option<f64>,
}

/// Row counts written by an import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub classes: usize,
    pub enrollments: usize,
    pub sessions: usize,
    pub attendance: usize,
    pub submissions: usize,
}

impl Snapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn report(&self) -> ImportReport {
        ImportReport {
            classes: self.classes.len(),
            enrollments: self.enrollments.len(),
            sessions: self.sessions.len(),
            attendance: self.attendance.len(),
            submissions: self.submissions.len(),
        }
    }
}

/// Write a snapshot in a single transaction; any failing row rolls back the whole import.
pub async fn import_snapshot(db: &Database, snapshot: Snapshot) -> Result<ImportReport> {
    let report = snapshot.report();
    db.writer()
        .call(move |conn| {
            let tx = conn.transaction()?;
            for c in &snapshot.courses {
                repository::upsert_course(&tx, c.id, &c.name)?;
            }
            for t in &snapshot.teachers {
                repository::upsert_teacher(&tx, t.id, &t.name)?;
            }
            for s in &snapshot.students {
                repository::upsert_student(&tx, s.id, &s.name)?;
            }
            for c in &snapshot.classes {
                repository::upsert_class(&tx, c.id, &c.name, c.course_id, c.teacher_id, c.start_date)?;
            }
            for e in &snapshot.enrollments {
                repository::upsert_enrollment(&tx, e.id, e.class_id, e.student_id)?;
            }
            for s in &snapshot.sessions {
                repository::upsert_session(&tx, s.id, s.class_id, s.date)?;
            }
            for a in &snapshot.attendance {
                let status = AttendanceStatus::parse(&a.status);
                repository::upsert_attendance(&tx, a.session_id, a.student_id, &status)?;
            }
            for a in &snapshot.assignments {
                repository::upsert_assignment(&tx, a.id, a.class_id, &a.title)?;
            }
            for s in &snapshot.submissions {
                repository::upsert_submission(&tx, s.id, s.assignment_id, s.student_id, s.score)?;
            }
            tx.commit()?;
            Ok::<(), rusqlite::Error>(())
        })
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

    log::info!(
        "imported {} classes, {} enrollments, {} sessions, {} submissions",
        report.classes,
        report.enrollments,
        report.sessions,
        report.submissions
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ClassQuery;

    const SNAPSHOT: &str = r#"{
        "courses": [{"id": 1, "name": "Algebra"}],
        "teachers": [{"id": 5, "name": "Mr. Okafor"}],
        "students": [{"id": 1, "name": "Ana"}, {"id": 2, "name": "Ben"}],
        "classes": [{"id": 7, "name": "ALG-A", "course_id": 1, "teacher_id": 5, "start_date": "2025-01-06"}],
        "enrollments": [{"id": 1, "class_id": 7, "student_id": 1}, {"id": 2, "class_id": 7, "student_id": 2}],
        "sessions": [{"id": 1, "class_id": 7, "date": "2025-01-08"}],
        "attendance": [{"session_id": 1, "student_id": 1, "status": "present"}],
        "assignments": [{"id": 1, "class_id": 7, "title": "Quiz"}],
        "submissions": [{"id": 1, "assignment_id": 1, "student_id": 1, "score": 72.5},
                        {"id": 2, "assignment_id": 1, "student_id": 2, "score": null}]
    }"#;

    #[tokio::test]
    async fn test_import_snapshot() {
        let db = Database::open_memory().await.unwrap();
        let snapshot = Snapshot::from_json(SNAPSHOT).unwrap();
        let report = import_snapshot(&db, snapshot).await.unwrap();
        assert_eq!(report.classes, 1);
        assert_eq!(report.enrollments, 2);
        assert_eq!(report.submissions, 2);

        let classes = db
            .reader()
            .call(|conn| repository::query_classes(conn, &ClassQuery::new()))
            .await
            .unwrap();
        assert_eq!(classes[0].teacher_name.as_deref(), Some("Mr. Okafor"));

        let marks = db
            .reader()
            .call(|conn| repository::query_attendance(conn, 1))
            .await
            .unwrap();
        assert_eq!(marks[0].status, AttendanceStatus::Present);
    }

    #[tokio::test]
    async fn test_import_is_idempotent() {
        let db = Database::open_memory().await.unwrap();
        import_snapshot(&db, Snapshot::from_json(SNAPSHOT).unwrap()).await.unwrap();
        import_snapshot(&db, Snapshot::from_json(SNAPSHOT).unwrap()).await.unwrap();

        let enrollments = db
            .reader()
            .call(|conn| repository::query_enrollments(conn, 7))
            .await
            .unwrap();
        assert_eq!(enrollments.len(), 2);
    }

    #[tokio::test]
    async fn test_import_rolls_back_on_bad_reference() {
        let db = Database::open_memory().await.unwrap();
        let snapshot = Snapshot::from_json(
            r#"{"courses": [{"id": 1, "name": "Algebra"}],
                "classes": [{"id": 7, "name": "ALG-A", "course_id": 99}]}"#,
        )
        .unwrap();
        assert!(import_snapshot(&db, snapshot).await.is_err());

        let courses: i64 = db
            .reader()
            .call(|conn| conn.query_row("SELECT COUNT(*) FROM courses", [], |row| row.get(0)))
            .await
            .unwrap();
        assert_eq!(courses, 0);
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let snapshot = Snapshot::from_json(r#"{"courses": []}"#).unwrap();
        assert!(snapshot.classes.is_empty());
        assert!(snapshot.submissions.is_empty());
    }
}
