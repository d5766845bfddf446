use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::query::builder::ClassQuery;
use crate::storage::records::{
    Assignment, AttendanceMark, ClassRecord, Enrollment, Session, Submission,
};
use crate::storage::{repository, Database};

/// Read access to the education-center records.
///
/// Implementations bound every call by their own deadline and surface
/// failures as typed errors; callers never retry.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn query_classes(&self, query: &ClassQuery) -> Result<Vec<ClassRecord>>;
    async fn query_enrollments(&self, class_id: i64) -> Result<Vec<Enrollment>>;
    async fn query_sessions(&self, class_id: i64) -> Result<Vec<Session>>;
    async fn query_attendance(&self, session_id: i64) -> Result<Vec<AttendanceMark>>;
    async fn query_assignments(&self, class_id: i64) -> Result<Vec<Assignment>>;
    async fn query_submissions(&self, assignment_id: i64) -> Result<Vec<Submission>>;
}

/// [`RecordStore`] backed by the local SQLite database.
#[derive(Clone)]
pub struct SqliteStore {
    db: Database,
    deadline: Duration,
}

impl SqliteStore {
    pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(5);

    pub fn new(db: Database) -> Self {
        Self {
            db,
            deadline: Self::DEFAULT_DEADLINE,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn query_classes(&self, query: &ClassQuery) -> Result<Vec<ClassRecord>> {
        let query = query.clone();
        self.db
            .read(self.deadline, move |conn| repository::query_classes(conn, &query))
            .await
    }

    async fn query_enrollments(&self, class_id: i64) -> Result<Vec<Enrollment>> {
        self.db
            .read(self.deadline, move |conn| {
                repository::query_enrollments(conn, class_id)
            })
            .await
    }

    async fn query_sessions(&self, class_id: i64) -> Result<Vec<Session>> {
        self.db
            .read(self.deadline, move |conn| repository::query_sessions(conn, class_id))
            .await
    }

    async fn query_attendance(&self, session_id: i64) -> Result<Vec<AttendanceMark>> {
        self.db
            .read(self.deadline, move |conn| {
                repository::query_attendance(conn, session_id)
            })
            .await
    }

    async fn query_assignments(&self, class_id: i64) -> Result<Vec<Assignment>> {
        self.db
            .read(self.deadline, move |conn| {
                repository::query_assignments(conn, class_id)
            })
            .await
    }

    async fn query_submissions(&self, assignment_id: i64) -> Result<Vec<Submission>> {
        self.db
            .read(self.deadline, move |conn| {
                repository::query_submissions(conn, assignment_id)
            })
            .await
    }
}
