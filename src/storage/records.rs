//! Normalized records as handed to the reporting core.
//!
//! Row decoding (text dates, status strings) happens in the repository; these
//! types carry already-parsed values.

use chrono::NaiveDate;
use serde::Serialize;

/// A class joined with its course and teacher names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassRecord {
    pub class_id: i64,
    pub class_name: String,
    pub course_id: i64,
    pub course_name: String,
    pub teacher_id: Option<i64>,
    pub teacher_name: Option<String>,
    pub start_date: Option<NaiveDate>,
}

/// One student's membership in one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Enrollment {
    pub enrollment_id: i64,
    pub class_id: i64,
    pub student_id: i64,
    pub student_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub session_id: i64,
    pub class_id: i64,
    pub session_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Excused,
    Late,
    #[serde(untagged)]
    Other(String),
}

impl AttendanceStatus {
    /// Case-insensitive mapping of the stored status text.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PRESENT" => AttendanceStatus::Present,
            "ABSENT" => AttendanceStatus::Absent,
            "EXCUSED" => AttendanceStatus::Excused,
            "LATE" => AttendanceStatus::Late,
            other => AttendanceStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AttendanceStatus::Present => "PRESENT",
            AttendanceStatus::Absent => "ABSENT",
            AttendanceStatus::Excused => "EXCUSED",
            AttendanceStatus::Late => "LATE",
            AttendanceStatus::Other(s) => s,
        }
    }

    /// Only an explicit PRESENT mark counts toward attendance.
    pub fn is_present(&self) -> bool {
        matches!(self, AttendanceStatus::Present)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceMark {
    pub session_id: i64,
    pub student_id: i64,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub assignment_id: i64,
    pub class_id: i64,
    pub title: String,
}

/// A submission; `score` is `None` until graded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub submission_id: i64,
    pub assignment_id: i64,
    pub student_id: i64,
    pub score: Option<f64>,
}
