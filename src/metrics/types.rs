use serde::Serialize;

use crate::report::id::ReportId;

/// One class's KPI summary for its reporting period.
///
/// Scores are rounded to one decimal and rates to whole percent; see
/// [`super::round_score`] and [`super::round_rate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    pub id: ReportId,
    pub class_id: i64,
    pub class_name: String,
    pub course_id: i64,
    pub course_name: String,
    pub teacher_id: Option<i64>,
    pub teacher_name: Option<String>,
    pub month: u32,
    pub year: i32,
    pub average_score: f64,
    pub pass_rate: f64,
    pub attendance_rate: f64,
    pub total_students: u64,
    /// Not yet computed; always 0 until a threshold is agreed.
    pub high_performers: u64,
    /// Not yet computed; always 0 until a threshold is agreed.
    pub low_performers: u64,
    pub improvement_rate: f64,
    pub notes: Option<String>,
}

/// Per-student row of a drill-down.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPerformance {
    pub student_id: i64,
    pub student_name: String,
    pub current_score: f64,
    pub previous_score: f64,
    pub attendance: f64,
    pub assignments_completed: u64,
    pub improvement_pct: f64,
}

/// A report expanded with its students, best score first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDetail {
    #[serde(flatten)]
    pub report: PerformanceReport,
    pub students: Vec<StudentPerformance>,
}

/// Center-wide rollup.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub average_score: f64,
    /// Number of classes. Named after courses for compatibility with callers.
    pub total_courses: u64,
    pub high_performing: u64,
    pub low_performing: u64,
    pub overall_improvement: f64,
}
