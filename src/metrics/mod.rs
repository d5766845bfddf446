pub mod types;

pub use types::*;

use std::collections::{HashMap, HashSet};

use crate::report::baseline::BaselineProvider;
use crate::storage::records::{AttendanceMark, Enrollment, Session, Submission};

/// Mean score a student needs across a class's assignments to pass.
pub const PASS_THRESHOLD: f64 = 50.0;

// ── Calculators ────────────────────────────────────────────────────
//
// None of these fail on empty input; each returns 0 instead.

/// Mean of the graded scores; ungraded (`None`) entries are skipped, not zeroed.
pub fn average_score(scores: impl IntoIterator<Item = Option<f64>>) -> f64 {
    let (sum, count) = scores
        .into_iter()
        .flatten()
        .fold((0.0, 0u64), |(sum, count), s| (sum + s, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Percentage (0–100) of enrolled students whose mean score reaches [`PASS_THRESHOLD`].
///
/// A student without graded scores fails.
pub fn pass_rate(enrolled: &[i64], scores_by_student: &HashMap<i64, Vec<f64>>) -> f64 {
    if enrolled.is_empty() {
        return 0.0;
    }
    let passing = enrolled
        .iter()
        .filter(|student_id| {
            scores_by_student
                .get(*student_id)
                .filter(|scores| !scores.is_empty())
                .is_some_and(|scores| {
                    average_score(scores.iter().copied().map(Some)) >= PASS_THRESHOLD
                })
        })
        .count();
    passing as f64 / enrolled.len() as f64 * 100.0
}

/// Mean over sessions of the percentage of enrolled students marked present.
///
/// Marks for students outside `enrolled` are ignored.
pub fn attendance_rate(
    sessions: &[i64],
    enrolled: &HashSet<i64>,
    present_by_session: &HashMap<i64, HashSet<i64>>,
) -> f64 {
    if sessions.is_empty() {
        return 0.0;
    }
    let total: f64 = sessions
        .iter()
        .map(|session_id| {
            if enrolled.is_empty() {
                return 0.0;
            }
            let present = present_by_session
                .get(session_id)
                .map_or(0, |students| students.intersection(enrolled).count());
            present as f64 / enrolled.len() as f64
        })
        .sum();
    total / sessions.len() as f64 * 100.0
}

/// Signed percent change from `previous` to `current`.
///
/// The divisor is `previous` clamped to at least 1, so baselines below one
/// point are measured in absolute points.
pub fn improvement(current: f64, previous: f64) -> f64 {
    (current - previous) / previous.max(1.0) * 100.0
}

pub fn round_score(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn round_rate(value: f64) -> f64 {
    value.round()
}

// ── Fact sets ──────────────────────────────────────────────────────

/// Every fact recorded for one class.
#[derive(Debug, Clone, Default)]
pub struct ClassFacts {
    pub enrollments: Vec<Enrollment>,
    pub sessions: Vec<Session>,
    pub attendance: Vec<AttendanceMark>,
    pub submissions: Vec<Submission>,
}

/// Class-level KPIs at full precision.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassMetrics {
    pub average_score: f64,
    pub pass_rate: f64,
    pub attendance_rate: f64,
    pub total_students: u64,
    pub graded_submissions: u64,
    pub improvement_rate: f64,
}

/// One enrolled student's KPIs at full precision.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentMetrics {
    pub student_id: i64,
    pub student_name: String,
    pub current_score: f64,
    pub previous_score: f64,
    pub attendance: f64,
    pub assignments_completed: u64,
    pub improvement_pct: f64,
}

impl From<&StudentMetrics> for StudentPerformance {
    fn from(m: &StudentMetrics) -> Self {
        StudentPerformance {
            student_id: m.student_id,
            student_name: m.student_name.clone(),
            current_score: round_score(m.current_score),
            previous_score: round_score(m.previous_score),
            attendance: round_rate(m.attendance),
            assignments_completed: m.assignments_completed,
            improvement_pct: round_score(m.improvement_pct),
        }
    }
}

impl ClassFacts {
    fn enrolled_ids(&self) -> Vec<i64> {
        let mut seen = HashSet::new();
        self.enrollments
            .iter()
            .map(|e| e.student_id)
            .filter(|id| seen.insert(*id))
            .collect()
    }

    fn scores_by_student(&self) -> HashMap<i64, Vec<f64>> {
        let mut map: HashMap<i64, Vec<f64>> = HashMap::new();
        for sub in &self.submissions {
            if let Some(score) = sub.score {
                map.entry(sub.student_id).or_default().push(score);
            }
        }
        map
    }

    fn present_by_session(&self) -> HashMap<i64, HashSet<i64>> {
        let mut map: HashMap<i64, HashSet<i64>> = HashMap::new();
        for mark in self.attendance.iter().filter(|m| m.status.is_present()) {
            map.entry(mark.session_id).or_default().insert(mark.student_id);
        }
        map
    }

    fn session_ids(&self) -> Vec<i64> {
        let mut seen = HashSet::new();
        self.sessions
            .iter()
            .map(|s| s.session_id)
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Per-student KPIs for every enrolled student, in enrollment order.
    pub fn student_metrics(
        &self,
        class_id: i64,
        baseline: &dyn BaselineProvider,
    ) -> Vec<StudentMetrics> {
        let scores = self.scores_by_student();
        let present = self.present_by_session();
        let sessions = self.session_ids();
        let mut seen = HashSet::new();

        self.enrollments
            .iter()
            .filter(|e| seen.insert(e.student_id))
            .map(|e| {
                let own = scores.get(&e.student_id).map(Vec::as_slice).unwrap_or(&[]);
                let current = average_score(own.iter().copied().map(Some));
                let attended = sessions
                    .iter()
                    .filter(|sid| present.get(*sid).is_some_and(|p| p.contains(&e.student_id)))
                    .count();
                let attendance = if sessions.is_empty() {
                    0.0
                } else {
                    attended as f64 / sessions.len() as f64 * 100.0
                };
                let previous = baseline
                    .previous_score(class_id, e.student_id, current)
                    .unwrap_or(0.0);

                StudentMetrics {
                    student_id: e.student_id,
                    student_name: e.student_name.clone(),
                    current_score: current,
                    previous_score: previous,
                    attendance,
                    assignments_completed: own.len() as u64,
                    improvement_pct: improvement(current, previous),
                }
            })
            .collect()
    }

    /// Class-level KPIs.
    ///
    /// `improvement_rate` is the mean improvement of enrolled students with at
    /// least one graded submission.
    pub fn class_metrics(&self, class_id: i64, baseline: &dyn BaselineProvider) -> ClassMetrics {
        let enrolled = self.enrolled_ids();
        let enrolled_set: HashSet<i64> = enrolled.iter().copied().collect();
        let scores = self.scores_by_student();

        let graded: Vec<f64> = self
            .student_metrics(class_id, baseline)
            .iter()
            .filter(|m| m.assignments_completed > 0)
            .map(|m| m.improvement_pct)
            .collect();

        ClassMetrics {
            average_score: average_score(self.submissions.iter().map(|s| s.score)),
            pass_rate: pass_rate(&enrolled, &scores),
            attendance_rate: attendance_rate(
                &self.session_ids(),
                &enrolled_set,
                &self.present_by_session(),
            ),
            total_students: enrolled.len() as u64,
            graded_submissions: self.submissions.iter().filter(|s| s.score.is_some()).count()
                as u64,
            improvement_rate: average_score(graded.into_iter().map(Some)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::baseline::FlatBaseline;
    use crate::storage::records::AttendanceStatus;
    use chrono::NaiveDate;

    fn enrollment(id: i64, student_id: i64) -> Enrollment {
        Enrollment {
            enrollment_id: id,
            class_id: 1,
            student_id,
            student_name: format!("Student {student_id}"),
        }
    }

    fn session(id: i64) -> Session {
        Session {
            session_id: id,
            class_id: 1,
            session_date: NaiveDate::from_ymd_opt(2025, 3, id as u32).unwrap(),
        }
    }

    fn mark(session_id: i64, student_id: i64, status: AttendanceStatus) -> AttendanceMark {
        AttendanceMark {
            session_id,
            student_id,
            status,
        }
    }

    fn submission(id: i64, student_id: i64, score: Option<f64>) -> Submission {
        Submission {
            submission_id: id,
            assignment_id: 1,
            student_id,
            score,
        }
    }

    /// Three students, two sessions (full, then half attended), scores 40/60/80.
    fn sample_class() -> ClassFacts {
        ClassFacts {
            enrollments: vec![enrollment(1, 1), enrollment(2, 2), enrollment(3, 3)],
            sessions: vec![session(1), session(2)],
            attendance: vec![
                mark(1, 1, AttendanceStatus::Present),
                mark(1, 2, AttendanceStatus::Present),
                mark(1, 3, AttendanceStatus::Present),
                mark(2, 1, AttendanceStatus::Present),
                mark(2, 2, AttendanceStatus::Absent),
                mark(2, 3, AttendanceStatus::Excused),
            ],
            submissions: vec![
                submission(1, 1, Some(40.0)),
                submission(2, 2, Some(60.0)),
                submission(3, 3, Some(80.0)),
            ],
        }
    }

    #[test]
    fn test_average_score_skips_ungraded() {
        assert_eq!(average_score([Some(40.0), None, Some(80.0)]), 60.0);
    }

    #[test]
    fn test_average_score_empty_is_zero() {
        assert_eq!(average_score(Vec::<Option<f64>>::new()), 0.0);
        assert_eq!(average_score([None, None]), 0.0);
    }

    #[test]
    fn test_pass_rate_counts_students_not_submissions() {
        let mut scores = HashMap::new();
        // One student with many passing submissions, one failing with one.
        scores.insert(1, vec![90.0, 95.0, 100.0]);
        scores.insert(2, vec![10.0]);
        assert_eq!(pass_rate(&[1, 2], &scores), 50.0);
    }

    #[test]
    fn test_pass_rate_student_without_scores_fails() {
        let mut scores = HashMap::new();
        scores.insert(1, vec![50.0]);
        assert_eq!(pass_rate(&[1, 2, 3, 4], &scores), 25.0);
    }

    #[test]
    fn test_pass_rate_no_students_is_zero() {
        assert_eq!(pass_rate(&[], &HashMap::new()), 0.0);
    }

    #[test]
    fn test_attendance_rate_no_sessions_is_zero() {
        let enrolled: HashSet<i64> = [1, 2].into_iter().collect();
        assert_eq!(attendance_rate(&[], &enrolled, &HashMap::new()), 0.0);
    }

    #[test]
    fn test_attendance_rate_no_students_is_zero() {
        assert_eq!(attendance_rate(&[1, 2], &HashSet::new(), &HashMap::new()), 0.0);
    }

    #[test]
    fn test_attendance_rate_ignores_unenrolled_marks() {
        let enrolled: HashSet<i64> = [1, 2].into_iter().collect();
        let mut present = HashMap::new();
        present.insert(10, [1, 2, 99].into_iter().collect::<HashSet<i64>>());
        assert_eq!(attendance_rate(&[10], &enrolled, &present), 100.0);
    }

    #[test]
    fn test_improvement() {
        assert_eq!(improvement(60.0, 50.0), 20.0);
        assert_eq!(improvement(40.0, 50.0), -20.0);
        // Baselines below 1 divide by 1.
        assert_eq!(improvement(5.0, 0.0), 500.0);
        assert_eq!(improvement(0.0, 0.0), 0.0);
        assert_eq!(improvement(5.0, 0.5), 450.0);
        assert_eq!(improvement(0.75, 0.5), 25.0);
        assert_eq!(improvement(2.0, 1.0), 100.0);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_score(66.666_666), 66.7);
        assert_eq!(round_score(59.94), 59.9);
        assert_eq!(round_rate(66.666_666), 67.0);
        assert_eq!(round_rate(74.5), 75.0);
    }

    #[test]
    fn test_sample_class_metrics() {
        let m = sample_class().class_metrics(1, &FlatBaseline);
        assert_eq!(m.average_score, 60.0);
        assert_eq!(m.total_students, 3);
        assert!((m.pass_rate - 200.0 / 3.0).abs() < 1e-9);
        // Session 1: 3/3, session 2: 1/3.
        assert!((m.attendance_rate - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(m.improvement_rate, 0.0);
    }

    #[test]
    fn test_rates_stay_in_bounds() {
        let mut facts = sample_class();
        // Duplicate marks and enrollments must not push rates past 100.
        facts.attendance.extend(facts.attendance.clone());
        facts.enrollments.push(enrollment(4, 1));
        let m = facts.class_metrics(1, &FlatBaseline);
        assert!((0.0..=100.0).contains(&m.pass_rate));
        assert!((0.0..=100.0).contains(&m.attendance_rate));
        assert_eq!(m.total_students, 3);
    }

    #[test]
    fn test_class_without_grades_or_students() {
        let m = ClassFacts::default().class_metrics(1, &FlatBaseline);
        assert_eq!(m, ClassMetrics::default());
        assert!(!m.average_score.is_nan());
    }

    #[test]
    fn test_student_metrics_cover_every_enrolled_student() {
        let mut facts = sample_class();
        facts.enrollments.push(enrollment(4, 4));
        facts.submissions.push(submission(4, 1, None));

        let students = facts.student_metrics(1, &FlatBaseline);
        assert_eq!(students.len(), 4);

        let first = &students[0];
        assert_eq!(first.current_score, 40.0);
        assert_eq!(first.assignments_completed, 1);
        assert_eq!(first.attendance, 100.0);

        let absent = &students[1];
        assert_eq!(absent.attendance, 50.0);

        let newcomer = &students[3];
        assert_eq!(newcomer.current_score, 0.0);
        assert_eq!(newcomer.assignments_completed, 0);
        assert_eq!(newcomer.attendance, 0.0);
    }

    #[test]
    fn test_student_performance_rounds_at_boundary() {
        let m = StudentMetrics {
            student_id: 1,
            student_name: "Ana".into(),
            current_score: 72.345,
            previous_score: 70.0,
            attendance: 66.666,
            assignments_completed: 3,
            improvement_pct: 3.36,
        };
        let row = StudentPerformance::from(&m);
        assert_eq!(row.current_score, 72.3);
        assert_eq!(row.attendance, 67.0);
        assert_eq!(row.improvement_pct, 3.4);
    }
}
