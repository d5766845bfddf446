use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::error::Result;
use crate::metrics::{round_rate, round_score, ClassFacts, PerformanceReport};
use crate::query::{PeriodKey, PeriodSource, ReportFilter};
use crate::report::baseline::BaselineProvider;
use crate::report::id::ReportId;
use crate::storage::records::{ClassRecord, Session};
use crate::storage::store::RecordStore;

/// Load the remaining facts of a class whose sessions are already known.
pub async fn load_class_facts(
    store: &dyn RecordStore,
    class_id: i64,
    sessions: Vec<Session>,
) -> Result<ClassFacts> {
    let enrollments = store.query_enrollments(class_id).await?;

    let mut attendance = Vec::new();
    for session in &sessions {
        attendance.extend(store.query_attendance(session.session_id).await?);
    }

    let mut submissions = Vec::new();
    for assignment in store.query_assignments(class_id).await? {
        submissions.extend(store.query_submissions(assignment.assignment_id).await?);
    }

    Ok(ClassFacts {
        enrollments,
        sessions,
        attendance,
        submissions,
    })
}

/// Build one report per class matching `filter`, sorted for display.
pub async fn plan_reports(
    store: &dyn RecordStore,
    baseline: &dyn BaselineProvider,
    filter: &ReportFilter,
    today: NaiveDate,
) -> Result<Vec<PerformanceReport>> {
    let classes = store.query_classes(&filter.class_query()).await?;
    log::debug!("{} candidate classes for {filter:?}", classes.len());

    let mut reports = Vec::with_capacity(classes.len());
    for class in &classes {
        let sessions = store.query_sessions(class.class_id).await?;
        let Some((period, source)) = matched_period(class, &sessions, filter, today) else {
            log::debug!("class {} skipped by period filter", class.class_id);
            continue;
        };
        log::debug!("planning class {} for {period} ({source:?})", class.class_id);
        let facts = load_class_facts(store, class.class_id, sessions).await?;
        reports.push(build_report(class, &facts, period, source, baseline));
    }

    sort_reports(&mut reports);
    Ok(reports)
}

pub(crate) fn class_period(
    class: &ClassRecord,
    sessions: &[Session],
    today: NaiveDate,
) -> (PeriodKey, PeriodSource) {
    let derived = PeriodKey::derive(sessions.iter().map(|s| s.session_date), class.start_date, today);
    if derived.1 == PeriodSource::Today {
        log::warn!(
            "class {} has no sessions or start date; reporting under {}",
            class.class_id,
            derived.0
        );
    }
    derived
}

/// The earliest period with a session that satisfies the month and year
/// filters. A class without sessions is held to its fallback period.
pub(crate) fn matched_period(
    class: &ClassRecord,
    sessions: &[Session],
    filter: &ReportFilter,
    today: NaiveDate,
) -> Option<(PeriodKey, PeriodSource)> {
    if sessions.is_empty() {
        let derived = class_period(class, sessions, today);
        return filter.matches_period(derived.0).then_some(derived);
    }
    sessions
        .iter()
        .map(|s| PeriodKey::of(s.session_date))
        .filter(|p| filter.matches_period(*p))
        .min()
        .map(|p| (p, PeriodSource::FirstSession))
}

pub(crate) fn build_report(
    class: &ClassRecord,
    facts: &ClassFacts,
    period: PeriodKey,
    source: PeriodSource,
    baseline: &dyn BaselineProvider,
) -> PerformanceReport {
    let m = facts.class_metrics(class.class_id, baseline);

    let mut notes = Vec::new();
    match source {
        PeriodSource::FirstSession => {}
        PeriodSource::ClassStart => {
            notes.push("no sessions recorded; period taken from class start date")
        }
        PeriodSource::Today => notes.push("no sessions or start date; period taken from today"),
    }
    if m.total_students == 0 {
        notes.push("no enrolled students");
    }
    if m.graded_submissions == 0 {
        notes.push("no graded submissions");
    }

    PerformanceReport {
        id: ReportId::for_class(class.class_id),
        class_id: class.class_id,
        class_name: class.class_name.clone(),
        course_id: class.course_id,
        course_name: class.course_name.clone(),
        teacher_id: class.teacher_id,
        teacher_name: class.teacher_name.clone(),
        month: period.month,
        year: period.year,
        average_score: round_score(m.average_score),
        pass_rate: round_rate(m.pass_rate),
        attendance_rate: round_rate(m.attendance_rate),
        total_students: m.total_students,
        high_performers: 0,
        low_performers: 0,
        improvement_rate: round_score(m.improvement_rate),
        notes: (!notes.is_empty()).then(|| notes.join("; ")),
    }
}

/// Newest period first, then course name, then class id.
pub fn sort_reports(reports: &mut [PerformanceReport]) {
    reports.sort_by(compare_reports);
}

fn compare_reports(a: &PerformanceReport, b: &PerformanceReport) -> Ordering {
    b.year
        .cmp(&a.year)
        .then(b.month.cmp(&a.month))
        .then_with(|| a.course_name.cmp(&b.course_name))
        .then(a.class_id.cmp(&b.class_id))
}
