use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::metrics::{ReportDetail, StudentPerformance};
use crate::query::ClassQuery;
use crate::report::baseline::BaselineProvider;
use crate::report::id::ReportId;
use crate::report::planner::{build_report, class_period, load_class_facts};
use crate::storage::store::RecordStore;

/// Expand one `PERF-<classId>` report into per-student rows.
///
/// The embedded report is built exactly as the list endpoint builds it, so
/// the two always agree. Unknown ids, malformed ids and classes with no
/// enrolled students all resolve to [`Error::NotFound`].
pub async fn resolve_report(
    store: &dyn RecordStore,
    baseline: &dyn BaselineProvider,
    record_id: &str,
    today: NaiveDate,
) -> Result<ReportDetail> {
    let id = ReportId::parse(record_id)
        .map_err(|_| Error::NotFound(format!("report {record_id}")))?;
    let class_id = id.class_id();

    let class = store
        .query_classes(&ClassQuery::new().class(class_id))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| Error::NotFound(format!("report {id}")))?;

    let sessions = store.query_sessions(class_id).await?;
    let (period, source) = class_period(&class, &sessions, today);
    let facts = load_class_facts(store, class_id, sessions).await?;
    if facts.enrollments.is_empty() {
        return Err(Error::NotFound(format!("report {id} has no enrolled students")));
    }

    let report = build_report(&class, &facts, period, source, baseline);
    let mut students: Vec<StudentPerformance> = facts
        .student_metrics(class_id, baseline)
        .iter()
        .map(StudentPerformance::from)
        .collect();
    // Stable: equal scores keep enrollment order.
    students.sort_by(|a, b| b.current_score.total_cmp(&a.current_score));

    log::debug!("resolved {id} with {} students", students.len());
    Ok(ReportDetail { report, students })
}
