use crate::error::Result;
use crate::metrics::{average_score, round_score, PerformanceSummary};
use crate::query::ClassQuery;
use crate::report::baseline::BaselineProvider;
use crate::storage::store::RecordStore;

/// Center-wide summary across every class, ignoring period filters.
///
/// `average_score` pools every graded submission in the center, so large
/// classes weigh more than small ones. `total_courses` counts classes.
pub async fn summarize(
    store: &dyn RecordStore,
    baseline: &dyn BaselineProvider,
) -> Result<PerformanceSummary> {
    let classes = store.query_classes(&ClassQuery::new()).await?;

    let mut scores = Vec::new();
    for class in &classes {
        for assignment in store.query_assignments(class.class_id).await? {
            let submissions = store.query_submissions(assignment.assignment_id).await?;
            scores.extend(submissions.into_iter().map(|s| s.score));
        }
    }

    let average = average_score(scores);
    log::debug!(
        "summary over {} classes, average {average:.2} ({} baseline)",
        classes.len(),
        baseline.name()
    );

    Ok(PerformanceSummary {
        average_score: round_score(average),
        total_courses: classes.len() as u64,
        high_performing: 0,
        low_performing: 0,
        overall_improvement: round_score(baseline.overall_improvement(average)),
    })
}
