pub mod api;
pub mod config;
pub mod date_util;
pub mod error;
pub mod metrics;
pub mod query;
pub mod report;
pub mod storage;

use std::sync::Arc;

pub use config::{BaselinePolicy, Settings};
pub use error::{Error, Result};
pub use metrics::{PerformanceReport, PerformanceSummary, ReportDetail, StudentPerformance};
pub use query::{RawReportFilter, ReportFilter};
pub use report::{BaselineProvider, ReportId};
pub use storage::import::{import_snapshot, ImportReport, Snapshot};
pub use storage::store::{RecordStore, SqliteStore};
pub use storage::Database;

/// Main entry point for performance reporting.
///
/// Holds no per-request state; every call recomputes from the record store.
pub struct PerformanceEngine {
    store: Arc<dyn RecordStore>,
    baseline: Arc<dyn BaselineProvider>,
}

impl PerformanceEngine {
    pub fn new(store: Arc<dyn RecordStore>, baseline: Arc<dyn BaselineProvider>) -> Self {
        Self { store, baseline }
    }

    /// Engine over the local database, configured from `settings`.
    pub fn from_database(db: Database, settings: &Settings) -> Self {
        let store = SqliteStore::new(db).with_deadline(settings.query_timeout());
        Self::new(Arc::new(store), settings.baseline())
    }

    pub fn baseline(&self) -> &dyn BaselineProvider {
        self.baseline.as_ref()
    }

    // ── Reports ────────────────────────────────────────────────────

    /// Validate raw filters, then list reports. Malformed filters fail before
    /// any record is read.
    pub async fn list_reports(&self, raw: &RawReportFilter) -> Result<Vec<PerformanceReport>> {
        let filter = ReportFilter::from_raw(raw)?;
        self.list_reports_filtered(&filter).await
    }

    pub async fn list_reports_filtered(
        &self,
        filter: &ReportFilter,
    ) -> Result<Vec<PerformanceReport>> {
        report::plan_reports(
            self.store.as_ref(),
            self.baseline.as_ref(),
            filter,
            date_util::today(),
        )
        .await
    }

    pub async fn report_detail(&self, record_id: &str) -> Result<ReportDetail> {
        report::resolve_report(
            self.store.as_ref(),
            self.baseline.as_ref(),
            record_id,
            date_util::today(),
        )
        .await
    }

    // ── Summary ────────────────────────────────────────────────────

    pub async fn summary(&self) -> Result<PerformanceSummary> {
        report::summarize(self.store.as_ref(), self.baseline.as_ref()).await
    }
}
