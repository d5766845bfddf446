//! HTTP surface over [`PerformanceEngine`].

pub mod error;

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};

use crate::error::{Error, Result};
use crate::metrics::{PerformanceReport, PerformanceSummary, ReportDetail};
use crate::query::RawReportFilter;
use crate::PerformanceEngine;

pub use error::ApiError;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<PerformanceEngine>,
}

impl AppState {
    pub fn new(engine: Arc<PerformanceEngine>) -> Self {
        Self { engine }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/performance/reports", get(list_reports))
        .route("/performance/reports/{record_id}", get(get_report))
        .route("/performance/summary", get(get_summary))
        .with_state(state)
}

async fn list_reports(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<RawReportFilter>,
) -> std::result::Result<Json<Vec<PerformanceReport>>, ApiError> {
    let reports = state.engine.list_reports(&filter).await?;
    Ok(Json(reports))
}

async fn get_report(
    State(state): State<Arc<AppState>>,
    Path(record_id): Path<String>,
) -> std::result::Result<Json<ReportDetail>, ApiError> {
    let detail = state.engine.report_detail(&record_id).await?;
    Ok(Json(detail))
}

async fn get_summary(
    State(state): State<Arc<AppState>>,
) -> std::result::Result<Json<PerformanceSummary>, ApiError> {
    let summary = state.engine.summary().await?;
    Ok(Json(summary))
}

/// Serve the API on `addr` until Ctrl+C.
pub async fn serve(engine: Arc<PerformanceEngine>, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Config(format!("cannot bind {addr}: {e}")))?;
    let local = listener
        .local_addr()
        .map_err(|e| Error::Other(e.to_string()))?;
    log::info!(
        "serving performance reports on http://{local} ({} baseline)",
        engine.baseline().name()
    );

    let app = router(Arc::new(AppState::new(engine)));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::Other(e.to_string()))?;

    log::info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("could not listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("shutdown signal received");
}
