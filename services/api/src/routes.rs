use crate::infra::{resolve_analysis_config, AppState, WeightOverrides};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use curriculum_attainment::config::AnalysisConfig;
use curriculum_attainment::error::AppError;
use curriculum_attainment::workflows::attainment::{
    AttainmentImporter, AttainmentReport, ReconciliationSummary,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use tracing::info;

#[derive(Debug, Deserialize)]
pub(crate) struct AttainmentReportRequest {
    pub(crate) scores_csv: String,
    pub(crate) matrix_csv: String,
    #[serde(default)]
    pub(crate) weights: WeightOverrides,
    #[serde(default)]
    pub(crate) threshold: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttainmentReportResponse {
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) summary: ReconciliationSummary,
    #[serde(flatten)]
    pub(crate) report: AttainmentReport,
}

pub(crate) fn attainment_routes() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/attainment/report", post(attainment_report_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Runs one reconciliation pass over the posted tables. Interactive weights
/// and threshold apply unless the request overrides them.
pub(crate) async fn attainment_report_endpoint(
    Json(payload): Json<AttainmentReportRequest>,
) -> Result<Json<AttainmentReportResponse>, AppError> {
    let AttainmentReportRequest {
        scores_csv,
        matrix_csv,
        weights,
        threshold,
    } = payload;

    let config = resolve_analysis_config(AnalysisConfig::interactive(), weights, threshold)
        .map_err(|err| AppError::InvalidRequest(err.to_string()))?;

    let report = AttainmentImporter::from_readers(
        Cursor::new(scores_csv.into_bytes()),
        Cursor::new(matrix_csv.into_bytes()),
        config,
    )?;
    let summary = report.summary();
    info!(
        matched = summary.matched_courses,
        unmatched = summary.unmatched_courses,
        flagged = summary.flagged_requirements,
        "attainment report generated"
    );

    Ok(Json(AttainmentReportResponse {
        generated_at: Utc::now(),
        summary,
        report,
    }))
}
