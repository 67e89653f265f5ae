use axum::{extract::State, Json};
use chrono::Utc;

use crate::dto::CronStatusResponse;
use crate::error::AppResult;
use crate::month::MonthKey;
use crate::services::monthly_report::{run_monthly_batch, BatchMode, BatchSummary};
use crate::AppState;

pub async fn cron_status() -> Json<CronStatusResponse> {
    Json(CronStatusResponse {
        status: "ok",
        message: "Monthly report cron endpoint is active",
        timestamp: Utc::now(),
    })
}

/// Generates last month's report for every user with dreams in it.
pub async fn run_monthly_reports(State(state): State<AppState>) -> AppResult<Json<BatchSummary>> {
    let month = MonthKey::previous();
    tracing::info!(%month, "Cron: monthly report batch started");
    let summary = run_monthly_batch(
        state.store.as_ref(),
        &state.strategy,
        month,
        state.config.batch_concurrency,
        BatchMode::Regenerate,
    )
    .await?;
    Ok(Json(summary))
}
