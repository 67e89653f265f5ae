//! Monthly report orchestration: per-user generation and the batch driver.

use futures_util::{stream, StreamExt};
use serde::Serialize;
use uuid::Uuid;

use super::store::{DreamStore, StoreError};
use crate::analysis::evolution::LOOKBACK_MONTHS;
use crate::analysis::{
    average_intensity, compute_evolution, determine_archetype, dominant_emotion, DreamAnalysis,
    Emotion, EvolutionData,
};
use crate::models::report::MonthlyReport;
use crate::month::MonthKey;
use crate::strategy::ClassificationStrategy;

/// Error messages kept in a batch summary.
pub const MAX_BATCH_ERRORS: usize = 10;

#[derive(Debug)]
pub enum ReportOutcome {
    Generated(MonthlyReport),
    /// No dreams recorded for the month. Not a failure.
    InsufficientData,
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to load dreams: {0}")]
    Load(StoreError),
    #[error("failed to save report: {0}")]
    Save(StoreError),
}

/// Per-month analyses for the `LOOKBACK_MONTHS` months before `month`,
/// most recent first.
async fn prior_months(
    store: &dyn DreamStore,
    user_id: Uuid,
    month: MonthKey,
) -> Result<Vec<(MonthKey, Vec<DreamAnalysis>)>, StoreError> {
    let mut months = Vec::with_capacity(LOOKBACK_MONTHS as usize);
    for n in 1..=LOOKBACK_MONTHS {
        let key = month.months_back(n);
        let (start, end) = key.range();
        months.push((key, store.analyses_between(user_id, start, end).await?));
    }
    Ok(months)
}

/// Evolution of `month` against the preceding months. `None` when the
/// month has no dreams.
pub async fn evolution_for(
    store: &dyn DreamStore,
    user_id: Uuid,
    month: MonthKey,
) -> Result<Option<EvolutionData>, StoreError> {
    let (start, end) = month.range();
    let current = store.analyses_between(user_id, start, end).await?;
    if current.is_empty() {
        return Ok(None);
    }
    let prior = prior_months(store, user_id, month).await?;
    Ok(compute_evolution(month, &current, &prior))
}

async fn upsert_with_retry(
    store: &dyn DreamStore,
    user_id: Uuid,
    month: MonthKey,
    report: &crate::analysis::MonthlyWellnessReport,
) -> Result<MonthlyReport, StoreError> {
    match store.upsert_monthly_report(user_id, month, report).await {
        Err(StoreError::Conflict(reason)) => {
            tracing::debug!(%user_id, %month, %reason, "Report upsert conflicted, retrying");
            store.upsert_monthly_report(user_id, month, report).await
        }
        other => other,
    }
}

/// Builds and stores the report for `(user_id, month)`, overwriting any
/// previous one.
pub async fn generate_monthly_report(
    store: &dyn DreamStore,
    strategy: &ClassificationStrategy,
    user_id: Uuid,
    month: MonthKey,
) -> Result<ReportOutcome, ReportError> {
    let (start, end) = month.range();
    let analyses = store
        .analyses_between(user_id, start, end)
        .await
        .map_err(ReportError::Load)?;
    if analyses.is_empty() {
        return Ok(ReportOutcome::InsufficientData);
    }

    let mut report = strategy.analyze_wellness(&analyses).await;
    let themes = strategy.detect_themes(&analyses).await;

    let evolution = match prior_months(store, user_id, month).await {
        Ok(prior) => compute_evolution(month, &analyses, &prior),
        Err(e) => {
            tracing::warn!(%user_id, %month, error = %e, "Evolution unavailable, report saved without it");
            None
        }
    };

    let archetype = determine_archetype(
        &themes.dominant_themes,
        dominant_emotion(&analyses).unwrap_or(Emotion::Neutral),
        average_intensity(&analyses),
    );

    report.dominant_themes = Some(themes.dominant_themes);
    report.theme_explanation = Some(themes.theme_explanation);
    report.archetype = Some(archetype.archetype.as_str().to_string());
    report.evolution_summary = evolution.map(|e| e.evolution_summary);

    let saved = upsert_with_retry(store, user_id, month, &report)
        .await
        .map_err(ReportError::Save)?;

    tracing::info!(
        %user_id,
        %month,
        dreams = analyses.len(),
        mental_state = saved.mental_state.as_str(),
        "Monthly report generated"
    );
    Ok(ReportOutcome::Generated(saved))
}

/// Whether a batch rebuilds reports that already exist for the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMode {
    Regenerate,
    /// Users with a stored report for the month count as skipped.
    MissingOnly,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub month: MonthKey,
    pub processed: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

/// `None` when `MissingOnly` found a stored report.
async fn batch_report(
    store: &dyn DreamStore,
    strategy: &ClassificationStrategy,
    user_id: Uuid,
    month: MonthKey,
    mode: BatchMode,
) -> Result<Option<ReportOutcome>, ReportError> {
    if mode == BatchMode::MissingOnly {
        let existing = store
            .find_monthly_report(user_id, month)
            .await
            .map_err(ReportError::Load)?;
        if existing.is_some() {
            return Ok(None);
        }
    }
    generate_monthly_report(store, strategy, user_id, month)
        .await
        .map(Some)
}

/// Generates `month` reports for every user with dreams in that month.
///
/// Users are independent: a failure is counted and recorded, never
/// propagated. Only listing the users can fail the whole run.
pub async fn run_monthly_batch(
    store: &dyn DreamStore,
    strategy: &ClassificationStrategy,
    month: MonthKey,
    concurrency: usize,
    mode: BatchMode,
) -> Result<BatchSummary, StoreError> {
    let (start, end) = month.range();
    let users = store.users_with_dreams_between(start, end).await?;

    let results: Vec<(Uuid, Result<Option<ReportOutcome>, ReportError>)> = stream::iter(users)
        .map(|user_id| async move {
            let outcome = batch_report(store, strategy, user_id, month, mode).await;
            (user_id, outcome)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut summary = BatchSummary {
        month,
        processed: results.len(),
        succeeded: 0,
        skipped: 0,
        failed: 0,
        errors: Vec::new(),
    };
    for (user_id, result) in results {
        match result {
            Ok(Some(ReportOutcome::Generated(_))) => summary.succeeded += 1,
            Ok(Some(ReportOutcome::InsufficientData) | None) => summary.skipped += 1,
            Err(e) => {
                tracing::warn!(%user_id, %month, error = %e, "Monthly report failed");
                summary.failed += 1;
                if summary.errors.len() < MAX_BATCH_ERRORS {
                    summary.errors.push(format!("User {user_id}: {e}"));
                }
            }
        }
    }

    tracing::info!(
        %month,
        processed = summary.processed,
        succeeded = summary.succeeded,
        skipped = summary.skipped,
        failed = summary.failed,
        "Monthly report batch finished"
    );
    Ok(summary)
}
