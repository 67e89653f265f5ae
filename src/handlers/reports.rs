use axum::{
    extract::{Query, State},
    Extension, Json,
};
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::dto::{EvolutionResponse, GenerateReportRequest, MonthQuery, MonthlyReportResponse};
use crate::error::{AppError, AppResult};
use crate::month::MonthKey;
use crate::services::monthly_report::{evolution_for, generate_monthly_report, ReportOutcome};
use crate::AppState;

const NO_DREAMS_MESSAGE: &str = "No dreams found for this month";

async fn generate(state: &AppState, auth_user: &AuthUser, month: MonthKey) -> AppResult<MonthlyReportResponse> {
    let outcome = generate_monthly_report(state.store.as_ref(), &state.strategy, auth_user.id, month)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    Ok(match outcome {
        ReportOutcome::Generated(report) => MonthlyReportResponse {
            month,
            report: Some(report),
            message: None,
        },
        ReportOutcome::InsufficientData => MonthlyReportResponse {
            month,
            report: None,
            message: Some(NO_DREAMS_MESSAGE.into()),
        },
    })
}

/// Returns the stored report, generating it on first access.
pub async fn get_monthly_report(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<MonthQuery>,
) -> AppResult<Json<MonthlyReportResponse>> {
    query.validate()?;
    let month = query.month_key()?;

    if let Some(report) = state.store.find_monthly_report(auth_user.id, month).await? {
        return Ok(Json(MonthlyReportResponse {
            month,
            report: Some(report),
            message: None,
        }));
    }
    Ok(Json(generate(&state, &auth_user, month).await?))
}

pub async fn regenerate_monthly_report(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    body: Option<Json<GenerateReportRequest>>,
) -> AppResult<Json<MonthlyReportResponse>> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    body.validate()?;
    let month = body.month_key()?;
    Ok(Json(generate(&state, &auth_user, month).await?))
}

pub async fn get_evolution(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<MonthQuery>,
) -> AppResult<Json<EvolutionResponse>> {
    query.validate()?;
    let month = query.month_key()?;
    let evolution = evolution_for(state.store.as_ref(), auth_user.id, month).await?;
    Ok(Json(EvolutionResponse { month, evolution }))
}
