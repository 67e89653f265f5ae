use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::analysis::dream_reflection;
use crate::auth::middleware::AuthUser;
use crate::dto::{CreateDreamRequest, CreateDreamResponse, DreamListQuery};
use crate::error::{AppError, AppResult};
use crate::models::dream::{Dream, NewDream};
use crate::AppState;

pub async fn create_dream(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateDreamRequest>,
) -> AppResult<(StatusCode, Json<CreateDreamResponse>)> {
    body.validate()?;
    let dream_text = body.dream_text.trim().to_string();

    let analysis = state.strategy.analyze_dream(&dream_text).await;
    let blob = serde_json::to_value(&analysis).map_err(|e| AppError::Internal(e.into()))?;

    let dream = state
        .store
        .insert_dream(NewDream {
            user_id: auth_user.id,
            dream_text,
            emotion: body.emotion,
            style: body.style,
            analysis: blob,
        })
        .await?;

    tracing::info!(
        user_id = %auth_user.id,
        dream_id = %dream.id,
        emotion = analysis.primary_emotion.as_str(),
        "Dream recorded"
    );

    let reflection = dream_reflection(&analysis);
    Ok((
        StatusCode::CREATED,
        Json(CreateDreamResponse {
            dream,
            analysis,
            reflection,
            source: state.strategy.source(),
        }),
    ))
}

pub async fn list_dreams(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<DreamListQuery>,
) -> AppResult<Json<Vec<Dream>>> {
    let (limit, offset) = query.page();
    let dreams = state.store.list_dreams(auth_user.id, limit, offset).await?;
    Ok(Json(dreams))
}

pub async fn get_dream(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(dream_id): Path<Uuid>,
) -> AppResult<Json<Dream>> {
    state
        .store
        .find_dream(auth_user.id, dream_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Dream not found".into()))
}
