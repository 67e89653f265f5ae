use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// A stored dream. `analysis` is the raw JSONB blob; rows written before
/// analysis existed, or by older clients, may hold `NULL` or a partial object.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Dream {
    pub id: Uuid,
    pub user_id: Uuid,
    pub dream_text: String,
    pub emotion: Option<String>,
    pub style: Option<String>,
    pub analysis: Option<Json<serde_json::Value>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDream {
    pub user_id: Uuid,
    pub dream_text: String,
    pub emotion: Option<String>,
    pub style: Option<String>,
    pub analysis: serde_json::Value,
}
