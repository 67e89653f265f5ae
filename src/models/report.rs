use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::analysis::MentalState;

/// Persisted monthly report, one row per (user, month).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MonthlyReport {
    pub id: Uuid,
    pub user_id: Uuid,
    pub month_year: String,
    pub mental_state: MentalState,
    pub summary: String,
    pub patterns: Json<Vec<String>>,
    pub recommendation: String,
    pub dominant_themes: Json<Vec<String>>,
    pub theme_explanation: Option<String>,
    pub archetype: Option<String>,
    pub evolution_summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
