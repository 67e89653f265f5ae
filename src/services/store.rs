//! Record store for dreams and monthly reports.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::analysis::{sanitize, DreamAnalysis, MonthlyWellnessReport};
use crate::models::dream::{Dream, NewDream};
use crate::models::report::MonthlyReport;
use crate::month::MonthKey;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(sqlx::Error),
    #[error("conflicting write: {0}")]
    Conflict(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return StoreError::Conflict(db.message().to_string());
            }
        }
        StoreError::Database(e)
    }
}

#[async_trait]
pub trait DreamStore: Send + Sync {
    async fn insert_dream(&self, dream: NewDream) -> Result<Dream, StoreError>;

    async fn list_dreams(&self, user_id: Uuid, limit: i64, offset: i64) -> Result<Vec<Dream>, StoreError>;

    async fn find_dream(&self, user_id: Uuid, id: Uuid) -> Result<Option<Dream>, StoreError>;

    /// Analyses of a user's dreams created in `[start, end)`, oldest first.
    /// Blobs without a usable `primary_emotion` are skipped.
    async fn analyses_between(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<DreamAnalysis>, StoreError>;

    async fn users_with_dreams_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Uuid>, StoreError>;

    /// Inserts or overwrites the report for `(user_id, month)`.
    async fn upsert_monthly_report(
        &self,
        user_id: Uuid,
        month: MonthKey,
        report: &MonthlyWellnessReport,
    ) -> Result<MonthlyReport, StoreError>;

    async fn find_monthly_report(
        &self,
        user_id: Uuid,
        month: MonthKey,
    ) -> Result<Option<MonthlyReport>, StoreError>;
}

/// Decodes stored analysis blobs, dropping the ones that fail validation.
pub fn decode_analyses(blobs: impl IntoIterator<Item = Value>) -> Vec<DreamAnalysis> {
    blobs
        .into_iter()
        .filter_map(|blob| sanitize::dream_analysis(&blob).ok())
        .collect()
}

#[derive(Clone)]
pub struct PgDreamStore {
    db: PgPool,
}

impl PgDreamStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DreamStore for PgDreamStore {
    async fn insert_dream(&self, dream: NewDream) -> Result<Dream, StoreError> {
        let row = sqlx::query_as::<_, Dream>(
            r#"
            INSERT INTO dreams (id, user_id, dream_text, emotion, style, analysis)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(dream.user_id)
        .bind(&dream.dream_text)
        .bind(&dream.emotion)
        .bind(&dream.style)
        .bind(Json(&dream.analysis))
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn list_dreams(&self, user_id: Uuid, limit: i64, offset: i64) -> Result<Vec<Dream>, StoreError> {
        let rows = sqlx::query_as::<_, Dream>(
            r#"
            SELECT * FROM dreams
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_dream(&self, user_id: Uuid, id: Uuid) -> Result<Option<Dream>, StoreError> {
        let row = sqlx::query_as::<_, Dream>("SELECT * FROM dreams WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row)
    }

    async fn analyses_between(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<DreamAnalysis>, StoreError> {
        let blobs = sqlx::query_scalar::<_, Json<Value>>(
            r#"
            SELECT analysis FROM dreams
            WHERE user_id = $1
              AND created_at >= $2 AND created_at < $3
              AND analysis IS NOT NULL
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;
        Ok(decode_analyses(blobs.into_iter().map(|blob| blob.0)))
    }

    async fn users_with_dreams_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Uuid>, StoreError> {
        let users = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT DISTINCT user_id FROM dreams
            WHERE created_at >= $1 AND created_at < $2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;
        Ok(users)
    }

    async fn upsert_monthly_report(
        &self,
        user_id: Uuid,
        month: MonthKey,
        report: &MonthlyWellnessReport,
    ) -> Result<MonthlyReport, StoreError> {
        let row = sqlx::query_as::<_, MonthlyReport>(
            r#"
            INSERT INTO monthly_reports (
                id, user_id, month_year, mental_state, summary, patterns,
                recommendation, dominant_themes, theme_explanation, archetype,
                evolution_summary
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (user_id, month_year) DO UPDATE SET
                mental_state = EXCLUDED.mental_state,
                summary = EXCLUDED.summary,
                patterns = EXCLUDED.patterns,
                recommendation = EXCLUDED.recommendation,
                dominant_themes = EXCLUDED.dominant_themes,
                theme_explanation = EXCLUDED.theme_explanation,
                archetype = EXCLUDED.archetype,
                evolution_summary = EXCLUDED.evolution_summary,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(month.to_string())
        .bind(report.mental_state)
        .bind(&report.summary)
        .bind(Json(&report.recurring_patterns))
        .bind(&report.gentle_recommendation)
        .bind(Json(report.dominant_themes.clone().unwrap_or_default()))
        .bind(&report.theme_explanation)
        .bind(&report.archetype)
        .bind(&report.evolution_summary)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn find_monthly_report(
        &self,
        user_id: Uuid,
        month: MonthKey,
    ) -> Result<Option<MonthlyReport>, StoreError> {
        let row = sqlx::query_as::<_, MonthlyReport>(
            "SELECT * FROM monthly_reports WHERE user_id = $1 AND month_year = $2",
        )
        .bind(user_id)
        .bind(month.to_string())
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// In-process store with failure injection for orchestrator tests.
    #[derive(Default)]
    pub struct MemoryStore {
        pub dreams: Mutex<Vec<Dream>>,
        pub reports: Mutex<Vec<MonthlyReport>>,
        /// Number of upcoming upserts that fail with `Conflict`.
        pub pending_conflicts: AtomicUsize,
        /// Users whose analysis reads fail.
        pub failing_users: Mutex<HashSet<Uuid>>,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn add_dream_at(&self, user_id: Uuid, created_at: DateTime<Utc>, analysis: Value) {
            self.dreams.lock().unwrap().push(Dream {
                id: Uuid::new_v4(),
                user_id,
                dream_text: "dream".into(),
                emotion: None,
                style: None,
                analysis: Some(Json(analysis)),
                created_at,
            });
        }

        pub fn add_analysis(&self, user_id: Uuid, month: MonthKey, analysis: &DreamAnalysis) {
            let (start, _) = month.range();
            let value = serde_json::to_value(analysis).unwrap();
            self.add_dream_at(user_id, start + chrono::Duration::days(1), value);
        }

        pub fn report_count(&self) -> usize {
            self.reports.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl DreamStore for MemoryStore {
        async fn insert_dream(&self, dream: NewDream) -> Result<Dream, StoreError> {
            let row = Dream {
                id: Uuid::new_v4(),
                user_id: dream.user_id,
                dream_text: dream.dream_text,
                emotion: dream.emotion,
                style: dream.style,
                analysis: Some(Json(dream.analysis)),
                created_at: Utc::now(),
            };
            self.dreams.lock().unwrap().push(row.clone());
            Ok(row)
        }

        async fn list_dreams(&self, user_id: Uuid, limit: i64, offset: i64) -> Result<Vec<Dream>, StoreError> {
            let mut rows: Vec<Dream> = self
                .dreams
                .lock()
                .unwrap()
                .iter()
                .filter(|d| d.user_id == user_id)
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(rows
                .into_iter()
                .skip(offset.max(0) as usize)
                .take(limit.max(0) as usize)
                .collect())
        }

        async fn find_dream(&self, user_id: Uuid, id: Uuid) -> Result<Option<Dream>, StoreError> {
            Ok(self
                .dreams
                .lock()
                .unwrap()
                .iter()
                .find(|d| d.id == id && d.user_id == user_id)
                .cloned())
        }

        async fn analyses_between(
            &self,
            user_id: Uuid,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> Result<Vec<DreamAnalysis>, StoreError> {
            if self.failing_users.lock().unwrap().contains(&user_id) {
                return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
            }
            let mut rows: Vec<Dream> = self
                .dreams
                .lock()
                .unwrap()
                .iter()
                .filter(|d| d.user_id == user_id && d.created_at >= start && d.created_at < end)
                .cloned()
                .collect();
            rows.sort_by_key(|d| d.created_at);
            Ok(decode_analyses(
                rows.into_iter().filter_map(|d| d.analysis.map(|a| a.0)),
            ))
        }

        async fn users_with_dreams_between(
            &self,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> Result<Vec<Uuid>, StoreError> {
            let mut seen = HashSet::new();
            Ok(self
                .dreams
                .lock()
                .unwrap()
                .iter()
                .filter(|d| d.created_at >= start && d.created_at < end)
                .filter(|d| seen.insert(d.user_id))
                .map(|d| d.user_id)
                .collect())
        }

        async fn upsert_monthly_report(
            &self,
            user_id: Uuid,
            month: MonthKey,
            report: &MonthlyWellnessReport,
        ) -> Result<MonthlyReport, StoreError> {
            let injected = self
                .pending_conflicts
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if injected {
                return Err(StoreError::Conflict("duplicate key (user_id, month_year)".into()));
            }

            let now = Utc::now();
            let mut reports = self.reports.lock().unwrap();
            let existing = reports
                .iter()
                .position(|r| r.user_id == user_id && r.month_year == month.to_string());
            let (id, created_at) = match existing {
                Some(i) => (reports[i].id, reports[i].created_at),
                None => (Uuid::new_v4(), now),
            };
            let row = MonthlyReport {
                id,
                user_id,
                month_year: month.to_string(),
                mental_state: report.mental_state,
                summary: report.summary.clone(),
                patterns: Json(report.recurring_patterns.clone()),
                recommendation: report.gentle_recommendation.clone(),
                dominant_themes: Json(report.dominant_themes.clone().unwrap_or_default()),
                theme_explanation: report.theme_explanation.clone(),
                archetype: report.archetype.clone(),
                evolution_summary: report.evolution_summary.clone(),
                created_at,
                updated_at: now,
            };
            match existing {
                Some(i) => reports[i] = row.clone(),
                None => reports.push(row.clone()),
            }
            Ok(row)
        }

        async fn find_monthly_report(
            &self,
            user_id: Uuid,
            month: MonthKey,
        ) -> Result<Option<MonthlyReport>, StoreError> {
            Ok(self
                .reports
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.user_id == user_id && r.month_year == month.to_string())
                .cloned())
        }
    }
}
