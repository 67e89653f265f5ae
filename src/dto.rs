//! # DreamArc — Request/Response DTOs
//!
//! Conventions:
//! - `*Request` / `*Query` → deserialized from client JSON body or query params
//! - `*Response` → serialized to client JSON
//! - Field validation is expressed via `validator` derive macros

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::analysis::{DreamAnalysis, EvolutionData};
use crate::error::{AppError, AppResult};
use crate::models::dream::Dream;
use crate::models::report::MonthlyReport;
use crate::month::MonthKey;

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 100;

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("Dream text cannot be empty".into());
        return Err(error);
    }
    Ok(())
}

/// `None` means the current UTC month.
fn resolve_month(value: Option<&str>) -> AppResult<MonthKey> {
    match value {
        None => Ok(MonthKey::current()),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: crate::month::InvalidMonth| AppError::Validation(e.to_string())),
    }
}

// ============================================================================
// Dreams
// ============================================================================

/// POST /api/dreams
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDreamRequest {
    #[validate(
        custom = "validate_not_blank",
        length(max = 10000, message = "Dream text must be under 10000 characters")
    )]
    pub dream_text: String,

    /// Free-form mood tag chosen by the user
    #[validate(length(max = 50))]
    pub emotion: Option<String>,

    /// Visualization style preference
    #[validate(length(max = 50))]
    pub style: Option<String>,
}

/// GET /api/dreams
#[derive(Debug, Default, Deserialize)]
pub struct DreamListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl DreamListQuery {
    /// `(limit, offset)` clamped to the allowed page window.
    pub fn page(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

#[derive(Debug, Serialize)]
pub struct CreateDreamResponse {
    pub dream: Dream,
    pub analysis: DreamAnalysis,
    pub reflection: String,
    /// "local" or "oracle"
    pub source: &'static str,
}

// ============================================================================
// Reports
// ============================================================================

/// GET /api/reports/monthly, GET /api/reports/evolution
#[derive(Debug, Default, Deserialize, Validate)]
pub struct MonthQuery {
    #[validate(custom = "crate::month::validate_month_key")]
    pub month: Option<String>,
}

impl MonthQuery {
    pub fn month_key(&self) -> AppResult<MonthKey> {
        resolve_month(self.month.as_deref())
    }
}

/// POST /api/reports/monthly
#[derive(Debug, Default, Deserialize, Validate)]
pub struct GenerateReportRequest {
    #[validate(custom = "crate::month::validate_month_key")]
    pub month: Option<String>,
}

impl GenerateReportRequest {
    pub fn month_key(&self) -> AppResult<MonthKey> {
        resolve_month(self.month.as_deref())
    }
}

#[derive(Debug, Serialize)]
pub struct MonthlyReportResponse {
    pub month: MonthKey,
    pub report: Option<MonthlyReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EvolutionResponse {
    pub month: MonthKey,
    pub evolution: Option<EvolutionData>,
}

// ============================================================================
// Cron
// ============================================================================

/// GET /api/cron/monthly-report
#[derive(Debug, Serialize)]
pub struct CronStatusResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_dream_rejected() {
        let req = CreateDreamRequest {
            dream_text: "   \n".into(),
            emotion: None,
            style: None,
        };
        assert!(req.validate().is_err());

        let req = CreateDreamRequest {
            dream_text: "I was flying".into(),
            emotion: Some("happy".into()),
            style: None,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_month_query_validation() {
        let bad = MonthQuery { month: Some("2026-13".into()) };
        assert!(bad.validate().is_err());
        assert!(bad.month_key().is_err());

        let good = MonthQuery { month: Some("2026-02".into()) };
        assert!(good.validate().is_ok());
        assert_eq!(good.month_key().unwrap().to_string(), "2026-02");

        assert_eq!(MonthQuery::default().month_key().unwrap(), MonthKey::current());
    }

    #[test]
    fn test_page_clamping() {
        assert_eq!(DreamListQuery::default().page(), (50, 0));
        let q = DreamListQuery { limit: Some(500), offset: Some(-3) };
        assert_eq!(q.page(), (100, 0));
        let q = DreamListQuery { limit: Some(0), offset: Some(20) };
        assert_eq!(q.page(), (1, 20));
    }
}
