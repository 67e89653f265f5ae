//! Chooses between the lexical heuristics and the text oracle.
//!
//! The oracle path is always single-attempt and bounded by a timeout. Any
//! failure (transport, timeout, unparseable or incomplete JSON) degrades to
//! the local result for the same input.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::analysis::sanitize::{self, SanitizeError};
use crate::analysis::{
    analyze_dream, analyze_monthly_wellness, detect_themes_local, DreamAnalysis,
    MonthlyWellnessReport, ThemeAnalysis,
};
use crate::config::Config;
use crate::oracle::{extract_json, prompts, OpenAiOracle, OracleError, TextOracle};

#[derive(Clone)]
pub enum ClassificationStrategy {
    LocalHeuristic,
    OracleBacked {
        oracle: Arc<dyn TextOracle>,
        timeout: Duration,
    },
}

impl std::fmt::Debug for ClassificationStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.source())
    }
}

impl ClassificationStrategy {
    pub fn from_config(config: &Config) -> Self {
        if !config.oracle_enabled() {
            tracing::info!("No oracle credential configured, using local analysis");
            return Self::LocalHeuristic;
        }
        match OpenAiOracle::from_config(config) {
            Ok(oracle) => {
                tracing::info!(model = %config.openai_model, "Oracle-backed analysis enabled");
                Self::OracleBacked {
                    oracle: Arc::new(oracle),
                    timeout: config.oracle_timeout(),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to build oracle client, using local analysis");
                Self::LocalHeuristic
            }
        }
    }

    pub fn source(&self) -> &'static str {
        match self {
            Self::LocalHeuristic => "local",
            Self::OracleBacked { .. } => "oracle",
        }
    }

    /// One oracle round-trip, sanitized. `None` means "use the local result".
    async fn ask<T>(
        &self,
        task: &'static str,
        system: &str,
        user: &str,
        sanitize: fn(&Value) -> Result<T, SanitizeError>,
    ) -> Option<T> {
        let Self::OracleBacked { oracle, timeout } = self else {
            return None;
        };
        if !oracle.is_available() {
            return None;
        }

        let reply = match tokio::time::timeout(*timeout, oracle.complete(system, user)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                tracing::warn!(task, error = %e, "Oracle call failed, falling back to local analysis");
                return None;
            }
            Err(_) => {
                tracing::warn!(
                    task,
                    error = %OracleError::Timeout,
                    timeout_ms = timeout.as_millis() as u64,
                    "Oracle call failed, falling back to local analysis"
                );
                return None;
            }
        };

        let value = match extract_json(&reply) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(task, error = %e, "Oracle reply unusable, falling back to local analysis");
                return None;
            }
        };

        match sanitize(&value) {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::warn!(task, error = %e, "Oracle reply incomplete, falling back to local analysis");
                None
            }
        }
    }

    pub async fn analyze_dream(&self, dream_text: &str) -> DreamAnalysis {
        if dream_text.trim().is_empty() {
            return DreamAnalysis::neutral();
        }
        self.ask(
            "dream",
            prompts::DREAM_SYSTEM,
            &prompts::dream_prompt(dream_text),
            sanitize::dream_analysis,
        )
        .await
        .unwrap_or_else(|| analyze_dream(dream_text))
    }

    pub async fn analyze_wellness(&self, analyses: &[DreamAnalysis]) -> MonthlyWellnessReport {
        if analyses.is_empty() {
            return analyze_monthly_wellness(analyses);
        }
        self.ask(
            "wellness",
            prompts::WELLNESS_SYSTEM,
            &prompts::wellness_prompt(analyses),
            sanitize::wellness_report,
        )
        .await
        .unwrap_or_else(|| analyze_monthly_wellness(analyses))
    }

    pub async fn detect_themes(&self, analyses: &[DreamAnalysis]) -> ThemeAnalysis {
        if analyses.is_empty() {
            return detect_themes_local(analyses);
        }
        self.ask(
            "themes",
            prompts::THEMES_SYSTEM,
            &prompts::themes_prompt(analyses),
            sanitize::theme_analysis,
        )
        .await
        .unwrap_or_else(|| detect_themes_local(analyses))
    }
}
