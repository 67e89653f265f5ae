//! Validation and clamping of untrusted analysis JSON (oracle replies and
//! legacy stored blobs). Every field is checked against its enum or range
//! and replaced by a fixed default when out of bounds.

use serde_json::Value;

use super::{
    round2, DreamAnalysis, Emotion, MentalState, MonthlyWellnessReport, ThemeAnalysis, Tone,
};

pub const MAX_PATTERNS: usize = 4;
pub const MAX_THEMES: usize = 5;

const DEFAULT_INTENSITY: f64 = 0.5;
const DEFAULT_WELLNESS_SUMMARY: &str = "Your dream patterns show a rich inner world.";
const DEFAULT_RECOMMENDATION: &str = "Continue reflecting on your dreams and what they mean to you.";
const DEFAULT_THEME_EXPLANATION: &str = "Your dreams reveal rich symbolic patterns.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SanitizeError {
    #[error("expected a JSON object")]
    NotAnObject,
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
}

fn required<'a>(value: &'a Value, field: &'static str) -> Result<&'a Value, SanitizeError> {
    let object = value.as_object().ok_or(SanitizeError::NotAnObject)?;
    object
        .get(field)
        .filter(|v| !v.is_null())
        .ok_or(SanitizeError::MissingField(field))
}

fn non_empty_str<'a>(value: &'a Value, field: &str) -> Option<&'a str> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Unique, non-blank strings from a JSON array, in order, capped at `cap`.
fn string_list(value: Option<&Value>, cap: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let Some(items) = value.and_then(Value::as_array) else {
        return out;
    };
    for item in items {
        if out.len() == cap {
            break;
        }
        if let Some(s) = item.as_str().map(str::trim).filter(|s| !s.is_empty()) {
            if !out.iter().any(|seen| seen == s) {
                out.push(s.to_string());
            }
        }
    }
    out
}

/// `primary_emotion` must be present; unknown categories fall back to
/// hopeful, intensity is clamped to `[0, 1]`.
pub fn dream_analysis(value: &Value) -> Result<DreamAnalysis, SanitizeError> {
    let emotion = required(value, "primary_emotion")?;
    let primary_emotion = emotion
        .as_str()
        .and_then(Emotion::parse)
        .unwrap_or(Emotion::Hopeful);

    let intensity = value
        .get("emotion_intensity")
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .unwrap_or(DEFAULT_INTENSITY)
        .clamp(0.0, 1.0);

    let overall_tone = value
        .get("overall_tone")
        .and_then(Value::as_str)
        .and_then(Tone::parse)
        .unwrap_or(Tone::Neutral);

    Ok(DreamAnalysis {
        primary_emotion,
        emotion_intensity: round2(intensity),
        symbols: string_list(value.get("symbols"), DreamAnalysis::MAX_SYMBOLS),
        overall_tone,
    })
}

pub fn wellness_report(value: &Value) -> Result<MonthlyWellnessReport, SanitizeError> {
    let state = required(value, "mental_state")?;
    let mental_state = state
        .as_str()
        .and_then(MentalState::parse)
        .unwrap_or(MentalState::Mixed);

    Ok(MonthlyWellnessReport {
        mental_state,
        summary: non_empty_str(value, "summary")
            .unwrap_or(DEFAULT_WELLNESS_SUMMARY)
            .to_string(),
        recurring_patterns: string_list(value.get("recurring_patterns"), MAX_PATTERNS),
        gentle_recommendation: non_empty_str(value, "gentle_recommendation")
            .unwrap_or(DEFAULT_RECOMMENDATION)
            .to_string(),
        ..MonthlyWellnessReport::default()
    })
}

pub fn theme_analysis(value: &Value) -> Result<ThemeAnalysis, SanitizeError> {
    let themes = required(value, "dominant_themes")?;
    Ok(ThemeAnalysis {
        dominant_themes: string_list(Some(themes), MAX_THEMES),
        theme_explanation: non_empty_str(value, "theme_explanation")
            .unwrap_or(DEFAULT_THEME_EXPLANATION)
            .to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dream_analysis_clamps_and_caps() {
        let value = json!({
            "primary_emotion": "Dark",
            "emotion_intensity": 1.7,
            "symbols": ["water", "water", "", "fire", "moon", "door", "key", "bridge"],
            "overall_tone": "reflective"
        });
        let analysis = dream_analysis(&value).unwrap();
        assert_eq!(analysis.primary_emotion, Emotion::Dark);
        assert_eq!(analysis.emotion_intensity, 1.0);
        assert_eq!(analysis.symbols, vec!["water", "fire", "moon", "door", "key"]);
        assert_eq!(analysis.overall_tone, Tone::Reflective);
    }

    #[test]
    fn test_dream_analysis_defaults() {
        let value = json!({ "primary_emotion": "ecstatic", "overall_tone": "negative" });
        let analysis = dream_analysis(&value).unwrap();
        assert_eq!(analysis.primary_emotion, Emotion::Hopeful);
        assert_eq!(analysis.emotion_intensity, 0.5);
        assert!(analysis.symbols.is_empty());
        assert_eq!(analysis.overall_tone, Tone::Neutral);
    }

    #[test]
    fn test_dream_analysis_negative_intensity() {
        let value = json!({ "primary_emotion": "calm", "emotion_intensity": -3 });
        assert_eq!(dream_analysis(&value).unwrap().emotion_intensity, 0.0);
    }

    #[test]
    fn test_dream_analysis_requires_emotion() {
        assert_eq!(
            dream_analysis(&json!({ "emotion_intensity": 0.3 })),
            Err(SanitizeError::MissingField("primary_emotion"))
        );
        assert_eq!(dream_analysis(&json!([1, 2])), Err(SanitizeError::NotAnObject));
    }

    #[test]
    fn test_wellness_report_enum_fallback() {
        let value = json!({
            "mental_state": "Anxious",
            "summary": "",
            "recurring_patterns": ["a", "b", "c", "d", "e"],
        });
        let report = wellness_report(&value).unwrap();
        assert_eq!(report.mental_state, MentalState::Mixed);
        assert_eq!(report.summary, DEFAULT_WELLNESS_SUMMARY);
        assert_eq!(report.recurring_patterns.len(), MAX_PATTERNS);
        assert_eq!(report.gentle_recommendation, DEFAULT_RECOMMENDATION);
        assert!(report.dominant_themes.is_none());
    }

    #[test]
    fn test_wellness_report_accepts_valid_state() {
        let value = json!({ "mental_state": "Healing", "summary": "Growing." });
        let report = wellness_report(&value).unwrap();
        assert_eq!(report.mental_state, MentalState::Healing);
        assert_eq!(report.summary, "Growing.");
    }

    #[test]
    fn test_theme_analysis() {
        let value = json!({
            "dominant_themes": ["Freedom", "Freedom", "Connection", 3, "A", "B", "C", "D"],
        });
        let themes = theme_analysis(&value).unwrap();
        assert_eq!(themes.dominant_themes, vec!["Freedom", "Connection", "A", "B", "C"]);
        assert_eq!(themes.theme_explanation, DEFAULT_THEME_EXPLANATION);
        assert!(theme_analysis(&json!({})).is_err());
    }
}
