//! Theme detection from recurring symbols and the dominant emotion.

use serde::{Deserialize, Serialize};

use super::{capitalize, DreamAnalysis, Emotion, Tally};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeAnalysis {
    pub dominant_themes: Vec<String>,
    pub theme_explanation: String,
}

const EMPTY_EXPLANATION: &str = "As you continue to record your dreams, themes will begin to emerge that reflect your inner landscape.";
const NO_THEMES_EXPLANATION: &str =
    "Your dreams are beginning to reveal their patterns. Keep writing, and themes will emerge.";

/// Theme name for a symbol, or `None` when the symbol has no mapping.
pub fn symbol_theme(symbol: &str) -> Option<&'static str> {
    match symbol {
        "water" => Some("Emotional Flow"),
        "flying" => Some("Freedom"),
        "journey" => Some("Exploration"),
        "transformation" => Some("Growth"),
        "darkness" => Some("Uncertainty"),
        "light" => Some("Clarity"),
        "animals" => Some("Instinct"),
        "nature" => Some("Connection"),
        "people" => Some("Relationships"),
        "buildings" => Some("Stability"),
        _ => None,
    }
}

pub fn emotion_theme(emotion: Emotion) -> Option<&'static str> {
    match emotion {
        Emotion::Anxious => Some("Uncertainty"),
        Emotion::Hopeful => Some("Possibility"),
        Emotion::Calm => Some("Peace"),
        Emotion::Emotional => Some("Depth"),
        Emotion::Intense => Some("Transformation"),
        Emotion::Dark => Some("Exploration"),
        Emotion::Neutral => None,
    }
}

/// Deterministic theme detection from symbol and emotion frequencies.
pub fn detect_themes_local(analyses: &[DreamAnalysis]) -> ThemeAnalysis {
    if analyses.is_empty() {
        return ThemeAnalysis {
            dominant_themes: Vec::new(),
            theme_explanation: EMPTY_EXPLANATION.to_string(),
        };
    }

    let symbols: Tally<&str> = analyses
        .iter()
        .flat_map(|a| a.symbols.iter().map(String::as_str))
        .collect();

    let mut themes: Vec<String> = Vec::new();
    for (symbol, _) in symbols.by_frequency().into_iter().take(5) {
        let theme = symbol_theme(symbol)
            .map(str::to_string)
            .unwrap_or_else(|| capitalize(symbol));
        if !themes.contains(&theme) {
            themes.push(theme);
        }
    }

    let emotions: Tally<Emotion> = analyses.iter().map(|a| a.primary_emotion).collect();
    if let Some(theme) = emotions.most_frequent().copied().and_then(emotion_theme) {
        if !themes.iter().any(|t| t == theme) {
            themes.insert(0, theme.to_string());
        }
    }
    themes.truncate(5);

    let theme_explanation = if themes.is_empty() {
        NO_THEMES_EXPLANATION.to_string()
    } else {
        let named: Vec<&str> = themes.iter().take(3).map(String::as_str).collect();
        format!(
            "Your dreams weave together themes of {}. These patterns reflect the rich inner landscape you're exploring.",
            named.join(", ")
        )
    };

    ThemeAnalysis {
        dominant_themes: themes,
        theme_explanation,
    }
}
