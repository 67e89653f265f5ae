//! Month-over-month comparison of intensity, dominant emotion and themes.

use serde::{Deserialize, Serialize};

use super::{average_intensity, capitalize, dominant_emotion, DreamAnalysis, Emotion, Tally};
use crate::month::MonthKey;

/// How many calendar months before the target month are compared.
pub const LOOKBACK_MONTHS: u32 = 3;

const TREND_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntensityTrend {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthSnapshot {
    pub month_year: MonthKey,
    pub avg_intensity: f64,
    pub dominant_emotion: Emotion,
    pub themes: Vec<String>,
}

impl MonthSnapshot {
    /// `None` for a month without analyses.
    pub fn from_analyses(month_year: MonthKey, analyses: &[DreamAnalysis]) -> Option<Self> {
        let dominant_emotion = dominant_emotion(analyses)?;
        Some(Self {
            month_year,
            avg_intensity: average_intensity(analyses),
            dominant_emotion,
            themes: month_themes(analyses),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionData {
    pub current_month: MonthSnapshot,
    /// Most recent first; months without dreams are left out.
    pub previous_months: Vec<MonthSnapshot>,
    pub evolution_summary: String,
    pub intensity_trend: IntensityTrend,
    pub theme_shifts: Vec<String>,
}

fn evolution_theme(symbol: &str) -> String {
    match symbol {
        "water" => "Emotional Flow".to_string(),
        "flying" => "Freedom".to_string(),
        "journey" => "Exploration".to_string(),
        "transformation" => "Growth".to_string(),
        "darkness" => "Uncertainty".to_string(),
        "light" => "Clarity".to_string(),
        other => capitalize(other),
    }
}

/// Themes of the three most frequent symbols in a month.
fn month_themes(analyses: &[DreamAnalysis]) -> Vec<String> {
    let symbols: Tally<&str> = analyses
        .iter()
        .flat_map(|a| a.symbols.iter().map(String::as_str))
        .collect();
    symbols
        .by_frequency()
        .into_iter()
        .take(3)
        .map(|(symbol, _)| evolution_theme(symbol))
        .collect()
}

/// Direction between the two most recent data points, newest first.
pub fn intensity_trend(intensities: &[f64]) -> IntensityTrend {
    let [recent, previous, ..] = intensities else {
        return IntensityTrend::Stable;
    };
    let diff = recent - previous;
    if diff > TREND_THRESHOLD {
        IntensityTrend::Increasing
    } else if diff < -TREND_THRESHOLD {
        IntensityTrend::Decreasing
    } else {
        IntensityTrend::Stable
    }
}

fn emotion_name(emotion: Emotion) -> &'static str {
    match emotion {
        Emotion::Anxious => "uncertainty",
        Emotion::Hopeful => "possibility",
        Emotion::Calm => "peace",
        Emotion::Emotional => "depth",
        Emotion::Intense => "transformation",
        Emotion::Dark => "exploration",
        Emotion::Neutral => "neutral",
    }
}

/// Returns `(new_themes_sentence, fading_themes_sentence)`.
fn theme_shifts(current: &[String], previous: &[MonthSnapshot]) -> (Option<String>, Option<String>) {
    let emerging: Vec<&str> = current
        .iter()
        .filter(|theme| !previous.iter().any(|m| m.themes.contains(theme)))
        .map(String::as_str)
        .collect();
    let fading: Vec<&str> = previous
        .first()
        .map(|m| {
            m.themes
                .iter()
                .filter(|theme| !current.contains(theme))
                .map(String::as_str)
                .collect()
        })
        .unwrap_or_default();

    let sentence = |label: &str, themes: &[&str]| {
        (!themes.is_empty()).then(|| format!("{label}: {}.", themes.join(", ")))
    };
    (
        sentence("New themes emerging", &emerging),
        sentence("Themes shifting", &fading),
    )
}

/// Compares the target month with the preceding months.
///
/// `prior` holds the analyses of earlier months, most recent first. Returns
/// `None` when the target month has no analyses.
pub fn compute_evolution(
    month: MonthKey,
    current: &[DreamAnalysis],
    prior: &[(MonthKey, Vec<DreamAnalysis>)],
) -> Option<EvolutionData> {
    let current_month = MonthSnapshot::from_analyses(month, current)?;
    let previous_months: Vec<MonthSnapshot> = prior
        .iter()
        .filter_map(|(key, analyses)| MonthSnapshot::from_analyses(*key, analyses))
        .collect();

    let intensities: Vec<f64> = std::iter::once(current_month.avg_intensity)
        .chain(previous_months.iter().map(|m| m.avg_intensity))
        .collect();
    let intensity_trend = intensity_trend(&intensities);

    let (emerging, fading) = theme_shifts(&current_month.themes, &previous_months);
    let theme_shifts: Vec<String> = emerging.iter().chain(fading.iter()).cloned().collect();

    let mut summary = String::from(match intensity_trend {
        IntensityTrend::Increasing => "Your dreams are showing deeper emotional intensity, suggesting you're exploring more profound inner experiences. ",
        IntensityTrend::Decreasing => "Your dreams are becoming more balanced, reflecting a sense of calm and integration. ",
        IntensityTrend::Stable => "Your dream patterns show consistency, indicating a stable inner landscape. ",
    });

    let previous_emotion = previous_months
        .first()
        .map(|m| m.dominant_emotion)
        .unwrap_or(current_month.dominant_emotion);
    if previous_emotion != current_month.dominant_emotion {
        summary.push_str(&format!(
            "There's a shift from {} toward {} in your dreams. ",
            emotion_name(previous_emotion),
            emotion_name(current_month.dominant_emotion)
        ));
    }

    for sentence in emerging.iter().chain(fading.iter()) {
        summary.push_str(sentence);
        summary.push(' ');
    }
    summary.push_str("This evolution reflects your ongoing journey of self-discovery and inner growth.");

    Some(EvolutionData {
        current_month,
        previous_months,
        evolution_summary: summary,
        intensity_trend,
        theme_shifts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{sample, Tone};

    fn key(s: &str) -> MonthKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_trend_thresholds() {
        assert_eq!(intensity_trend(&[0.8, 0.5]), IntensityTrend::Increasing);
        assert_eq!(intensity_trend(&[0.3, 0.5]), IntensityTrend::Decreasing);
        assert_eq!(intensity_trend(&[0.55, 0.5]), IntensityTrend::Stable);
        assert_eq!(intensity_trend(&[0.5]), IntensityTrend::Stable);
        assert_eq!(intensity_trend(&[]), IntensityTrend::Stable);
    }

    #[test]
    fn test_trend_ignores_older_months() {
        // only current vs most recent prior counts
        assert_eq!(intensity_trend(&[0.5, 0.5, 0.1, 0.1]), IntensityTrend::Stable);
    }

    #[test]
    fn test_no_current_dreams_is_none() {
        let prior = vec![(key("2026-01"), vec![sample(Emotion::Calm, 0.2, &[], Tone::Neutral)])];
        assert!(compute_evolution(key("2026-02"), &[], &prior).is_none());
    }

    #[test]
    fn test_first_month_is_stable_without_shift_sentences() {
        let current = vec![sample(Emotion::Calm, 0.2, &["water"], Tone::Positive)];
        let evolution = compute_evolution(key("2026-02"), &current, &[]).unwrap();
        assert_eq!(evolution.intensity_trend, IntensityTrend::Stable);
        assert!(evolution.previous_months.is_empty());
        assert_eq!(evolution.current_month.themes, vec!["Emotional Flow"]);
        assert_eq!(
            evolution.theme_shifts,
            vec!["New themes emerging: Emotional Flow."]
        );
        assert!(!evolution.evolution_summary.contains("shift from"));
    }

    #[test]
    fn test_increasing_with_emotion_and_theme_shift() {
        let current = vec![
            sample(Emotion::Anxious, 0.8, &["darkness", "flying"], Tone::Reflective),
            sample(Emotion::Anxious, 0.8, &["darkness"], Tone::Reflective),
        ];
        let prior = vec![
            (key("2026-01"), vec![sample(Emotion::Calm, 0.5, &["water", "darkness"], Tone::Positive)]),
            (key("2025-12"), vec![]),
            (key("2025-11"), vec![sample(Emotion::Calm, 0.4, &["flying"], Tone::Positive)]),
        ];
        let evolution = compute_evolution(key("2026-02"), &current, &prior).unwrap();

        assert_eq!(evolution.intensity_trend, IntensityTrend::Increasing);
        assert_eq!(evolution.previous_months.len(), 2);
        assert_eq!(evolution.current_month.themes, vec!["Uncertainty", "Freedom"]);
        assert_eq!(evolution.theme_shifts, vec!["Themes shifting: Emotional Flow."]);
        assert!(evolution
            .evolution_summary
            .contains("There's a shift from peace toward uncertainty in your dreams."));
        assert!(evolution
            .evolution_summary
            .starts_with("Your dreams are showing deeper emotional intensity"));
    }

    #[test]
    fn test_summary_has_one_new_and_one_fading_sentence() {
        let current = vec![sample(Emotion::Hopeful, 0.3, &["light"], Tone::Positive)];
        let prior = vec![(key("2026-01"), vec![sample(Emotion::Hopeful, 0.6, &["water"], Tone::Positive)])];
        let evolution = compute_evolution(key("2026-02"), &current, &prior).unwrap();
        assert_eq!(evolution.intensity_trend, IntensityTrend::Decreasing);
        assert_eq!(
            evolution.theme_shifts,
            vec!["New themes emerging: Clarity.", "Themes shifting: Emotional Flow."]
        );
        assert!(evolution.evolution_summary.contains("New themes emerging: Clarity."));
        assert!(evolution.evolution_summary.contains("Themes shifting: Emotional Flow."));
    }

    #[test]
    fn test_unmapped_symbols_title_cased() {
        let current = vec![sample(Emotion::Hopeful, 0.3, &["vehicles"], Tone::Positive)];
        let evolution = compute_evolution(key("2026-02"), &current, &[]).unwrap();
        assert_eq!(evolution.current_month.themes, vec!["Vehicles"]);
    }
}
