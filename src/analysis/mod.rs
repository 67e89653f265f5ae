//! Lexical dream analysis: per-dream classification, monthly aggregation,
//! theme detection, archetype resolution and month-over-month evolution.
//!
//! Everything in here is pure and deterministic. The optional text oracle
//! lives in `crate::oracle` and is composed with these functions by
//! `crate::strategy`.

pub mod archetype;
pub mod dream;
pub mod evolution;
pub mod sanitize;
pub mod themes;
pub mod wellness;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use archetype::{all_archetypes, determine_archetype, ArchetypeData};
pub use dream::{analyze_dream, dream_reflection};
pub use evolution::{compute_evolution, EvolutionData};
pub use themes::{detect_themes_local, ThemeAnalysis};
pub use wellness::{analyze_monthly_wellness, MentalState, MonthlyWellnessReport};

/// Dominant emotional category of a single dream.
///
/// `Neutral` is only produced for empty input; the six keyword-backed
/// categories are listed in [`Emotion::CATEGORIES`] in tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Anxious,
    Hopeful,
    Calm,
    Emotional,
    Intense,
    Dark,
    Neutral,
}

impl Emotion {
    pub const CATEGORIES: [Emotion; 6] = [
        Emotion::Anxious,
        Emotion::Hopeful,
        Emotion::Calm,
        Emotion::Emotional,
        Emotion::Intense,
        Emotion::Dark,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Anxious => "anxious",
            Emotion::Hopeful => "hopeful",
            Emotion::Calm => "calm",
            Emotion::Emotional => "emotional",
            Emotion::Intense => "intense",
            Emotion::Dark => "dark",
            Emotion::Neutral => "neutral",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "anxious" => Some(Emotion::Anxious),
            "hopeful" => Some(Emotion::Hopeful),
            "calm" => Some(Emotion::Calm),
            "emotional" => Some(Emotion::Emotional),
            "intense" => Some(Emotion::Intense),
            "dark" => Some(Emotion::Dark),
            "neutral" => Some(Emotion::Neutral),
            _ => None,
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Narrative valence of a single dream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Neutral,
    Positive,
    Reflective,
    Contemplative,
    Transformative,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Neutral => "neutral",
            Tone::Positive => "positive",
            Tone::Reflective => "reflective",
            Tone::Contemplative => "contemplative",
            Tone::Transformative => "transformative",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "neutral" => Some(Tone::Neutral),
            "positive" => Some(Tone::Positive),
            "reflective" => Some(Tone::Reflective),
            "contemplative" => Some(Tone::Contemplative),
            "transformative" => Some(Tone::Transformative),
            _ => None,
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-dream analysis, stored alongside the dream and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DreamAnalysis {
    pub primary_emotion: Emotion,
    /// In `[0, 1]`, rounded to two decimals.
    pub emotion_intensity: f64,
    /// At most five, unique, in detection order.
    pub symbols: Vec<String>,
    pub overall_tone: Tone,
}

impl DreamAnalysis {
    pub const MAX_SYMBOLS: usize = 5;

    pub fn neutral() -> Self {
        Self {
            primary_emotion: Emotion::Neutral,
            emotion_intensity: 0.0,
            symbols: Vec::new(),
            overall_tone: Tone::Neutral,
        }
    }
}

/// Occurrence counts that remember first-seen order, so "most frequent"
/// ties resolve to whichever value showed up first.
#[derive(Debug, Clone)]
pub struct Tally<T> {
    entries: Vec<(T, usize)>,
}

impl<T> Default for Tally<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: PartialEq> Tally<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item: T) {
        match self.entries.iter_mut().find(|(seen, _)| *seen == item) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((item, 1)),
        }
    }

    pub fn count(&self, item: &T) -> usize {
        self.entries
            .iter()
            .find(|(seen, _)| seen == item)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    /// Number of distinct values.
    pub fn distinct(&self) -> usize {
        self.entries.len()
    }

    pub fn most_frequent(&self) -> Option<&T> {
        let mut best: Option<&(T, usize)> = None;
        for entry in &self.entries {
            if best.map_or(true, |(_, count)| entry.1 > *count) {
                best = Some(entry);
            }
        }
        best.map(|(item, _)| item)
    }

    /// Entries ordered by count descending; equal counts keep first-seen order.
    pub fn by_frequency(&self) -> Vec<(&T, usize)> {
        let mut sorted: Vec<(&T, usize)> = self.entries.iter().map(|(t, c)| (t, *c)).collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted
    }
}

impl<T: PartialEq> FromIterator<T> for Tally<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tally = Tally::new();
        for item in iter {
            tally.add(item);
        }
        tally
    }
}

/// Mean `emotion_intensity`, or 0 for an empty slice.
pub fn average_intensity(analyses: &[DreamAnalysis]) -> f64 {
    if analyses.is_empty() {
        return 0.0;
    }
    analyses.iter().map(|a| a.emotion_intensity).sum::<f64>() / analyses.len() as f64
}

/// Most frequent primary emotion, first-seen on ties.
pub fn dominant_emotion(analyses: &[DreamAnalysis]) -> Option<Emotion> {
    analyses
        .iter()
        .map(|a| a.primary_emotion)
        .collect::<Tally<_>>()
        .most_frequent()
        .copied()
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
pub(crate) fn sample(emotion: Emotion, intensity: f64, symbols: &[&str], tone: Tone) -> DreamAnalysis {
    DreamAnalysis {
        primary_emotion: emotion,
        emotion_intensity: intensity,
        symbols: symbols.iter().map(|s| s.to_string()).collect(),
        overall_tone: tone,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_tie_prefers_first_seen() {
        let tally: Tally<&str> = ["b", "a", "a", "b", "c"].into_iter().collect();
        assert_eq!(tally.most_frequent(), Some(&"b"));
        assert_eq!(tally.count(&"a"), 2);
        assert_eq!(tally.distinct(), 3);
    }

    #[test]
    fn test_tally_by_frequency_is_stable() {
        let tally: Tally<&str> = ["x", "y", "z", "z", "y"].into_iter().collect();
        let order: Vec<&str> = tally.by_frequency().into_iter().map(|(s, _)| *s).collect();
        assert_eq!(order, vec!["y", "z", "x"]);
    }

    #[test]
    fn test_tally_empty() {
        let tally: Tally<Emotion> = Tally::new();
        assert!(tally.most_frequent().is_none());
        assert!(tally.by_frequency().is_empty());
    }

    #[test]
    fn test_emotion_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Emotion::Anxious).unwrap(), "\"anxious\"");
        assert_eq!(serde_json::to_string(&Tone::Transformative).unwrap(), "\"transformative\"");
        assert_eq!(Emotion::parse(" Calm "), Some(Emotion::Calm));
        assert_eq!(Emotion::parse("joyful"), None);
        assert_eq!(Tone::parse("negative"), None);
    }

    #[test]
    fn test_average_and_dominant() {
        let analyses = vec![
            sample(Emotion::Calm, 0.2, &[], Tone::Positive),
            sample(Emotion::Dark, 0.4, &[], Tone::Reflective),
            sample(Emotion::Dark, 0.6, &[], Tone::Reflective),
        ];
        assert!((average_intensity(&analyses) - 0.4).abs() < 1e-9);
        assert_eq!(dominant_emotion(&analyses), Some(Emotion::Dark));
        assert_eq!(average_intensity(&[]), 0.0);
        assert_eq!(dominant_emotion(&[]), None);
    }

    #[test]
    fn test_capitalize_and_round() {
        assert_eq!(capitalize("water"), "Water");
        assert_eq!(capitalize(""), "");
        assert_eq!(round2(0.666), 0.67);
        assert_eq!(round2(1.0), 1.0);
    }
}
