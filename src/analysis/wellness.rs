//! Monthly wellness aggregation over a month of per-dream analyses.

use serde::{Deserialize, Serialize};

use super::{capitalize, DreamAnalysis, Emotion, Tally, Tone};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "mental_state")]
pub enum MentalState {
    Calm,
    #[default]
    Mixed,
    Healing,
    Stressed,
}

impl MentalState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MentalState::Calm => "Calm",
            MentalState::Mixed => "Mixed",
            MentalState::Healing => "Healing",
            MentalState::Stressed => "Stressed",
        }
    }

    /// Exact, case-sensitive match against the four state names.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Calm" => Some(MentalState::Calm),
            "Mixed" => Some(MentalState::Mixed),
            "Healing" => Some(MentalState::Healing),
            "Stressed" => Some(MentalState::Stressed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MonthlyWellnessReport {
    pub mental_state: MentalState,
    pub summary: String,
    pub recurring_patterns: Vec<String>,
    pub gentle_recommendation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dominant_themes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archetype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evolution_summary: Option<String>,
}

/// Aggregated signals for one month, computed once and shared by the state
/// decision and the prose generators.
#[derive(Debug, Clone)]
pub struct MonthlyStats {
    pub dream_count: usize,
    pub avg_intensity: f64,
    pub dominant_emotion: Emotion,
    pub emotion_counts: Tally<Emotion>,
    /// Number of different primary emotions seen in the month.
    pub distinct_emotions: usize,
    pub recurring_symbols: Vec<String>,
    pub tone_counts: Tally<Tone>,
    pub positive_ratio: f64,
    pub transformative_ratio: f64,
    pub negative_tone_ratio: f64,
}

impl MonthlyStats {
    pub fn compute(analyses: &[DreamAnalysis]) -> Option<Self> {
        if analyses.is_empty() {
            return None;
        }
        let dream_count = analyses.len();
        let n = dream_count as f64;

        let emotion_counts: Tally<Emotion> = analyses.iter().map(|a| a.primary_emotion).collect();
        let dominant_emotion = emotion_counts.most_frequent().copied()?;
        let avg_intensity = analyses.iter().map(|a| a.emotion_intensity).sum::<f64>() / n;

        let symbol_counts: Tally<&str> = analyses
            .iter()
            .flat_map(|a| a.symbols.iter().map(String::as_str))
            .collect();
        let threshold = (n * 0.3).ceil() as usize;
        let recurring_symbols = symbol_counts
            .by_frequency()
            .into_iter()
            .filter(|(_, count)| *count >= threshold)
            .take(5)
            .map(|(symbol, _)| symbol.to_string())
            .collect();

        let tone_counts: Tally<Tone> = analyses.iter().map(|a| a.overall_tone).collect();
        let ratio = |tone: Tone| tone_counts.count(&tone) as f64 / n;
        let negative_tone_ratio = ratio(Tone::Reflective) + ratio(Tone::Contemplative);

        Some(Self {
            dream_count,
            avg_intensity,
            dominant_emotion,
            distinct_emotions: emotion_counts.distinct(),
            emotion_counts,
            recurring_symbols,
            positive_ratio: ratio(Tone::Positive),
            transformative_ratio: ratio(Tone::Transformative),
            negative_tone_ratio,
            tone_counts,
        })
    }

    pub fn mental_state(&self) -> MentalState {
        if self.avg_intensity < 0.3
            && self.dominant_emotion == Emotion::Calm
            && self.positive_ratio > 0.5
        {
            MentalState::Calm
        } else if self.avg_intensity > 0.7
            && matches!(self.dominant_emotion, Emotion::Anxious | Emotion::Dark)
        {
            MentalState::Stressed
        } else if self.transformative_ratio > 0.4 && self.positive_ratio > self.negative_tone_ratio
        {
            MentalState::Healing
        } else {
            MentalState::Mixed
        }
    }
}

pub fn analyze_monthly_wellness(analyses: &[DreamAnalysis]) -> MonthlyWellnessReport {
    let Some(stats) = MonthlyStats::compute(analyses) else {
        return MonthlyWellnessReport {
            mental_state: MentalState::Mixed,
            summary: "Your dream journal is just beginning. As you continue to record your dreams, patterns and insights will emerge that can help you understand your inner world better.".into(),
            recurring_patterns: Vec::new(),
            gentle_recommendation: "Keep writing your dreams. Over time, you'll notice themes and patterns that can offer valuable self-reflection.".into(),
            ..Default::default()
        };
    };

    let mental_state = stats.mental_state();
    MonthlyWellnessReport {
        mental_state,
        summary: summary(mental_state, &stats),
        recurring_patterns: patterns(&stats),
        gentle_recommendation: recommendation(mental_state, &stats.recurring_symbols),
        ..Default::default()
    }
}

fn emotion_description(emotion: Emotion) -> &'static str {
    match emotion {
        Emotion::Anxious => "feelings of concern or uncertainty",
        Emotion::Hopeful => "a sense of possibility and forward movement",
        Emotion::Calm => "peaceful and centered moments",
        Emotion::Emotional => "deep feelings and connections",
        Emotion::Intense => "powerful and vivid experiences",
        Emotion::Dark => "exploration of shadowy or unknown territories",
        Emotion::Neutral => "various emotional experiences",
    }
}

fn summary(state: MentalState, stats: &MonthlyStats) -> String {
    let mut summary = format!(
        "Over the past month, your dreams have shown {}. ",
        emotion_description(stats.dominant_emotion)
    );

    summary.push_str(match state {
        MentalState::Calm => "There's a sense of balance and tranquility in your inner world. Your dreams reflect a period of stability and peace. ",
        MentalState::Healing => "You're experiencing a journey of growth and transformation. Your dreams suggest you're processing change and moving toward new understanding. ",
        MentalState::Stressed => "Your dreams indicate you may be navigating some challenges or concerns. This is a natural part of life's journey, and your dreams are helping you process these experiences. ",
        MentalState::Mixed => "Your emotional landscape shows variety and complexity, which is completely normal. Life brings many different experiences, and your dreams reflect this rich inner world. ",
    });

    if !stats.recurring_symbols.is_empty() {
        let named: Vec<&str> = stats
            .recurring_symbols
            .iter()
            .take(2)
            .map(String::as_str)
            .collect();
        summary.push_str(&format!(
            "You've been revisiting themes around {} in your dreams, which may hold personal significance for you. ",
            named.join(" and ")
        ));
    }

    if stats.transformative_ratio > 0.3 {
        summary.push_str("There's a sense of movement and change in your dreams, suggesting you're in a period of growth and discovery. ");
    }

    summary.push_str(
        "Remember, dreams are a natural way your mind processes experiences, emotions, and thoughts.",
    );
    summary
}

fn patterns(stats: &MonthlyStats) -> Vec<String> {
    let mut patterns = Vec::new();

    if let Some((emotion, count)) = stats.emotion_counts.by_frequency().first() {
        let percentage = (*count as f64 / stats.dream_count as f64 * 100.0).round() as u32;
        if percentage >= 40 {
            patterns.push(format!(
                "{} emotions appear in {}% of your dreams",
                capitalize(emotion.as_str()),
                percentage
            ));
        }
    }

    if !stats.recurring_symbols.is_empty() {
        let named: Vec<&str> = stats
            .recurring_symbols
            .iter()
            .take(3)
            .map(String::as_str)
            .collect();
        patterns.push(format!("Recurring symbols: {}", named.join(", ")));
    }

    if let Some(tone) = stats.tone_counts.most_frequent() {
        if *tone != Tone::Neutral {
            patterns.push(format!("Overall {} tone in your dream experiences", tone));
        }
    }

    if stats.distinct_emotions >= 4 {
        patterns.push("Rich emotional diversity across your dreams".to_string());
    }

    patterns.truncate(4);
    patterns
}

fn symbol_guidance(symbol: &str) -> Option<&'static str> {
    match symbol {
        "water" => Some("Water in dreams often relates to emotions. Consider how you're feeling and what you might need to express."),
        "flying" => Some("Flying dreams can represent freedom or escape. What areas of your life feel liberating or where do you need more freedom?"),
        "animals" => Some("Animals in dreams may represent instincts or natural parts of yourself. What qualities do these animals embody that resonate with you?"),
        "transformation" => Some("Transformation themes suggest growth. What changes are you experiencing or hoping for?"),
        _ => None,
    }
}

fn recommendation(state: MentalState, recurring_symbols: &[String]) -> String {
    let base = match state {
        MentalState::Calm => "Continue to nurture the peace you're experiencing. Consider what practices or activities help maintain this sense of balance.",
        MentalState::Healing => "You're on a meaningful journey of growth. Be gentle with yourself as you navigate changes and new understandings.",
        MentalState::Stressed => "Your dreams are helping you process concerns. Consider what support systems or self-care practices might help you feel more grounded.",
        MentalState::Mixed => "Your emotional landscape is rich and varied. This complexity is normal and reflects the full range of human experience.",
    };

    match recurring_symbols.iter().find_map(|s| symbol_guidance(s)) {
        Some(guidance) => format!("{base} {guidance}"),
        None => base.to_string(),
    }
}
