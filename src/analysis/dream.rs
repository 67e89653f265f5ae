//! Single-dream classifier: keyword emotion scoring, symbol detection and
//! tone classification.

use std::sync::OnceLock;

use regex::Regex;

use super::{round2, DreamAnalysis, Emotion, Tone};

const EMOTION_KEYWORDS: [(Emotion, &[&str]); 6] = [
    (
        Emotion::Anxious,
        &[
            "fear", "worried", "scared", "anxious", "panic", "nervous", "threat", "danger", "chase",
            "hide", "escape",
        ],
    ),
    (
        Emotion::Hopeful,
        &[
            "hope", "light", "bright", "future", "success", "achieve", "dream", "goal",
            "possibility", "opportunity", "growth",
        ],
    ),
    (
        Emotion::Calm,
        &[
            "peace", "calm", "serene", "quiet", "still", "tranquil", "relaxed", "comfortable",
            "safe", "protected",
        ],
    ),
    (
        Emotion::Emotional,
        &[
            "love", "loss", "sad", "cry", "tears", "heart", "feeling", "emotion", "connection",
            "relationship", "missing",
        ],
    ),
    (
        Emotion::Intense,
        &[
            "powerful", "strong", "intense", "overwhelming", "passionate", "urgent", "vivid",
            "dramatic", "transformative",
        ],
    ),
    (
        Emotion::Dark,
        &[
            "dark", "shadow", "night", "black", "void", "empty", "lonely", "isolated", "unknown",
            "mystery",
        ],
    ),
];

const SYMBOL_WORDS: [(&str, &[&str]); 11] = [
    (
        "water",
        &["water", "ocean", "sea", "river", "lake", "rain", "wave", "swim", "drown", "flood"],
    ),
    (
        "flying",
        &["fly", "flying", "soar", "sky", "air", "wings", "bird", "eagle", "height", "falling"],
    ),
    (
        "animals",
        &["dog", "cat", "bird", "snake", "lion", "tiger", "bear", "wolf", "horse", "animal", "creature"],
    ),
    (
        "vehicles",
        &["car", "bus", "train", "plane", "bike", "vehicle", "drive", "travel", "journey", "road"],
    ),
    (
        "buildings",
        &["house", "building", "room", "door", "window", "stairs", "home", "school", "office"],
    ),
    (
        "people",
        &["family", "friend", "parent", "child", "stranger", "person", "people", "crowd", "group"],
    ),
    (
        "nature",
        &["tree", "forest", "mountain", "hill", "garden", "flower", "grass", "earth", "ground"],
    ),
    (
        "light",
        &["light", "sun", "bright", "glow", "shine", "star", "moon", "fire", "flame", "spark"],
    ),
    (
        "darkness",
        &["dark", "shadow", "night", "black", "void", "tunnel", "cave", "underground"],
    ),
    (
        "death",
        &["death", "die", "dead", "grave", "funeral", "end", "loss", "goodbye", "farewell"],
    ),
    (
        "transformation",
        &["change", "transform", "become", "grow", "evolve", "metamorphosis", "shift"],
    ),
];

const POSITIVE_TONE: &[&str] = &[
    "happy", "joy", "success", "achievement", "love", "peace", "hope", "bright", "beautiful",
    "wonderful",
];
const NEGATIVE_TONE: &[&str] = &[
    "sad", "fear", "anxiety", "worry", "stress", "pain", "loss", "dark", "scary", "trouble",
];
const TRANSFORMATIVE_TONE: &[&str] = &[
    "change", "growth", "transformation", "journey", "discovery", "learning", "evolution",
];

fn whole_word_pattern(words: &[&str]) -> Regex {
    let alternation = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{alternation})\b")).expect("keyword pattern is valid")
}

fn emotion_patterns() -> &'static [(Emotion, Regex)] {
    static PATTERNS: OnceLock<Vec<(Emotion, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        EMOTION_KEYWORDS
            .iter()
            .map(|(emotion, words)| (*emotion, whole_word_pattern(words)))
            .collect()
    })
}

fn symbol_patterns() -> &'static [(&'static str, Regex)] {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        SYMBOL_WORDS
            .iter()
            .map(|(symbol, words)| (*symbol, whole_word_pattern(words)))
            .collect()
    })
}

/// Classifies one dream narrative. Never fails: blank input yields
/// [`DreamAnalysis::neutral`].
pub fn analyze_dream(dream_text: &str) -> DreamAnalysis {
    if dream_text.trim().is_empty() {
        return DreamAnalysis::neutral();
    }

    let text = dream_text.to_lowercase();
    let word_count = text.split_whitespace().count().max(1);

    let mut primary = Emotion::CATEGORIES[0];
    let mut best_score = 0usize;
    for (emotion, pattern) in emotion_patterns() {
        let score = pattern.find_iter(&text).count();
        if score > best_score {
            best_score = score;
            primary = *emotion;
        }
    }

    // Scores below one hit still count as one so keyword-free text is not
    // reported as zero intensity.
    let max_score = best_score.max(1) as f64;
    let intensity = (max_score / (word_count as f64 * 0.1)).min(1.0);

    let symbols: Vec<String> = symbol_patterns()
        .iter()
        .filter(|(_, pattern)| pattern.is_match(&text))
        .map(|(symbol, _)| symbol.to_string())
        .take(DreamAnalysis::MAX_SYMBOLS)
        .collect();

    DreamAnalysis {
        primary_emotion: primary,
        emotion_intensity: round2(intensity),
        symbols,
        overall_tone: classify_tone(&text),
    }
}

fn indicators_present(text: &str, indicators: &[&str]) -> usize {
    indicators.iter().filter(|word| text.contains(*word)).count()
}

fn classify_tone(text: &str) -> Tone {
    let positive = indicators_present(text, POSITIVE_TONE) as f64;
    let negative = indicators_present(text, NEGATIVE_TONE) as f64;
    let transformative = indicators_present(text, TRANSFORMATIVE_TONE);

    if transformative > 0 && positive > negative {
        Tone::Transformative
    } else if positive > negative * 1.5 {
        Tone::Positive
    } else if negative > positive * 1.5 {
        Tone::Reflective
    } else if negative > 0.0 {
        Tone::Contemplative
    } else {
        Tone::Neutral
    }
}

/// Short empathetic reflection shown back to the user after submitting a dream.
pub fn dream_reflection(analysis: &DreamAnalysis) -> String {
    let base = match analysis.primary_emotion {
        Emotion::Anxious => "Your dream reflects feelings of uncertainty or concern. This is a natural response to navigating life's challenges. Consider what aspects of your waking life might be contributing to these feelings.",
        Emotion::Hopeful => "Your dream carries a sense of possibility and forward movement. This suggests you're open to growth and new experiences. What opportunities are you most excited about?",
        Emotion::Calm => "Your dream has a peaceful, centered quality. This may reflect a sense of balance or a need for tranquility in your life. How can you bring more of this calm into your daily routine?",
        Emotion::Emotional => "Your dream touches on deep feelings and connections. Emotions in dreams often help us process relationships and experiences. What relationships or experiences are most meaningful to you right now?",
        Emotion::Intense => "Your dream has a powerful, vivid quality. Strong dreams often mark periods of significant change or important realizations. What feels most important or urgent in your life currently?",
        Emotion::Dark => "Your dream explores shadowy or unknown territories. This can represent parts of yourself or your life that need attention or understanding. What feels hidden or unexplored that you'd like to bring into the light?",
        Emotion::Neutral => "Your dream offers insights into your inner world. Take time to reflect on what resonates with you.",
    };

    if analysis.symbols.is_empty() {
        return base.to_string();
    }

    let named: Vec<&str> = analysis.symbols.iter().take(2).map(String::as_str).collect();
    format!(
        "{base} The presence of {} in your dream may hold personal significance.",
        named.join(" and ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_blank_input_is_neutral() {
        for text in ["", "   ", "\n\t "] {
            let analysis = analyze_dream(text);
            assert_eq!(analysis, DreamAnalysis::neutral());
        }
    }

    #[test]
    fn test_calm_dream() {
        let analysis = analyze_dream("I felt so peaceful and calm, everything was still and quiet");
        assert_eq!(analysis.primary_emotion, Emotion::Calm);
        // calm, still, quiet over 11 words
        assert_eq!(analysis.emotion_intensity, 1.0);
        assert!(analysis.symbols.is_empty());
    }

    #[test]
    fn test_chasing_shadow_dream_is_dark() {
        // "chasing" is not the whole word "chase"
        let analysis =
            analyze_dream("I was scared and ran from a chasing shadow in the dark forest");
        assert_eq!(analysis.primary_emotion, Emotion::Dark);
        assert_eq!(analysis.emotion_intensity, 1.0);
        assert_eq!(analysis.symbols, vec!["nature", "darkness"]);
    }

    #[test]
    fn test_tie_goes_to_first_declared_category() {
        // anxious: scared, chase; dark: shadow, dark
        let analysis = analyze_dream("scared of the chase, a shadow in the dark");
        assert_eq!(analysis.primary_emotion, Emotion::Anxious);
    }

    #[test]
    fn test_keywords_match_whole_words_only() {
        // "hopeless" and "stillness" must not count as hope / still
        let analysis = analyze_dream("hopeless stillness fearful");
        assert_eq!(analysis.primary_emotion, Emotion::Anxious);
        assert!(analysis.emotion_intensity > 0.0);
    }

    #[test]
    fn test_intensity_normalised_by_length() {
        // one hit ("love") in 20 words -> 1 / 2.0
        let text = "love one two three four five six seven eight nine ten eleven twelve thirteen fourteen fifteen sixteen seventeen eighteen nineteen";
        let analysis = analyze_dream(text);
        assert_eq!(analysis.primary_emotion, Emotion::Emotional);
        assert_eq!(analysis.emotion_intensity, 0.5);
    }

    #[test]
    fn test_symbols_follow_declaration_order_and_cap() {
        let text = "a shadow over the ocean, a bird in the sky, my car, the house, my family, \
                    the forest, the sun, a funeral, and then I began to change";
        let analysis = analyze_dream(text);
        assert_eq!(
            analysis.symbols,
            vec!["water", "flying", "animals", "vehicles", "buildings"]
        );
    }

    #[test]
    fn test_tone_transformative() {
        let analysis = analyze_dream("a beautiful journey of change and hope");
        assert_eq!(analysis.overall_tone, Tone::Transformative);
    }

    #[test]
    fn test_tone_positive_reflective_contemplative() {
        assert_eq!(analyze_dream("a happy wonderful day").overall_tone, Tone::Positive);
        assert_eq!(analyze_dream("pain and trouble everywhere").overall_tone, Tone::Reflective);
        assert_eq!(analyze_dream("love and loss").overall_tone, Tone::Contemplative);
        assert_eq!(analyze_dream("an ordinary walk").overall_tone, Tone::Neutral);
    }

    #[test]
    fn test_tone_uses_substrings() {
        // "darkness" contains "dark", "sadness" contains "sad"
        assert_eq!(analyze_dream("darkness and sadness").overall_tone, Tone::Reflective);
    }

    #[test]
    fn test_reflection_mentions_first_two_symbols() {
        let analysis = analyze_dream("I swam in the ocean under a flying bird near a house");
        let reflection = dream_reflection(&analysis);
        assert!(reflection.contains("water and flying"));
    }

    #[test]
    fn test_reflection_for_neutral() {
        let reflection = dream_reflection(&DreamAnalysis::neutral());
        assert!(reflection.starts_with("Your dream offers insights"));
    }

    proptest! {
        #[test]
        fn prop_intensity_in_unit_range_with_two_decimals(text in ".{0,300}") {
            let analysis = analyze_dream(&text);
            prop_assert!((0.0..=1.0).contains(&analysis.emotion_intensity));
            let scaled = analysis.emotion_intensity * 100.0;
            prop_assert!((scaled - scaled.round()).abs() < 1e-6);
        }

        #[test]
        fn prop_symbols_capped_and_unique(words in proptest::collection::vec("[a-z]{2,8}|water|sky|bird|car|house|tree|sun|cave|dead|change|crowd", 0..60)) {
            let analysis = analyze_dream(&words.join(" "));
            prop_assert!(analysis.symbols.len() <= DreamAnalysis::MAX_SYMBOLS);
            let mut deduped = analysis.symbols.clone();
            deduped.sort();
            deduped.dedup();
            prop_assert_eq!(deduped.len(), analysis.symbols.len());
        }
    }
}
