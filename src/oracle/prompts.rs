use crate::analysis::DreamAnalysis;

pub const DREAM_SYSTEM: &str =
    "You are a dream reflection AI. Always return valid JSON only, no markdown formatting.";

pub const WELLNESS_SYSTEM: &str = "You are a mental wellness reflection assistant. Always return valid JSON only, no markdown formatting. Use empathetic, supportive language. Never diagnose or provide medical advice.";

pub const THEMES_SYSTEM: &str = "You are a dream reflection guide. Always return valid JSON only. Use poetic, empathetic language. Never diagnose or provide medical advice.";

pub fn dream_prompt(dream_text: &str) -> String {
    format!(
        "Analyze the following dream in a calm, empathetic, non-clinical way.

Goals:
- Identify emotions
- Detect recurring symbols
- Reflect mental tone
- Do NOT diagnose or give medical advice

Return JSON with:
- primary_emotion (one of: anxious, hopeful, calm, emotional, intense, dark)
- emotion_intensity (0-1, where 0 is very low and 1 is very high)
- symbols (array of strings, max 5)
- overall_tone (one of: positive, neutral, reflective, contemplative, transformative)

Dream text:
{dream_text}

Return ONLY valid JSON, no markdown, no code blocks, no explanations."
    )
}

fn analyses_json(analyses: &[DreamAnalysis]) -> String {
    serde_json::to_string_pretty(analyses).unwrap_or_else(|_| "[]".to_string())
}

pub fn wellness_prompt(analyses: &[DreamAnalysis]) -> String {
    format!(
        "You are given a list of dream analyses from one user over one month.

Your job:
1. Detect emotional trends
2. Identify stress vs healing patterns
3. Summarize mental state gently
4. Use supportive, human language
5. Do NOT diagnose or label illness

Dream analyses (JSON array):
{}

Return JSON with:
- mental_state (one of: Calm, Mixed, Healing, Stressed)
- summary (empathetic paragraph, 2-3 sentences)
- recurring_patterns (array of strings, max 4)
- gentle_recommendation (supportive suggestion, 1-2 sentences)

Return ONLY valid JSON, no markdown, no code blocks, no explanations.",
        analyses_json(analyses)
    )
}

pub fn themes_prompt(analyses: &[DreamAnalysis]) -> String {
    format!(
        "Analyze the following dream analyses to identify recurring subconscious themes.
Themes are symbolic patterns that appear across multiple dreams, representing deeper inner narratives.

Dream analyses:
{}

Identify 3-5 dominant themes from these symbolic patterns:
- Look for recurring symbols, emotions, and narrative patterns
- Themes should be poetic and meaningful (e.g., \"Freedom\", \"Uncertainty\", \"Exploration\", \"Connection\", \"Transformation\")
- Use empathetic, non-clinical language
- Do NOT diagnose or label

Return JSON with:
- dominant_themes (array of 3-5 theme names as strings)
- theme_explanation (2-3 sentence poetic explanation of what these themes might represent)

Return ONLY valid JSON, no markdown, no code blocks.",
        analyses_json(analyses)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{sample, Emotion, Tone};

    #[test]
    fn test_dream_prompt_embeds_text() {
        let prompt = dream_prompt("I was flying over the sea");
        assert!(prompt.contains("Dream text:\nI was flying over the sea"));
    }

    #[test]
    fn test_wellness_prompt_embeds_analyses() {
        let prompt = wellness_prompt(&[sample(Emotion::Calm, 0.3, &["water"], Tone::Positive)]);
        assert!(prompt.contains("\"primary_emotion\": \"calm\""));
        assert!(prompt.contains("mental_state (one of: Calm, Mixed, Healing, Stressed)"));
    }
}
