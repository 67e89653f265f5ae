//! Dreamer archetypes and the rules that pick one for a month.

use serde::{Deserialize, Serialize};

use super::Emotion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    Dreamer,
    Explorer,
    Seeker,
    Protector,
    #[serde(rename = "Shadow Walker")]
    ShadowWalker,
    Creator,
}

impl Archetype {
    pub const ALL: [Archetype; 6] = [
        Archetype::Dreamer,
        Archetype::Explorer,
        Archetype::Seeker,
        Archetype::Protector,
        Archetype::ShadowWalker,
        Archetype::Creator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Archetype::Dreamer => "Dreamer",
            Archetype::Explorer => "Explorer",
            Archetype::Seeker => "Seeker",
            Archetype::Protector => "Protector",
            Archetype::ShadowWalker => "Shadow Walker",
            Archetype::Creator => "Creator",
        }
    }

    pub fn data(&self) -> ArchetypeData {
        let (description, characteristics): (&str, [&str; 4]) = match self {
            Archetype::Dreamer => (
                "You navigate worlds of possibility, where imagination and reality blend into beautiful visions. Your dreams are gateways to what could be.",
                ["Imaginative", "Visionary", "Hopeful", "Intuitive"],
            ),
            Archetype::Explorer => (
                "Your dreams are journeys into unknown territories. You seek new experiences, understanding, and perspectives in your inner landscape.",
                ["Curious", "Adventurous", "Open-minded", "Courageous"],
            ),
            Archetype::Seeker => (
                "You are on a quest for meaning, truth, and deeper understanding. Your dreams reflect a soul searching for answers and purpose.",
                ["Reflective", "Purposeful", "Questioning", "Determined"],
            ),
            Archetype::Protector => (
                "Your dreams show a deep care for safety, stability, and the well-being of yourself and others. You create sanctuaries in your inner world.",
                ["Caring", "Grounded", "Nurturing", "Responsible"],
            ),
            Archetype::ShadowWalker => (
                "You courageously explore the deeper, more mysterious aspects of your inner world. Your dreams reveal hidden truths and unspoken feelings.",
                ["Brave", "Introspective", "Mysterious", "Transformative"],
            ),
            Archetype::Creator => (
                "Your dreams are canvases of creation, where ideas, art, and new possibilities come to life. You transform thoughts into visions.",
                ["Artistic", "Innovative", "Expressive", "Inspiring"],
            ),
        };
        ArchetypeData {
            archetype: *self,
            description: description.to_string(),
            characteristics: characteristics.iter().map(|c| c.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeData {
    pub archetype: Archetype,
    pub description: String,
    pub characteristics: Vec<String>,
}

/// Theme keyword groups, checked in order; the first group with any
/// matching theme decides the archetype.
const THEME_RULES: [(&[&str], Archetype); 5] = [
    (&["freedom", "exploration", "journey"], Archetype::Explorer),
    (&["uncertainty", "darkness", "shadow"], Archetype::ShadowWalker),
    (&["transformation", "growth", "creation"], Archetype::Creator),
    (&["connection", "relationship", "stability"], Archetype::Protector),
    (&["clarity", "meaning", "truth"], Archetype::Seeker),
];

pub fn determine_archetype(
    dominant_themes: &[String],
    dominant_emotion: Emotion,
    avg_intensity: f64,
) -> ArchetypeData {
    let themes: Vec<String> = dominant_themes.iter().map(|t| t.to_lowercase()).collect();

    for (keywords, archetype) in THEME_RULES {
        if themes
            .iter()
            .any(|theme| keywords.iter().any(|k| theme.contains(k)))
        {
            return archetype.data();
        }
    }

    let archetype = match dominant_emotion {
        Emotion::Hopeful if avg_intensity < 0.6 => Archetype::Dreamer,
        Emotion::Anxious | Emotion::Dark => Archetype::ShadowWalker,
        Emotion::Intense if avg_intensity > 0.7 => Archetype::Creator,
        Emotion::Calm if avg_intensity < 0.4 => Archetype::Protector,
        _ => Archetype::Dreamer,
    };
    archetype.data()
}

pub fn all_archetypes() -> Vec<ArchetypeData> {
    Archetype::ALL.iter().map(Archetype::data).collect()
}
