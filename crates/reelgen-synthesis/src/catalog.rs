//! Built-in voice catalog.

use std::collections::HashMap;

use reelgen_models::VoiceProfile;

/// Catalog entry id used when nothing else resolves.
pub const DEFAULT_VOICE_ID: &str = "adult_male";

/// Catalog entry used for custom mode without any description.
pub const FRIENDLY_VOICE_ID: &str = "male_friendly";

struct Entry {
    id: &'static str,
    description: &'static str,
    prompt: &'static str,
    pitch: &'static str,
    age_range: &'static str,
    accent: &'static str,
    tags: &'static [&'static str],
}

const ENTRIES: &[Entry] = &[
    Entry {
        id: "child_happy",
        description: "Cute, cheerful youthful voice",
        prompt: "Youthful, bright voice, playful and cheerful tone, clear high-pitched delivery, energetic, clean audio.",
        pitch: "High",
        age_range: "youthful",
        accent: "neutral Indian accent",
        tags: &["child", "cheerful", "playful"],
    },
    Entry {
        id: "child_excited",
        description: "Energetic, bouncy youthful voice",
        prompt: "Animated, excited voice, high-pitched and fast-paced, bouncy energetic tone, enthusiastic delivery, clean audio.",
        pitch: "Very high",
        age_range: "youthful",
        accent: "neutral Indian accent",
        tags: &["child", "excited", "energetic"],
    },
    Entry {
        id: "male_friendly",
        description: "Friendly, warm adult male voice",
        prompt: "Warm, clear male voice, calm and friendly tone, natural conversational delivery, neutral Indian accent, clean audio.",
        pitch: "Medium",
        age_range: "late 20s to early 40s",
        accent: "neutral Indian accent",
        tags: &["male", "friendly", "conversational"],
    },
    Entry {
        id: "male_strong",
        description: "Deep, mature adult male voice with clear delivery",
        prompt: "Deep, calm male voice, confident and professional tone, clear articulation, steady pace, neutral Indian accent, clean audio.",
        pitch: "Low to medium-low",
        age_range: "late 30s to early 40s",
        accent: "neutral Indian accent",
        tags: &["male", "deep", "confident"],
    },
    Entry {
        id: "adult_male",
        description: "Professional adult male voice",
        prompt: "Clear adult male voice, calm and professional, smooth delivery, easy to understand, clean indoor audio.",
        pitch: "Medium-low",
        age_range: "30s to 40s",
        accent: "neutral accent",
        tags: &["male", "professional", "default"],
    },
    Entry {
        id: "female_friendly",
        description: "Warm, mature adult female voice with friendly tone",
        prompt: "Warm, clear female voice, friendly and gentle tone, natural pacing, neutral Indian accent, clean audio.",
        pitch: "Medium",
        age_range: "early 30s to mid 40s",
        accent: "neutral Indian accent",
        tags: &["female", "friendly", "warm"],
    },
    Entry {
        id: "adult_female",
        description: "Professional adult female voice",
        prompt: "Clear female voice, calm and professional delivery, smooth articulation, natural tone, clean indoor audio.",
        pitch: "Medium",
        age_range: "early 30s to mid 40s",
        accent: "neutral Indian accent",
        tags: &["female", "professional"],
    },
    Entry {
        id: "female_soft",
        description: "Soft, gentle female voice, soothing tone",
        prompt: "Soft, calm female voice, slow and reassuring tone, gentle delivery, clean quiet audio.",
        pitch: "Medium-high",
        age_range: "mid 20s to mid 30s",
        accent: "soft Indian accent",
        tags: &["female", "soft", "soothing"],
    },
    Entry {
        id: "cartoon",
        description: "Expressive, animated cartoon character voice",
        prompt: "Fun, animated cartoon voice, expressive and energetic, playful tone, clear speech, lively delivery.",
        pitch: "Variable, expressive",
        age_range: "ageless",
        accent: "animated, clear",
        tags: &["cartoon", "playful", "expressive"],
    },
];

/// Read-only voice catalog keyed by voice id.
#[derive(Debug, Clone)]
pub struct VoiceCatalog {
    profiles: HashMap<String, VoiceProfile>,
}

impl VoiceCatalog {
    /// Catalog with the built-in voices.
    pub fn builtin() -> Self {
        let profiles = ENTRIES
            .iter()
            .map(|e| {
                let profile = VoiceProfile {
                    id: e.id.to_string(),
                    description: e.description.to_string(),
                    prompt: e.prompt.to_string(),
                    pitch: e.pitch.to_string(),
                    age_range: e.age_range.to_string(),
                    accent: e.accent.to_string(),
                    tags: e.tags.iter().map(|t| t.to_string()).collect(),
                };
                (profile.id.clone(), profile)
            })
            .collect();
        Self { profiles }
    }

    /// Look up a voice by exact id.
    pub fn get(&self, id: &str) -> Option<&VoiceProfile> {
        self.profiles.get(id)
    }

    /// All voices, sorted by id.
    pub fn profiles(&self) -> Vec<&VoiceProfile> {
        let mut all: Vec<_> = self.profiles.values().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for VoiceCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_entries() {
        let catalog = VoiceCatalog::builtin();
        assert_eq!(catalog.len(), 9);
        assert!(catalog.get(DEFAULT_VOICE_ID).is_some());
        assert!(catalog.get("nonexistent").is_none());
    }

    #[test]
    fn test_fallback_entries_exist() {
        let catalog = VoiceCatalog::builtin();
        let friendly = catalog.get(FRIENDLY_VOICE_ID).unwrap();
        assert!(friendly.has_tag("friendly"));
        for id in ["female_friendly", "male_friendly", "child_happy", "adult_male"] {
            assert!(catalog.get(id).is_some(), "missing {}", id);
        }
    }

    #[test]
    fn test_prompts_are_non_empty() {
        let catalog = VoiceCatalog::builtin();
        assert!(catalog.profiles().iter().all(|p| !p.prompt.is_empty()));
    }
}
