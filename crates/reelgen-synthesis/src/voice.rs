//! Voice resolution.
//!
//! One descriptor is resolved per request and reused verbatim for every scene.

use std::sync::Arc;

use serde::Serialize;

use crate::catalog::{VoiceCatalog, DEFAULT_VOICE_ID, FRIENDLY_VOICE_ID};

/// Voice ids that switch resolution to user-described voices.
const CUSTOM_VOICE_IDS: &[&str] = &["custom", "i will describe"];

/// Suffix appended to user-described voices so they read like catalog prompts.
const CUSTOM_VOICE_SUFFIX: &str = "Clean audio, professional quality.";

/// Id recorded for user-described voices.
pub const CUSTOM_VOICE_ID: &str = "custom";

/// Which rung of the fallback chain produced the voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceSource {
    /// Custom mode, user-written description
    Custom,
    /// Custom mode, voice hint from the scenario
    Hint,
    /// Exact catalog id
    Catalog,
    /// Gender/age token found in the requested id
    Heuristic,
    /// Nothing matched, or custom mode with nothing to go on
    Default,
}

/// Final voice for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVoice {
    /// Catalog id, or "custom"
    pub voice_id: String,
    /// Descriptor embedded in every scene
    pub descriptor: String,
    pub source: VoiceSource,
}

impl ResolvedVoice {
    /// Deterministic speaker identity for a character.
    pub fn speaker_id(&self, character_name: &str) -> String {
        speaker_id(character_name, &self.voice_id)
    }
}

/// Resolves requested voice ids against the catalog.
#[derive(Debug, Clone)]
pub struct VoiceResolver {
    catalog: Arc<VoiceCatalog>,
}

impl VoiceResolver {
    pub fn new(catalog: Arc<VoiceCatalog>) -> Self {
        Self { catalog }
    }

    /// Resolve a voice.
    ///
    /// Order: custom mode (description, then scenario hint, then the friendly
    /// default), exact catalog id, gender/age heuristic on the id, global default.
    pub fn resolve(
        &self,
        requested: &str,
        custom_description: Option<&str>,
        voice_hint: &str,
    ) -> ResolvedVoice {
        let requested = requested.trim();

        if is_custom_id(requested) {
            return self.resolve_custom(custom_description, voice_hint);
        }

        let key = requested.to_lowercase();
        if let Some(profile) = self.catalog.get(&key) {
            return ResolvedVoice {
                voice_id: profile.id.clone(),
                descriptor: profile.prompt.clone(),
                source: VoiceSource::Catalog,
            };
        }

        if let Some(id) = heuristic_voice_id(&key) {
            if let Some(profile) = self.catalog.get(id) {
                return ResolvedVoice {
                    voice_id: profile.id.clone(),
                    descriptor: profile.prompt.clone(),
                    source: VoiceSource::Heuristic,
                };
            }
        }

        self.catalog_voice(DEFAULT_VOICE_ID, VoiceSource::Default)
    }

    fn resolve_custom(&self, custom_description: Option<&str>, voice_hint: &str) -> ResolvedVoice {
        let described = custom_description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(|d| (d, VoiceSource::Custom))
            .or_else(|| {
                Some(voice_hint.trim())
                    .filter(|h| !h.is_empty())
                    .map(|h| (h, VoiceSource::Hint))
            });

        match described {
            Some((text, source)) => ResolvedVoice {
                voice_id: CUSTOM_VOICE_ID.to_string(),
                descriptor: normalize_custom(text),
                source,
            },
            None => self.catalog_voice(FRIENDLY_VOICE_ID, VoiceSource::Default),
        }
    }

    fn catalog_voice(&self, id: &str, source: VoiceSource) -> ResolvedVoice {
        let descriptor = self
            .catalog
            .get(id)
            .map(|p| p.prompt.clone())
            .unwrap_or_else(|| format!("Clear, natural voice. {}", CUSTOM_VOICE_SUFFIX));
        ResolvedVoice {
            voice_id: id.to_string(),
            descriptor,
            source,
        }
    }
}

fn is_custom_id(requested: &str) -> bool {
    CUSTOM_VOICE_IDS
        .iter()
        .any(|id| requested.eq_ignore_ascii_case(id))
}

/// Nearest catalog id for a free-form voice id, matched on whole
/// `_`/whitespace-separated tokens. "female" wins over "male".
fn heuristic_voice_id(requested: &str) -> Option<&'static str> {
    let tokens: Vec<&str> = requested
        .split(|c: char| c == '_' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();
    let has = |word: &str| tokens.contains(&word);

    if has("female") {
        Some("female_friendly")
    } else if has("male") {
        Some("male_friendly")
    } else if has("child") {
        Some("child_happy")
    } else {
        None
    }
}

/// Trim, drop trailing punctuation and append the standard quality suffix.
fn normalize_custom(text: &str) -> String {
    let base = text.trim().trim_end_matches(['.', ',', ';', '!']).trim_end();
    format!("{}. {}", base, CUSTOM_VOICE_SUFFIX)
}

/// Speaker id: character name and voice id, lower-cased, whitespace runs
/// replaced with "_".
pub fn speaker_id(character_name: &str, voice_id: &str) -> String {
    let normalize = |s: &str| {
        s.split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("_")
    };
    format!("{}_{}", normalize(character_name), normalize(voice_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> VoiceResolver {
        VoiceResolver::new(Arc::new(VoiceCatalog::builtin()))
    }

    #[test]
    fn test_catalog_lookup() {
        let voice = resolver().resolve("  Female_Soft ", None, "");
        assert_eq!(voice.voice_id, "female_soft");
        assert_eq!(voice.source, VoiceSource::Catalog);
        assert!(voice.descriptor.starts_with("Soft, calm female voice"));
    }

    #[test]
    fn test_custom_description_wins_over_hint() {
        let voice = resolver().resolve(
            "I will describe",
            Some("Raspy baritone, slow pace."),
            "Deep calm voice",
        );
        assert_eq!(voice.voice_id, CUSTOM_VOICE_ID);
        assert_eq!(voice.source, VoiceSource::Custom);
        assert_eq!(
            voice.descriptor,
            "Raspy baritone, slow pace. Clean audio, professional quality."
        );
    }

    #[test]
    fn test_custom_falls_back_to_hint_then_friendly() {
        let voice = resolver().resolve("custom", Some("   "), "Deep calm voice.");
        assert_eq!(voice.source, VoiceSource::Hint);
        assert_eq!(
            voice.descriptor,
            "Deep calm voice. Clean audio, professional quality."
        );

        let voice = resolver().resolve("CUSTOM", None, "");
        assert_eq!(voice.source, VoiceSource::Default);
        assert_eq!(voice.voice_id, FRIENDLY_VOICE_ID);
        assert!(!voice.descriptor.is_empty());
    }

    #[test]
    fn test_heuristic_prefers_female_over_male() {
        let r = resolver();
        assert_eq!(r.resolve("young_female_narrator", None, "").voice_id, "female_friendly");
        assert_eq!(r.resolve("old male", None, "").voice_id, "male_friendly");
        assert_eq!(r.resolve("child_sleepy", None, "").voice_id, "child_happy");
        assert_eq!(r.resolve("child_sleepy", None, "").source, VoiceSource::Heuristic);
    }

    #[test]
    fn test_heuristic_matches_whole_tokens_only() {
        let r = resolver();
        for id in ["german_narrator", "human", "romantic", "kidnapper_mystery", "females_only"] {
            let voice = r.resolve(id, None, "");
            assert_eq!(voice.voice_id, DEFAULT_VOICE_ID, "{id}");
            assert_eq!(voice.source, VoiceSource::Default, "{id}");
        }
        assert_eq!(r.resolve("Calm Female", None, "").voice_id, "female_friendly");
    }

    #[test]
    fn test_unknown_uses_global_default() {
        let voice = resolver().resolve("robotic", None, "");
        assert_eq!(voice.voice_id, DEFAULT_VOICE_ID);
        assert_eq!(voice.source, VoiceSource::Default);
    }

    #[test]
    fn test_speaker_id_normalization() {
        assert_eq!(
            speaker_id("Yagnesh  Modh", "male_strong"),
            "yagnesh_modh_male_strong"
        );
        assert_eq!(speaker_id("Apple", "I will  describe"), "apple_i_will_describe");
    }
}
