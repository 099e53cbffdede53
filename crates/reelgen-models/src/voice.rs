//! Voice profile model.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A catalog voice.
///
/// Profiles are built once at startup and never mutated. The `prompt` is the
/// canonical descriptor embedded verbatim into every scene of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VoiceProfile {
    /// Catalog key (e.g. "male_friendly")
    pub id: String,
    /// Human-readable label
    pub description: String,
    /// Canonical voice prompt text
    pub prompt: String,
    /// Pitch tag (e.g. "medium-low")
    pub pitch: String,
    /// Age range tag (e.g. "28-35")
    pub age_range: String,
    /// Accent tag
    pub accent: String,
    /// Style tags (e.g. ["friendly", "conversational"])
    #[serde(default)]
    pub tags: Vec<String>,
}

impl VoiceProfile {
    /// Whether the profile carries the given style tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}
