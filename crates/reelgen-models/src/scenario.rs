//! Scenario attributes extracted from a free-text scenario.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Structured view of a scenario string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScenarioAttributes {
    /// What the character teaches. Never empty after extraction.
    pub teaching_topic: String,
    /// Outfit text to reuse verbatim in every scene, or empty
    #[serde(default)]
    pub outfit_description: String,
    /// Voice characteristics mentioned in the scenario, or empty
    #[serde(default)]
    pub voice_hint: String,
}

impl ScenarioAttributes {
    pub fn has_outfit(&self) -> bool {
        !self.outfit_description.trim().is_empty()
    }

    pub fn has_voice_hint(&self) -> bool {
        !self.voice_hint.trim().is_empty()
    }
}
