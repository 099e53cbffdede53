//! Synthesized scene records.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::plan::SlotRole;

/// Placeholder used when a block carries no teaching point.
pub const DEFAULT_TEACHING_POINT: &str = "Key teaching point";

/// Where a scene's content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum SceneOrigin {
    /// Parsed from the generation backend's response
    #[default]
    Parsed,
    /// Synthesized locally to fill a slot that failed to parse
    Fallback,
}

impl SceneOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            SceneOrigin::Parsed => "parsed",
            SceneOrigin::Fallback => "fallback",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "parsed" => Some(SceneOrigin::Parsed),
            "fallback" => Some(SceneOrigin::Fallback),
            _ => None,
        }
    }
}

/// One timed scene. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SceneRecord {
    /// 1-based, contiguous
    pub scene_number: u32,
    pub role: SlotRole,
    /// Rendered scene length in seconds
    pub duration_secs: u32,
    pub visual_description: String,
    pub dialogue: String,
    pub teaching_point: String,
    /// Character expression label (e.g. "engaging", "concerned")
    pub emotion: String,
    pub speaker_id: String,
    /// Shared by every scene of one request
    pub voice_descriptor: String,
    #[serde(default)]
    pub origin: SceneOrigin,
    /// Composite production prompt for this scene
    pub prompt: String,
}

impl SceneRecord {
    pub fn is_fallback(&self) -> bool {
        self.origin == SceneOrigin::Fallback
    }

    /// Number of whitespace-separated words in the dialogue.
    pub fn dialogue_words(&self) -> usize {
        self.dialogue.split_whitespace().count()
    }
}

/// How the response was split into blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SplitStrategy {
    /// Paired `SCENE n` / `END SCENE n` delimiters
    Paired,
    /// Opening delimiters only, numbered by position
    OpenersOnly,
}

/// Quality signals from parsing one response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ParseReport {
    pub strategy: SplitStrategy,
    /// Blocks found in the response
    pub blocks_found: usize,
    /// Scene numbers filled by fallback synthesis
    #[serde(default)]
    pub repaired_slots: Vec<u32>,
    /// Scene numbers whose dialogue exceeds its word budget
    #[serde(default)]
    pub over_budget_slots: Vec<u32>,
}

impl ParseReport {
    pub fn is_clean(&self) -> bool {
        self.repaired_slots.is_empty() && self.over_budget_slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_defaults_to_parsed() {
        let json = r#"{
            "scene_number": 1,
            "role": "cutaway",
            "duration_secs": 7,
            "visual_description": "A glowing atom",
            "dialogue": "Atoms are tiny",
            "teaching_point": "Atoms",
            "emotion": "engaging",
            "speaker_id": "riya_female_friendly",
            "voice_descriptor": "Warm voice",
            "prompt": "..."
        }"#;
        let record: SceneRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.origin, SceneOrigin::Parsed);
        assert_eq!(record.role, SlotRole::Cutaway);
        assert_eq!(record.dialogue_words(), 3);
    }

    #[test]
    fn test_report_is_clean() {
        let mut report = ParseReport {
            strategy: SplitStrategy::Paired,
            blocks_found: 3,
            repaired_slots: vec![],
            over_budget_slots: vec![],
        };
        assert!(report.is_clean());

        report.repaired_slots.push(2);
        assert!(!report.is_clean());
    }
}
