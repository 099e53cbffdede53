//! Character generation request and response models.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::scene::{ParseReport, SceneRecord};

/// Maximum character name length.
pub const MAX_CHARACTER_NAME_LENGTH: usize = 100;

/// Maximum scenario length (characters).
pub const MAX_SCENARIO_LENGTH: usize = 5000;

/// Which content variant to synthesize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Presenter teaching a topic, three-point structure
    #[default]
    Educational,
    /// Talking food character describing benefits or side effects
    Food,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Educational => "educational",
            ContentKind::Food => "food",
        }
    }

    /// Parse a stored value. Anything other than "food" is educational.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("food") {
            ContentKind::Food
        } else {
            ContentKind::Educational
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Dialogue language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    #[serde(alias = "Hindi", alias = "HINDI")]
    Hindi,
    #[serde(alias = "English", alias = "ENGLISH")]
    English,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Hindi => "hindi",
            Language::English => "english",
        }
    }

    /// Upper-case label used in section headers.
    pub fn label(&self) -> &'static str {
        match self {
            Language::Hindi => "HINDI",
            Language::English => "ENGLISH",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "hindi" => Some(Language::Hindi),
            "english" => Some(Language::English),
            _ => None,
        }
    }
}

/// Angle a food character takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum TopicMode {
    #[default]
    Benefits,
    SideEffects,
    /// Any other value; educational requests ignore the topic mode
    #[serde(other)]
    General,
}

impl TopicMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopicMode::Benefits => "benefits",
            TopicMode::SideEffects => "side_effects",
            TopicMode::General => "general",
        }
    }

    /// Human wording for prompts ("health benefits", "side effects").
    pub fn phrase(&self) -> &'static str {
        match self {
            TopicMode::Benefits => "health benefits",
            TopicMode::SideEffects => "side effects",
            TopicMode::General => "key facts",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "benefits" => TopicMode::Benefits,
            "side_effects" => TopicMode::SideEffects,
            _ => TopicMode::General,
        }
    }
}

impl fmt::Display for TopicMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request to generate a character scene sequence.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CharacterSceneRequest {
    /// Character name (e.g. "Apple", "Yagnesh Modh")
    pub character_name: String,

    /// Voice identifier from the catalog, or "custom"
    pub voice_tone: String,

    #[serde(default)]
    pub topic_mode: TopicMode,

    /// Free-text scenario (topic, outfit, voice hints)
    #[serde(default)]
    pub scenario: Option<String>,

    /// Visual style; defaults per content kind when absent
    #[serde(default)]
    pub visual_style: Option<String>,

    #[serde(default)]
    pub language: Language,

    /// Total video length in seconds
    #[serde(default = "default_total_duration")]
    pub total_duration: i64,

    /// Existing project to overwrite
    #[serde(default)]
    pub project_id: Option<String>,

    #[serde(default)]
    pub content_type: ContentKind,

    /// User-written voice description used with voice_tone "custom"
    #[serde(default)]
    pub custom_voice_description: Option<String>,
}

fn default_total_duration() -> i64 {
    8
}

impl CharacterSceneRequest {
    /// Validate the request.
    pub fn validate(&self, max_total_duration: u32) -> Result<(), String> {
        let name = self.character_name.trim();
        if name.is_empty() {
            return Err("Character name is required".to_string());
        }
        if name.chars().count() > MAX_CHARACTER_NAME_LENGTH {
            return Err(format!(
                "Character name must be at most {} characters",
                MAX_CHARACTER_NAME_LENGTH
            ));
        }

        if self.voice_tone.trim().is_empty() {
            return Err("Voice tone is required".to_string());
        }

        if let Some(scenario) = &self.scenario {
            if scenario.chars().count() > MAX_SCENARIO_LENGTH {
                return Err(format!(
                    "Scenario must be at most {} characters",
                    MAX_SCENARIO_LENGTH
                ));
            }
        }

        if self.total_duration <= 0 {
            return Err("Total duration must be positive".to_string());
        }
        if self.total_duration > i64::from(max_total_duration) {
            return Err(format!(
                "Total duration must be at most {} seconds",
                max_total_duration
            ));
        }

        Ok(())
    }

    /// Scenario to synthesize from.
    ///
    /// Falls back to a sentence built from the character and topic mode when
    /// the caller sent no scenario.
    pub fn effective_scenario(&self) -> String {
        match self.scenario.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => match self.content_type {
                ContentKind::Food => format!(
                    "{} explains its {}",
                    self.character_name.trim(),
                    self.topic_mode.phrase()
                ),
                ContentKind::Educational => {
                    format!("{} explains a simple concept", self.character_name.trim())
                }
            },
        }
    }

    /// Project display name.
    pub fn project_name(&self) -> String {
        format!("{} - {}", self.character_name.trim(), self.topic_mode)
    }
}

/// Result of a generation request.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CharacterDialogueResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Whether the scenes were persisted
    pub saved: bool,
    pub message: String,
    pub scenes: Vec<SceneRecord>,
    pub total_scenes: usize,
    pub character_name: String,
    /// Content kind label ("educational" or "food")
    pub topic: String,
    pub parse_report: ParseReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CharacterSceneRequest {
        serde_json::from_str(
            r#"{"character_name": "Apple", "voice_tone": "child_happy", "topic_mode": "benefits"}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_request_defaults() {
        let req = request();
        assert_eq!(req.total_duration, 8);
        assert_eq!(req.language, Language::Hindi);
        assert_eq!(req.content_type, ContentKind::Educational);
        assert!(req.scenario.is_none());
        assert!(req.validate(600).is_ok());
    }

    #[test]
    fn test_unknown_topic_mode_is_general() {
        let req: CharacterSceneRequest = serde_json::from_str(
            r#"{"character_name": "Riya", "voice_tone": "adult_female", "topic_mode": "educational"}"#,
        )
        .unwrap();
        assert_eq!(req.topic_mode, TopicMode::General);
    }

    #[test]
    fn test_validate_rejects_bad_durations() {
        let mut req = request();
        req.total_duration = 0;
        assert!(req.validate(600).is_err());

        req.total_duration = -8;
        assert!(req.validate(600).is_err());

        req.total_duration = 601;
        assert!(req.validate(600).is_err());
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let mut req = request();
        req.character_name = "   ".to_string();
        assert!(req.validate(600).is_err());
    }

    #[test]
    fn test_effective_scenario_fallback() {
        let mut req = request();
        req.content_type = ContentKind::Food;
        req.topic_mode = TopicMode::SideEffects;
        assert_eq!(req.effective_scenario(), "Apple explains its side effects");

        req.scenario = Some("  Apple talks about fibre.  ".to_string());
        assert_eq!(req.effective_scenario(), "Apple talks about fibre.");
    }

    #[test]
    fn test_project_name() {
        assert_eq!(request().project_name(), "Apple - benefits");
    }

    #[test]
    fn test_parse_stored_values() {
        assert_eq!(ContentKind::parse("FOOD"), ContentKind::Food);
        assert_eq!(ContentKind::parse("anything"), ContentKind::Educational);
        assert_eq!(Language::parse("English"), Some(Language::English));
        assert_eq!(Language::parse("tamil"), None);
        assert_eq!(TopicMode::parse("side_effects"), TopicMode::SideEffects);
        assert_eq!(TopicMode::parse("other"), TopicMode::General);
    }
}
