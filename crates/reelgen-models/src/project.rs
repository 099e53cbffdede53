//! Character project models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::request::{CharacterSceneRequest, ContentKind, Language, TopicMode};

/// Unique identifier for a character project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ProjectId(pub String);

impl ProjectId {
    /// Generate a new random project ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Project metadata stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CharacterProject {
    pub project_id: ProjectId,

    /// Owner
    pub user_id: String,

    /// Display name ("{character} - {topic_mode}")
    pub project_name: String,

    pub character_name: String,
    pub voice_tone: String,

    #[serde(default)]
    pub topic_mode: TopicMode,

    #[serde(default)]
    pub content_type: ContentKind,

    #[serde(default)]
    pub scenario: Option<String>,

    pub visual_style: String,

    #[serde(default)]
    pub language: Language,

    /// Total requested duration in seconds
    pub total_duration: u32,

    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl CharacterProject {
    /// Build a project from a generation request.
    pub fn from_request(
        project_id: ProjectId,
        user_id: impl Into<String>,
        request: &CharacterSceneRequest,
        visual_style: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            project_id,
            user_id: user_id.into(),
            project_name: request.project_name(),
            character_name: request.character_name.trim().to_string(),
            voice_tone: request.voice_tone.clone(),
            topic_mode: request.topic_mode,
            content_type: request.content_type,
            scenario: request.scenario.clone(),
            visual_style: visual_style.into(),
            language: request.language,
            total_duration: u32::try_from(request.total_duration).unwrap_or(0),
            created_at: now,
            last_updated: now,
        }
    }

    /// Mark the project as updated now.
    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }
}

/// Request to create an empty project.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreateProjectRequest {
    #[serde(default)]
    pub project_name: Option<String>,
    pub character_name: String,
    pub voice_tone: String,
    #[serde(default)]
    pub topic_mode: TopicMode,
    #[serde(default)]
    pub content_type: ContentKind,
    #[serde(default)]
    pub scenario: Option<String>,
    #[serde(default)]
    pub visual_style: Option<String>,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub total_duration: u32,
}

impl CreateProjectRequest {
    /// Validate the request.
    pub fn validate(&self) -> Result<(), String> {
        if self.character_name.trim().is_empty() {
            return Err("Character name is required".to_string());
        }
        if self.voice_tone.trim().is_empty() {
            return Err("Voice tone is required".to_string());
        }
        Ok(())
    }

    /// Build the project record for a user.
    pub fn into_project(self, user_id: impl Into<String>, default_style: &str) -> CharacterProject {
        let now = Utc::now();
        let character_name = self.character_name.trim().to_string();
        let project_name = self
            .project_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("{} - {}", character_name, self.topic_mode));

        CharacterProject {
            project_id: ProjectId::new(),
            user_id: user_id.into(),
            project_name,
            character_name,
            voice_tone: self.voice_tone,
            topic_mode: self.topic_mode,
            content_type: self.content_type,
            scenario: self.scenario,
            visual_style: self
                .visual_style
                .unwrap_or_else(|| default_style.to_string()),
            language: self.language,
            total_duration: self.total_duration,
            created_at: now,
            last_updated: now,
        }
    }
}
