//! Shared data models for the Reelgen backend.
//!
//! This crate provides Serde-serializable types for:
//! - Voice profiles and scenario attributes
//! - Scene plans and synthesized scene records
//! - Character generation requests and responses
//! - Persisted character projects

pub mod plan;
pub mod project;
pub mod request;
pub mod scenario;
pub mod scene;
pub mod voice;

// Re-export common types
pub use plan::{PlannedSlot, SceneMode, ScenePlan, SlotRole};
pub use project::{CharacterProject, CreateProjectRequest, ProjectId};
pub use request::{
    CharacterDialogueResponse, CharacterSceneRequest, ContentKind, Language, TopicMode,
    MAX_CHARACTER_NAME_LENGTH, MAX_SCENARIO_LENGTH,
};
pub use scenario::ScenarioAttributes;
pub use scene::{ParseReport, SceneOrigin, SceneRecord, SplitStrategy, DEFAULT_TEACHING_POINT};
pub use voice::VoiceProfile;
