//! Scene plan models.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Whether the character is visible in a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SlotRole {
    /// Character is on screen, speaking to camera
    OnCamera,
    /// Illustrative footage while the same voice continues off-screen
    Cutaway,
}

impl SlotRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotRole::OnCamera => "on_camera",
            SlotRole::Cutaway => "cutaway",
        }
    }

    /// Label used in generation instructions.
    pub fn label(&self) -> &'static str {
        match self {
            SlotRole::OnCamera => "ON-CAMERA",
            SlotRole::Cutaway => "CUTAWAY",
        }
    }

    /// Parse a stored role string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "on_camera" => Some(SlotRole::OnCamera),
            "cutaway" => Some(SlotRole::Cutaway),
            _ => None,
        }
    }
}

impl fmt::Display for SlotRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Planning mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SceneMode {
    /// Every scene shares one role
    Simple,
    /// On-camera at start, middle and end; cutaways in between
    ThreePoint,
}

impl SceneMode {
    /// Minimum number of scenes the mode can express.
    pub fn min_scenes(&self) -> u32 {
        match self {
            SceneMode::Simple => 1,
            SceneMode::ThreePoint => 3,
        }
    }
}

/// One planned scene before any text exists for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PlannedSlot {
    /// 1-based position
    pub position: u32,
    pub role: SlotRole,
}

/// Ordered scene slots for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScenePlan {
    pub mode: SceneMode,
    pub slots: Vec<PlannedSlot>,
}

impl ScenePlan {
    /// Number of planned scenes.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot at a 1-based position.
    pub fn slot(&self, position: u32) -> Option<&PlannedSlot> {
        position
            .checked_sub(1)
            .and_then(|idx| self.slots.get(idx as usize))
    }

    /// Positions of on-camera slots, ascending.
    pub fn on_camera_positions(&self) -> Vec<u32> {
        self.positions_with(SlotRole::OnCamera)
    }

    /// Positions of cutaway slots, ascending.
    pub fn cutaway_positions(&self) -> Vec<u32> {
        self.positions_with(SlotRole::Cutaway)
    }

    fn positions_with(&self, role: SlotRole) -> Vec<u32> {
        self.slots
            .iter()
            .filter(|s| s.role == role)
            .map(|s| s.position)
            .collect()
    }
}
