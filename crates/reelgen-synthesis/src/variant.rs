//! Content variants as data.
//!
//! Educational and food sequences share one pipeline; everything that differs
//! between them lives in a [`VariantProfile`].

use reelgen_models::{ContentKind, Language, PlannedSlot, SceneMode, SlotRole, TopicMode};

/// Word ceilings per slot. Position 1 always uses `intro`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordBudgetTable {
    pub intro: u32,
    pub on_camera: u32,
    pub cutaway: u32,
}

impl WordBudgetTable {
    /// Budget for a planned slot.
    pub fn budget_for(&self, slot: &PlannedSlot) -> u32 {
        if slot.position == 1 {
            return self.intro;
        }
        match slot.role {
            SlotRole::OnCamera => self.on_camera,
            SlotRole::Cutaway => self.cutaway,
        }
    }
}

/// Per-variant planning and wording rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariantProfile {
    pub kind: ContentKind,
    pub mode: SceneMode,
    pub budgets: WordBudgetTable,
    pub default_visual_style: &'static str,
}

pub const EDUCATIONAL: VariantProfile = VariantProfile {
    kind: ContentKind::Educational,
    mode: SceneMode::ThreePoint,
    budgets: WordBudgetTable {
        intro: 25,
        on_camera: 20,
        cutaway: 20,
    },
    default_visual_style: "Realistic Character",
};

pub const FOOD: VariantProfile = VariantProfile {
    kind: ContentKind::Food,
    mode: SceneMode::Simple,
    budgets: WordBudgetTable {
        intro: 20,
        on_camera: 15,
        cutaway: 15,
    },
    default_visual_style: "3D Animation (Pixar/Disney) - Best",
};

impl VariantProfile {
    pub fn for_kind(kind: ContentKind) -> &'static VariantProfile {
        match kind {
            ContentKind::Educational => &EDUCATIONAL,
            ContentKind::Food => &FOOD,
        }
    }

    /// Expression label stamped on every scene.
    pub fn emotion(&self, topic_mode: TopicMode) -> &'static str {
        match (self.kind, topic_mode) {
            (ContentKind::Educational, _) => "engaging",
            (ContentKind::Food, TopicMode::SideEffects) => "concerned",
            (ContentKind::Food, _) => "happy",
        }
    }

    /// Visual tone instruction for the character's expression.
    pub fn visual_tone(&self, topic_mode: TopicMode) -> &'static str {
        match (self.kind, topic_mode) {
            (ContentKind::Educational, _) => {
                "warm, knowledgeable presenter energy, direct eye contact with the camera"
            }
            (ContentKind::Food, TopicMode::SideEffects) => {
                "looking concerned and cautionary, gentle warning gestures, slightly furrowed brow"
            }
            (ContentKind::Food, _) => {
                "looking happy and friendly, bright smile, cheerful welcoming gestures"
            }
        }
    }

    /// What the sequence is about, phrased for instructions.
    pub fn subject(&self, topic_mode: TopicMode, teaching_topic: &str) -> String {
        match self.kind {
            ContentKind::Educational => teaching_topic.to_string(),
            ContentKind::Food => format!("its own {}: {}", topic_mode.phrase(), teaching_topic),
        }
    }
}

/// Script rules for a dialogue language.
pub fn language_rules(language: Language) -> &'static str {
    match language {
        Language::Hindi => {
            "Write dialogue in Hindi using Devanagari script. Keep English technical terms \
             (names of concepts, tools, units) in English/Latin script. Natural spoken Hindi, \
             not formal written Hindi."
        }
        Language::English => {
            "Write dialogue in simple, natural spoken English. Short sentences, no jargon \
             without a quick explanation."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intro_gets_larger_budget() {
        let intro = PlannedSlot { position: 1, role: SlotRole::OnCamera };
        let middle = PlannedSlot { position: 3, role: SlotRole::OnCamera };
        let cutaway = PlannedSlot { position: 2, role: SlotRole::Cutaway };

        assert_eq!(EDUCATIONAL.budgets.budget_for(&intro), 25);
        assert_eq!(EDUCATIONAL.budgets.budget_for(&middle), 20);
        assert_eq!(EDUCATIONAL.budgets.budget_for(&cutaway), 20);
        assert_eq!(FOOD.budgets.budget_for(&intro), 20);
        assert_eq!(FOOD.budgets.budget_for(&middle), 15);
    }

    #[test]
    fn test_variant_lookup() {
        assert_eq!(VariantProfile::for_kind(ContentKind::Food).mode, SceneMode::Simple);
        assert_eq!(
            VariantProfile::for_kind(ContentKind::Educational).mode,
            SceneMode::ThreePoint
        );
    }

    #[test]
    fn test_food_emotion_follows_topic_mode() {
        assert_eq!(FOOD.emotion(TopicMode::SideEffects), "concerned");
        assert_eq!(FOOD.emotion(TopicMode::Benefits), "happy");
        assert_eq!(EDUCATIONAL.emotion(TopicMode::SideEffects), "engaging");
    }
}
