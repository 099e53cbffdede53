//! Generation request building.
//!
//! Assembles the instruction text sent to the generation backend. Nothing here
//! performs I/O.

use std::fmt::Write;

use reelgen_models::{Language, ScenarioAttributes, ScenePlan, TopicMode};

use crate::planner::position_label;
use crate::variant::{language_rules, VariantProfile};

/// Everything the instruction text depends on.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub character_name: &'a str,
    pub visual_style: &'a str,
    pub topic_mode: TopicMode,
    pub language: Language,
    pub scene_duration_secs: u32,
    pub attributes: &'a ScenarioAttributes,
    pub voice_descriptor: &'a str,
    pub plan: &'a ScenePlan,
    pub profile: &'a VariantProfile,
}

/// Build the generation instruction for a planned sequence.
pub fn build_generation_prompt(ctx: &PromptContext<'_>) -> String {
    let count = ctx.plan.len();
    let subject = ctx
        .profile
        .subject(ctx.topic_mode, &ctx.attributes.teaching_topic);
    let language = ctx.language.label();

    // Writing into a String never fails.
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Create exactly {} {}-second scenes in which {} explains {}.",
        count, ctx.scene_duration_secs, ctx.character_name, subject
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "CHARACTER: {}", ctx.character_name);
    let _ = writeln!(out, "VISUAL STYLE: {}", ctx.visual_style);
    let _ = writeln!(out, "TOPIC: {}", ctx.attributes.teaching_topic);
    let _ = writeln!(out, "LANGUAGE: {}", language);
    let _ = writeln!(
        out,
        "EXPRESSION: {}",
        ctx.profile.visual_tone(ctx.topic_mode)
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "SCENE PLAN:");
    for slot in &ctx.plan.slots {
        let _ = writeln!(
            out,
            "- Scene {} ({}, {}): MAX {} WORDS of dialogue",
            slot.position,
            position_label(slot.position, count as u32),
            slot.role.label(),
            ctx.profile.budgets.budget_for(slot)
        );
    }
    let _ = writeln!(
        out,
        "ON-CAMERA scenes show {} speaking to the camera. CUTAWAY scenes show \
         illustrative footage while the same voice continues off-screen.",
        ctx.character_name
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "VOICE (use exactly, do not re-describe or vary it):");
    let _ = writeln!(out, "{}", ctx.voice_descriptor);
    let _ = writeln!(
        out,
        "Do not put any voice, audio or microphone description in the visual prompts."
    );
    let _ = writeln!(out);

    out.push_str(&outfit_rule(ctx));
    let _ = writeln!(out);

    let _ = writeln!(out, "LANGUAGE RULES:");
    let _ = writeln!(out, "{}", language_rules(ctx.language));
    let _ = writeln!(out);

    let _ = writeln!(out, "OUTPUT FORMAT (repeat for every scene, n = 1..{}):", count);
    let _ = writeln!(out, "===SCENE n===");
    let _ = writeln!(out, "Visual Prompt:");
    let _ = writeln!(
        out,
        "{}, [Style: {}]. [Outfit per the rule above]. [Setting]. [Action/Emotion]. \
         [Camera/lighting]. No subtitles.",
        ctx.character_name, ctx.visual_style
    );
    let _ = writeln!(out, "Dialogue ({}):", language);
    let _ = writeln!(out, "[One complete thought within the scene's word limit]");
    let _ = writeln!(out, "Teaching Point:");
    let _ = writeln!(out, "[Key point of the scene]");
    let _ = writeln!(out, "===END SCENE n===");
    let _ = writeln!(out);

    let _ = write!(
        out,
        "Generate all {} scenes now. Never exceed a word limit.",
        count
    );

    out
}

fn outfit_rule(ctx: &PromptContext<'_>) -> String {
    if ctx.attributes.has_outfit() {
        format!(
            "OUTFIT RULE: use this exact outfit in every scene, copied word-for-word into \
             each visual prompt. Do not modify it or add clothing items:\n\"{}\"\n",
            ctx.attributes.outfit_description
        )
    } else {
        format!(
            "OUTFIT RULE: no outfit was specified. DO NOT invent clothing. Start each visual \
             prompt with \"{}, [Style: {}], professional appearance.\" and describe only \
             expression, gesture, setting, camera and lighting.\n",
            ctx.character_name, ctx.visual_style
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::plan_scenes;
    use crate::variant::{EDUCATIONAL, FOOD};

    fn attributes(outfit: &str) -> ScenarioAttributes {
        ScenarioAttributes {
            teaching_topic: "How rainbows form".to_string(),
            outfit_description: outfit.to_string(),
            voice_hint: String::new(),
        }
    }

    fn build(attrs: &ScenarioAttributes, profile: &VariantProfile, total: u32) -> String {
        let plan = plan_scenes(total, 8, profile.mode);
        build_generation_prompt(&PromptContext {
            character_name: "Riya",
            visual_style: "Realistic Character",
            topic_mode: TopicMode::Benefits,
            language: Language::Hindi,
            scene_duration_secs: 7,
            attributes: attrs,
            voice_descriptor: "Warm, clear female voice.",
            plan: &plan,
            profile,
        })
    }

    #[test]
    fn test_slot_lines_carry_role_and_budget() {
        let prompt = build(&attributes(""), &EDUCATIONAL, 40);
        assert!(prompt.contains("- Scene 1 (start, ON-CAMERA): MAX 25 WORDS"));
        assert!(prompt.contains("- Scene 2 (supporting, CUTAWAY): MAX 20 WORDS"));
        assert!(prompt.contains("- Scene 3 (middle, ON-CAMERA): MAX 20 WORDS"));
        assert!(prompt.contains("- Scene 5 (end, ON-CAMERA): MAX 20 WORDS"));
        assert!(prompt.contains("Create exactly 5 7-second scenes"));
    }

    #[test]
    fn test_voice_descriptor_embedded_verbatim() {
        let prompt = build(&attributes(""), &EDUCATIONAL, 24);
        assert!(prompt.contains("\nWarm, clear female voice.\n"));
    }

    #[test]
    fn test_outfit_rules() {
        let with_outfit = build(&attributes("green suit, white shirt"), &EDUCATIONAL, 24);
        assert!(with_outfit.contains("\"green suit, white shirt\""));
        assert!(!with_outfit.contains("DO NOT invent clothing"));

        let without = build(&attributes(""), &EDUCATIONAL, 24);
        assert!(without.contains("DO NOT invent clothing"));
    }

    #[test]
    fn test_delimiter_grammar_and_headers() {
        let prompt = build(&attributes(""), &FOOD, 16);
        assert!(prompt.contains("===SCENE n==="));
        assert!(prompt.contains("===END SCENE n==="));
        assert!(prompt.contains("Visual Prompt:"));
        assert!(prompt.contains("Dialogue (HINDI):"));
        assert!(prompt.contains("Teaching Point:"));
        assert!(prompt.contains("Devanagari"));
    }

    #[test]
    fn test_food_budgets_and_subject() {
        let prompt = build(&attributes(""), &FOOD, 24);
        assert!(prompt.contains("- Scene 1 (start, ON-CAMERA): MAX 20 WORDS"));
        assert!(prompt.contains("- Scene 2 (middle, ON-CAMERA): MAX 15 WORDS"));
        assert!(prompt.contains("explains its own health benefits"));
    }
}
