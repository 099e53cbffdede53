//! Scene block parsing and validation.
//!
//! Turns the backend's free text into exactly one [`SceneRecord`] per planned
//! slot. Paired `===SCENE n===` / `===END SCENE n===` delimiters are preferred;
//! if none pair up, every opener starts a block. Slots that cannot be filled
//! from the text get a deterministic fallback record and are listed in the
//! [`ParseReport`].

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use reelgen_models::{
    ContentKind, Language, ParseReport, PlannedSlot, SceneOrigin, ScenePlan, SceneRecord,
    SplitStrategy, DEFAULT_TEACHING_POINT,
};
use tracing::{debug, warn};

use crate::error::{GenerationError, SynthesisError, SynthesisResult};
use crate::fallback::{fallback_dialogue, fallback_visual};
use crate::render::{render_scene_prompt, RenderFields};
use crate::variant::WordBudgetTable;

static SCENE_OPENER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)={3,}\s*SCENE\s+(\d+)\s*={3,}").unwrap());

static SCENE_CLOSER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)={3,}\s*END\s+SCENE\s+(\d+)\s*={3,}").unwrap());

static SECTION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^[ \t]*[*_#>]*[ \t]*(visual[ \t]+prompt|visual[ \t]+description|visual|dialogue|dialog|teaching[ \t]+point|teaching|key[ \t]+point)[ \t]*[*_]*[ \t]*(?:[(\[][^)\]\n]*[)\]])?[ \t]*[*_]*[ \t]*:[*_]*",
    )
    .unwrap()
});

static LANGUAGE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[(\[]\s*(?:hindi|english|hinglish|devanagari)\s*[)\]]\s*:?").unwrap()
});

const QUOTE_CHARS: &[char] = &['"', '\'', '`', '“', '”', '‘', '’', '«', '»', '*'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Visual,
    Dialogue,
    Teaching,
}

impl Section {
    fn from_header(name: &str) -> Self {
        let name = name.to_lowercase();
        if name.starts_with("visual") {
            Section::Visual
        } else if name.starts_with("dialog") {
            Section::Dialogue
        } else {
            Section::Teaching
        }
    }
}

/// One delimited region of the response.
#[derive(Debug)]
struct RawBlock<'t> {
    /// Declared scene number (paired) or 1-based position (openers only)
    number: Option<u32>,
    body: &'t str,
}

/// Cleaned sections of one block.
#[derive(Debug, Default, PartialEq, Eq)]
struct BlockContent {
    visual: String,
    dialogue: String,
    teaching: String,
}

/// Request-level facts stamped on every record.
#[derive(Debug, Clone)]
pub struct SceneAssembly {
    pub character_name: String,
    pub visual_style: String,
    pub outfit: String,
    pub speaker_id: String,
    pub voice_descriptor: String,
    pub emotion: String,
    pub kind: ContentKind,
    pub language: Language,
    pub scene_duration_secs: u32,
}

/// Parsed scenes and the quality report for one response.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub scenes: Vec<SceneRecord>,
    pub report: ParseReport,
}

/// Parser bound to one request's plan.
pub struct SceneParser<'a> {
    plan: &'a ScenePlan,
    budgets: WordBudgetTable,
    assembly: &'a SceneAssembly,
}

impl<'a> SceneParser<'a> {
    pub fn new(plan: &'a ScenePlan, budgets: WordBudgetTable, assembly: &'a SceneAssembly) -> Self {
        Self {
            plan,
            budgets,
            assembly,
        }
    }

    /// Parse a raw response into exactly `plan.len()` records.
    pub fn parse(&self, raw: &str) -> SynthesisResult<ParseOutcome> {
        if raw.trim().is_empty() {
            return Err(GenerationError::EmptyResponse.into());
        }

        let (strategy, blocks) = split_blocks(raw);
        if blocks.is_empty() {
            return Err(SynthesisError::parse_fatal(format!(
                "no scene openers in {} characters of text",
                raw.len()
            )));
        }

        let mut report = ParseReport {
            strategy,
            blocks_found: blocks.len(),
            repaired_slots: Vec::new(),
            over_budget_slots: Vec::new(),
        };

        let count = self.plan.len() as u32;
        let mut filled: BTreeMap<u32, BlockContent> = BTreeMap::new();

        for block in blocks {
            let number = match block.number {
                Some(n) if (1..=count).contains(&n) => n,
                other => {
                    warn!(
                        declared = ?other,
                        planned = count,
                        "Ignoring scene block outside the plan"
                    );
                    continue;
                }
            };

            let content = extract_sections(block.body);
            match filled.get(&number) {
                // A later duplicate only replaces a claim that had no dialogue.
                Some(existing) if existing.dialogue.is_empty() && !content.dialogue.is_empty() => {
                    debug!(scene = number, "Duplicate scene block replaces empty one");
                }
                Some(_) => {
                    warn!(scene = number, "Ignoring duplicate scene block");
                    continue;
                }
                None if content.dialogue.is_empty() => {
                    warn!(scene = number, "Scene block has no dialogue");
                }
                None => {}
            }
            filled.insert(number, content);
        }

        let mut scenes = Vec::with_capacity(self.plan.len());
        for slot in &self.plan.slots {
            let record = match filled.remove(&slot.position) {
                Some(content) if !content.dialogue.is_empty() => {
                    let budget = self.budgets.budget_for(slot);
                    let words = content.dialogue.split_whitespace().count();
                    if words > budget as usize {
                        warn!(
                            scene = slot.position,
                            words = words,
                            budget = budget,
                            "Dialogue exceeds word budget"
                        );
                        report.over_budget_slots.push(slot.position);
                    }
                    self.parsed_record(slot, content)
                }
                _ => {
                    report.repaired_slots.push(slot.position);
                    self.fallback_record(slot)
                }
            };
            scenes.push(record);
        }

        if !report.repaired_slots.is_empty() {
            warn!(
                repaired = ?report.repaired_slots,
                blocks_found = report.blocks_found,
                "Filled missing scenes with fallback content"
            );
        }
        debug!(
            strategy = ?report.strategy,
            scenes = scenes.len(),
            "Parsed scene blocks"
        );

        Ok(ParseOutcome { scenes, report })
    }

    fn parsed_record(&self, slot: &PlannedSlot, content: BlockContent) -> SceneRecord {
        let visual = if content.visual.is_empty() {
            self.default_visual(slot)
        } else {
            content.visual
        };
        let teaching = if content.teaching.is_empty() {
            DEFAULT_TEACHING_POINT.to_string()
        } else {
            content.teaching
        };
        self.assemble(slot, visual, content.dialogue, teaching, SceneOrigin::Parsed)
    }

    fn fallback_record(&self, slot: &PlannedSlot) -> SceneRecord {
        let a = self.assembly;
        self.assemble(
            slot,
            self.default_visual(slot),
            fallback_dialogue(&a.character_name, slot.role, slot.position),
            DEFAULT_TEACHING_POINT.to_string(),
            SceneOrigin::Fallback,
        )
    }

    fn default_visual(&self, slot: &PlannedSlot) -> String {
        let a = self.assembly;
        fallback_visual(
            &a.character_name,
            &a.visual_style,
            &a.outfit,
            slot.role,
            slot.position,
        )
    }

    fn assemble(
        &self,
        slot: &PlannedSlot,
        visual_description: String,
        dialogue: String,
        teaching_point: String,
        origin: SceneOrigin,
    ) -> SceneRecord {
        let a = self.assembly;
        let prompt = render_scene_prompt(&RenderFields {
            scene_number: slot.position,
            duration_secs: a.scene_duration_secs,
            visual_description: &visual_description,
            dialogue: &dialogue,
            teaching_point: &teaching_point,
            visual_style: &a.visual_style,
            kind: a.kind,
            language: a.language,
            speaker_id: &a.speaker_id,
            voice_descriptor: &a.voice_descriptor,
            emotion: &a.emotion,
        });

        SceneRecord {
            scene_number: slot.position,
            role: slot.role,
            duration_secs: a.scene_duration_secs,
            visual_description,
            dialogue,
            teaching_point,
            emotion: a.emotion.clone(),
            speaker_id: a.speaker_id.clone(),
            voice_descriptor: a.voice_descriptor.clone(),
            origin,
            prompt,
        }
    }
}

/// Split into blocks, preferring paired delimiters.
fn split_blocks(raw: &str) -> (SplitStrategy, Vec<RawBlock<'_>>) {
    let openers: Vec<_> = SCENE_OPENER.captures_iter(raw).collect();

    let regions: Vec<(Option<u32>, &str)> = openers
        .iter()
        .enumerate()
        .filter_map(|(i, caps)| {
            let whole = caps.get(0)?;
            let end = openers
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map(|m| m.start())
                .unwrap_or(raw.len());
            let number = caps.get(1).and_then(|m| m.as_str().parse().ok());
            Some((number, &raw[whole.end()..end]))
        })
        .collect();

    let paired: Vec<RawBlock<'_>> = regions
        .iter()
        .filter_map(|&(number, region)| {
            let declared = number?;
            let closer = SCENE_CLOSER.captures_iter(region).find(|c| {
                c.get(1)
                    .and_then(|m| m.as_str().parse::<u32>().ok())
                    .is_some_and(|n| n == declared)
            })?;
            let start = closer.get(0)?.start();
            Some(RawBlock {
                number: Some(declared),
                body: &region[..start],
            })
        })
        .collect();

    if !paired.is_empty() {
        return (SplitStrategy::Paired, paired);
    }

    let by_position = regions
        .iter()
        .enumerate()
        .map(|(i, &(_, region))| {
            let body = match SCENE_CLOSER.find(region) {
                Some(stray) => &region[..stray.start()],
                None => region,
            };
            RawBlock {
                number: u32::try_from(i + 1).ok(),
                body,
            }
        })
        .collect();

    (SplitStrategy::OpenersOnly, by_position)
}

/// Extract and clean the three sections of a block. The first header of each
/// kind wins.
fn extract_sections(body: &str) -> BlockContent {
    let headers: Vec<_> = SECTION_HEADER.captures_iter(body).collect();
    let mut content = BlockContent::default();
    let mut seen = [false; 3];

    for (i, caps) in headers.iter().enumerate() {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let end = headers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(body.len());
        let text = &body[whole.end()..end];

        let section = Section::from_header(name.as_str());
        let idx = section as usize;
        if seen[idx] {
            continue;
        }
        seen[idx] = true;

        let cleaned = clean_text(text);
        match section {
            Section::Visual => content.visual = cleaned,
            Section::Dialogue => content.dialogue = cleaned,
            Section::Teaching => content.teaching = cleaned,
        }
    }

    content
}

/// Remove language tags and quoting, collapse whitespace.
fn clean_text(text: &str) -> String {
    let without_tags = LANGUAGE_TAG.replace_all(text, " ");
    let collapsed = without_tags.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| c.is_whitespace() || QUOTE_CHARS.contains(&c))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::plan_scenes;
    use crate::variant::EDUCATIONAL;
    use reelgen_models::{SceneMode, SlotRole};

    fn assembly() -> SceneAssembly {
        SceneAssembly {
            character_name: "Riya".to_string(),
            visual_style: "Realistic Character".to_string(),
            outfit: String::new(),
            speaker_id: "riya_female_friendly".to_string(),
            voice_descriptor: "Warm, clear female voice.".to_string(),
            emotion: "engaging".to_string(),
            kind: ContentKind::Educational,
            language: Language::English,
            scene_duration_secs: 7,
        }
    }

    fn block(n: u32, dialogue: &str) -> String {
        format!(
            "===SCENE {n}===\nVisual Prompt:\nRiya in a studio, scene {n}.\n\n\
             Dialogue (ENGLISH):\n{dialogue}\n\nTeaching Point:\nPoint {n}\n===END SCENE {n}===\n"
        )
    }

    fn parse(raw: &str, total: u32) -> SynthesisResult<ParseOutcome> {
        let plan = plan_scenes(total, 8, SceneMode::ThreePoint);
        let assembly = assembly();
        SceneParser::new(&plan, EDUCATIONAL.budgets, &assembly).parse(raw)
    }

    #[test]
    fn test_complete_response() {
        let raw: String = (1..=5).map(|n| block(n, "Light bends in water.")).collect();
        let outcome = parse(&raw, 40).unwrap();

        assert_eq!(outcome.scenes.len(), 5);
        assert_eq!(outcome.report.strategy, SplitStrategy::Paired);
        assert!(outcome.report.is_clean());
        for (i, scene) in outcome.scenes.iter().enumerate() {
            assert_eq!(scene.scene_number, i as u32 + 1);
            assert_eq!(scene.origin, SceneOrigin::Parsed);
            assert_eq!(scene.dialogue, "Light bends in water.");
            assert_eq!(scene.teaching_point, format!("Point {}", i + 1));
        }
        assert_eq!(outcome.scenes[1].role, SlotRole::Cutaway);
        assert_eq!(outcome.scenes[2].role, SlotRole::OnCamera);
    }

    #[test]
    fn test_pure_prose_is_fatal() {
        let err = parse("Here are some thoughts about rainbows.", 24).unwrap_err();
        assert!(matches!(err, SynthesisError::ParseFatal(_)));
    }

    #[test]
    fn test_empty_response_is_generation_error() {
        let err = parse("  \n ", 24).unwrap_err();
        assert!(matches!(
            err,
            SynthesisError::Generation(GenerationError::EmptyResponse)
        ));
    }

    #[test]
    fn test_missing_block_is_repaired() {
        let raw = format!("{}{}", block(1, "Hello there."), block(3, "Goodbye now."));
        let outcome = parse(&raw, 24).unwrap();

        assert_eq!(outcome.scenes.len(), 3);
        assert_eq!(outcome.report.repaired_slots, vec![2]);
        let repaired = &outcome.scenes[1];
        assert_eq!(repaired.origin, SceneOrigin::Fallback);
        assert_eq!(repaired.teaching_point, DEFAULT_TEACHING_POINT);
        assert!(!repaired.dialogue.is_empty());
        assert!(!repaired.visual_description.is_empty());
    }

    #[test]
    fn test_voice_descriptor_identical_across_records() {
        let raw = block(2, "Only the middle scene.");
        let outcome = parse(&raw, 40).unwrap();
        assert_eq!(outcome.scenes.len(), 5);
        assert!(outcome
            .scenes
            .iter()
            .all(|s| s.voice_descriptor == "Warm, clear female voice."
                && s.speaker_id == "riya_female_friendly"));
    }

    #[test]
    fn test_openers_only_split() {
        let raw = "===SCENE 1===\nVisual: Riya waves.\nDialogue: Hello friends.\n\
                   ===SCENE 7===\nDialogue: Second line.\n===END SCENE 9===\ntrailing";
        let outcome = parse(raw, 24).unwrap();

        assert_eq!(outcome.report.strategy, SplitStrategy::OpenersOnly);
        assert_eq!(outcome.report.blocks_found, 2);
        assert_eq!(outcome.scenes[0].dialogue, "Hello friends.");
        assert_eq!(outcome.scenes[1].dialogue, "Second line.");
        assert_eq!(outcome.report.repaired_slots, vec![3]);
    }

    #[test]
    fn test_out_of_range_and_duplicate_blocks_ignored() {
        let raw = format!(
            "{}{}{}",
            block(1, "First wins."),
            block(1, "Duplicate loses."),
            block(9, "Out of range.")
        );
        let outcome = parse(&raw, 24).unwrap();
        assert_eq!(outcome.scenes[0].dialogue, "First wins.");
        assert_eq!(outcome.report.repaired_slots, vec![2, 3]);
    }

    #[test]
    fn test_duplicate_with_dialogue_replaces_empty_block() {
        let empty = "===SCENE 2===\nVisual Prompt: Riya waves.\nDialogue:\n\n===END SCENE 2===\n";
        let raw = format!("{}{}{}", empty, block(2, "Second try."), block(2, "Third loses."));
        let outcome = parse(&raw, 24).unwrap();
        assert_eq!(outcome.scenes[1].dialogue, "Second try.");
        assert_eq!(outcome.scenes[1].origin, SceneOrigin::Parsed);
        assert_eq!(outcome.report.repaired_slots, vec![1, 3]);
    }

    #[test]
    fn test_over_budget_is_reported_not_truncated() {
        let long = "word ".repeat(30);
        let raw = block(2, long.trim());
        let outcome = parse(&raw, 24).unwrap();
        assert_eq!(outcome.report.over_budget_slots, vec![2]);
        assert_eq!(outcome.scenes[1].dialogue_words(), 30);
    }

    #[test]
    fn test_empty_dialogue_falls_back() {
        let raw = "===SCENE 1===\nVisual Prompt: Riya smiles.\nDialogue:\n\nTeaching Point: Smiles\n===END SCENE 1===";
        let outcome = parse(raw, 24).unwrap();
        assert_eq!(outcome.scenes[0].origin, SceneOrigin::Fallback);
        assert_eq!(outcome.report.repaired_slots, vec![1, 2, 3]);
    }

    #[test]
    fn test_header_variants_and_cleaning() {
        let raw = "=== SCENE 1 ===\n**Visual Description:** Riya at a desk.\n\
                   ## Dialog (HINDI):\n  \"आज   हम AI  सीखेंगे।\"  \n\
                   Key Point: AI basics\n=== END SCENE 1 ===";
        let outcome = parse(raw, 24).unwrap();
        let scene = &outcome.scenes[0];
        assert_eq!(scene.visual_description, "Riya at a desk.");
        assert_eq!(scene.dialogue, "आज हम AI सीखेंगे।");
        assert_eq!(scene.teaching_point, "AI basics");
    }

    #[test]
    fn test_missing_visual_and_teaching_use_defaults() {
        let raw = "===SCENE 1===\nDialogue: Just words.\n===END SCENE 1===";
        let outcome = parse(raw, 24).unwrap();
        let scene = &outcome.scenes[0];
        assert_eq!(scene.origin, SceneOrigin::Parsed);
        assert_eq!(scene.teaching_point, DEFAULT_TEACHING_POINT);
        assert!(scene.visual_description.starts_with("Riya, [Style: Realistic Character]"));
    }

    #[test]
    fn test_inline_language_tag_removed() {
        assert_eq!(clean_text("(Hinglish) Namaste dosto"), "Namaste dosto");
        assert_eq!(clean_text("[English]: “Hi there”"), "Hi there");
    }

    #[test]
    fn test_bracketed_dialogue_starting_with_language_word_kept() {
        assert_eq!(
            clean_text("Learning (English words like AI) is easy"),
            "Learning (English words like AI) is easy"
        );
        assert_eq!(
            clean_text("Say it [english, hindi mix] loud"),
            "Say it [english, hindi mix] loud"
        );
    }

    #[test]
    fn test_render_prompt_attached() {
        let raw = block(1, "Hello there.");
        let outcome = parse(&raw, 24).unwrap();
        assert!(outcome.scenes[0].prompt.contains("Text: \"Hello there.\""));
        assert!(outcome.scenes[2].prompt.starts_with("===== SCENE 3 (7 SECONDS) ====="));
    }
}
