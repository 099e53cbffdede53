//! Per-scene production sheet.

use reelgen_models::{ContentKind, Language};

/// Aspect ratio of every rendered scene.
pub const ASPECT_RATIO: &str = "9:16";

/// Scene fields rendered into the composite prompt.
#[derive(Debug, Clone, Copy)]
pub struct RenderFields<'a> {
    pub scene_number: u32,
    pub duration_secs: u32,
    pub visual_description: &'a str,
    pub dialogue: &'a str,
    pub teaching_point: &'a str,
    pub visual_style: &'a str,
    pub kind: ContentKind,
    pub language: Language,
    pub speaker_id: &'a str,
    pub voice_descriptor: &'a str,
    pub emotion: &'a str,
}

/// Composite render prompt for one scene.
pub fn render_scene_prompt(f: &RenderFields<'_>) -> String {
    let kind = match f.kind {
        ContentKind::Educational => "educational",
        ContentKind::Food => "food",
    };

    format!(
        "===== SCENE {number} ({secs} SECONDS) =====\n\
         \n\
         VISUAL (VEO 3):\n\
         {visual}\n\
         \n\
         DIALOGUE ({lang}):\n\
         {dialogue}\n\
         \n\
         TEACHING:\n\
         {teaching}\n\
         \n\
         === METADATA ===\n\
         Duration: {secs} seconds\n\
         Style: {style}\n\
         Type: {kind}\n\
         Aspect ratio: {aspect}\n\
         \n\
         SPEAKER:\n\
         ID: {speaker}\n\
         Voice: {voice}\n\
         Emotion: {emotion}\n\
         Text: \"{dialogue}\"",
        number = f.scene_number,
        secs = f.duration_secs,
        visual = f.visual_description,
        lang = f.language.label(),
        dialogue = f.dialogue,
        teaching = f.teaching_point,
        style = f.visual_style,
        kind = kind,
        aspect = ASPECT_RATIO,
        speaker = f.speaker_id,
        voice = f.voice_descriptor,
        emotion = f.emotion,
    )
}
