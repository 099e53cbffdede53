//! Scenario-to-scene synthesis pipeline.
//!
//! Extract attributes, resolve the voice, plan slots, build the instruction,
//! call the generator once under a timeout, then parse and reconcile. The
//! generation call is the only suspension point; nothing is retried.

use std::sync::Arc;
use std::time::Instant;

use reelgen_models::{
    CharacterSceneRequest, ContentKind, Language, ParseReport, ScenarioAttributes, ScenePlan,
    SceneRecord, TopicMode,
};
use tracing::Instrument;

use crate::catalog::VoiceCatalog;
use crate::config::PipelineConfig;
use crate::error::{GenerationError, SynthesisError, SynthesisResult};
use crate::extractor::AttributeExtractor;
use crate::generator::TextGenerator;
use crate::logging::SynthesisLogger;
use crate::metrics;
use crate::parser::{SceneAssembly, SceneParser};
use crate::planner::plan_scenes;
use crate::prompt::{build_generation_prompt, PromptContext};
use crate::variant::VariantProfile;
use crate::voice::{ResolvedVoice, VoiceResolver};

/// Caller-supplied parameters for one synthesis run.
#[derive(Debug, Clone)]
pub struct SynthesisInput {
    pub character_name: String,
    pub voice_tone: String,
    pub custom_voice_description: Option<String>,
    pub scenario: String,
    /// Falls back to the variant's default style
    pub visual_style: Option<String>,
    pub topic_mode: TopicMode,
    pub language: Language,
    pub total_duration_secs: i64,
    pub kind: ContentKind,
}

impl SynthesisInput {
    /// Build input from an API request, filling in a missing scenario.
    pub fn from_request(req: &CharacterSceneRequest) -> Self {
        Self {
            character_name: req.character_name.trim().to_string(),
            voice_tone: req.voice_tone.clone(),
            custom_voice_description: req.custom_voice_description.clone(),
            scenario: req.effective_scenario(),
            visual_style: req
                .visual_style
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            topic_mode: req.topic_mode,
            language: req.language,
            total_duration_secs: req.total_duration,
            kind: req.content_type,
        }
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct SynthesisOutput {
    /// Exactly one record per planned slot, in order
    pub scenes: Vec<SceneRecord>,
    pub report: ParseReport,
    pub attributes: ScenarioAttributes,
    pub voice: ResolvedVoice,
    pub plan: ScenePlan,
    pub visual_style: String,
}

/// Parametrised pipeline shared by every content variant.
#[derive(Clone)]
pub struct ScenePipeline {
    config: Arc<PipelineConfig>,
    resolver: VoiceResolver,
    extractor: Arc<AttributeExtractor>,
    generator: Arc<dyn TextGenerator>,
}

impl ScenePipeline {
    pub fn new(
        config: PipelineConfig,
        catalog: Arc<VoiceCatalog>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            resolver: VoiceResolver::new(catalog),
            extractor: Arc::new(AttributeExtractor::default()),
            generator,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full pipeline for one request.
    pub async fn synthesize(
        &self,
        input: &SynthesisInput,
        logger: &SynthesisLogger,
    ) -> SynthesisResult<SynthesisOutput> {
        let variant = input.kind.as_str();
        let result = self.run(input, logger).instrument(logger.create_span()).await;

        match &result {
            Ok(output) => {
                metrics::record_synthesis(variant, "success");
                metrics::record_parse_quality(
                    variant,
                    output.report.repaired_slots.len(),
                    output.report.over_budget_slots.len(),
                );
                logger.log_completion(&format!(
                    "{} scenes ({} repaired, {} over budget)",
                    output.scenes.len(),
                    output.report.repaired_slots.len(),
                    output.report.over_budget_slots.len()
                ));
            }
            Err(e) => {
                metrics::record_synthesis(variant, e.code());
                logger.log_error(&e.to_string());
            }
        }

        result
    }

    async fn run(
        &self,
        input: &SynthesisInput,
        logger: &SynthesisLogger,
    ) -> SynthesisResult<SynthesisOutput> {
        let total_secs = self.validate(input)?;
        let profile = VariantProfile::for_kind(input.kind);
        logger.log_start(&format!(
            "{} for '{}' ({}s)",
            input.kind, input.character_name, total_secs
        ));

        let attributes = self.extractor.extract(&input.scenario);
        let voice = self.resolver.resolve(
            &input.voice_tone,
            input.custom_voice_description.as_deref(),
            &attributes.voice_hint,
        );
        let plan = plan_scenes(total_secs, self.config.planning_unit_secs, profile.mode);
        let visual_style = input
            .visual_style
            .clone()
            .unwrap_or_else(|| profile.default_visual_style.to_string());

        tracing::info!(
            scenes = plan.len(),
            voice_id = %voice.voice_id,
            voice_source = ?voice.source,
            has_outfit = attributes.has_outfit(),
            "Planned scene sequence"
        );

        let prompt = build_generation_prompt(&PromptContext {
            character_name: &input.character_name,
            visual_style: &visual_style,
            topic_mode: input.topic_mode,
            language: input.language,
            scene_duration_secs: self.config.scene_duration_secs,
            attributes: &attributes,
            voice_descriptor: &voice.descriptor,
            plan: &plan,
            profile,
        });

        let raw = self.generate(&prompt, input.kind).await?;
        logger.log_progress(&format!("received {} characters", raw.len()));

        let assembly = SceneAssembly {
            character_name: input.character_name.clone(),
            visual_style: visual_style.clone(),
            outfit: attributes.outfit_description.clone(),
            speaker_id: voice.speaker_id(&input.character_name),
            voice_descriptor: voice.descriptor.clone(),
            emotion: profile.emotion(input.topic_mode).to_string(),
            kind: input.kind,
            language: input.language,
            scene_duration_secs: self.config.scene_duration_secs,
        };
        let outcome = SceneParser::new(&plan, profile.budgets, &assembly).parse(&raw)?;

        if !outcome.report.repaired_slots.is_empty() {
            logger.log_warning(&format!(
                "repaired slots {:?}",
                outcome.report.repaired_slots
            ));
        }

        Ok(SynthesisOutput {
            scenes: outcome.scenes,
            report: outcome.report,
            attributes,
            voice,
            plan,
            visual_style,
        })
    }

    /// Reject unusable input before any work happens. Returns the duration.
    fn validate(&self, input: &SynthesisInput) -> SynthesisResult<u32> {
        if input.character_name.trim().is_empty() {
            return Err(SynthesisError::input("character name is empty"));
        }
        if input.scenario.trim().is_empty() {
            return Err(SynthesisError::input("scenario is empty"));
        }
        if input.total_duration_secs <= 0 {
            return Err(SynthesisError::input(format!(
                "total duration must be positive, got {}",
                input.total_duration_secs
            )));
        }
        let max = self.config.max_total_duration_secs;
        match u32::try_from(input.total_duration_secs) {
            Ok(secs) if secs <= max => Ok(secs),
            _ => Err(SynthesisError::input(format!(
                "total duration must be at most {} seconds",
                max
            ))),
        }
    }

    async fn generate(&self, prompt: &str, kind: ContentKind) -> SynthesisResult<String> {
        let timeout = self.config.generation_timeout;
        let start = Instant::now();

        let result = match tokio::time::timeout(timeout, self.generator.generate(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout(timeout.as_secs())),
        };

        metrics::record_generation(kind.as_str(), result.is_ok(), start.elapsed().as_secs_f64());
        result.map_err(SynthesisError::from)
    }
}
