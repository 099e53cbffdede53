//! Scenario-to-scene synthesis.
//!
//! This crate provides:
//! - Attribute extraction from free-text scenarios
//! - Voice resolution against a static catalog
//! - Scene planning (simple and three-point)
//! - Generation request building and response parsing
//! - A Gemini-backed text generator
//! - Structured logging and metrics for synthesis runs

pub mod catalog;
pub mod config;
pub mod error;
pub mod extractor;
pub mod fallback;
pub mod gemini;
pub mod generator;
pub mod logging;
pub mod metrics;
pub mod parser;
pub mod pipeline;
pub mod planner;
pub mod prompt;
pub mod render;
pub mod variant;
pub mod voice;

pub use catalog::VoiceCatalog;
pub use config::{GeminiConfig, PipelineConfig};
pub use error::{GenerationError, SynthesisError, SynthesisResult};
pub use extractor::AttributeExtractor;
pub use gemini::GeminiClient;
pub use generator::TextGenerator;
pub use logging::SynthesisLogger;
pub use parser::{ParseOutcome, SceneAssembly, SceneParser};
pub use pipeline::{ScenePipeline, SynthesisInput, SynthesisOutput};
pub use planner::plan_scenes;
pub use variant::{VariantProfile, WordBudgetTable};
pub use voice::{ResolvedVoice, VoiceResolver, VoiceSource};
