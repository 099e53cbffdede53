//! Synthesis metrics.

use metrics::{counter, histogram};

/// Metric names.
pub mod names {
    pub const SYNTHESIS_REQUESTS_TOTAL: &str = "reelgen_synthesis_requests_total";
    pub const GENERATION_DURATION_SECONDS: &str = "reelgen_generation_duration_seconds";
    pub const SCENES_REPAIRED_TOTAL: &str = "reelgen_scenes_repaired_total";
    pub const DIALOGUE_OVER_BUDGET_TOTAL: &str = "reelgen_dialogue_over_budget_total";
}

/// Record a finished synthesis request.
pub fn record_synthesis(variant: &str, outcome: &str) {
    let labels = [
        ("variant", variant.to_string()),
        ("outcome", outcome.to_string()),
    ];
    counter!(names::SYNTHESIS_REQUESTS_TOTAL, &labels).increment(1);
}

/// Record one generation backend call.
pub fn record_generation(variant: &str, success: bool, duration_secs: f64) {
    let labels = [
        ("variant", variant.to_string()),
        ("status", if success { "success" } else { "error" }.to_string()),
    ];
    histogram!(names::GENERATION_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record parse quality signals.
pub fn record_parse_quality(variant: &str, repaired: usize, over_budget: usize) {
    let labels = [("variant", variant.to_string())];
    if repaired > 0 {
        counter!(names::SCENES_REPAIRED_TOTAL, &labels).increment(repaired as u64);
    }
    if over_budget > 0 {
        counter!(names::DIALOGUE_OVER_BUDGET_TOTAL, &labels).increment(over_budget as u64);
    }
}
