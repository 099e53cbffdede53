//! Scenario attribute extraction.
//!
//! Splits a free-text scenario into teaching topic, outfit and voice hint by
//! keyword overlap. This is a heuristic classifier: a fragment mentioning both
//! clothing and voice is routed to the outfit (and duplicated into the voice
//! hint), whether or not that matches the author's intent.

use std::sync::LazyLock;

use regex::Regex;
use reelgen_models::ScenarioAttributes;

/// Explicit separator between topic and outfit text (matched case-insensitively).
const OUTFIT_SEPARATOR: &str = "outfit:";

pub const VOICE_KEYWORDS: &[&str] = &[
    "voice",
    "tone",
    "pitch",
    "accent",
    "speaking",
    "sound",
    "articulation",
    "pronunciation",
    "timbre",
    "resonance",
    "wpm",
    "delivery",
    "volume",
    "vocal",
    "audio",
];

pub const CLOTHING_KEYWORDS: &[&str] = &[
    "suit", "blazer", "shirt", "dress", "jacket", "tie", "pants", "jeans", "coat", "sweater",
    "hoodie", "vest", "trousers", "skirt", "collar", "sleeve", "button", "pocket", "wearing",
    "belt", "printed", "formal", "casual", "glasses", "watch", "shoes", "sneakers", "boots",
    "look", "style", "tuxedo", "uniform", "robe", "gown", "top", "blouse", "cardigan",
];

static REPEATED_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([.,;!?।])(?:\s*[.,;!?।])+").unwrap());

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Keyword-driven scenario classifier.
#[derive(Debug, Clone)]
pub struct AttributeExtractor {
    clothing: Vec<String>,
    voice: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    Topic,
    Outfit,
    Voice,
}

impl Default for AttributeExtractor {
    fn default() -> Self {
        Self::new(CLOTHING_KEYWORDS, VOICE_KEYWORDS)
    }
}

impl AttributeExtractor {
    pub fn new(clothing: &[&str], voice: &[&str]) -> Self {
        Self {
            clothing: clothing.iter().map(|k| k.to_lowercase()).collect(),
            voice: voice.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// Extract attributes from a scenario string.
    pub fn extract(&self, scenario: &str) -> ScenarioAttributes {
        let scenario = scenario.trim();

        // ASCII lowercasing keeps byte offsets aligned with the original.
        let separator = scenario.to_ascii_lowercase().find(OUTFIT_SEPARATOR);

        let (topic_seed, remainder, explicit) = match separator {
            Some(idx) => (
                &scenario[..idx],
                &scenario[idx + OUTFIT_SEPARATOR.len()..],
                true,
            ),
            None if self.mentions_clothing(scenario) => ("", scenario, false),
            None => {
                return ScenarioAttributes {
                    teaching_topic: scenario.to_string(),
                    ..Default::default()
                }
            }
        };

        let mut topic = vec![topic_seed.trim()];
        let mut outfit = Vec::new();
        let mut voice = Vec::new();

        for fragment in split_fragments(remainder) {
            for bucket in self.classify(fragment, explicit) {
                match bucket {
                    Bucket::Topic => topic.push(fragment),
                    Bucket::Outfit => outfit.push(fragment),
                    Bucket::Voice => voice.push(fragment),
                }
            }
        }

        let mut teaching_topic = join_bucket(&topic);
        while teaching_topic.ends_with(['.', ',', ';', ':']) {
            teaching_topic.pop();
        }
        let teaching_topic = teaching_topic.trim_end().to_string();

        ScenarioAttributes {
            teaching_topic: if teaching_topic.is_empty() {
                scenario.to_string()
            } else {
                teaching_topic
            },
            outfit_description: join_bucket(&outfit),
            voice_hint: join_bucket(&voice),
        }
    }

    /// Whether any clothing keyword appears in the text.
    pub fn mentions_clothing(&self, text: &str) -> bool {
        contains_keyword(text, &self.clothing)
    }

    /// Whether any voice keyword appears in the text.
    pub fn mentions_voice(&self, text: &str) -> bool {
        contains_keyword(text, &self.voice)
    }

    /// Buckets a fragment belongs to. Clothing wins over voice; a fragment with
    /// both is also copied into the voice bucket.
    fn classify(&self, fragment: &str, explicit: bool) -> Vec<Bucket> {
        let clothing = self.mentions_clothing(fragment);
        let voice = self.mentions_voice(fragment);

        match (clothing, voice) {
            (true, true) => vec![Bucket::Outfit, Bucket::Voice],
            (true, false) => vec![Bucket::Outfit],
            (false, true) => vec![Bucket::Voice],
            (false, false) if explicit => vec![Bucket::Outfit],
            (false, false) => vec![Bucket::Topic],
        }
    }
}

/// Split on sentence and clause punctuation, keeping the punctuation.
fn split_fragments(text: &str) -> impl Iterator<Item = &str> {
    text.split_inclusive(['.', ',', ';', '!', '?', '।'])
        .map(str::trim)
        .filter(|f| f.chars().any(char::is_alphanumeric))
}

/// Whole-word keyword match, tolerating plural "s"/"es".
fn contains_keyword(text: &str, keywords: &[String]) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .any(|word| {
            keywords.iter().any(|kw| {
                word == *kw
                    || word
                        .strip_prefix(kw.as_str())
                        .is_some_and(|rest| rest == "s" || rest == "es")
            })
        })
}

fn join_bucket(parts: &[&str]) -> String {
    let joined = parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let joined = WHITESPACE_RUN.replace_all(&joined, " ");
    let collapsed = REPEATED_PUNCTUATION.replace_all(&joined, "$1");
    collapsed
        .trim()
        .trim_end_matches([',', ';'])
        .trim_end()
        .to_string()
}
