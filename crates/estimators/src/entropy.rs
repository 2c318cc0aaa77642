use serde::{Deserialize, Serialize};

/// Entropy score below which an answer may be adopted.
pub const DEFAULT_ENTROPY_THRESHOLD: f64 = 0.7;

const ORDERING_CONNECTIVES: &[&str] = &[
    "first",
    "second",
    "finally",
    "therefore",
    "because",
    "thus",
    "首先",
    "其次",
    "最后",
    "综上所述",
    "因此",
    "因为",
    "所以",
];

const DISORDER_WORDS: &[&str] = &["contradiction", "conflict", "chaos", "矛盾", "冲突", "混乱"];

const KEY_TERMS: &[&str] = &[
    "reason", "moral", "meaning", "value", "理性", "道德", "意义", "价值",
];

const LOGIC_CONNECTIVES: &[&str] = &[
    "if",
    "then",
    "because",
    "therefore",
    "thus",
    "如果",
    "那么",
    "因为",
    "所以",
    "因此",
];

const CONTRAST_WORDS: &[&str] = &["but", "however", "although", "但是", "然而", "虽然"];

/// Verdict attached to an [`EntropyAssessment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntropyRecommendation {
    Adopt,
    Simplify,
    Refine,
}

impl EntropyRecommendation {
    pub fn message(self) -> &'static str {
        match self {
            EntropyRecommendation::Adopt => {
                "This answer increases cognitive order at a low entropy cost; adopt it."
            }
            EntropyRecommendation::Simplify => {
                "This answer carries a high entropy cost; simplify the logic or tighten consistency."
            }
            EntropyRecommendation::Refine => {
                "This answer has a moderate entropy impact and needs further refinement."
            }
        }
    }
}

impl std::fmt::Display for EntropyRecommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Heuristic entropy profile of a piece of text. Scores are rounded to three
/// decimals; a lower `entropy_score` is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntropyAssessment {
    pub entropy_score: f64,
    pub cognitive_order: bool,
    pub compression_ratio: f64,
    pub prediction_power: f64,
    pub recommendation: EntropyRecommendation,
}

/// Scores how much an answer adds order versus noise.
#[derive(Debug, Clone)]
pub struct EntropyAssessor {
    threshold: f64,
}

impl Default for EntropyAssessor {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_ENTROPY_THRESHOLD,
        }
    }
}

impl EntropyAssessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Assess `text` against the texts that led up to it.
    pub fn assess(&self, text: &str, prior_texts: &[&str]) -> EntropyAssessment {
        let lower = text.to_lowercase();
        let length = text.chars().count();

        let cognitive_order = cognitive_order(&lower, prior_texts);
        let compression_ratio = compression_ratio(&lower, length, prior_texts);
        let prediction_power = prediction_power(&lower, length);
        let entropy_score = 0.4 * (1.0 - compression_ratio) + 0.6 * (1.0 - prediction_power);

        let recommendation = if entropy_score < self.threshold && cognitive_order {
            EntropyRecommendation::Adopt
        } else if entropy_score >= self.threshold {
            EntropyRecommendation::Simplify
        } else {
            EntropyRecommendation::Refine
        };

        tracing::debug!(
            entropy_score,
            cognitive_order,
            ?recommendation,
            "entropy assessed"
        );

        EntropyAssessment {
            entropy_score: round3(entropy_score),
            cognitive_order,
            compression_ratio: round3(compression_ratio),
            prediction_power: round3(prediction_power),
            recommendation,
        }
    }

    /// Whether an assessed answer is cheap enough to adopt.
    pub fn should_adopt(&self, assessment: &EntropyAssessment) -> bool {
        assessment.entropy_score < self.threshold && assessment.cognitive_order
    }
}

fn count_present(haystack: &str, needles: &[&str]) -> usize {
    needles.iter().filter(|n| haystack.contains(*n)).count()
}

fn cognitive_order(lower: &str, prior_texts: &[&str]) -> bool {
    let ordering = count_present(lower, ORDERING_CONNECTIVES);
    let disorder = count_present(lower, DISORDER_WORDS);

    let mut distinct = prior_texts.to_vec();
    distinct.sort_unstable();
    distinct.dedup();
    let chain_consistent = prior_texts.len() <= 1 || distinct.len() == prior_texts.len();

    ordering > disorder && chain_consistent
}

fn compression_ratio(lower: &str, length: usize, prior_texts: &[&str]) -> f64 {
    if length == 0 {
        return 0.0;
    }
    let key_terms = count_present(lower, KEY_TERMS) as f64;
    let mut ratio = (key_terms / (length as f64 / 100.0)).min(1.0);

    let prior_length: usize = prior_texts.iter().map(|t| t.chars().count()).sum();
    if prior_length > length * 2 {
        ratio *= 0.8;
    }
    ratio
}

fn prediction_power(lower: &str, length: usize) -> f64 {
    if length == 0 {
        return 0.0;
    }
    let logic = count_present(lower, LOGIC_CONNECTIVES) as f64;
    let contrast = count_present(lower, CONTRAST_WORDS) as f64;
    let density = logic / (length as f64 / 50.0);
    (density - contrast * 0.2).clamp(0.0, 1.0)
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
