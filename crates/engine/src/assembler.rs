use dialectic_estimators::{CosmicContextEstimator, EntropyAssessor, LifecycleModeler};

use crate::orchestrator::{LoopOutcome, STEP_COSMIC_CALIBRATION};
use crate::types::{CalibrationInfo, CalibrationResult, ConceptLifecycle, FinalResponse};

const MAX_KEY_CONCEPTS: usize = 5;
const ANALYSED_CONCEPTS: usize = 3;

const STOP_WORDS: &[&str] = &[
    "the", "is", "are", "a", "an", "and", "or", "of", "to", "in", "on", "for", "it", "be", "do",
    "does", "what", "how", "why", "的", "是", "在", "有", "和", "与", "或",
];

/// Candidate concepts of a query, in order of appearance.
pub fn key_concepts(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|token| token.chars().count() > 1 && !STOP_WORDS.contains(token))
        .take(MAX_KEY_CONCEPTS)
        .map(str::to_string)
        .collect()
}

/// Merges the loop outcome, the calibration and the estimator annotations.
#[derive(Debug, Clone, Default)]
pub struct ResponseAssembler {
    entropy: EntropyAssessor,
    lifecycle: LifecycleModeler,
    cosmic: CosmicContextEstimator,
}

impl ResponseAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entropy(mut self, entropy: EntropyAssessor) -> Self {
        self.entropy = entropy;
        self
    }

    pub fn assemble(
        &self,
        query: &str,
        outcome: LoopOutcome,
        calibration: CalibrationResult,
    ) -> FinalResponse {
        let mut chain = outcome.chain;
        let verdict = if calibration.finitude_check.passed {
            "passed"
        } else {
            "failed"
        };
        chain.record(
            STEP_COSMIC_CALIBRATION,
            format!(
                "Calibrated as {}; finitude check {}",
                calibration.category, verdict
            ),
            calibration.trace,
        );

        let synthesis = outcome.sample.synthesis;
        let entropy_assessment = self.entropy.assess(&synthesis, &[synthesis.as_str()]);

        let lifecycle_analyses = key_concepts(query)
            .into_iter()
            .take(ANALYSED_CONCEPTS)
            .map(|concept| ConceptLifecycle {
                assessment: self.lifecycle.assess(&concept),
                concept,
            })
            .collect();

        FinalResponse {
            query: query.to_string(),
            domain: outcome.domain,
            perspectives: outcome.sample.perspectives,
            synthesis,
            calibrated_text: calibration.calibrated_text,
            moral_status: outcome.moral_status,
            regeneration_rounds: outcome.regeneration_rounds,
            reasoning_chain: chain,
            calibration_info: CalibrationInfo {
                finitude_check: calibration.finitude_check,
                category: calibration.category,
            },
            entropy_assessment,
            lifecycle_analyses,
            cosmic_state: self.cosmic.estimate(),
            cosmic_context: self.cosmic.context_summary(),
            cosmic_mapping: outcome.sample.cosmic_mapping,
        }
    }
}
