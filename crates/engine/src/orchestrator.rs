//! Bounded generate → validate → regenerate loop.
//!
//! The loop is an explicit state machine over [`RetryPhase`]. Transitions
//! live in [`RetryPhase::next`] so each one can be tested without a backend.

use std::sync::Arc;

use crate::domain::classify_domain;
use crate::markers::has_obligation;
use crate::perspective::{PerspectiveGenerator, PerspectiveSample};
use crate::types::{Domain, MoralStatus, ReasoningChain};
use crate::validator::ClaimValidator;

pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

pub const STEP_DOMAIN_CLASSIFICATION: &str = "domain_classification";
pub const STEP_PERSPECTIVE_SAMPLING: &str = "perspective_sampling";
pub const STEP_CLAIM_EXTRACTION: &str = "claim_extraction";
pub const STEP_MORAL_VALIDATION: &str = "moral_validation";
pub const STEP_MORAL_VERDICT: &str = "moral_verdict";
pub const STEP_BIASED_REGENERATION: &str = "biased_regeneration";
pub const STEP_COSMIC_CALIBRATION: &str = "cosmic_calibration";

const CLAIM_EXCERPT_CHARS: usize = 50;

/// Phase of the validation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPhase {
    GenerateInitial,
    Validate,
    RegenerateBiased,
    Calibrate,
}

/// Counters the transition function reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopState {
    /// Verdict of the most recent validation.
    pub passed: bool,
    /// Biased regenerations performed so far.
    pub regeneration_rounds: usize,
    pub max_attempts: usize,
}

impl LoopState {
    pub fn new(max_attempts: usize) -> Self {
        Self {
            passed: false,
            regeneration_rounds: 0,
            max_attempts,
        }
    }
}

impl RetryPhase {
    /// Phase that follows `self` given the loop counters.
    pub fn next(self, state: &LoopState) -> RetryPhase {
        match self {
            RetryPhase::GenerateInitial | RetryPhase::RegenerateBiased => {
                if state.regeneration_rounds < state.max_attempts {
                    RetryPhase::Validate
                } else {
                    RetryPhase::Calibrate
                }
            }
            RetryPhase::Validate => {
                if state.passed {
                    RetryPhase::Calibrate
                } else {
                    RetryPhase::RegenerateBiased
                }
            }
            RetryPhase::Calibrate => RetryPhase::Calibrate,
        }
    }
}

/// Result of the loop, ready for calibration.
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    pub domain: Domain,
    /// Last sample produced; its synthesis is the one that was (or failed to
    /// be) validated.
    pub sample: PerspectiveSample,
    pub moral_status: MoralStatus,
    pub regeneration_rounds: usize,
    pub chain: ReasoningChain,
}

/// Turn a synthesis into the claim handed to the validator.
pub fn action_claim(synthesis: &str) -> String {
    if has_obligation(synthesis) {
        synthesis.to_string()
    } else {
        format!("Adopt the following stance: {}...", excerpt(synthesis))
    }
}

fn excerpt(text: &str) -> String {
    text.chars().take(CLAIM_EXCERPT_CHARS).collect()
}

#[derive(Clone)]
pub struct RetryOrchestrator {
    generator: PerspectiveGenerator,
    validator: Arc<dyn ClaimValidator>,
    max_attempts: usize,
}

impl RetryOrchestrator {
    pub fn new(generator: PerspectiveGenerator, validator: Arc<dyn ClaimValidator>) -> Self {
        Self {
            generator,
            validator,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Cap on biased regeneration rounds (at least one).
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn generator(&self) -> &PerspectiveGenerator {
        &self.generator
    }

    pub async fn run(&self, query: &str) -> LoopOutcome {
        let mut chain = ReasoningChain::new();

        let domain = classify_domain(query);
        chain.record(
            STEP_DOMAIN_CLASSIFICATION,
            format!("Identified domain: {}", domain),
            None,
        );
        tracing::info!(domain = %domain, "domain classified");

        let mut state = LoopState::new(self.max_attempts);
        let mut sample = self.generator.sample(query, domain).await;
        chain.record(
            STEP_PERSPECTIVE_SAMPLING,
            "Generated three perspectives (μ, +2σ, -2σ)",
            sample.trace.clone(),
        );

        let mut phase = RetryPhase::GenerateInitial.next(&state);
        loop {
            match phase {
                RetryPhase::Validate => {
                    let claim = action_claim(&sample.synthesis);
                    chain.record(
                        STEP_CLAIM_EXTRACTION,
                        format!("Extracted from synthesis: {}...", excerpt(&claim)),
                        None,
                    );

                    let result = self.validator.validate(&claim, query).await;
                    chain.record(STEP_MORAL_VALIDATION, result.summary(), result.trace.clone());

                    state.passed = result.passed();
                    if state.passed {
                        chain.record(STEP_MORAL_VERDICT, "Passed the threefold moral test", None);
                    } else {
                        chain.record(
                            STEP_MORAL_VERDICT,
                            format!(
                                "Failed, starting regeneration round {}",
                                state.regeneration_rounds + 1
                            ),
                            None,
                        );
                    }
                    tracing::info!(
                        passed = state.passed,
                        round = state.regeneration_rounds,
                        "claim validated"
                    );
                }
                RetryPhase::RegenerateBiased => {
                    sample = self.generator.sample_biased(query, domain).await;
                    state.regeneration_rounds += 1;
                    chain.record(
                        STEP_BIASED_REGENERATION,
                        format!(
                            "Regenerated toward the consensus (round {})",
                            state.regeneration_rounds
                        ),
                        sample.trace.clone(),
                    );
                }
                RetryPhase::GenerateInitial | RetryPhase::Calibrate => break,
            }
            phase = phase.next(&state);
        }

        let moral_status = if state.passed {
            MoralStatus::Passed
        } else {
            MoralStatus::CompromisedAfterRetry
        };
        tracing::info!(
            status = %moral_status,
            regeneration_rounds = state.regeneration_rounds,
            "validation loop finished"
        );

        LoopOutcome {
            domain,
            sample,
            moral_status,
            regeneration_rounds: state.regeneration_rounds,
            chain,
        }
    }
}
