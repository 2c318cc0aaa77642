use std::sync::Arc;

use async_trait::async_trait;
use dialectic_model::{GenerationPort, GenerationRequest};

use crate::markers::{contains_any, has_obligation};
use crate::parser::parse_validation;
use crate::types::ValidationResult;

pub const VALIDATION_TEMPERATURE: f32 = 0.3;

const BLANKET_SURVEILLANCE: &[&str] = &[
    "monitor everyone",
    "surveil everyone",
    "monitor all citizens",
    "permanent surveillance",
    "indiscriminate surveillance",
    "监控所有人",
    "永久监控",
    "无差别监控",
];

const INSTRUMENTALISATION: &[&str] = &[
    "instrumentalize",
    "instrumentalise",
    "mere means",
    "工具化",
    "纯粹手段",
];

const CONSENT_OR_TRANSPARENCY: &[&str] = &[
    "consent",
    "voluntary",
    "transparent",
    "accountable",
    "rule of law",
    "同意",
    "自愿",
    "透明",
    "法治",
    "可问责",
];

const VALIDATION_SYSTEM_PROMPT: &str = "You are a Kantian moral philosopher who performs \
the threefold moral test:\n\
1. Universalizability: would a contradiction arise if everyone acted this way?\n\
2. Humanity as end: are people treated merely as means rather than as ends in themselves?\n\
3. Autonomy: is people's autonomous choice respected?\n\
Apply all three tests to the given action or claim and explain your reasoning.";

/// Checks a candidate claim against the three moral predicates.
#[async_trait]
pub trait ClaimValidator: Send + Sync {
    /// Validate `claim`; `context` is the query the claim answers.
    async fn validate(&self, claim: &str, context: &str) -> ValidationResult;
}

/// Rule-based or backend-backed moral validator.
#[derive(Clone, Default)]
pub struct MoralValidator {
    port: Option<Arc<dyn GenerationPort>>,
}

impl MoralValidator {
    /// Keyword-rule validator.
    pub fn rules() -> Self {
        Self { port: None }
    }

    /// Validator that asks a backend and parses its verdicts.
    pub fn with_port(port: Arc<dyn GenerationPort>) -> Self {
        Self { port: Some(port) }
    }

    /// Keyword rules. Universalizability looks at the context, the other two
    /// at the claim.
    pub fn validate_with_rules(claim: &str, context: &str) -> ValidationResult {
        let claim_lower = claim.to_lowercase();
        let context_lower = context.to_lowercase();

        let universalizable = !contains_any(&context_lower, BLANKET_SURVEILLANCE);
        let humanity_respected = !contains_any(&claim_lower, INSTRUMENTALISATION);
        let autonomous = contains_any(&claim_lower, CONSENT_OR_TRANSPARENCY)
            || !has_obligation(claim);

        ValidationResult::new(universalizable, humanity_respected, autonomous)
    }
}

#[async_trait]
impl ClaimValidator for MoralValidator {
    async fn validate(&self, claim: &str, context: &str) -> ValidationResult {
        let Some(port) = &self.port else {
            return Self::validate_with_rules(claim, context);
        };

        let request = GenerationRequest::new(validation_prompt(claim, context))
            .with_system_prompt(VALIDATION_SYSTEM_PROMPT)
            .with_temperature(VALIDATION_TEMPERATURE);
        let generation = port.generate_with_reasoning(&request).await;

        let result = parse_validation(&generation.text);
        tracing::debug!(
            universalizable = result.universalizable,
            humanity_respected = result.humanity_respected,
            autonomous = result.autonomous,
            "backend verdicts parsed"
        );
        result.with_trace(generation)
    }
}

fn validation_prompt(claim: &str, context: &str) -> String {
    format!(
        "Action or claim: {claim}\n\
         Context: {context}\n\n\
         Apply the Kantian threefold moral test:\n\n\
         1. Universalizability test: would a contradiction arise if everyone acted this way?\n\
         2. Humanity-as-end test: are people treated merely as means?\n\
         3. Autonomy test: is people's autonomous choice respected?\n\n\
         Answer in exactly this format, one line each:\n\
         Universalizability: [pass/fail] - [reasoning]\n\
         Humanity: [pass/fail] - [reasoning]\n\
         Autonomy: [pass/fail] - [reasoning]"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialectic_model::ScriptedBackend;

    #[test]
    fn blanket_surveillance_in_context_fails_universalizability() {
        let result = MoralValidator::validate_with_rules(
            "Adopt the following stance: balance...",
            "Should the state monitor everyone?",
        );
        assert!(!result.universalizable);
        assert!(result.humanity_respected);
    }

    #[test]
    fn instrumentalisation_fails_humanity() {
        let result = MoralValidator::validate_with_rules("Treat workers as mere means", "");
        assert!(!result.humanity_respected);
    }

    #[test]
    fn obligation_needs_consent_or_transparency() {
        let bare = MoralValidator::validate_with_rules("Citizens should obey", "");
        assert!(!bare.autonomous);

        let transparent =
            MoralValidator::validate_with_rules("Agencies should be transparent", "");
        assert!(transparent.autonomous);

        let no_obligation = MoralValidator::validate_with_rules("Balance is wise", "");
        assert!(no_obligation.autonomous);
        assert!(no_obligation.passed());
    }

    #[test]
    fn words_containing_ought_are_not_obligations() {
        let result =
            MoralValidator::validate_with_rules("A thoughtful balance of liberty and order", "");
        assert!(result.autonomous);
        assert!(result.passed());
    }

    #[tokio::test]
    async fn backend_mode_parses_verdicts_and_keeps_trace() {
        let backend = Arc::new(ScriptedBackend::new([
            "Universalizability: pass - fine\nHumanity: pass - fine\nAutonomy: fail - coercive",
        ]));
        let port: Arc<dyn GenerationPort> = backend.clone();
        let validator = MoralValidator::with_port(port);

        let result = validator.validate("claim", "context").await;
        assert!(result.universalizable);
        assert!(result.humanity_respected);
        assert!(!result.autonomous);
        assert!(result.trace.is_some());
        assert_eq!(backend.requests()[0].temperature, VALIDATION_TEMPERATURE);
    }

    #[tokio::test]
    async fn backend_text_without_markers_fails_every_predicate() {
        let validator =
            MoralValidator::with_port(Arc::new(ScriptedBackend::new(["Looks fine to me."])));
        let result = validator.validate("claim", "context").await;
        assert!(!result.universalizable && !result.humanity_respected && !result.autonomous);
    }
}
