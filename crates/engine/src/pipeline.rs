//! End-to-end answering: classify, sample, validate, calibrate, annotate.

use std::sync::Arc;

use dialectic_model::{
    create_backend, default_backend, BackendKind, BackendOptions, ConfigurationError,
    GenerationPort,
};

use crate::assembler::ResponseAssembler;
use crate::calibration::CalibrationStage;
use crate::config::DialecticConfig;
use crate::orchestrator::{RetryOrchestrator, DEFAULT_MAX_ATTEMPTS};
use crate::perspective::PerspectiveGenerator;
use crate::templates::TemplateTable;
use crate::types::FinalResponse;
use crate::validator::{ClaimValidator, MoralValidator};

/// Immutable pipeline configuration shared across requests. Every call to
/// [`Pipeline::respond`] owns its own reasoning chain.
#[derive(Clone)]
pub struct Pipeline {
    port: Option<Arc<dyn GenerationPort>>,
    validator: Arc<dyn ClaimValidator>,
    templates: TemplateTable,
    max_attempts: usize,
    assembler: ResponseAssembler,
}

impl Pipeline {
    /// Template sampling, rule-based validation and rule-based calibration.
    pub fn rules() -> Self {
        Self {
            port: None,
            validator: Arc::new(MoralValidator::rules()),
            templates: TemplateTable::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            assembler: ResponseAssembler::new(),
        }
    }

    /// Route sampling, validation and calibration through `port`.
    pub fn with_backend(port: Arc<dyn GenerationPort>) -> Self {
        Self {
            validator: Arc::new(MoralValidator::with_port(Arc::clone(&port))),
            port: Some(port),
            ..Self::rules()
        }
    }

    /// Backend mode over the shared default port.
    pub fn from_default_backend() -> Self {
        Self::with_backend(default_backend())
    }

    pub fn from_config(config: &DialecticConfig) -> Result<Self, ConfigurationError> {
        let backend = &config.backend;
        let pipeline = if backend.use_backend {
            Self::with_backend(create_backend(&backend.name, &backend.options)?)
        } else {
            backend.name.parse::<BackendKind>()?;
            Self::rules()
        };
        Ok(pipeline.with_max_attempts(config.pipeline.max_attempts))
    }

    /// Replace the claim validator, keeping the generation mode.
    pub fn with_validator(mut self, validator: Arc<dyn ClaimValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_templates(mut self, templates: TemplateTable) -> Self {
        self.templates = templates;
        self
    }

    pub fn uses_backend(&self) -> bool {
        self.port.is_some()
    }

    /// Answer one query. Generation faults surface as diagnostic text inside
    /// the response, never as an error.
    pub async fn respond(&self, query: &str) -> FinalResponse {
        tracing::info!(backend = self.uses_backend(), "answering query");

        let (generator, calibration) = match &self.port {
            Some(port) => (
                PerspectiveGenerator::with_port(Arc::clone(port), self.templates.clone()),
                CalibrationStage::with_port(Arc::clone(port)),
            ),
            None => (
                PerspectiveGenerator::templated(self.templates.clone()),
                CalibrationStage::rules(),
            ),
        };

        let outcome = RetryOrchestrator::new(generator, Arc::clone(&self.validator))
            .with_max_attempts(self.max_attempts)
            .run(query)
            .await;

        let calibrated = calibration
            .calibrate(&outcome.sample.synthesis, query, outcome.domain)
            .await;

        let response = self.assembler.assemble(query, outcome, calibrated);
        tracing::info!(
            domain = %response.domain,
            status = %response.moral_status,
            steps = response.reasoning_chain.len(),
            "query answered"
        );
        response
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::rules()
    }
}

/// One-shot entry point. The backend name is checked even when
/// `use_backend` is false; the backend itself is only built when used.
pub async fn ask(
    query: &str,
    backend_name: &str,
    use_backend: bool,
    options: &BackendOptions,
) -> Result<FinalResponse, ConfigurationError> {
    let pipeline = if use_backend {
        Pipeline::with_backend(create_backend(backend_name, options)?)
    } else {
        backend_name.parse::<BackendKind>()?;
        Pipeline::rules()
    };
    Ok(pipeline.respond(query).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendSettings;
    use crate::orchestrator::STEP_COSMIC_CALIBRATION;
    use dialectic_model::ScriptedBackend;

    #[test]
    fn from_config_defaults_to_rules() {
        let pipeline = Pipeline::from_config(&DialecticConfig::default()).unwrap();
        assert!(!pipeline.uses_backend());
        assert_eq!(pipeline.max_attempts, DEFAULT_MAX_ATTEMPTS);
    }

    #[test]
    fn from_config_builds_backend_when_enabled() {
        let config = DialecticConfig {
            backend: BackendSettings {
                use_backend: true,
                ..BackendSettings::default()
            },
            ..DialecticConfig::default()
        };
        assert!(Pipeline::from_config(&config).unwrap().uses_backend());
    }

    #[test]
    fn from_config_rejects_unknown_backend() {
        let config = DialecticConfig {
            backend: BackendSettings {
                name: "gpt-oracle".to_string(),
                ..BackendSettings::default()
            },
            ..DialecticConfig::default()
        };
        assert!(matches!(
            Pipeline::from_config(&config),
            Err(ConfigurationError::UnsupportedBackend { .. })
        ));
    }

    #[tokio::test]
    async fn calibration_trace_is_kept_in_the_chain() {
        let backend = Arc::new(ScriptedBackend::new([
            "Consensus (μ): middle\nProgressive tail (+2σ): bold\nConservative tail (-2σ): careful\nSynthesis: Balance is wise.",
            "Universalizability: pass\nHumanity: pass\nAutonomy: pass",
            "Finitude check: pass - stays meaningful\nCalibration lens: look up\nCalibrated answer: A calmer answer.",
        ]));
        let response = Pipeline::with_backend(backend).respond("Is art useful?").await;

        let last = response.reasoning_chain.steps().last().unwrap();
        assert_eq!(last.name, STEP_COSMIC_CALIBRATION);
        let trace = last.details.as_ref().unwrap();
        assert!(trace.text.contains("Calibrated answer: A calmer answer."));
        assert_eq!(response.calibrated_text, "A calmer answer.");
    }

    #[tokio::test]
    async fn rule_mode_records_calibration_without_trace() {
        let response = Pipeline::rules().respond("What is a good life?").await;
        let last = response.reasoning_chain.steps().last().unwrap();
        assert_eq!(last.name, STEP_COSMIC_CALIBRATION);
        assert!(last.details.is_none());
        assert!(last.description.starts_with("Calibrated as "));
    }
}
