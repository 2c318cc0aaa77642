use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::backend::BackendKind;
use crate::error::GenerationFault;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Prefix shared by every inline diagnostic produced from a [`GenerationFault`].
pub const DIAGNOSTIC_PREFIX: &str = "[generation error:";

/// A single text-generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// User prompt.
    pub prompt: String,
    /// Optional system instructions.
    pub system_prompt: Option<String>,
    /// Sampling temperature in [0,1].
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_prompt: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = if temperature.is_nan() {
            DEFAULT_TEMPERATURE
        } else {
            temperature.clamp(0.0, 1.0)
        };
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// System prompt, ignoring blank values.
    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// One step of a backend's reasoning trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningTrace {
    pub step: usize,
    pub content: String,
}

/// Generated text together with the reasoning that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasonedGeneration {
    pub text: String,
    pub reasoning_steps: Vec<ReasoningTrace>,
    /// Confidence in [0,1].
    pub confidence: f64,
}

impl ReasonedGeneration {
    pub fn new(
        text: impl Into<String>,
        reasoning_steps: Vec<ReasoningTrace>,
        confidence: f64,
    ) -> Self {
        Self {
            text: text.into(),
            reasoning_steps,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// Capability interface every text-generation backend implements.
///
/// Neither method can fail: faults are caught inside the backend and turned
/// into inline diagnostic text (see [`render_fault`]).
#[async_trait]
pub trait GenerationPort: Send + Sync {
    /// Backend kind.
    fn kind(&self) -> BackendKind;

    /// Generate text for a request.
    async fn generate(&self, request: &GenerationRequest) -> String;

    /// Generate text and return a reasoning trace with a confidence estimate.
    async fn generate_with_reasoning(&self, request: &GenerationRequest) -> ReasonedGeneration;
}

/// Render a fault as inline text, logging it on the way.
pub fn render_fault(fault: &GenerationFault) -> String {
    tracing::warn!(error = %fault, "generation fault recovered as inline diagnostic");
    format!("{} {}]", DIAGNOSTIC_PREFIX, fault)
}

/// Whether text contains an inline generation diagnostic.
pub fn is_generation_diagnostic(text: &str) -> bool {
    text.contains(DIAGNOSTIC_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_is_clamped() {
        assert_eq!(GenerationRequest::new("q").with_temperature(1.7).temperature, 1.0);
        assert_eq!(GenerationRequest::new("q").with_temperature(-0.2).temperature, 0.0);
        assert_eq!(
            GenerationRequest::new("q").with_temperature(f32::NAN).temperature,
            DEFAULT_TEMPERATURE
        );
    }

    #[test]
    fn blank_system_prompt_is_ignored() {
        let request = GenerationRequest::new("q").with_system_prompt("   ");
        assert!(request.system_prompt().is_none());
    }

    #[test]
    fn rendered_fault_is_recognised() {
        let text = render_fault(&GenerationFault::EmptyResponse {
            backend: "qwen".into(),
        });
        assert!(text.starts_with("[generation error: qwen"));
        assert!(is_generation_diagnostic(&text));
        assert!(!is_generation_diagnostic("a perfectly normal answer"));
    }

    #[test]
    fn confidence_is_clamped() {
        let generation = ReasonedGeneration::new("t", vec![], 3.0);
        assert_eq!(generation.confidence, 1.0);
    }
}
