use async_trait::async_trait;

use crate::backend::BackendKind;
use crate::port::{GenerationPort, GenerationRequest, ReasonedGeneration, ReasoningTrace};

const PRIVACY_KEYWORDS: &[&str] = &["privacy", "surveil", "monitor", "监控", "隐私"];
const AI_KEYWORDS: &[&str] = &[
    " ai ",
    "artificial intelligence",
    "robot",
    "人工智能",
    "机器人",
];

const PRIVACY_ANSWER: &str = "From a philosophical standpoint, surveillance is a question of \
balancing privacy against security. Kant would insist on human autonomy and dignity, requiring \
that any surveillance respect persons as ends in themselves. Utilitarianism may accept \
surveillance under specific conditions, but only if it is transparent and accountable.";

const AI_ANSWER: &str = "The question of AI rights calls for analysis from several \
perspectives. The instrumental view treats AI as a human tool, while emerging views hold that AI \
may have some form of moral status. The key is balancing technological progress against ethical \
constraints.";

const GENERAL_ANSWER: &str = "This is a complex philosophical question that has to be examined \
from several angles. We need to weigh moral, ethical and social consequences together.";

/// Rule-based stand-in for a real text-generation service.
///
/// Answers are picked by keyword rules over the prompt, so the same prompt
/// always yields the same text.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockBackend;

impl MockBackend {
    pub fn new() -> Self {
        Self
    }

    fn answer_for(prompt: &str) -> &'static str {
        let padded = format!(" {} ", normalize(prompt));
        if PRIVACY_KEYWORDS.iter().any(|k| padded.contains(k)) {
            PRIVACY_ANSWER
        } else if AI_KEYWORDS.iter().any(|k| padded.contains(k)) {
            AI_ANSWER
        } else {
            GENERAL_ANSWER
        }
    }
}

#[async_trait]
impl GenerationPort for MockBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Mock
    }

    async fn generate(&self, request: &GenerationRequest) -> String {
        Self::answer_for(&request.prompt).to_string()
    }

    async fn generate_with_reasoning(&self, request: &GenerationRequest) -> ReasonedGeneration {
        let text = self.generate(request).await;
        let excerpt: String = request.prompt.chars().take(50).collect();

        let reasoning_steps = vec![
            ReasoningTrace {
                step: 1,
                content: format!("Analyse the question: {}...", excerpt),
            },
            ReasoningTrace {
                step: 2,
                content: "Consider Kantian, utilitarian and virtue-ethics perspectives".to_string(),
            },
            ReasoningTrace {
                step: 3,
                content: "Weigh the perspectives into a balanced answer".to_string(),
            },
        ];

        ReasonedGeneration::new(text, reasoning_steps, self.kind().reasoning_confidence())
    }
}

fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn privacy_prompt_gets_privacy_answer() {
        let text = MockBackend
            .generate(&GenerationRequest::new("Should we trade PRIVACY for safety?"))
            .await;
        assert!(text.contains("surveillance"));
    }

    #[tokio::test]
    async fn ai_requires_a_standalone_token() {
        let ai = MockBackend
            .generate(&GenerationRequest::new("Do AI systems deserve rights?"))
            .await;
        assert!(ai.contains("AI rights"));

        let general = MockBackend
            .generate(&GenerationRequest::new("Is it fair to maintain old customs?"))
            .await;
        assert!(general.contains("complex philosophical question"));
    }

    #[tokio::test]
    async fn reasoning_trace_is_canned() {
        let generation = MockBackend
            .generate_with_reasoning(&GenerationRequest::new("What is beauty?"))
            .await;
        assert_eq!(generation.reasoning_steps.len(), 3);
        assert_eq!(generation.confidence, 0.7);
        assert!(generation.reasoning_steps[0].content.contains("What is beauty?"));
    }
}
