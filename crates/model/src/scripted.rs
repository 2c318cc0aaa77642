use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::backend::BackendKind;
use crate::port::{GenerationPort, GenerationRequest, ReasonedGeneration};
use crate::reasoning::extract_reasoning_steps;

/// Backend that replays canned responses, for exercising parsers and
/// fallbacks without a network.
///
/// Responses are returned in order; once the queue is drained the last one is
/// repeated. Every request is recorded for inspection.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    responses: Mutex<VecDeque<String>>,
    last: Mutex<Option<String>>,
    requests: Mutex<Vec<GenerationRequest>>,
    confidence: f64,
}

impl ScriptedBackend {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
            confidence: 0.9,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Requests received so far, in call order.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    fn next_response(&self) -> String {
        let next = self
            .responses
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front());

        let Ok(mut last) = self.last.lock() else {
            return next.unwrap_or_default();
        };
        match next {
            Some(text) => {
                *last = Some(text.clone());
                text
            }
            None => last.clone().unwrap_or_default(),
        }
    }

    fn record(&self, request: &GenerationRequest) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
    }
}

#[async_trait]
impl GenerationPort for ScriptedBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Mock
    }

    async fn generate(&self, request: &GenerationRequest) -> String {
        self.record(request);
        self.next_response()
    }

    async fn generate_with_reasoning(&self, request: &GenerationRequest) -> ReasonedGeneration {
        let text = self.generate(request).await;
        let steps = extract_reasoning_steps(&text);
        ReasonedGeneration::new(text, steps, self.confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_in_order_then_repeats_last() {
        let backend = ScriptedBackend::new(["one", "two"]);
        let request = GenerationRequest::new("p");
        assert_eq!(backend.generate(&request).await, "one");
        assert_eq!(backend.generate(&request).await, "two");
        assert_eq!(backend.generate(&request).await, "two");
        assert_eq!(backend.requests().len(), 3);
    }

    #[tokio::test]
    async fn empty_script_yields_empty_text() {
        let backend = ScriptedBackend::new(Vec::<String>::new());
        let generation = backend
            .generate_with_reasoning(&GenerationRequest::new("p"))
            .await;
        assert_eq!(generation.text, "");
        assert_eq!(generation.reasoning_steps.len(), 1);
    }
}
