//! HTTP-backed generation ports.
//!
//! OpenAI, DeepSeek, Qwen and Volcano all speak the chat-completions shape;
//! the local backend speaks the Ollama `/api/generate` shape.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::backend::{BackendKind, BackendOptions, WireFormat};
use crate::error::{ConfigurationError, GenerationFault};
use crate::port::{render_fault, GenerationPort, GenerationRequest, ReasonedGeneration};
use crate::reasoning::{extract_reasoning_steps, reasoning_prompt, REASONING_MAX_TOKENS};

const ERROR_BODY_MAX_CHARS: usize = 320;

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Value,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
}

/// Generation port talking to a remote (or local) text-generation service.
#[derive(Clone)]
pub struct HttpBackend {
    kind: BackendKind,
    wire: WireFormat,
    model: String,
    endpoint: String,
    api_key: Option<String>,
    client: Client,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("kind", &self.kind)
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

impl HttpBackend {
    /// Validate options for `kind` and build the backend.
    pub fn from_options(
        kind: BackendKind,
        options: &BackendOptions,
    ) -> Result<Self, ConfigurationError> {
        let wire = kind
            .wire_format()
            .ok_or_else(|| ConfigurationError::UnsupportedBackend {
                name: kind.name().to_string(),
                supported: http_backend_names(),
            })?;

        let api_key = options.api_key().map(str::to_string);
        if kind.requires_api_key() && api_key.is_none() {
            return Err(ConfigurationError::MissingCredential {
                backend: kind.name().to_string(),
                field: "api_key",
            });
        }
        if kind.requires_secret_key() && options.secret_key().is_none() {
            return Err(ConfigurationError::MissingCredential {
                backend: kind.name().to_string(),
                field: "secret_key",
            });
        }

        let model = options
            .model()
            .or_else(|| kind.default_model())
            .map(str::to_string)
            .ok_or_else(|| ConfigurationError::MissingModel {
                backend: kind.name().to_string(),
            })?;

        let default_endpoint = kind.default_endpoint().unwrap_or_default();
        let endpoint = match wire {
            WireFormat::ChatCompletions => {
                resolve_chat_endpoint(options.endpoint(), default_endpoint)
            }
            WireFormat::OllamaGenerate => {
                resolve_generate_endpoint(options.endpoint(), default_endpoint)
            }
        };
        Url::parse(&endpoint).map_err(|e| ConfigurationError::InvalidEndpoint {
            endpoint: endpoint.clone(),
            reason: e.to_string(),
        })?;

        let client = build_http_client(options.timeout_secs())?;

        tracing::debug!(backend = %kind, model = %model, endpoint = %endpoint, "HTTP backend ready");

        Ok(Self {
            kind,
            wire,
            model,
            endpoint,
            api_key,
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn complete(&self, request: &GenerationRequest) -> Result<String, GenerationFault> {
        let output = match self.wire {
            WireFormat::ChatCompletions => self.complete_chat(request).await?,
            WireFormat::OllamaGenerate => self.complete_ollama(request).await?,
        };
        let output = output.trim();
        if output.is_empty() {
            return Err(GenerationFault::EmptyResponse {
                backend: self.kind.name().to_string(),
            });
        }
        Ok(output.to_string())
    }

    async fn complete_chat(&self, request: &GenerationRequest) -> Result<String, GenerationFault> {
        let mut messages = Vec::new();
        if let Some(system_prompt) = request.system_prompt() {
            messages.push(json!({
                "role": "system",
                "content": system_prompt,
            }));
        }
        messages.push(json!({
            "role": "user",
            "content": request.prompt,
        }));

        let payload = json!({
            "model": self.model,
            "messages": messages,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });

        let mut builder = self.client.post(&self.endpoint).json(&payload);
        if let Some(api_key) = self.api_key.as_deref() {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await.map_err(|e| self.transport(e))?;
        let response = self.check_status(response).await?;

        let body: ChatCompletionResponse = response.json().await.map_err(|e| self.decode(e))?;
        let choice = body
            .choices
            .first()
            .ok_or_else(|| GenerationFault::EmptyResponse {
                backend: self.kind.name().to_string(),
            })?;
        Ok(extract_text(&choice.message.content))
    }

    async fn complete_ollama(
        &self,
        request: &GenerationRequest,
    ) -> Result<String, GenerationFault> {
        let payload = json!({
            "model": self.model,
            "prompt": compose_prompt(request),
            "stream": false,
            "options": {
                "temperature": request.temperature,
                "num_predict": request.max_tokens,
            },
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.transport(e))?;
        let response = self.check_status(response).await?;

        let body: OllamaResponse = response.json().await.map_err(|e| self.decode(e))?;
        Ok(body.response)
    }

    async fn check_status(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GenerationFault> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(GenerationFault::Status {
            backend: self.kind.name().to_string(),
            status,
            body: truncate(&body, ERROR_BODY_MAX_CHARS),
        })
    }

    fn transport(&self, error: reqwest::Error) -> GenerationFault {
        GenerationFault::Transport {
            backend: self.kind.name().to_string(),
            message: error.to_string(),
        }
    }

    fn decode(&self, error: reqwest::Error) -> GenerationFault {
        GenerationFault::Decode {
            backend: self.kind.name().to_string(),
            message: error.to_string(),
        }
    }
}

#[async_trait]
impl GenerationPort for HttpBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    async fn generate(&self, request: &GenerationRequest) -> String {
        match self.complete(request).await {
            Ok(text) => text,
            Err(fault) => render_fault(&fault),
        }
    }

    async fn generate_with_reasoning(&self, request: &GenerationRequest) -> ReasonedGeneration {
        let mut wrapped = GenerationRequest::new(reasoning_prompt(&request.prompt))
            .with_temperature(request.temperature)
            .with_max_tokens(REASONING_MAX_TOKENS);
        wrapped.system_prompt = request.system_prompt.clone();

        let text = self.generate(&wrapped).await;
        let steps = extract_reasoning_steps(&text);
        ReasonedGeneration::new(text, steps, self.kind.reasoning_confidence())
    }
}

fn build_http_client(timeout_secs: u64) -> Result<Client, ConfigurationError> {
    let mut builder = Client::builder().timeout(Duration::from_secs(timeout_secs));
    let allow_system_proxy = std::env::var("DIALECTIC_USE_SYSTEM_PROXY")
        .map(|value| matches!(value.as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);

    if !allow_system_proxy {
        builder = builder.no_proxy();
    }

    builder
        .build()
        .map_err(|e| ConfigurationError::HttpClient(e.to_string()))
}

fn http_backend_names() -> String {
    BackendKind::ALL
        .iter()
        .filter(|kind| kind.wire_format().is_some())
        .map(|kind| kind.name())
        .collect::<Vec<_>>()
        .join(", ")
}

fn compose_prompt(request: &GenerationRequest) -> String {
    match request.system_prompt() {
        Some(system_prompt) => format!(
            "System:\n{}\n\nUser:\n{}",
            system_prompt,
            request.prompt.trim()
        ),
        None => request.prompt.trim().to_string(),
    }
}

fn resolve_chat_endpoint(endpoint: Option<&str>, default_endpoint: &str) -> String {
    let endpoint = endpoint.unwrap_or(default_endpoint);
    if endpoint.contains("/chat/completions") {
        endpoint.to_string()
    } else {
        format!("{}/chat/completions", endpoint.trim_end_matches('/'))
    }
}

fn resolve_generate_endpoint(endpoint: Option<&str>, default_endpoint: &str) -> String {
    let endpoint = endpoint.unwrap_or(default_endpoint);
    if endpoint.contains("/api/generate") {
        endpoint.to_string()
    } else {
        format!("{}/api/generate", endpoint.trim_end_matches('/'))
    }
}

fn extract_text(content: &Value) -> String {
    match content {
        Value::String(text) => text.clone(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

fn truncate(value: &str, max_chars: usize) -> String {
    let mut chars = value.chars();
    let truncated: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}
