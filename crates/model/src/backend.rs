use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Backend selected when the caller does not name one.
pub const DEFAULT_BACKEND: &str = "mock";

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Closed set of supported generation backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Rule-based stub, no network.
    Mock,
    /// OpenAI chat completions.
    OpenAi,
    /// DeepSeek (OpenAI-compatible).
    DeepSeek,
    /// Qwen through DashScope's OpenAI-compatible mode.
    Qwen,
    /// Volcano Engine Ark (OpenAI-compatible).
    Volcano,
    /// Local Ollama-style generate endpoint.
    Local,
}

/// Request/response shape spoken by an HTTP backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    ChatCompletions,
    OllamaGenerate,
}

impl BackendKind {
    pub const ALL: [BackendKind; 6] = [
        BackendKind::Mock,
        BackendKind::OpenAi,
        BackendKind::DeepSeek,
        BackendKind::Qwen,
        BackendKind::Volcano,
        BackendKind::Local,
    ];

    /// Name accepted by the factory.
    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Mock => "mock",
            BackendKind::OpenAi => "openai",
            BackendKind::DeepSeek => "deepseek",
            BackendKind::Qwen => "qwen",
            BackendKind::Volcano => "volcano",
            BackendKind::Local => "local",
        }
    }

    pub fn wire_format(self) -> Option<WireFormat> {
        match self {
            BackendKind::Mock => None,
            BackendKind::Local => Some(WireFormat::OllamaGenerate),
            _ => Some(WireFormat::ChatCompletions),
        }
    }

    pub fn default_endpoint(self) -> Option<&'static str> {
        match self {
            BackendKind::Mock => None,
            BackendKind::OpenAi => Some("https://api.openai.com/v1/chat/completions"),
            BackendKind::DeepSeek => Some("https://api.deepseek.com/v1/chat/completions"),
            BackendKind::Qwen => {
                Some("https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions")
            }
            BackendKind::Volcano => Some("https://ark.cn-beijing.volces.com/api/v3/chat/completions"),
            BackendKind::Local => Some("http://127.0.0.1:11434/api/generate"),
        }
    }

    /// Default model; `None` means the caller must supply one.
    pub fn default_model(self) -> Option<&'static str> {
        match self {
            BackendKind::Mock => Some("mock"),
            BackendKind::OpenAi => Some("gpt-3.5-turbo"),
            BackendKind::DeepSeek => Some("deepseek-chat"),
            BackendKind::Qwen => Some("qwen-turbo"),
            BackendKind::Volcano => None,
            BackendKind::Local => Some("llama3"),
        }
    }

    pub fn requires_api_key(self) -> bool {
        !matches!(self, BackendKind::Mock | BackendKind::Local)
    }

    pub fn requires_secret_key(self) -> bool {
        matches!(self, BackendKind::Volcano)
    }

    /// Confidence reported alongside reasoning traces.
    pub fn reasoning_confidence(self) -> f64 {
        match self {
            BackendKind::Mock => 0.7,
            BackendKind::DeepSeek => 0.85,
            BackendKind::Local => 0.6,
            BackendKind::OpenAi | BackendKind::Qwen | BackendKind::Volcano => 0.8,
        }
    }

    fn supported_names() -> String {
        Self::ALL
            .iter()
            .map(|kind| kind.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| ConfigurationError::UnsupportedBackend {
                name: s.to_string(),
                supported: Self::supported_names(),
            })
    }
}

/// Backend configuration supplied alongside the backend name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BackendOptions {
    /// Model or endpoint id; falls back to the backend's default model.
    #[serde(default)]
    pub model: Option<String>,
    /// Endpoint override.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// API key (access key for Volcano).
    #[serde(default)]
    pub api_key: Option<String>,
    /// Secret key, only used by Volcano.
    #[serde(default)]
    pub secret_key: Option<String>,
    /// HTTP request timeout.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl BackendOptions {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_secret_key(mut self, secret_key: impl Into<String>) -> Self {
        self.secret_key = Some(secret_key.into());
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    pub(crate) fn api_key(&self) -> Option<&str> {
        non_blank(self.api_key.as_deref())
    }

    pub(crate) fn secret_key(&self) -> Option<&str> {
        non_blank(self.secret_key.as_deref())
    }

    pub(crate) fn model(&self) -> Option<&str> {
        non_blank(self.model.as_deref())
    }

    pub(crate) fn endpoint(&self) -> Option<&str> {
        non_blank(self.endpoint.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_supported_name() {
        for kind in BackendKind::ALL {
            assert_eq!(kind.name().parse::<BackendKind>().unwrap(), kind);
        }
        assert_eq!(" OpenAI ".parse::<BackendKind>().unwrap(), BackendKind::OpenAi);
    }

    #[test]
    fn unknown_name_is_configuration_error() {
        let err = "claude-desktop".parse::<BackendKind>().unwrap_err();
        assert!(matches!(err, ConfigurationError::UnsupportedBackend { .. }));
        assert!(err.to_string().contains("volcano"));
    }

    #[test]
    fn credential_requirements() {
        assert!(!BackendKind::Mock.requires_api_key());
        assert!(!BackendKind::Local.requires_api_key());
        assert!(BackendKind::DeepSeek.requires_api_key());
        assert!(BackendKind::Volcano.requires_secret_key());
        assert!(!BackendKind::OpenAi.requires_secret_key());
    }

    #[test]
    fn blank_options_count_as_missing() {
        let options = BackendOptions::default().with_api_key("  ").with_model("");
        assert!(options.api_key().is_none());
        assert!(options.model().is_none());
        assert_eq!(options.timeout_secs(), DEFAULT_TIMEOUT_SECS);
    }
}
