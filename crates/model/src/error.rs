/// Raised while constructing a backend. This is the only error the pipeline
/// lets escape to its caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("unsupported backend `{name}` (supported: {supported})")]
    UnsupportedBackend { name: String, supported: String },
    #[error("{backend} backend requires `{field}`")]
    MissingCredential {
        backend: String,
        field: &'static str,
    },
    #[error("{backend} backend requires an explicit model")]
    MissingModel { backend: String },
    #[error("invalid endpoint `{endpoint}`: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Backend-level failure of a single generation call.
///
/// Never propagated past a [`crate::GenerationPort`]; ports render it as
/// inline diagnostic text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationFault {
    #[error("{backend} request failed: {message}")]
    Transport { backend: String, message: String },
    #[error("{backend} error {status}: {body}")]
    Status {
        backend: String,
        status: u16,
        body: String,
    },
    #[error("invalid {backend} response: {message}")]
    Decode { backend: String, message: String },
    #[error("{backend} response did not include any output")]
    EmptyResponse { backend: String },
}
