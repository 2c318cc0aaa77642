#![deny(unsafe_code)]
//! # dialectic-model
//!
//! The generation port used by the Dialectic pipeline, plus the backends that
//! implement it.
//!
//! Every backend honours the same contract: generation never fails across the
//! port boundary. Transport and decoding faults are logged and rendered inline
//! as `[generation error: ...]` text so the pipeline keeps running on degraded
//! content. The only error a caller sees is [`ConfigurationError`], raised
//! when a backend is constructed.
//!
//! ```no_run
//! use dialectic_model::{create_backend, BackendOptions, GenerationRequest};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let port = create_backend("mock", &BackendOptions::default())?;
//! let text = port
//!     .generate(&GenerationRequest::new("Is privacy a right?").with_temperature(0.3))
//!     .await;
//! println!("{text}");
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod error;
pub mod factory;
pub mod http;
pub mod mock;
pub mod port;
pub mod reasoning;
pub mod scripted;

pub use backend::{BackendKind, BackendOptions, DEFAULT_BACKEND};
pub use error::{ConfigurationError, GenerationFault};
pub use factory::{create_backend, default_backend, set_default_backend};
pub use http::HttpBackend;
pub use mock::MockBackend;
pub use port::{
    is_generation_diagnostic, render_fault, GenerationPort, GenerationRequest,
    ReasonedGeneration, ReasoningTrace,
};
pub use scripted::ScriptedBackend;
