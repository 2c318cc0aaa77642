#![deny(unsafe_code)]
//! # dialectic-engine
//!
//! The answering pipeline. A query is classified into a domain, sampled into
//! three viewpoints (consensus, progressive tail, conservative tail) plus a
//! synthesis, checked by a bounded validate/regenerate loop, calibrated, and
//! annotated by the estimators.
//!
//! Each stage runs either on fixed templates and keyword rules or through a
//! [`dialectic_model::GenerationPort`]. Only construction can fail, with
//! [`dialectic_model::ConfigurationError`].
//!
//! ```no_run
//! use dialectic_engine::{ask, BackendOptions};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let response = ask("Should the state monitor citizens?", "mock", false, &BackendOptions::default()).await?;
//! println!("{}", response.calibrated_text);
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod calibration;
pub mod config;
pub mod domain;
pub mod markers;
pub mod orchestrator;
pub mod parser;
pub mod perspective;
pub mod pipeline;
pub mod telemetry;
pub mod templates;
pub mod types;
pub mod validator;

pub use assembler::{key_concepts, ResponseAssembler};
pub use calibration::{classify_category, finitude_check, CalibrationStage};
pub use config::{BackendSettings, DialecticConfig, LoggingConfig, PipelineSettings};
pub use domain::classify_domain;
pub use orchestrator::{
    action_claim, LoopOutcome, LoopState, RetryOrchestrator, RetryPhase, DEFAULT_MAX_ATTEMPTS,
};
pub use parser::{
    parse_calibration, parse_perspectives, parse_synthesis, parse_validation, ParsedPerspectives,
};
pub use perspective::{PerspectiveGenerator, PerspectiveSample};
pub use pipeline::{ask, Pipeline};
pub use telemetry::init_tracing;
pub use templates::{DomainTemplate, TemplateTable};
pub use types::{
    CalibrationCategory, CalibrationInfo, CalibrationResult, ConceptLifecycle, Domain,
    FinalResponse, FinitudeCheck, MoralStatus, Perspective, PerspectiveLabel, PerspectiveSet,
    ReasoningChain, ReasoningStep, UnknownTag, ValidationResult,
};
pub use validator::{ClaimValidator, MoralValidator};

pub use dialectic_model::{BackendOptions, ConfigurationError};
