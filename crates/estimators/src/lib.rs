#![deny(unsafe_code)]
//! # dialectic-estimators
//!
//! Keyword and lookup-table heuristics that annotate a finished answer:
//!
//! - [`EntropyAssessor`]: how much order an answer adds relative to its length
//! - [`LifecycleModeler`]: where a concept sits in its rise-and-fall cycle
//! - [`CosmicContextEstimator`]: the fixed cosmic backdrop and phase mappings
//!
//! All estimators are pure and deterministic. None of them feed back into
//! generation or validation.

pub mod cosmic;
pub mod entropy;
pub mod lifecycle;

pub use cosmic::{CosmicContextEstimator, CosmicPhase, CosmicState, PhaseMapping};
pub use entropy::{
    EntropyAssessment, EntropyAssessor, EntropyRecommendation, DEFAULT_ENTROPY_THRESHOLD,
};
pub use lifecycle::{LifecycleAssessment, LifecycleModeler, LifecycleStage};
