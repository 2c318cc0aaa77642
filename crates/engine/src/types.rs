//! Per-request data model shared by every pipeline stage.

use std::str::FromStr;

use dialectic_estimators::{CosmicState, EntropyAssessment, LifecycleAssessment, PhaseMapping};
use dialectic_model::ReasonedGeneration;
use serde::{Deserialize, Serialize};

/// A tag string that names no known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} tag `{tag}`")]
pub struct UnknownTag {
    pub kind: &'static str,
    pub tag: String,
}

/// Coarse topic of a query, chosen once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    AiRights,
    PrivacyVsSecurity,
    General,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::AiRights, Domain::PrivacyVsSecurity, Domain::General];

    pub fn tag(self) -> &'static str {
        match self {
            Domain::AiRights => "ai_rights",
            Domain::PrivacyVsSecurity => "privacy_vs_security",
            Domain::General => "general",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Domain {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        Self::ALL
            .into_iter()
            .find(|domain| domain.tag() == tag)
            .ok_or_else(|| UnknownTag {
                kind: "domain",
                tag: tag.to_string(),
            })
    }
}

/// Position of a viewpoint on the spectrum of opinion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerspectiveLabel {
    /// μ, the mainstream view.
    Consensus,
    /// +2σ, the radical view.
    ProgressiveTail,
    /// -2σ, the cautious view.
    ConservativeTail,
}

impl PerspectiveLabel {
    /// Canonical display order.
    pub const ALL: [PerspectiveLabel; 3] = [
        PerspectiveLabel::Consensus,
        PerspectiveLabel::ProgressiveTail,
        PerspectiveLabel::ConservativeTail,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            PerspectiveLabel::Consensus => "consensus",
            PerspectiveLabel::ProgressiveTail => "progressive_tail",
            PerspectiveLabel::ConservativeTail => "conservative_tail",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            PerspectiveLabel::Consensus => "Consensus (μ)",
            PerspectiveLabel::ProgressiveTail => "Progressive tail (+2σ)",
            PerspectiveLabel::ConservativeTail => "Conservative tail (-2σ)",
        }
    }

    pub fn is_tail(self) -> bool {
        !matches!(self, PerspectiveLabel::Consensus)
    }
}

impl std::fmt::Display for PerspectiveLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for PerspectiveLabel {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        Self::ALL
            .into_iter()
            .find(|label| label.tag() == tag)
            .ok_or_else(|| UnknownTag {
                kind: "perspective",
                tag: tag.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Perspective {
    pub label: PerspectiveLabel,
    pub text: String,
}

/// Exactly three labelled viewpoints, serialised as an object keyed by
/// label tag in canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerspectiveSet {
    consensus: String,
    progressive_tail: String,
    conservative_tail: String,
}

impl PerspectiveSet {
    pub fn new(
        consensus: impl Into<String>,
        progressive_tail: impl Into<String>,
        conservative_tail: impl Into<String>,
    ) -> Self {
        Self {
            consensus: consensus.into(),
            progressive_tail: progressive_tail.into(),
            conservative_tail: conservative_tail.into(),
        }
    }

    pub fn get(&self, label: PerspectiveLabel) -> &str {
        match label {
            PerspectiveLabel::Consensus => &self.consensus,
            PerspectiveLabel::ProgressiveTail => &self.progressive_tail,
            PerspectiveLabel::ConservativeTail => &self.conservative_tail,
        }
    }

    pub(crate) fn slot_mut(&mut self, label: PerspectiveLabel) -> &mut String {
        match label {
            PerspectiveLabel::Consensus => &mut self.consensus,
            PerspectiveLabel::ProgressiveTail => &mut self.progressive_tail,
            PerspectiveLabel::ConservativeTail => &mut self.conservative_tail,
        }
    }

    /// Perspectives in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = Perspective> + '_ {
        PerspectiveLabel::ALL.into_iter().map(|label| Perspective {
            label,
            text: self.get(label).to_string(),
        })
    }
}

/// One entry of the per-request reasoning log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningStep {
    /// 1-based position in the chain.
    pub index: usize,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ReasonedGeneration>,
}

/// Append-only reasoning log, created fresh for every request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReasoningChain {
    steps: Vec<ReasoningStep>,
}

impl ReasoningChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        name: &str,
        description: impl Into<String>,
        details: Option<ReasonedGeneration>,
    ) {
        let step = ReasoningStep {
            index: self.steps.len() + 1,
            name: name.to_string(),
            description: description.into(),
            details,
        };
        tracing::debug!(index = step.index, name = %step.name, "reasoning step");
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[ReasoningStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of steps with the given name.
    pub fn count(&self, name: &str) -> usize {
        self.steps.iter().filter(|step| step.name == name).count()
    }
}

/// Terminal classification of the validation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoralStatus {
    Passed,
    CompromisedAfterRetry,
}

impl std::fmt::Display for MoralStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MoralStatus::Passed => "passed",
            MoralStatus::CompromisedAfterRetry => "compromised_after_retry",
        };
        f.write_str(name)
    }
}

/// Verdicts of the three independent checks on a claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub universalizable: bool,
    pub humanity_respected: bool,
    pub autonomous: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<ReasonedGeneration>,
}

impl ValidationResult {
    pub fn new(universalizable: bool, humanity_respected: bool, autonomous: bool) -> Self {
        Self {
            universalizable,
            humanity_respected,
            autonomous,
            trace: None,
        }
    }

    pub fn with_trace(mut self, trace: ReasonedGeneration) -> Self {
        self.trace = Some(trace);
        self
    }

    pub fn passed(&self) -> bool {
        self.universalizable && self.humanity_respected && self.autonomous
    }

    pub(crate) fn summary(&self) -> String {
        format!(
            "universalizable: {}, humanity respected: {}, autonomous: {}",
            self.universalizable, self.humanity_respected, self.autonomous
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinitudeCheck {
    pub passed: bool,
    pub reason: String,
}

/// Closing-commentary category chosen for calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationCategory {
    Moral,
    Epistemic,
    Aesthetic,
    General,
}

impl CalibrationCategory {
    pub fn tag(self) -> &'static str {
        match self {
            CalibrationCategory::Moral => "moral",
            CalibrationCategory::Epistemic => "epistemic",
            CalibrationCategory::Aesthetic => "aesthetic",
            CalibrationCategory::General => "general",
        }
    }

    /// Fixed closing aphorism for the category.
    pub fn aphorism(self) -> &'static str {
        match self {
            CalibrationCategory::Moral => {
                "The moral law holds unconditionally, even in the last second before heat death."
            }
            CalibrationCategory::Epistemic => {
                "Truth is reason completing itself; it does not lapse when the data is lost."
            }
            CalibrationCategory::Aesthetic => {
                "The fleeting flower is more beautiful because it must wither; the sublime \
                 arises from transcending finitude."
            }
            CalibrationCategory::General => {
                "Meaning arises from the self-legislation of finite rational beings."
            }
        }
    }
}

impl std::fmt::Display for CalibrationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    pub calibrated_text: String,
    pub finitude_check: FinitudeCheck,
    pub category: CalibrationCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<ReasonedGeneration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationInfo {
    pub finitude_check: FinitudeCheck,
    pub category: CalibrationCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptLifecycle {
    pub concept: String,
    pub assessment: LifecycleAssessment,
}

/// Everything the pipeline knows about one answered query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalResponse {
    pub query: String,
    pub domain: Domain,
    pub perspectives: PerspectiveSet,
    /// Validated synthesis before calibration.
    pub synthesis: String,
    pub calibrated_text: String,
    pub moral_status: MoralStatus,
    pub regeneration_rounds: usize,
    pub reasoning_chain: ReasoningChain,
    pub calibration_info: CalibrationInfo,
    pub entropy_assessment: EntropyAssessment,
    pub lifecycle_analyses: Vec<ConceptLifecycle>,
    pub cosmic_state: CosmicState,
    pub cosmic_context: String,
    pub cosmic_mapping: PhaseMapping,
}
