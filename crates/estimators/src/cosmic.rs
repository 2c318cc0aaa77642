use serde::{Deserialize, Serialize};

/// Civilisation's position on the cosmic normal distribution.
pub const CURRENT_TIME_PHASE: f64 = 1.5;

/// Stage of cosmic evolution a distribution of thought is mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CosmicPhase {
    BigBang,
    StructureFormation,
    CurrentCivilization,
    HeatDeath,
}

impl CosmicPhase {
    pub const ALL: [CosmicPhase; 4] = [
        CosmicPhase::BigBang,
        CosmicPhase::StructureFormation,
        CosmicPhase::CurrentCivilization,
        CosmicPhase::HeatDeath,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            CosmicPhase::BigBang => "big_bang",
            CosmicPhase::StructureFormation => "structure_formation",
            CosmicPhase::CurrentCivilization => "current_civilization",
            CosmicPhase::HeatDeath => "heat_death",
        }
    }

    /// Parse a phase tag, falling back to the current civilisation.
    pub fn from_tag_or_current(tag: &str) -> Self {
        let tag = tag.trim();
        Self::ALL
            .into_iter()
            .find(|phase| phase.tag() == tag)
            .unwrap_or(CosmicPhase::CurrentCivilization)
    }

    pub fn sigma(self) -> f64 {
        match self {
            CosmicPhase::BigBang => 0.0,
            CosmicPhase::StructureFormation => 1.0,
            CosmicPhase::CurrentCivilization => CURRENT_TIME_PHASE,
            CosmicPhase::HeatDeath => 3.0,
        }
    }

    fn description(self) -> &'static str {
        match self {
            CosmicPhase::BigBang => {
                "Big bang: highest energy density, lowest entropy, maximal symmetry"
            }
            CosmicPhase::StructureFormation => {
                "Structure formation: local negentropy emerging amid rising entropy"
            }
            CosmicPhase::CurrentCivilization => {
                "Current civilisation: peak complexity and information-processing capacity"
            }
            CosmicPhase::HeatDeath => {
                "Heat death: maximal entropy, no structure, no arrow of time"
            }
        }
    }

    fn thought_character(self) -> &'static str {
        match self {
            CosmicPhase::BigBang => "primordial unity",
            CosmicPhase::StructureFormation => "differentiation and integration of structure",
            CosmicPhase::CurrentCivilization => "reason completing itself",
            CosmicPhase::HeatDeath => "return to unity, though not the primordial one",
        }
    }
}

impl std::fmt::Display for CosmicPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Snapshot of the cosmic backdrop every answer is reasoned against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CosmicState {
    pub time_phase: String,
    pub entropy_trend: String,
    pub heat_death_countdown: String,
    pub cosmic_position: String,
    pub implications: String,
}

/// Mapping of a thought distribution onto a cosmic phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseMapping {
    pub phase: CosmicPhase,
    pub sigma: f64,
    pub description: String,
    pub thought_character: String,
    pub implication: String,
}

/// Estimates the current cosmic state. Fully deterministic.
#[derive(Debug, Clone, Default)]
pub struct CosmicContextEstimator;

impl CosmicContextEstimator {
    pub fn new() -> Self {
        Self
    }

    pub fn estimate(&self) -> CosmicState {
        CosmicState {
            time_phase: format!("+{}σ", CURRENT_TIME_PHASE),
            entropy_trend: "The window of local negentropy is narrowing; civilisational \
                            complexity is near its peak"
                .to_string(),
            heat_death_countdown: "~10^100 years (a regulative idea, not a prediction)"
                .to_string(),
            cosmic_position: format!(
                "Currently at +{}σ on the cosmic normal distribution, at the structural \
                 peak with the greatest information-processing capacity.",
                CURRENT_TIME_PHASE
            ),
            implications: "Within a finite window, take part in the universe's \
                           self-understanding in the most rational form; do not cling to \
                           permanence, only reflect its laws faithfully now; the moral law \
                           does not depend on the universe enduring but springs from pure \
                           practical reason."
                .to_string(),
        }
    }

    /// Render the cosmic state as a short multi-line summary.
    pub fn context_summary(&self) -> String {
        let state = self.estimate();
        format!(
            "Cosmic context:\n\
             - Time phase: {} (structural peak)\n\
             - Entropy trend: {}\n\
             - Heat-death countdown: {}\n\
             - Implications: {}",
            state.time_phase, state.entropy_trend, state.heat_death_countdown, state.implications
        )
    }

    /// Map a phase tag onto its cosmic description. Unknown tags map to the
    /// current civilisation.
    pub fn phase_mapping(&self, phase: &str) -> PhaseMapping {
        let phase = CosmicPhase::from_tag_or_current(phase);
        PhaseMapping {
            phase,
            sigma: phase.sigma(),
            description: phase.description().to_string(),
            thought_character: phase.thought_character().to_string(),
            implication: format!(
                "The current distribution of thought sits at {}σ on the cosmic normal \
                 distribution, characterised by {}.",
                phase.sigma(),
                phase.thought_character()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_is_deterministic() {
        let estimator = CosmicContextEstimator::new();
        assert_eq!(estimator.estimate(), estimator.estimate());
        assert_eq!(estimator.estimate().time_phase, "+1.5σ");
    }

    #[test]
    fn summary_lists_every_field() {
        let summary = CosmicContextEstimator::new().context_summary();
        assert!(summary.starts_with("Cosmic context:\n"));
        assert!(summary.contains("- Time phase: +1.5σ (structural peak)"));
        assert_eq!(summary.lines().count(), 5);
    }

    #[test]
    fn phase_mapping_known_and_unknown() {
        let estimator = CosmicContextEstimator::new();
        let heat_death = estimator.phase_mapping("heat_death");
        assert_eq!(heat_death.phase, CosmicPhase::HeatDeath);
        assert_eq!(heat_death.sigma, 3.0);
        assert!(heat_death.implication.contains("3σ"));

        let fallback = estimator.phase_mapping("andromeda_merger");
        assert_eq!(fallback.phase, CosmicPhase::CurrentCivilization);
        assert!(fallback.implication.contains("1.5σ"));
    }
}
