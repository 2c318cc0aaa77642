use serde::{Deserialize, Serialize};

const OVERHEATED_CONCEPTS: &[&str] = &[
    "blockchain",
    "metaverse",
    "nft",
    "web3",
    "chatgpt",
    "large language model",
    "generative ai",
    "区块链",
    "元宇宙",
    "大语言模型",
    "生成式ai",
];

const STABLE_CONCEPTS: &[&str] = &[
    "democracy",
    "scientific method",
    "rule of law",
    "market economy",
    "human rights",
    "民主",
    "科学方法",
    "法治",
    "市场经济",
    "人权",
];

const DECLINING_CONCEPTS: &[&str] = &[
    "geocentric",
    "alchemy",
    "feudalism",
    "地心说",
    "炼金术",
    "封建制度",
];

const NOVELTY_WORDS: &[&str] = &[
    "new",
    "revolution",
    "breakthrough",
    "disrupt",
    "新",
    "革命",
    "突破",
    "颠覆",
];

const TRADITION_WORDS: &[&str] = &["tradition", "classical", "classic", "传统", "古典", "经典"];

/// Where a concept sits in its rise-and-fall cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStage {
    /// +2σ, due for mean reversion.
    Overheated,
    /// ±1σ, resilient.
    Stable,
    /// Tail, historical reference only.
    Declining,
    Unknown,
}

impl LifecycleStage {
    pub fn sigma(self) -> &'static str {
        match self {
            LifecycleStage::Overheated => "+2σ",
            LifecycleStage::Stable => "±1σ",
            LifecycleStage::Declining => "tail",
            LifecycleStage::Unknown => "unknown",
        }
    }

    fn strategy(self) -> &'static str {
        match self {
            LifecycleStage::Overheated => "Stress possibility and risk; avoid excessive optimism",
            LifecycleStage::Stable => {
                "Stress norms and responsibility; highlight historical stability"
            }
            LifecycleStage::Declining => {
                "Stress historical lessons and sublation; avoid repeating mistakes"
            }
            LifecycleStage::Unknown => "Stay open; weigh several perspectives",
        }
    }
}

impl std::fmt::Display for LifecycleStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LifecycleStage::Overheated => "overheated",
            LifecycleStage::Stable => "stable",
            LifecycleStage::Declining => "declining",
            LifecycleStage::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleAssessment {
    pub stage: LifecycleStage,
    pub sigma: String,
    pub description: String,
    pub strategy: String,
}

impl LifecycleAssessment {
    fn new(stage: LifecycleStage, description: &str) -> Self {
        Self {
            stage,
            sigma: stage.sigma().to_string(),
            description: description.to_string(),
            strategy: stage.strategy().to_string(),
        }
    }
}

/// Lookup-table model of concept, institution and technology lifecycles.
#[derive(Debug, Clone, Default)]
pub struct LifecycleModeler;

impl LifecycleModeler {
    pub fn new() -> Self {
        Self
    }

    /// Assess the lifecycle stage of a concept.
    ///
    /// Known concepts match in either direction (the concept contains the
    /// table entry or the entry contains the concept); anything else falls
    /// through to word heuristics.
    pub fn assess(&self, concept: &str) -> LifecycleAssessment {
        let concept = concept.trim().to_lowercase();
        if concept.is_empty() {
            return unknown();
        }

        let tables = [
            (
                OVERHEATED_CONCEPTS,
                LifecycleStage::Overheated,
                "Overheated (+2σ), about to revert to the mean",
            ),
            (
                STABLE_CONCEPTS,
                LifecycleStage::Stable,
                "Stable (±1σ), resilient against entropy",
            ),
            (
                DECLINING_CONCEPTS,
                LifecycleStage::Declining,
                "Declining (tail), historical reference only",
            ),
        ];

        for (terms, stage, description) in tables {
            if terms
                .iter()
                .any(|term| concept.contains(term) || term.contains(concept.as_str()))
            {
                return LifecycleAssessment::new(stage, description);
            }
        }

        if NOVELTY_WORDS.iter().any(|w| concept.contains(w)) {
            return LifecycleAssessment::new(
                LifecycleStage::Overheated,
                "Possibly overheated (+2σ); assess with care",
            );
        }
        if TRADITION_WORDS.iter().any(|w| concept.contains(w)) {
            return LifecycleAssessment::new(
                LifecycleStage::Stable,
                "Possibly stable (±1σ), with historical staying power",
            );
        }

        unknown()
    }

    /// Output strategy for an assessed stage.
    pub fn output_strategy(&self, assessment: &LifecycleAssessment) -> &'static str {
        match assessment.stage {
            LifecycleStage::Overheated => {
                "For emerging things: stress possibility and risk; recall that regression \
                 to the mean is likely; stay rational and critical."
            }
            LifecycleStage::Stable => {
                "For mature things: stress norms and responsibility; highlight their \
                 historical stability; seek improvement within stability."
            }
            LifecycleStage::Declining => {
                "For declining things: stress historical lessons and sublation; avoid \
                 repeating mistakes; draw wisdom from history."
            }
            LifecycleStage::Unknown => {
                "Stay open; weigh several perspectives; judge on evidence and reason."
            }
        }
    }
}

fn unknown() -> LifecycleAssessment {
    LifecycleAssessment::new(
        LifecycleStage::Unknown,
        "Lifecycle stage unknown; needs further analysis",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lookup_is_bidirectional() {
        let modeler = LifecycleModeler::new();
        assert_eq!(modeler.assess("Blockchain voting").stage, LifecycleStage::Overheated);
        assert_eq!(modeler.assess("democracy").stage, LifecycleStage::Stable);
        // "law" is contained in "rule of law".
        assert_eq!(modeler.assess("law").stage, LifecycleStage::Stable);
        assert_eq!(modeler.assess("炼金术").stage, LifecycleStage::Declining);
    }

    #[test]
    fn heuristics_catch_novelty_and_tradition() {
        let modeler = LifecycleModeler::new();
        let novel = modeler.assess("breakthroughs");
        assert_eq!(novel.stage, LifecycleStage::Overheated);
        assert!(novel.description.starts_with("Possibly"));
        assert_eq!(modeler.assess("classical music").stage, LifecycleStage::Stable);
    }

    #[test]
    fn unmatched_concept_is_unknown() {
        let modeler = LifecycleModeler::new();
        let assessment = modeler.assess("surveillance");
        assert_eq!(assessment.stage, LifecycleStage::Unknown);
        assert_eq!(assessment.sigma, "unknown");
        assert_eq!(modeler.assess("   ").stage, LifecycleStage::Unknown);
    }

    #[test]
    fn strategy_follows_stage() {
        let modeler = LifecycleModeler::new();
        let assessment = modeler.assess("feudalism");
        assert!(modeler.output_strategy(&assessment).starts_with("For declining things"));
    }
}
