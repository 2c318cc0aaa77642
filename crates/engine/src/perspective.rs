//! Three-viewpoint sampling with a merged synthesis.

use std::sync::Arc;

use dialectic_estimators::{CosmicContextEstimator, CosmicPhase, PhaseMapping};
use dialectic_model::{GenerationPort, GenerationRequest, ReasonedGeneration};

use crate::markers::ADJUSTED_PREFIX;
use crate::parser::{parse_perspectives, parse_synthesis};
use crate::templates::TemplateTable;
use crate::types::{Domain, PerspectiveLabel, PerspectiveSet};

pub const SAMPLING_TEMPERATURE: f32 = 0.8;
pub const BIASED_TEMPERATURE: f32 = 0.6;

const SAMPLING_SYSTEM_PROMPT: &str = "You are a philosophical reasoning system that \
analyses questions from several angles. Following a normal distribution over the spectrum of \
opinion, produce three viewpoints of different intensity:\n\
1. Consensus (μ): the mainstream, balanced view\n\
2. Progressive tail (+2σ): the radical, innovative view\n\
3. Conservative tail (-2σ): the cautious, traditional view\n\
Then merge the three into a dialectical synthesis.";

const BIASED_SYSTEM_PROMPT: &str = "You are a philosophical reasoning system. The previous \
answer failed moral validation, so produce an answer weighted toward the consensus (μ) and \
reduce the weight of the extreme viewpoints.";

/// One sampled perspective set with its synthesis.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveSample {
    pub domain: Domain,
    pub perspectives: PerspectiveSet,
    pub synthesis: String,
    pub cosmic_mapping: PhaseMapping,
    pub trace: Option<ReasonedGeneration>,
}

/// Produces perspective samples from templates or from a generation port.
#[derive(Clone)]
pub struct PerspectiveGenerator {
    port: Option<Arc<dyn GenerationPort>>,
    templates: TemplateTable,
    cosmic: CosmicContextEstimator,
}

impl PerspectiveGenerator {
    /// Template mode.
    pub fn templated(templates: TemplateTable) -> Self {
        Self {
            port: None,
            templates,
            cosmic: CosmicContextEstimator::new(),
        }
    }

    /// Backend mode; the templates fill whatever the backend leaves out.
    pub fn with_port(port: Arc<dyn GenerationPort>, templates: TemplateTable) -> Self {
        Self {
            port: Some(port),
            templates,
            cosmic: CosmicContextEstimator::new(),
        }
    }

    pub fn templates(&self) -> &TemplateTable {
        &self.templates
    }

    pub async fn sample(&self, query: &str, domain: Domain) -> PerspectiveSample {
        let template = self.templates.get(domain);
        let Some(port) = &self.port else {
            return self.assemble(domain, template.perspectives(), template.synthesis(), None);
        };

        let request = GenerationRequest::new(sampling_prompt(query))
            .with_system_prompt(SAMPLING_SYSTEM_PROMPT)
            .with_temperature(SAMPLING_TEMPERATURE);
        let generation = port.generate_with_reasoning(&request).await;

        let parsed = parse_perspectives(&generation.text);
        let missing = parsed.missing();
        if !missing.is_empty() {
            tracing::warn!(
                domain = %domain,
                missing = ?missing,
                "backend omitted perspectives, filling from templates"
            );
        }
        let perspectives = parsed.fill_from(&template.perspectives());

        let mut synthesis = parse_synthesis(&generation.text);
        if synthesis.trim().is_empty() {
            tracing::warn!(domain = %domain, "backend synthesis empty, using template");
            synthesis = template.synthesis();
        }

        self.assemble(domain, perspectives, synthesis, Some(generation))
    }

    /// Regenerate after a failed validation, weighting toward the consensus.
    /// The previous synthesis is discarded.
    pub async fn sample_biased(&self, query: &str, domain: Domain) -> PerspectiveSample {
        let template = self.templates.get(domain);
        let Some(port) = &self.port else {
            return self.assemble(
                domain,
                template.biased_perspectives(),
                template.biased_synthesis(),
                None,
            );
        };

        let request = GenerationRequest::new(biased_prompt(query))
            .with_system_prompt(BIASED_SYSTEM_PROMPT)
            .with_temperature(BIASED_TEMPERATURE);
        let generation = port.generate_with_reasoning(&request).await;

        let parsed = parse_perspectives(&generation.text);
        if !parsed.is_complete() {
            tracing::warn!(
                domain = %domain,
                missing = ?parsed.missing(),
                "biased regeneration omitted perspectives, filling from templates"
            );
        }
        let mut perspectives = parsed.fill_from(&template.biased_perspectives());
        for label in PerspectiveLabel::ALL.into_iter().filter(|l| l.is_tail()) {
            let text = perspectives.slot_mut(label);
            if !text.to_lowercase().contains(ADJUSTED_PREFIX.trim_end()) {
                text.insert_str(0, ADJUSTED_PREFIX);
            }
        }

        let mut synthesis = parse_synthesis(&generation.text);
        if synthesis.trim().is_empty() {
            tracing::warn!(domain = %domain, "biased synthesis empty, using template");
            synthesis = template.biased_synthesis();
        }

        self.assemble(domain, perspectives, synthesis, Some(generation))
    }

    fn assemble(
        &self,
        domain: Domain,
        perspectives: PerspectiveSet,
        synthesis: String,
        trace: Option<ReasonedGeneration>,
    ) -> PerspectiveSample {
        PerspectiveSample {
            domain,
            perspectives,
            synthesis,
            cosmic_mapping: self
                .cosmic
                .phase_mapping(CosmicPhase::CurrentCivilization.tag()),
            trace,
        }
    }
}

fn sampling_prompt(query: &str) -> String {
    format!(
        "Question: {query}\n\n\
         From the perspective of a normal distribution over the spectrum of opinion, produce \
         three viewpoints:\n\n\
         1. Consensus (μ): the mainstream, balanced view (about 68% would agree)\n\
         2. Progressive tail (+2σ): the radical, innovative view (about 2.5% would agree)\n\
         3. Conservative tail (-2σ): the cautious, traditional view (about 2.5% would agree)\n\n\
         Then write a dialectical synthesis that merges the three.\n\n\
         Answer in exactly this format:\n\
         Consensus (μ): [your answer]\n\
         Progressive tail (+2σ): [your answer]\n\
         Conservative tail (-2σ): [your answer]\n\
         Synthesis: [your answer]"
    )
}

fn biased_prompt(query: &str) -> String {
    format!(
        "Question: {query}\n\n\
         The previous answer failed moral validation (it may have been too radical or too \
         conservative). Produce the three viewpoints again, but this time:\n\
         1. Consensus (μ): keep the mainstream, balanced view\n\
         2. Progressive tail (+2σ): soften the radicalism and mark it {marker}\n\
         3. Conservative tail (-2σ): soften the conservatism and mark it {marker}\n\n\
         Then write a synthesis that stays closer to the consensus and stresses human dignity \
         and social sustainability.\n\n\
         Answer in exactly this format:\n\
         Consensus (μ): [your answer]\n\
         Progressive tail (+2σ): {marker} [your answer]\n\
         Conservative tail (-2σ): {marker} [your answer]\n\
         Synthesis: [your answer]",
        marker = ADJUSTED_PREFIX.trim_end()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialectic_model::ScriptedBackend;

    fn scripted(responses: &[&str]) -> (Arc<ScriptedBackend>, PerspectiveGenerator) {
        let backend = Arc::new(ScriptedBackend::new(responses.iter().copied()));
        let port: Arc<dyn GenerationPort> = backend.clone();
        let generator = PerspectiveGenerator::with_port(port, TemplateTable::default());
        (backend, generator)
    }

    #[tokio::test]
    async fn template_mode_uses_preset_texts() {
        let generator = PerspectiveGenerator::templated(TemplateTable::default());
        let sample = generator.sample("q", Domain::AiRights).await;
        assert!(sample
            .perspectives
            .get(PerspectiveLabel::Consensus)
            .starts_with("AI systems are tools"));
        assert!(sample.synthesis.starts_with("All things considered, AI systems"));
        assert!(sample.trace.is_none());
        assert_eq!(sample.cosmic_mapping.phase, CosmicPhase::CurrentCivilization);
    }

    #[tokio::test]
    async fn backend_mode_parses_and_uses_sampling_temperature() {
        let (backend, generator) = scripted(&[
            "Consensus (μ): middle\nProgressive tail (+2σ): bold\nConservative tail (-2σ): careful\nSynthesis: blend",
        ]);
        let sample = generator.sample("Is art useful?", Domain::General).await;
        assert_eq!(sample.perspectives, PerspectiveSet::new("middle", "bold", "careful"));
        assert_eq!(sample.synthesis, "blend");
        assert!(sample.trace.is_some());

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].temperature, SAMPLING_TEMPERATURE);
        assert!(requests[0].prompt.contains("Question: Is art useful?"));
    }

    #[tokio::test]
    async fn backend_mode_fills_only_missing_pieces() {
        let (_, generator) = scripted(&["+2σ: bold\nSynthesis:"]);
        let sample = generator.sample("q", Domain::PrivacyVsSecurity).await;
        let template = TemplateTable::default();
        let template = template.get(Domain::PrivacyVsSecurity);
        assert_eq!(
            sample.perspectives,
            PerspectiveSet::new(&template.consensus, "bold", &template.conservative)
        );
        assert_eq!(sample.synthesis, template.synthesis());
    }

    #[tokio::test]
    async fn biased_template_mode_marks_tails() {
        let generator = PerspectiveGenerator::templated(TemplateTable::default());
        let sample = generator.sample_biased("q", Domain::General).await;
        assert!(sample
            .perspectives
            .get(PerspectiveLabel::ConservativeTail)
            .starts_with(ADJUSTED_PREFIX));
        assert!(sample.synthesis.starts_with("After weighing every perspective"));
    }

    #[tokio::test]
    async fn biased_backend_mode_guarantees_marker_once() {
        let (backend, generator) = scripted(&[
            "Consensus (μ): middle\nProgressive tail (+2σ): [ethically adjusted] softer\nConservative tail (-2σ): gentler\nSynthesis: closer to the middle",
        ]);
        let sample = generator.sample_biased("q", Domain::General).await;
        assert_eq!(
            sample.perspectives.get(PerspectiveLabel::ProgressiveTail),
            "[ethically adjusted] softer"
        );
        assert_eq!(
            sample.perspectives.get(PerspectiveLabel::ConservativeTail),
            "[ethically adjusted] gentler"
        );
        assert_eq!(sample.perspectives.get(PerspectiveLabel::Consensus), "middle");
        assert_eq!(backend.requests()[0].temperature, BIASED_TEMPERATURE);
    }

    #[tokio::test]
    async fn adjusted_marker_is_recognised_in_any_case() {
        let (_, generator) = scripted(&[
            "Consensus (μ): middle\nProgressive tail (+2σ): [Ethically Adjusted] softer\nConservative tail (-2σ): [ETHICALLY ADJUSTED] gentler\nSynthesis: closer",
        ]);
        let sample = generator.sample_biased("q", Domain::General).await;
        assert_eq!(
            sample.perspectives.get(PerspectiveLabel::ProgressiveTail),
            "[Ethically Adjusted] softer"
        );
        assert_eq!(
            sample.perspectives.get(PerspectiveLabel::ConservativeTail),
            "[ETHICALLY ADJUSTED] gentler"
        );
    }
}
