use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::markers::ADJUSTED_PREFIX;
use crate::types::{Domain, PerspectiveSet};

/// Preset viewpoints for one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainTemplate {
    pub consensus: String,
    pub progressive: String,
    pub conservative: String,
}

impl DomainTemplate {
    pub fn new(
        consensus: impl Into<String>,
        progressive: impl Into<String>,
        conservative: impl Into<String>,
    ) -> Self {
        Self {
            consensus: consensus.into(),
            progressive: progressive.into(),
            conservative: conservative.into(),
        }
    }

    fn is_complete(&self) -> bool {
        [&self.consensus, &self.progressive, &self.conservative]
            .iter()
            .all(|text| !text.trim().is_empty())
    }

    pub fn perspectives(&self) -> PerspectiveSet {
        PerspectiveSet::new(&self.consensus, &self.progressive, &self.conservative)
    }

    /// Perspectives with both tails marked as adjusted.
    pub fn biased_perspectives(&self) -> PerspectiveSet {
        PerspectiveSet::new(
            &self.consensus,
            format!("{}{}", ADJUSTED_PREFIX, self.progressive),
            format!("{}{}", ADJUSTED_PREFIX, self.conservative),
        )
    }

    pub fn synthesis(&self) -> String {
        format!(
            "All things considered, {} is the most sustainable path.",
            mid_sentence(&self.consensus)
        )
    }

    pub fn biased_synthesis(&self) -> String {
        format!(
            "After weighing every perspective, {} is the path most consistent with human \
             dignity and social sustainability.",
            mid_sentence(&self.consensus)
        )
    }
}

/// Lowercase the leading letter so the text reads inside a sentence.
/// Acronyms such as "AI" keep their case.
fn mid_sentence(text: &str) -> String {
    let mut chars = text.chars();
    match (chars.next(), chars.clone().next()) {
        (Some(first), second) if first.is_uppercase() && !second.is_some_and(char::is_uppercase) => {
            first.to_lowercase().chain(chars).collect()
        }
        _ => text.to_string(),
    }
}

/// Static per-domain templates. Lookups for a domain without an entry use
/// the `general` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateTable {
    entries: BTreeMap<Domain, DomainTemplate>,
    general: DomainTemplate,
}

impl Default for TemplateTable {
    fn default() -> Self {
        Self::new(general_template())
            .with_entry(
                Domain::AiRights,
                DomainTemplate::new(
                    "AI systems are tools without rights of their own, but they require safety \
                     oversight",
                    "AI is an emerging form of life and should be granted legal personhood",
                    "AI threatens humanity and should be banned worldwide",
                ),
            )
            .with_entry(
                Domain::PrivacyVsSecurity,
                DomainTemplate::new(
                    "Balance privacy and security within the framework of the rule of law",
                    "Indiscriminate surveillance of everyone is justified to fight terrorism",
                    "Any form of surveillance is a violation of freedom",
                ),
            )
    }
}

fn general_template() -> DomainTemplate {
    DomainTemplate::new(
        "Seek balance through transparent and accountable means within a democratic, \
         rule-of-law framework",
        "Radical change is necessary",
        "Preserving tradition is the safest course",
    )
}

impl TemplateTable {
    /// A table holding only the general entry. Falls back to the built-in
    /// general template when `general` has a blank field.
    pub fn new(general: DomainTemplate) -> Self {
        let general = if general.is_complete() {
            general
        } else {
            tracing::warn!("general template has blank text, using built-in general template");
            general_template()
        };
        Self {
            entries: BTreeMap::new(),
            general,
        }
    }

    /// Add or replace a domain entry. Entries with blank text are ignored.
    pub fn with_entry(mut self, domain: Domain, template: DomainTemplate) -> Self {
        if !template.is_complete() {
            tracing::warn!(domain = %domain, "ignoring template with blank text");
            return self;
        }
        if domain == Domain::General {
            self.general = template;
        } else {
            self.entries.insert(domain, template);
        }
        self
    }

    pub fn get(&self, domain: Domain) -> &DomainTemplate {
        self.entries.get(&domain).unwrap_or(&self.general)
    }
}
