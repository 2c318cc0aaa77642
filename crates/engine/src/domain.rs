use crate::markers::padded_words;
use crate::types::Domain;

const PRIVACY_KEYWORDS: &[&str] = &[
    "surveil", "monitor", "privacy", "security", "监控", "隐私", "安全",
];

const AI_KEYWORDS: &[&str] = &[
    " ai ",
    "artificial intelligence",
    "robot",
    "machine learning",
    "人工智能",
    "机器人",
];

/// Pick the topic of a query. Keyword lists are checked in priority order;
/// the first list with a hit wins.
pub fn classify_domain(query: &str) -> Domain {
    let text = padded_words(query);
    if PRIVACY_KEYWORDS.iter().any(|k| text.contains(k)) {
        Domain::PrivacyVsSecurity
    } else if AI_KEYWORDS.iter().any(|k| text.contains(k)) {
        Domain::AiRights
    } else {
        Domain::General
    }
}
