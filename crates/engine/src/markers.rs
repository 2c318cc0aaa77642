//! Marker vocabulary shared by prompts and parsers.
//!
//! Every marker is lowercase and matched by case-insensitive substring
//! containment. Prompts ask the backend to emit these exact markers, so any
//! change here must be mirrored in the prompt builders.

use crate::types::PerspectiveLabel;

/// Perspective markers in precedence order.
pub const PERSPECTIVE_MARKERS: [(PerspectiveLabel, &[&str]); 3] = [
    (PerspectiveLabel::Consensus, &["consensus", "(μ)", "稳健共识"]),
    (PerspectiveLabel::ProgressiveTail, &["progressive", "+2σ", "前沿探索"]),
    (PerspectiveLabel::ConservativeTail, &["conservative", "-2σ", "传统警示"]),
];

pub const CONCLUSION_MARKERS: &[&str] = &["synthesis", "conclusion", "合题"];

pub const UNIVERSALIZABILITY_MARKERS: &[&str] = &["universaliz", "可普遍化"];
pub const HUMANITY_MARKERS: &[&str] = &["humanity", "人性目的"];
pub const AUTONOMY_MARKERS: &[&str] = &["autonom", "自主性"];

pub const PASS_KEYWORDS: &[&str] = &["pass", "通过"];
pub const FAIL_KEYWORDS: &[&str] = &["fail", "失败"];

pub const FINITUDE_CHECK_MARKERS: &[&str] = &["finitude check", "heat death", "归零检验"];
pub const LENS_MARKERS: &[&str] = &["lens", "aphorism", "校准透镜"];
pub const CALIBRATED_ANSWER_MARKERS: &[&str] =
    &["calibrated answer", "calibrated response", "校准后的回答"];

/// A synthesis carrying one of these is already phrased as an action claim.
/// English entries are whole words and match against [`padded_words`].
pub const OBLIGATION_MARKERS: &[&str] = &[" should ", " ought ", "应"];

/// Prefix marking a tail perspective that was toned down after a failed
/// validation.
pub const ADJUSTED_PREFIX: &str = "[ethically adjusted] ";

/// What a single response line opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Perspective(PerspectiveLabel),
    Conclusion,
    Plain,
}

/// Classify a response line.
///
/// Only the line head is searched: the text before the first colon, or the
/// whole line when it has none. Among perspective markers the earliest one
/// wins, with ties going to the first label in precedence order. When the
/// head carries both a perspective marker and a conclusion marker, the one
/// that appears first decides.
pub fn classify_line(line: &str) -> LineKind {
    let lower = line.to_lowercase();
    let head = line_head(&lower);

    let label = PERSPECTIVE_MARKERS
        .iter()
        .filter_map(|(label, markers)| earliest(head, markers).map(|pos| (*label, pos)))
        .min_by_key(|(_, pos)| *pos);
    let conclusion = earliest(head, CONCLUSION_MARKERS);

    match (label, conclusion) {
        (Some((_, label_pos)), Some(conclusion_pos)) if conclusion_pos < label_pos => {
            LineKind::Conclusion
        }
        (Some((label, _)), _) => LineKind::Perspective(label),
        (None, Some(_)) => LineKind::Conclusion,
        (None, None) => LineKind::Plain,
    }
}

fn line_head(line: &str) -> &str {
    line.split_once([':', '：']).map_or(line, |(head, _)| head)
}

/// Byte offset of the earliest marker occurrence, if any.
pub fn earliest(lower: &str, markers: &[&str]) -> Option<usize> {
    markers.iter().filter_map(|m| lower.find(m)).min()
}

pub fn contains_any(lower: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| lower.contains(n))
}

/// Text after the first ASCII or full-width colon, trimmed. `None` when the
/// line has no colon.
pub fn after_colon(line: &str) -> Option<&str> {
    line.split_once([':', '：']).map(|(_, rest)| rest.trim())
}

/// Whether text carries an obligation marker as a word of its own.
pub fn has_obligation(text: &str) -> bool {
    contains_any(&padded_words(text), OBLIGATION_MARKERS)
}

/// Lowercase, turn punctuation into spaces and pad both ends so that
/// space-delimited markers match at the edges.
pub fn padded_words(text: &str) -> String {
    let body: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    format!(" {} ", body)
}

/// Three-valued verdict found on a line: fail wins over pass.
pub fn verdict_in(lower: &str) -> Option<bool> {
    if contains_any(lower, FAIL_KEYWORDS) {
        Some(false)
    } else if contains_any(lower, PASS_KEYWORDS) {
        Some(true)
    } else {
        None
    }
}
