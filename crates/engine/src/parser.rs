//! Pure line scanners turning semi-structured backend text into typed fields.
//!
//! None of these functions touch a backend. Each one has an explicit fallback
//! for text that lacks the expected markers.

use crate::markers::{
    after_colon, classify_line, contains_any, verdict_in, LineKind, AUTONOMY_MARKERS,
    CALIBRATED_ANSWER_MARKERS, FAIL_KEYWORDS, FINITUDE_CHECK_MARKERS, HUMANITY_MARKERS,
    LENS_MARKERS, PASS_KEYWORDS, UNIVERSALIZABILITY_MARKERS,
};
use crate::types::{FinitudeCheck, PerspectiveLabel, PerspectiveSet, ValidationResult};

/// Returned when a response has neither a conclusion nor any paragraph.
pub const SYNTHESIS_FALLBACK: &str = "Weighing every perspective yields a balanced judgement.";

const CHECK_PASSED_DEFAULT: &str = "Finitude check completed.";
const CHECK_FAILED_DEFAULT: &str = "Did not pass the finitude check.";

/// Perspectives recovered from a response; any label may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPerspectives {
    slots: [Option<String>; 3],
}

impl ParsedPerspectives {
    /// Parsed text for a label, ignoring empty sections.
    pub fn get(&self, label: PerspectiveLabel) -> Option<&str> {
        self.slots[slot(label)]
            .as_deref()
            .filter(|text| !text.is_empty())
    }

    pub fn missing(&self) -> Vec<PerspectiveLabel> {
        PerspectiveLabel::ALL
            .into_iter()
            .filter(|label| self.get(*label).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// Complete the set, taking missing labels from `fallback`.
    pub fn fill_from(&self, fallback: &PerspectiveSet) -> PerspectiveSet {
        let mut set = fallback.clone();
        for label in PerspectiveLabel::ALL {
            if let Some(text) = self.get(label) {
                *set.slot_mut(label) = text.to_string();
            }
        }
        set
    }

    fn store(&mut self, label: PerspectiveLabel, buffer: &[String]) {
        self.slots[slot(label)] = Some(buffer.join(" ").trim().to_string());
    }
}

fn slot(label: PerspectiveLabel) -> usize {
    match label {
        PerspectiveLabel::Consensus => 0,
        PerspectiveLabel::ProgressiveTail => 1,
        PerspectiveLabel::ConservativeTail => 2,
    }
}

/// Scan a response for the three labelled perspectives.
///
/// A marker line flushes the active section and opens a new one seeded with
/// the text after its colon. Other non-blank lines extend the active section.
/// A conclusion line closes the active section.
pub fn parse_perspectives(text: &str) -> ParsedPerspectives {
    let mut parsed = ParsedPerspectives::default();
    let mut current: Option<PerspectiveLabel> = None;
    let mut buffer: Vec<String> = Vec::new();

    for line in text.lines() {
        match classify_line(line) {
            LineKind::Perspective(label) => {
                if let Some(active) = current {
                    parsed.store(active, &buffer);
                }
                current = Some(label);
                buffer.clear();
                if let Some(seed) = after_colon(line).filter(|s| !s.is_empty()) {
                    buffer.push(seed.to_string());
                }
            }
            LineKind::Conclusion => {
                if let Some(active) = current.take() {
                    parsed.store(active, &buffer);
                }
                buffer.clear();
            }
            LineKind::Plain => {
                let trimmed = line.trim();
                if current.is_some() && !trimmed.is_empty() {
                    buffer.push(trimmed.to_string());
                }
            }
        }
    }

    if let Some(active) = current {
        parsed.store(active, &buffer);
    }
    parsed
}

/// Extract the synthesis from a response.
///
/// From the first conclusion line, collects its trailing text and the
/// following lines up to a blank line. Without a conclusion line the last
/// paragraph is used, then [`SYNTHESIS_FALLBACK`]. An empty string means a
/// conclusion marker was present but carried no text.
pub fn parse_synthesis(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();

    if let Some(start) = lines
        .iter()
        .position(|line| classify_line(line) == LineKind::Conclusion)
    {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(rest) = after_colon(lines[start]).filter(|s| !s.is_empty()) {
            parts.push(rest);
        }
        for line in &lines[start + 1..] {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                if parts.is_empty() {
                    continue;
                }
                break;
            }
            parts.push(trimmed);
        }
        return parts.join(" ");
    }

    last_paragraph(&lines).unwrap_or_else(|| SYNTHESIS_FALLBACK.to_string())
}

fn last_paragraph(lines: &[&str]) -> Option<String> {
    let mut last: Vec<&str> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if !current.is_empty() {
                last = std::mem::take(&mut current);
            }
        } else {
            current.push(trimmed);
        }
    }
    if !current.is_empty() {
        last = current;
    }
    (!last.is_empty()).then(|| last.join("\n"))
}

/// Verdict for one predicate: the first marker line carrying a verdict
/// keyword decides, fail beating pass. No decisive line means `false`.
pub fn parse_verdict(text: &str, markers: &[&str]) -> bool {
    text.lines()
        .map(str::to_lowercase)
        .filter(|lower| contains_any(lower, markers))
        .find_map(|lower| verdict_in(&lower))
        .unwrap_or(false)
}

/// Parse all three predicates from a validation response.
pub fn parse_validation(text: &str) -> ValidationResult {
    ValidationResult::new(
        parse_verdict(text, UNIVERSALIZABILITY_MARKERS),
        parse_verdict(text, HUMANITY_MARKERS),
        parse_verdict(text, AUTONOMY_MARKERS),
    )
}

/// Fields recovered from a calibration response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCalibration {
    pub finitude_check: FinitudeCheck,
    pub aphorism: Option<String>,
    pub calibrated_answer: Option<String>,
}

pub fn parse_calibration(text: &str) -> ParsedCalibration {
    ParsedCalibration {
        finitude_check: parse_finitude_check(text),
        aphorism: parse_aphorism(text),
        calibrated_answer: parse_calibrated_answer(text),
    }
}

/// Finitude-check verdict and reason.
///
/// The verdict keyword may sit on the marker line or the line after it. The
/// reason is the text following the verdict, else the next line, else a
/// fixed default.
pub fn parse_finitude_check(text: &str) -> FinitudeCheck {
    let lines: Vec<&str> = text.lines().collect();

    for (i, line) in lines.iter().enumerate() {
        let lower = line.to_lowercase();
        if !contains_any(&lower, FINITUDE_CHECK_MARKERS) {
            continue;
        }
        let next = lines.get(i + 1).copied().unwrap_or("");

        if let Some(passed) = verdict_in(&lower) {
            let reason = text_after_verdict(line, passed)
                .or_else(|| reason_line(next))
                .unwrap_or_else(|| default_reason(passed).to_string());
            return FinitudeCheck { passed, reason };
        }
        if let Some(passed) = verdict_in(&next.to_lowercase()) {
            let reason = text_after_verdict(next, passed)
                .unwrap_or_else(|| default_reason(passed).to_string());
            return FinitudeCheck { passed, reason };
        }
    }

    FinitudeCheck {
        passed: false,
        reason: CHECK_FAILED_DEFAULT.to_string(),
    }
}

fn default_reason(passed: bool) -> &'static str {
    if passed {
        CHECK_PASSED_DEFAULT
    } else {
        CHECK_FAILED_DEFAULT
    }
}

fn reason_line(line: &str) -> Option<String> {
    let trimmed = line.trim();
    let lower = trimmed.to_lowercase();
    let is_other_field =
        contains_any(&lower, LENS_MARKERS) || contains_any(&lower, CALIBRATED_ANSWER_MARKERS);
    (!trimmed.is_empty() && !is_other_field).then(|| trimmed.to_string())
}

/// Text following the deciding verdict keyword on a line.
fn text_after_verdict(line: &str, passed: bool) -> Option<String> {
    let keywords = if passed { PASS_KEYWORDS } else { FAIL_KEYWORDS };
    let end = keywords.iter().filter_map(|kw| find_ci(line, kw)).min()?;
    let rest = line[end..]
        .trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .trim_start_matches(|c: char| {
            c.is_whitespace()
                || matches!(
                    c,
                    '-' | '–' | '—' | ':' | '：' | ',' | '，' | '.' | '。' | ']' | ')' | '）'
                )
        })
        .trim();
    (!rest.is_empty()).then(|| rest.to_string())
}

/// Byte offset just past the first case-insensitive occurrence of a
/// lowercase keyword.
fn find_ci(line: &str, keyword: &str) -> Option<usize> {
    let width = keyword.chars().count();
    line.char_indices().find_map(|(start, _)| {
        let candidate: String = line[start..].chars().take(width).collect();
        (candidate.to_lowercase() == keyword).then(|| start + candidate.len())
    })
}

fn parse_aphorism(text: &str) -> Option<String> {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.iter().position(|line| {
        let lower = line.to_lowercase();
        contains_any(&lower, LENS_MARKERS)
            && !contains_any(&lower, FINITUDE_CHECK_MARKERS)
            && !contains_any(&lower, CALIBRATED_ANSWER_MARKERS)
    })?;

    match after_colon(lines[start]) {
        Some(value) if !value.is_empty() => Some(value.to_string()),
        _ => lines
            .get(start + 1)
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .map(str::to_string),
    }
}

fn parse_calibrated_answer(text: &str) -> Option<String> {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines
        .iter()
        .position(|line| contains_any(&line.to_lowercase(), CALIBRATED_ANSWER_MARKERS))?;

    let mut parts: Vec<&str> = Vec::new();
    if let Some(value) = after_colon(lines[start]).filter(|s| !s.is_empty()) {
        parts.push(value);
    }
    for line in &lines[start + 1..] {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if parts.is_empty() {
                continue;
            }
            break;
        }
        parts.push(trimmed);
    }
    (!parts.is_empty()).then(|| parts.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = "\
Consensus (μ): Balance liberty and safety.
Progressive tail (+2σ): Abolish borders.
It would be bold.
Conservative tail (-2σ): Keep every tradition.
Synthesis: Seek balance
through law.

Trailing notes.";

    #[test]
    fn label_words_in_bodies_do_not_reassign() {
        let parsed = parse_perspectives(
            "Consensus (μ): a\nProgressive tail (+2σ): build consensus anew\nConservative tail (-2σ): resist progressive haste",
        );
        assert_eq!(parsed.get(PerspectiveLabel::Consensus), Some("a"));
        assert_eq!(
            parsed.get(PerspectiveLabel::ProgressiveTail),
            Some("build consensus anew")
        );
        assert_eq!(
            parsed.get(PerspectiveLabel::ConservativeTail),
            Some("resist progressive haste")
        );
    }

    #[test]
    fn parses_all_three_labels() {
        let parsed = parse_perspectives(WELL_FORMED);
        assert!(parsed.is_complete());
        assert_eq!(
            parsed.get(PerspectiveLabel::Consensus),
            Some("Balance liberty and safety.")
        );
        assert_eq!(
            parsed.get(PerspectiveLabel::ProgressiveTail),
            Some("Abolish borders. It would be bold.")
        );
        assert_eq!(
            parsed.get(PerspectiveLabel::ConservativeTail),
            Some("Keep every tradition.")
        );
    }

    #[test]
    fn synthesis_stops_at_blank_line() {
        assert_eq!(parse_synthesis(WELL_FORMED), "Seek balance through law.");
    }

    #[test]
    fn synthesis_line_is_not_appended_to_last_perspective() {
        let parsed = parse_perspectives("-2σ: careful\n合题：平衡");
        assert_eq!(parsed.get(PerspectiveLabel::ConservativeTail), Some("careful"));
    }

    #[test]
    fn marker_without_colon_starts_empty_section() {
        let parsed = parse_perspectives("Consensus view\nbalance matters");
        assert_eq!(parsed.get(PerspectiveLabel::Consensus), Some("balance matters"));
        assert_eq!(parsed.missing().len(), 2);
    }

    #[test]
    fn lines_before_any_marker_are_ignored() {
        let parsed = parse_perspectives("Preamble\n\n(μ): middle");
        assert_eq!(parsed.get(PerspectiveLabel::Consensus), Some("middle"));
    }

    #[test]
    fn fill_from_only_replaces_missing() {
        let parsed = parse_perspectives("+2σ: radical");
        let set = parsed.fill_from(&PerspectiveSet::new("c", "p", "k"));
        assert_eq!(set, PerspectiveSet::new("c", "radical", "k"));
    }

    #[test]
    fn synthesis_falls_back_to_last_paragraph_then_fixed_sentence() {
        assert_eq!(
            parse_synthesis("First paragraph.\n\nLast one\ncontinues."),
            "Last one\ncontinues."
        );
        assert_eq!(parse_synthesis("  \n\n "), SYNTHESIS_FALLBACK);
    }

    #[test]
    fn synthesis_marker_without_text_is_empty() {
        assert_eq!(parse_synthesis("Synthesis:"), "");
    }

    #[test]
    fn verdicts_follow_first_decisive_marker_line() {
        let text = "\
Universalizability: pass - anyone could do this.
Humanity as end: pass, but it might fail in edge cases
Autonomy: respected";
        let result = parse_validation(text);
        assert!(result.universalizable);
        assert!(!result.humanity_respected);
        // No verdict keyword on the autonomy line.
        assert!(!result.autonomous);
    }

    #[test]
    fn verdict_skips_indecisive_marker_lines() {
        let text = "Autonomy is discussed below.\nAutonomy: 通过";
        assert!(parse_verdict(text, AUTONOMY_MARKERS));
    }

    #[test]
    fn chinese_verdicts() {
        let result = parse_validation("可普遍化: 通过\n人性目的: 失败\n自主性: 通过");
        assert_eq!(
            (result.universalizable, result.humanity_respected, result.autonomous),
            (true, false, true)
        );
    }

    #[test]
    fn finitude_check_reason_after_verdict() {
        let check = parse_finitude_check("Finitude check: PASS - it honours reason.");
        assert!(check.passed);
        assert_eq!(check.reason, "it honours reason.");
    }

    #[test]
    fn finitude_check_verdict_on_next_line() {
        let check = parse_finitude_check("Heat death test\nfailed: drifts into nihilism");
        assert!(!check.passed);
        assert_eq!(check.reason, "drifts into nihilism");
    }

    #[test]
    fn finitude_check_reason_from_following_line() {
        let check = parse_finitude_check("Finitude check: pass\nIt stays dignified.");
        assert!(check.passed);
        assert_eq!(check.reason, "It stays dignified.");
    }

    #[test]
    fn finitude_check_without_marker_fails() {
        let check = parse_finitude_check("Everything passes.");
        assert!(!check.passed);
        assert_eq!(check.reason, CHECK_FAILED_DEFAULT);
    }

    #[test]
    fn calibration_fields() {
        let text = "\
Finitude check: pass - fine
Calibration lens: Reason outlives stars.
Calibrated answer:
Seek balance.
Within law.

ignored";
        let parsed = parse_calibration(text);
        assert_eq!(parsed.aphorism.as_deref(), Some("Reason outlives stars."));
        assert_eq!(
            parsed.calibrated_answer.as_deref(),
            Some("Seek balance.\nWithin law.")
        );
    }

    #[test]
    fn lens_word_in_finitude_reason_is_not_the_aphorism() {
        let text = "\
Finitude check: pass - seen through the lens of reason
Calibration lens: Reason outlives stars.
Calibrated answer: Seek balance.";
        let parsed = parse_calibration(text);
        assert_eq!(parsed.aphorism.as_deref(), Some("Reason outlives stars."));
        assert_eq!(
            parsed.finitude_check.reason,
            "seen through the lens of reason"
        );
    }

    #[test]
    fn missing_calibration_fields_are_none() {
        let parsed = parse_calibration("nothing structured here");
        assert_eq!(parsed.aphorism, None);
        assert_eq!(parsed.calibrated_answer, None);
    }
}
