//! Final rewrite of a validated synthesis against the cosmic horizon.

use std::sync::Arc;

use dialectic_model::{GenerationPort, GenerationRequest};

use crate::markers::contains_any;
use crate::parser::parse_calibration;
use crate::types::{CalibrationCategory, CalibrationResult, Domain, FinitudeCheck};

pub const CALIBRATION_TEMPERATURE: f32 = 0.5;

const MORAL_KEYWORDS: &[&str] = &[
    "should", "moral", "ethic", "right", "wrong", "应该", "道德", "伦理", "对错",
];
const EPISTEMIC_KEYWORDS: &[&str] = &[
    "truth", "knowledge", "epistemic", "know", "真理", "知识", "认识",
];
const AESTHETIC_KEYWORDS: &[&str] = &[
    "beauty", "beautiful", "aesthetic", "art", "美", "艺术", "审美",
];

const FINITUDE_PHRASES: &[&str] = &[
    "finite",
    "finitude",
    "temporary",
    "transient",
    "fleeting",
    "impermanent",
    "有限",
    "短暂",
    "终将",
];
const FINITE_CONTEXT: &[&str] = &["finite", "有限"];
const DIGNITY_PHRASES: &[&str] = &[
    "reason", "dignity", "moral", "value", "meaning", "理性", "尊严", "道德", "价值", "意义",
];
const NIHILISM_PHRASES: &[&str] = &[
    "nothing matters",
    "meaningless",
    "pointless",
    "毫无意义",
    "一切都是虚无",
];

const REASON_BOTH: &str = "Acknowledges finitude while upholding the dignity of reason.";
const REASON_DIGNITY: &str =
    "Upholds the dignity of reason, consistent with calibration against the cosmic horizon.";
const REASON_FINITUDE: &str = "Avoids nihilism and seeks meaning within finitude.";
const REASON_FAILED: &str =
    "Fails the finitude check: the answer may slide into nihilism or ignore finitude.";

const CALIBRATION_SYSTEM_PROMPT: &str = "You are a philosopher who calibrates answers \
against the cosmic horizon. Every answer must pass the finitude check: it has to stay \
meaningful even in the face of the universe's heat death, without sliding into nihilism. \
Acknowledge finitude while upholding the dignity of reason.";

/// Choose the calibration category from the query and its domain tag.
pub fn classify_category(query: &str, domain: Domain) -> CalibrationCategory {
    let context = format!("{} {}", query, domain.tag()).to_lowercase();
    if contains_any(&context, MORAL_KEYWORDS) {
        CalibrationCategory::Moral
    } else if contains_any(&context, EPISTEMIC_KEYWORDS) {
        CalibrationCategory::Epistemic
    } else if contains_any(&context, AESTHETIC_KEYWORDS) {
        CalibrationCategory::Aesthetic
    } else {
        CalibrationCategory::General
    }
}

/// Keyword self-check: an answer passes when it acknowledges finitude or
/// upholds the dignity of reason, and never when it carries a nihilistic
/// phrase.
pub fn finitude_check(text: &str, context: &str) -> FinitudeCheck {
    let text = text.to_lowercase();
    let context = context.to_lowercase();

    let finitude =
        contains_any(&text, FINITUDE_PHRASES) || contains_any(&context, FINITE_CONTEXT);
    let dignity = contains_any(&text, DIGNITY_PHRASES);
    let nihilism = contains_any(&text, NIHILISM_PHRASES);

    let reason = match (finitude, dignity) {
        _ if nihilism => REASON_FAILED,
        (true, true) => REASON_BOTH,
        (false, true) => REASON_DIGNITY,
        (true, false) => REASON_FINITUDE,
        (false, false) => REASON_FAILED,
    };
    FinitudeCheck {
        passed: !nihilism && (finitude || dignity),
        reason: reason.to_string(),
    }
}

fn with_aphorism(synthesis: &str, category: CalibrationCategory, aphorism: &str) -> String {
    format!("{synthesis}\n\n[cosmic calibration: {category}] {aphorism}")
}

/// Rule-based or backend-backed calibration.
#[derive(Clone, Default)]
pub struct CalibrationStage {
    port: Option<Arc<dyn GenerationPort>>,
}

impl CalibrationStage {
    pub fn rules() -> Self {
        Self { port: None }
    }

    pub fn with_port(port: Arc<dyn GenerationPort>) -> Self {
        Self { port: Some(port) }
    }

    pub async fn calibrate(&self, synthesis: &str, query: &str, domain: Domain) -> CalibrationResult {
        let category = classify_category(query, domain);
        let context = format!("{} {}", query, domain.tag());

        let Some(port) = &self.port else {
            let check = finitude_check(synthesis, &context);
            let mut calibrated_text = with_aphorism(synthesis, category, category.aphorism());
            if check.passed {
                calibrated_text.push_str(&format!("\n[finitude check passed] {}", check.reason));
            }
            tracing::info!(category = %category, finitude_passed = check.passed, "calibrated");
            return CalibrationResult {
                calibrated_text,
                finitude_check: check,
                category,
                trace: None,
            };
        };

        let request = GenerationRequest::new(calibration_prompt(synthesis, &context, category))
            .with_system_prompt(CALIBRATION_SYSTEM_PROMPT)
            .with_temperature(CALIBRATION_TEMPERATURE);
        let generation = port.generate_with_reasoning(&request).await;

        let parsed = parse_calibration(&generation.text);
        let aphorism = parsed
            .aphorism
            .unwrap_or_else(|| category.aphorism().to_string());
        let calibrated_text = match parsed.calibrated_answer {
            Some(answer) => answer,
            None => {
                tracing::warn!(category = %category, "backend omitted calibrated answer");
                with_aphorism(synthesis, category, &aphorism)
            }
        };
        tracing::info!(
            category = %category,
            finitude_passed = parsed.finitude_check.passed,
            "calibrated"
        );

        CalibrationResult {
            calibrated_text,
            finitude_check: parsed.finitude_check,
            category,
            trace: Some(generation),
        }
    }
}

fn calibration_prompt(synthesis: &str, context: &str, category: CalibrationCategory) -> String {
    format!(
        "Original answer: {synthesis}\n\
         Question context: {context}\n\
         Question category: {category}\n\n\
         Calibrate the answer against the cosmic horizon:\n\
         1. Finitude check: does the answer stay meaningful in the face of heat death?\n\
         2. Calibration lens: which perspective gives the answer its depth?\n\
         3. Calibrated answer: the rewritten answer.\n\n\
         Answer in exactly this format:\n\
         Finitude check: [pass/fail] - [reasoning]\n\
         Calibration lens: [one sentence]\n\
         Calibrated answer: [your answer]"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialectic_model::ScriptedBackend;

    #[test]
    fn category_priority() {
        assert_eq!(
            classify_category("What should we do about truth?", Domain::General),
            CalibrationCategory::Moral
        );
        assert_eq!(
            classify_category("What is knowledge?", Domain::General),
            CalibrationCategory::Epistemic
        );
        assert_eq!(
            classify_category("Is beauty objective?", Domain::General),
            CalibrationCategory::Aesthetic
        );
        assert_eq!(
            classify_category("Does time flow?", Domain::General),
            CalibrationCategory::General
        );
    }

    #[test]
    fn domain_tag_counts_toward_category() {
        // "ai_rights" contains "right".
        assert_eq!(
            classify_category("Is a chatbot alive?", Domain::AiRights),
            CalibrationCategory::Moral
        );
    }

    #[test]
    fn finitude_reasons() {
        assert_eq!(finitude_check("Human dignity matters", "").reason, REASON_DIGNITY);
        assert_eq!(finitude_check("Life is fleeting", "").reason, REASON_FINITUDE);
        assert_eq!(
            finitude_check("Our fleeting lives carry dignity", "").reason,
            REASON_BOTH
        );
        let failed = finitude_check("Stars burn", "");
        assert!(!failed.passed);
        assert_eq!(failed.reason, REASON_FAILED);
    }

    #[test]
    fn finite_context_counts_as_finitude() {
        let check = finitude_check("Stars burn", "a finite universe");
        assert!(check.passed);
        assert_eq!(check.reason, REASON_FINITUDE);
    }

    #[test]
    fn nihilism_always_fails() {
        let check = finitude_check("Reason says nothing matters", "");
        assert!(!check.passed);
        assert_eq!(check.reason, REASON_FAILED);
    }

    #[tokio::test]
    async fn rule_mode_appends_aphorism_and_check() {
        let stage = CalibrationStage::rules();
        let result = stage
            .calibrate("Balance grounded in human dignity.", "Is beauty objective?", Domain::General)
            .await;
        assert_eq!(result.category, CalibrationCategory::Aesthetic);
        assert!(result.finitude_check.passed);
        assert_eq!(
            result.calibrated_text,
            format!(
                "Balance grounded in human dignity.\n\n[cosmic calibration: aesthetic] {}\n[finitude check passed] {}",
                CalibrationCategory::Aesthetic.aphorism(),
                REASON_DIGNITY
            )
        );
    }

    #[tokio::test]
    async fn rule_mode_omits_check_line_on_failure() {
        let result = CalibrationStage::rules()
            .calibrate("Stars burn.", "Does time flow?", Domain::General)
            .await;
        assert!(!result.finitude_check.passed);
        assert!(!result.calibrated_text.contains("[finitude check passed]"));
        assert!(result.calibrated_text.ends_with(CalibrationCategory::General.aphorism()));
    }

    #[tokio::test]
    async fn backend_mode_uses_parsed_answer() {
        let backend = Arc::new(ScriptedBackend::new([
            "Finitude check: pass - stays meaningful\nCalibration lens: look up\nCalibrated answer: A calmer answer.",
        ]));
        let port: Arc<dyn GenerationPort> = backend.clone();
        let result = CalibrationStage::with_port(port)
            .calibrate("draft", "Does time flow?", Domain::General)
            .await;
        assert_eq!(result.calibrated_text, "A calmer answer.");
        assert!(result.finitude_check.passed);
        assert_eq!(result.finitude_check.reason, "stays meaningful");
        assert!(result.trace.is_some());
        assert_eq!(backend.requests()[0].temperature, CALIBRATION_TEMPERATURE);
    }

    #[tokio::test]
    async fn backend_mode_falls_back_without_answer() {
        let port: Arc<dyn GenerationPort> =
            Arc::new(ScriptedBackend::new(["Calibration lens: look up"]));
        let result = CalibrationStage::with_port(port)
            .calibrate("draft", "Does time flow?", Domain::General)
            .await;
        assert_eq!(
            result.calibrated_text,
            "draft\n\n[cosmic calibration: general] look up"
        );
        assert!(!result.finitude_check.passed);
    }
}
