//! Step-by-step prompting and reasoning-trace extraction for backends that do
//! not expose a native trace.

use crate::port::ReasoningTrace;

/// Max tokens used for reasoning-wrapped generations.
pub const REASONING_MAX_TOKENS: u32 = 1500;

const STEP_OPENERS: &[&str] = &[
    "1.", "2.", "3.", "first", "second", "finally", "首先", "其次", "最后",
];

/// Wrap a prompt so the backend shows its reasoning before concluding.
pub fn reasoning_prompt(prompt: &str) -> String {
    format!(
        "Think through the following step by step and show your reasoning.\n\n\
         Question: {}\n\n\
         Structure your answer as:\n\
         1. First, analyse the core of the question\n\
         2. Consider it from several angles (at least three perspectives)\n\
         3. Finally, weigh them and state your conclusion\n\n\
         Your answer:",
        prompt
    )
}

/// Split a response into reasoning steps.
///
/// A line opening with a step marker starts a new step; any other line
/// continues the current one. Text with no step markers becomes a single step.
pub fn extract_reasoning_steps(text: &str) -> Vec<ReasoningTrace> {
    let mut steps: Vec<ReasoningTrace> = Vec::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if opens_step(trimmed) {
            if let Some(content) = current.take() {
                steps.push(ReasoningTrace {
                    step: steps.len() + 1,
                    content,
                });
            }
            current = Some(trimmed.to_string());
        } else if let Some(content) = current.as_mut() {
            if !trimmed.is_empty() {
                content.push('\n');
                content.push_str(trimmed);
            }
        }
    }

    if let Some(content) = current {
        steps.push(ReasoningTrace {
            step: steps.len() + 1,
            content,
        });
    }

    if steps.is_empty() {
        steps.push(ReasoningTrace {
            step: 1,
            content: text.trim().to_string(),
        });
    }

    steps
}

fn opens_step(line: &str) -> bool {
    let lower = line.to_lowercase();
    STEP_OPENERS.iter().any(|opener| lower.starts_with(opener))
}
