// Turns a narrative instruction blob into numbered steps
//
// Some sources only give one long paragraph. We split it on sentence ends
// and line breaks and throw away the crumbs.

use crate::core::recipe::Instructions;
use regex::Regex;
use std::sync::OnceLock;

// Anything shorter is stray punctuation or a lone number, not a step
const MIN_STEP_LEN: usize = 5;

fn boundary() -> &'static Regex {
    static BOUNDARY: OnceLock<Regex> = OnceLock::new();
    BOUNDARY.get_or_init(|| Regex::new(r"[.!?]|\r?\n").expect("step boundary pattern compiles"))
}

/// Split narrative text into trimmed step texts
pub fn split_steps(text: &str) -> Vec<String> {
    boundary()
        .split(text)
        .map(str::trim)
        .filter(|fragment| fragment.chars().count() >= MIN_STEP_LEN)
        .map(str::to_string)
        .collect()
}

/// Narrative text as numbered steps (1-based, contiguous)
pub fn to_steps(text: &str) -> Instructions {
    Instructions::from_texts(split_steps(text))
}
