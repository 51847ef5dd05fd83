//! crates/countdown_core/src/prompt.rs
//!
//! Turns the countdown's description, days left and optional style into
//! instructions for an image generator. A remote completion writes the prompt;
//! when that is unavailable or unusable a fixed local template is used instead.

use crate::ports::TextCompletionService;
use std::sync::Arc;
use tracing::{debug, warn};

/// Characters stripped from both ends of a completion.
const QUOTE_CHARS: &[char] = &['"', '\'', '`', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}'];

/// "1 day" / "5 days".
pub fn day_phrase(days_left: i64) -> String {
    if days_left == 1 {
        "1 day".to_string()
    } else {
        format!("{days_left} days")
    }
}

/// The instruction sent to the completion model.
pub fn build_instruction(description: &str, days_left: i64, style: Option<&str>) -> String {
    let mut instruction = format!(
        "Write one prompt for an AI image generator. The image marks a countdown: \
         {} left until \"{}\". The number {} must be the focal point of the picture, \
         drawn large and legible.",
        day_phrase(days_left),
        description,
        days_left
    );
    if let Some(style) = style {
        instruction.push_str(&format!(" The image must be rendered in this style: {style}."));
    }
    instruction.push_str(
        " Respond with ONLY the prompt in under 80 words, no quotes, no explanation.",
    );
    instruction
}

/// The network-free prompt used whenever remote synthesis fails.
pub fn fallback_prompt(description: &str, days_left: i64, style: Option<&str>) -> String {
    let mut prompt = format!(
        "A vibrant, celebratory illustration counting down to \"{}\": the number {} \
         is displayed large and centered with the caption \"{} to go\". Joyful colors, high detail.",
        description,
        days_left,
        day_phrase(days_left)
    );
    if let Some(style) = style {
        prompt.push_str(&format!(" Rendered in a {style} style."));
    }
    prompt
}

/// Strips surrounding whitespace and quote characters. `None` if nothing usable remains.
pub fn clean_completion(raw: &str) -> Option<String> {
    let cleaned = raw.trim().trim_matches(QUOTE_CHARS).trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Produces image prompts. Never fails: remote problems degrade to [`fallback_prompt`].
#[derive(Clone)]
pub struct PromptSynthesizer {
    completions: Arc<dyn TextCompletionService>,
}

impl PromptSynthesizer {
    pub fn new(completions: Arc<dyn TextCompletionService>) -> Self {
        Self { completions }
    }

    pub async fn synthesize(&self, description: &str, days_left: i64, style: Option<&str>) -> String {
        let instruction = build_instruction(description, days_left, style);
        match self.completions.complete(&instruction).await {
            Ok(raw) => match clean_completion(&raw) {
                Some(prompt) => {
                    debug!(prompt = %prompt, "Synthesized image prompt");
                    prompt
                }
                None => {
                    warn!("Prompt completion was empty; using fallback prompt");
                    fallback_prompt(description, days_left, style)
                }
            },
            Err(e) => {
                warn!(error = %e, "Prompt synthesis failed; using fallback prompt");
                fallback_prompt(description, days_left, style)
            }
        }
    }
}
