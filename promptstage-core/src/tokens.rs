//! Token and cost estimation.
//!
//! Providers do not always report usage for image/video calls, so the ledger
//! falls back to a character-count heuristic. CJK scripts pack fewer
//! characters per token than Latin text; the two are counted separately.
//!
//! Cost is computed from total tokens at the model's input rate. Rates are
//! USD per token and are a static table; an unknown model falls back to the
//! cheapest Gemini rate rather than zero so usage is never silently free.

use crate::models::usage::{PREVIEW_MAX_CHARS, preview};

/// Fallback per-token rate for models missing from the table (USD).
pub const DEFAULT_INPUT_RATE: f64 = 0.000_075;

/// Per-token input rates, USD. Video and image models that bill per call
/// rather than per token carry a zero rate.
const INPUT_RATES: &[(&str, f64)] = &[
    ("gemini-2.5-flash", 0.000_075),
    ("gemini-2.5-pro", 0.001_25),
    ("gemini-2.5-flash-image", 0.000_075),
    ("veo-3.0-generate-001", 0.0),
    ("imagen-4.0-generate-001", 0.0),
    ("claude-3-sonnet-20240229", 0.000_003),
    ("dall-e-3", 0.0),
    ("kling-v1", 0.0),
];

/// Returns true for characters that tokenize densely: Hangul syllables,
/// unified Han ideographs, and Japanese kana.
fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{AC00}'..='\u{D7A3}'   // Hangul syllables
        | '\u{4E00}'..='\u{9FFF}' // CJK unified ideographs
        | '\u{3040}'..='\u{309F}' // Hiragana
        | '\u{30A0}'..='\u{30FF}' // Katakana
    )
}

/// Estimates the token count of a prompt.
///
/// CJK characters count at roughly 1.5 characters per token, everything
/// else at 4 characters per token; each bucket rounds up independently.
pub fn estimate_tokens(text: &str) -> u32 {
    let (cjk, other) = text.chars().fold((0u32, 0u32), |(cjk, other), c| {
        if is_cjk(c) {
            (cjk + 1, other)
        } else {
            (cjk, other + 1)
        }
    });

    // ceil(cjk / 1.5) without going through floats
    (2 * cjk).div_ceil(3) + other.div_ceil(4)
}

/// Returns the per-token input rate for a model, falling back to
/// [`DEFAULT_INPUT_RATE`] for unknown models.
pub fn model_input_rate(model: &str) -> f64 {
    INPUT_RATES
        .iter()
        .find(|(name, _)| *name == model)
        .map_or(DEFAULT_INPUT_RATE, |(_, rate)| *rate)
}

/// Estimates the cost of a call in USD.
///
/// Total tokens are billed at the model's input rate; completion tokens are
/// not priced separately.
pub fn estimate_cost(model: &str, total_tokens: u32) -> f64 {
    f64::from(total_tokens) * model_input_rate(model)
}

/// Truncates a prompt to the ledger preview length.
///
/// Re-exported convenience over [`crate::models::usage::preview`].
pub fn prompt_preview(text: &str) -> String {
    preview(text)
}

/// The preview length used by [`prompt_preview`].
pub const PROMPT_PREVIEW_CHARS: usize = PREVIEW_MAX_CHARS;
