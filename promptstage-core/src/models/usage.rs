//! Usage-accounting records and aggregates.
//!
//! One [`UsageRecord`] is appended per attempted call; [`SessionStats`] and
//! [`DailyUsage`] aggregate them. The serialized shapes here are a contract:
//! any persistence backend must round-trip them faithfully.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::provider::GenerationKind;

/// Maximum characters kept from a prompt/response in a ledger record.
pub const PREVIEW_MAX_CHARS: usize = 100;

// ============================================================================
// Usage Record
// ============================================================================

/// One record per attempted generation call, success or failure.
///
/// Serialized in camelCase; `truncatedPrompt` keeps at most
/// [`PREVIEW_MAX_CHARS`] characters of the original prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    /// Unique record id.
    pub id: String,
    /// When the call was recorded.
    pub timestamp: DateTime<Utc>,
    /// Model that served (or would have served) the call.
    pub model: String,
    /// What kind of content was requested.
    pub kind: GenerationKind,
    /// Estimated prompt tokens.
    pub prompt_tokens: u32,
    /// Estimated completion tokens.
    pub completion_tokens: u32,
    /// Prompt plus completion.
    pub total_tokens: u32,
    /// Estimated cost in USD.
    pub cost: f64,
    /// Truncated prompt preview.
    pub truncated_prompt: String,
    /// Truncated response preview, when a response existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncated_response: Option<String>,
}

/// Truncates text to [`PREVIEW_MAX_CHARS`] characters, appending an
/// ellipsis when anything was cut.
pub fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(PREVIEW_MAX_CHARS).collect();
    if text.chars().count() > PREVIEW_MAX_CHARS {
        out.push_str("...");
    }
    out
}

// ============================================================================
// Aggregates
// ============================================================================

/// Aggregate statistics over the current session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    /// Number of recorded calls.
    pub total_calls: u64,
    /// Sum of total tokens across records.
    pub total_tokens: u64,
    /// Sum of costs across records, USD.
    pub total_cost: f64,
    /// Call counts keyed by generation kind.
    pub calls_by_kind: HashMap<GenerationKind, u64>,
    /// Call counts keyed by model name.
    pub calls_by_model: HashMap<String, u64>,
}

/// One day's aggregate, keyed by ISO date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyUsage {
    /// ISO date (`YYYY-MM-DD`, UTC).
    pub date: String,
    /// Sum of total tokens for the day.
    pub total_tokens: u64,
    /// Sum of costs for the day, USD.
    pub total_cost: f64,
    /// The day's records.
    pub calls: Vec<UsageRecord>,
}

impl DailyUsage {
    /// Creates an empty aggregate for the given ISO date.
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            total_tokens: 0,
            total_cost: 0.0,
            calls: Vec::new(),
        }
    }

    /// Folds one record into the day.
    pub fn add(&mut self, record: UsageRecord) {
        self.total_tokens += u64::from(record.total_tokens);
        self.total_cost += record.cost;
        self.calls.push(record);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncation() {
        let short = "a cat on a roof";
        assert_eq!(preview(short), short);

        let long = "x".repeat(250);
        let p = preview(&long);
        assert_eq!(p.chars().count(), PREVIEW_MAX_CHARS + 3);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = UsageRecord {
            id: "r1".into(),
            timestamp: Utc::now(),
            model: "gemini-2.5-flash".into(),
            kind: GenerationKind::Image,
            prompt_tokens: 10,
            completion_tokens: 0,
            total_tokens: 10,
            cost: 0.00075,
            truncated_prompt: "a cat".into(),
            truncated_response: None,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("promptTokens").is_some());
        assert!(json.get("truncatedPrompt").is_some());
        assert!(json.get("truncated_response").is_none());
        assert!(json.get("truncatedResponse").is_none());
    }

    #[test]
    fn test_daily_usage_fold() {
        let mut day = DailyUsage::new("2025-01-01");
        for cost in [0.5, 0.25] {
            day.add(UsageRecord {
                id: format!("r{cost}"),
                timestamp: Utc::now(),
                model: "dall-e-3".into(),
                kind: GenerationKind::Image,
                prompt_tokens: 100,
                completion_tokens: 0,
                total_tokens: 100,
                cost,
                truncated_prompt: String::new(),
                truncated_response: None,
            });
        }
        assert_eq!(day.total_tokens, 200);
        assert!((day.total_cost - 0.75).abs() < f64::EPSILON);
        assert_eq!(day.calls.len(), 2);
    }
}
