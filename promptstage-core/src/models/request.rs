//! Generation requests, options, and results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::provider::{AspectRatio, GenerationKind, ProviderKind, Quality};
use super::settings::StructuredSettings;

// ============================================================================
// Requests
// ============================================================================

/// An opaque handle to a reference asset attached to a request.
///
/// The orchestration layer never interprets asset contents; handles are
/// passed through to the provider untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRef {
    /// Caller-side identifier for the asset.
    pub id: String,
    /// Role hint (e.g. "character", "background"), if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Reference weight in 0.0..=1.0, if the provider supports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f32>,
}

/// One generation attempt as issued by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// What to produce.
    pub kind: GenerationKind,
    /// Base prompt text, before compilation.
    pub prompt: String,
    /// Structured settings to compile into the prompt.
    #[serde(default)]
    pub settings: StructuredSettings,
    /// Attached reference assets.
    #[serde(default)]
    pub reference_assets: Vec<AssetRef>,
}

impl GenerationRequest {
    /// Creates a request with default settings and no attachments.
    pub fn new(kind: GenerationKind, prompt: impl Into<String>) -> Self {
        Self {
            kind,
            prompt: prompt.into(),
            settings: StructuredSettings::default(),
            reference_assets: Vec::new(),
        }
    }
}

/// Resolved options handed to an adapter for one image/video call.
///
/// Built by the controller from a [`GenerationRequest`] after the prompt has
/// been compiled; the adapter only sees final values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Final compiled prompt text.
    pub prompt: String,
    /// Requested aspect ratio.
    pub aspect_ratio: AspectRatio,
    /// Requested quality tier.
    pub quality: Quality,
    /// Style keyword, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    /// Video duration in seconds; ignored for image calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u32>,
    /// Attached reference assets.
    #[serde(default)]
    pub reference_assets: Vec<AssetRef>,
}

impl GenerationOptions {
    /// Creates options with sensible defaults around a compiled prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            aspect_ratio: AspectRatio::Wide,
            quality: Quality::Standard,
            style: None,
            duration_secs: None,
            reference_assets: Vec::new(),
        }
    }
}

// ============================================================================
// Results
// ============================================================================

/// Token usage reported (or estimated) for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    /// Tokens in the prompt.
    pub prompt_tokens: u32,
    /// Tokens in the completion, when the provider reports them.
    pub completion_tokens: u32,
    /// Prompt plus completion.
    pub total_tokens: u32,
}

impl TokenUsage {
    /// Builds a usage record from prompt/completion counts.
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// One generated output handle.
///
/// Providers return either a hosted URL or inline base64 data; both are
/// opaque to this layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputAsset {
    /// Hosted URL, if the provider returned one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Inline base64 payload, if the provider returned one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_base64: Option<String>,
    /// Provider-specific metadata (revised prompt, task id, ...).
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl OutputAsset {
    /// Creates an asset referencing a hosted URL.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            data_base64: None,
            metadata: serde_json::Value::Null,
        }
    }

    /// Creates an asset carrying inline base64 data.
    pub fn from_base64(data: impl Into<String>) -> Self {
        Self {
            url: None,
            data_base64: Some(data.into()),
            metadata: serde_json::Value::Null,
        }
    }

    /// Attaches provider metadata.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// The outcome of one successful generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Output handles, in provider order.
    pub outputs: Vec<OutputAsset>,
    /// Token usage for the call.
    pub usage: TokenUsage,
    /// Model that served the call.
    pub model: String,
    /// Provider selected at dispatch time.
    pub provider: ProviderKind,
    /// When the result was assembled.
    pub created_at: DateTime<Utc>,
}

impl GenerationResult {
    /// Creates a result stamped with the current time.
    pub fn new(
        outputs: Vec<OutputAsset>,
        usage: TokenUsage,
        model: impl Into<String>,
        provider: ProviderKind,
    ) -> Self {
        Self {
            outputs,
            usage,
            model: model.into(),
            provider,
            created_at: Utc::now(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_usage_totals() {
        let usage = TokenUsage::new(120, 30);
        assert_eq!(usage.total_tokens, 150);
    }

    #[test]
    fn test_request_defaults() {
        let request = GenerationRequest::new(GenerationKind::Image, "a cat on a roof");
        assert!(request.settings.is_default());
        assert!(request.reference_assets.is_empty());
    }

    #[test]
    fn test_output_asset_builders() {
        let asset = OutputAsset::from_url("https://example.com/img.png")
            .with_metadata(serde_json::json!({"revisedPrompt": "a cat"}));
        assert!(asset.url.is_some());
        assert!(asset.data_base64.is_none());
        assert_eq!(asset.metadata["revisedPrompt"], "a cat");
    }
}
