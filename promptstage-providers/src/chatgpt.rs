//! ChatGPT adapter: DALL-E 3 image generation.
//!
//! # Endpoints
//!
//! ```text
//! POST {base}/images/generations
//! GET  {base}/models                (availability probe)
//! Authorization: Bearer <api key>
//! ```
//!
//! DALL-E 3 only renders three sizes, so non-square ratios other than 16:9
//! and 9:16 fall back to 1024x1024. The API reports no token usage for
//! image calls; the ledger estimates from the prompt instead.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use promptstage_core::{
    AspectRatio, GenerationError, GenerationKind, GenerationOptions, GenerationResult,
    OutputAsset, ProviderKind, Quality, TokenUsage,
};

use crate::adapter::{ProviderAdapter, ensure_supported};
use crate::client::{HttpClient, error_from_status};

/// Base URL for the OpenAI API.
pub const API_BASE_URL: &str = "https://api.openai.com/v1";

const PROVIDER: ProviderKind = ProviderKind::ChatGpt;

/// Adapter for OpenAI's image endpoint.
#[derive(Debug, Clone)]
pub struct ChatGptAdapter {
    client: HttpClient,
    api_key: String,
    base_url: String,
}

impl ChatGptAdapter {
    /// Creates an adapter against the production endpoint.
    pub fn new(client: HttpClient, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, API_BASE_URL)
    }

    /// Creates an adapter against a custom endpoint (used by tests).
    pub fn with_base_url(
        client: HttpClient,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    fn headers(&self) -> Vec<(&'static str, String)> {
        vec![("authorization", format!("Bearer {}", self.api_key))]
    }
}

/// Maps an aspect ratio onto the sizes DALL-E 3 renders.
pub fn dalle3_size(ratio: AspectRatio) -> &'static str {
    match ratio {
        AspectRatio::Wide => "1792x1024",
        AspectRatio::Tall => "1024x1792",
        // DALL-E 3 has no 4:3 / 3:4 output
        AspectRatio::Square | AspectRatio::Classic | AspectRatio::Portrait => "1024x1024",
    }
}

#[async_trait]
impl ProviderAdapter for ChatGptAdapter {
    fn kind(&self) -> ProviderKind {
        PROVIDER
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/models", self.base_url);
        match self.client.get_json(PROVIDER, &url, &self.headers()).await {
            Ok(response) => response.is_success(),
            Err(_) => false,
        }
    }

    #[instrument(skip(self, options), fields(provider = ?PROVIDER))]
    async fn generate_image(
        &self,
        options: &GenerationOptions,
    ) -> Result<GenerationResult, GenerationError> {
        ensure_supported(self.features(), GenerationKind::Image)?;

        let model = self.features().default_image_model.unwrap_or("dall-e-3");
        let url = format!("{}/images/generations", self.base_url);
        let body = json!({
            "model": model,
            "prompt": options.prompt,
            "n": 1,
            "size": dalle3_size(options.aspect_ratio),
            "quality": if options.quality == Quality::Standard { "standard" } else { "hd" },
            "style": if options.style.as_deref() == Some("vivid") { "vivid" } else { "natural" }
        });

        let response = self
            .client
            .post_json(PROVIDER, &url, &self.headers(), &body)
            .await?;
        if !response.is_success() {
            return Err(error_from_status(PROVIDER, response.status, &response.body));
        }

        let Some(images) = response.body.get("data").and_then(Value::as_array) else {
            return Err(GenerationError::UnknownResponse {
                provider: PROVIDER,
                detail: "missing data array in image response".to_string(),
            });
        };

        let outputs: Vec<OutputAsset> = images
            .iter()
            .filter_map(|image| {
                let url = image.get("url").and_then(Value::as_str)?;
                let mut asset = OutputAsset::from_url(url);
                if let Some(revised) = image.get("revised_prompt").and_then(Value::as_str) {
                    asset = asset.with_metadata(json!({"revisedPrompt": revised}));
                }
                Some(asset)
            })
            .collect();

        if outputs.is_empty() {
            return Err(GenerationError::UnknownResponse {
                provider: PROVIDER,
                detail: "image response contained no URLs".to_string(),
            });
        }

        debug!(outputs = outputs.len(), "Image generation complete");
        // DALL-E reports no usage for image calls.
        Ok(GenerationResult::new(
            outputs,
            TokenUsage::default(),
            model,
            PROVIDER,
        ))
    }

    async fn generate_video(
        &self,
        _options: &GenerationOptions,
    ) -> Result<GenerationResult, GenerationError> {
        Err(GenerationError::UnsupportedOperation {
            provider: PROVIDER,
            operation: "video generation".to_string(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
