//! Google adapter: Gemini image models and Veo video models.
//!
//! # Endpoints
//!
//! ```text
//! POST {base}/models/{model}:generateContent      (image)
//! POST {base}/models/{model}:predictLongRunning   (video)
//! GET  {base}/models                              (availability probe)
//! x-goog-api-key: <api key>
//! ```
//!
//! Image calls return inline base64 data; video calls return a long-running
//! operation name, surfaced as output metadata for the caller to poll.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use promptstage_core::{
    GenerationError, GenerationKind, GenerationOptions, GenerationResult, OutputAsset,
    ProviderKind, TokenUsage,
};

use crate::adapter::{ProviderAdapter, ensure_supported};
use crate::client::{HttpClient, error_from_status};

/// Base URL for the Gemini API.
pub const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const PROVIDER: ProviderKind = ProviderKind::Google;

/// Adapter for Google's generative endpoints.
#[derive(Debug, Clone)]
pub struct GoogleAdapter {
    client: HttpClient,
    api_key: String,
    base_url: String,
}

impl GoogleAdapter {
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
        vec![("x-goog-api-key", self.api_key.clone())]
    }

    fn model_for(&self, kind: GenerationKind) -> &'static str {
        let features = self.features();
        match kind {
            GenerationKind::Video => features.default_video_model.unwrap_or("veo-3.0-generate-001"),
            _ => features.default_image_model.unwrap_or("gemini-2.5-flash-image"),
        }
    }
}

/// Reads inline image parts out of a `generateContent` response.
fn parse_image_outputs(body: &Value) -> Vec<OutputAsset> {
    body.pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.pointer("/inlineData/data").and_then(Value::as_str))
                .map(OutputAsset::from_base64)
                .collect()
        })
        .unwrap_or_default()
}

fn parse_usage(body: &Value) -> TokenUsage {
    let read = |field: &str| {
        body.pointer(&format!("/usageMetadata/{field}"))
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0)
    };
    TokenUsage::new(read("promptTokenCount"), read("candidatesTokenCount"))
}

#[async_trait]
impl ProviderAdapter for GoogleAdapter {
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

        let model = self.model_for(GenerationKind::Image);
        let url = format!("{}/models/{model}:generateContent", self.base_url);
        let body = json!({
            "contents": [{"parts": [{"text": options.prompt}]}],
            "generationConfig": {
                "responseModalities": ["IMAGE"],
                "imageConfig": {"aspectRatio": options.aspect_ratio.as_str()}
            }
        });

        let response = self
            .client
            .post_json(PROVIDER, &url, &self.headers(), &body)
            .await?;
        if !response.is_success() {
            return Err(error_from_status(PROVIDER, response.status, &response.body));
        }

        // A blocked prompt comes back 200 with no candidates.
        if let Some(reason) = response
            .body
            .pointer("/promptFeedback/blockReason")
            .and_then(Value::as_str)
        {
            return Err(GenerationError::SafetyPolicyViolation {
                provider: PROVIDER,
                categories: vec![reason.to_string()],
            });
        }

        let outputs = parse_image_outputs(&response.body);
        if outputs.is_empty() {
            return Err(GenerationError::UnknownResponse {
                provider: PROVIDER,
                detail: "no inline image data in response".to_string(),
            });
        }

        debug!(outputs = outputs.len(), "Image generation complete");
        Ok(GenerationResult::new(
            outputs,
            parse_usage(&response.body),
            model,
            PROVIDER,
        ))
    }

    #[instrument(skip(self, options), fields(provider = ?PROVIDER))]
    async fn generate_video(
        &self,
        options: &GenerationOptions,
    ) -> Result<GenerationResult, GenerationError> {
        ensure_supported(self.features(), GenerationKind::Video)?;

        let model = self.model_for(GenerationKind::Video);
        let url = format!("{}/models/{model}:predictLongRunning", self.base_url);
        let body = json!({
            "instances": [{"prompt": options.prompt}],
            "parameters": {
                "aspectRatio": options.aspect_ratio.as_str(),
                "durationSeconds": options.duration_secs.unwrap_or(8)
            }
        });

        let response = self
            .client
            .post_json(PROVIDER, &url, &self.headers(), &body)
            .await?;
        if !response.is_success() {
            return Err(error_from_status(PROVIDER, response.status, &response.body));
        }

        let Some(operation) = response.body.get("name").and_then(Value::as_str) else {
            return Err(GenerationError::UnknownResponse {
                provider: PROVIDER,
                detail: "no operation name in video response".to_string(),
            });
        };

        let output = OutputAsset {
            url: None,
            data_base64: None,
            metadata: json!({"operation": operation}),
        };
        Ok(GenerationResult::new(
            vec![output],
            TokenUsage::default(),
            model,
            PROVIDER,
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use promptstage_core::AspectRatio;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(server: &MockServer) -> GoogleAdapter {
        GoogleAdapter::with_base_url(HttpClient::default(), "AIzaSyTest", server.uri())
    }

    #[tokio::test]
    async fn test_generate_image_parses_inline_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash-image:generateContent"))
            .and(header("x-goog-api-key", "AIzaSyTest"))
            .and(body_partial_json(serde_json::json!({
                "generationConfig": {"imageConfig": {"aspectRatio": "16:9"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [
                    {"inlineData": {"mimeType": "image/png", "data": "aGVsbG8="}}
                ]}}],
                "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 3}
            })))
            .mount(&server)
            .await;

        let mut options = GenerationOptions::new("a cat on a roof");
        options.aspect_ratio = AspectRatio::Wide;
        let result = adapter(&server).generate_image(&options).await.unwrap();

        assert_eq!(result.model, "gemini-2.5-flash-image");
        assert_eq!(result.outputs.len(), 1);
        assert_eq!(result.outputs[0].data_base64.as_deref(), Some("aGVsbG8="));
        assert_eq!(result.usage.total_tokens, 15);
    }

    #[tokio::test]
    async fn test_blocked_prompt_maps_to_safety_violation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let err = adapter(&server)
            .generate_image(&GenerationOptions::new("something blocked"))
            .await
            .unwrap_err();
        match err {
            GenerationError::SafetyPolicyViolation { categories, .. } => {
                assert_eq!(categories, vec!["SAFETY".to_string()]);
            }
            other => panic!("expected safety violation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_video_returns_operation_handle() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/veo-3.0-generate-001:predictLongRunning"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "operations/abc123"
            })))
            .mount(&server)
            .await;

        let result = adapter(&server)
            .generate_video(&GenerationOptions::new("a drone shot of cliffs"))
            .await
            .unwrap();
        assert_eq!(result.outputs[0].metadata["operation"], "operations/abc123");
    }
}
