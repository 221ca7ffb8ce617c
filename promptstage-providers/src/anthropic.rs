//! Anthropic adapter: prompt work and image analysis.
//!
//! Claude produces no images or video; the adapter exists for prompt
//! optimization and for describing reference images via the Messages API.
//!
//! # Endpoints
//!
//! ```text
//! POST {base}/v1/messages    (image analysis)
//! GET  {base}/v1/models      (availability probe)
//! x-api-key: <api key>
//! anthropic-version: 2023-06-01
//! ```

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::instrument;

use promptstage_core::{
    GenerationError, GenerationOptions, GenerationResult, ProviderKind,
};

use crate::adapter::ProviderAdapter;
use crate::client::{HttpClient, error_from_status};

/// Base URL for the Anthropic API.
pub const API_BASE_URL: &str = "https://api.anthropic.com";

/// API version header value.
pub const API_VERSION: &str = "2023-06-01";

/// Model used for image analysis.
pub const ANALYSIS_MODEL: &str = "claude-3-sonnet-20240229";

const PROVIDER: ProviderKind = ProviderKind::Anthropic;

/// Adapter for Anthropic's Messages API.
#[derive(Debug, Clone)]
pub struct AnthropicAdapter {
    client: HttpClient,
    api_key: String,
    base_url: String,
}

impl AnthropicAdapter {
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
        vec![
            ("x-api-key", self.api_key.clone()),
            ("anthropic-version", API_VERSION.to_string()),
        ]
    }

    /// Describes an image for downstream prompt work.
    ///
    /// Not part of [`ProviderAdapter`]: no other provider analyzes images,
    /// so this stays an Anthropic-specific extension.
    #[instrument(skip(self, image_url, question), fields(provider = ?PROVIDER))]
    pub async fn analyze_image(
        &self,
        image_url: &str,
        question: Option<&str>,
    ) -> Result<String, GenerationError> {
        let url = format!("{}/v1/messages", self.base_url);
        let prompt = question.unwrap_or(
            "Describe this image in detail for use as an image-generation prompt.",
        );
        let body = json!({
            "model": ANALYSIS_MODEL,
            "max_tokens": 1000,
            "messages": [{
                "role": "user",
                "content": [
                    {"type": "image", "source": {"type": "url", "url": image_url}},
                    {"type": "text", "text": prompt}
                ]
            }]
        });

        let response = self
            .client
            .post_json(PROVIDER, &url, &self.headers(), &body)
            .await?;
        if !response.is_success() {
            return Err(error_from_status(PROVIDER, response.status, &response.body));
        }

        response
            .body
            .pointer("/content/0/text")
            .and_then(Value::as_str)
            .map(ToString::to_string)
            .ok_or_else(|| GenerationError::UnknownResponse {
                provider: PROVIDER,
                detail: "no text content in analysis response".to_string(),
            })
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn kind(&self) -> ProviderKind {
        PROVIDER
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/v1/models", self.base_url);
        match self.client.get_json(PROVIDER, &url, &self.headers()).await {
            Ok(response) => response.is_success(),
            Err(_) => false,
        }
    }

    async fn generate_image(
        &self,
        _options: &GenerationOptions,
    ) -> Result<GenerationResult, GenerationError> {
        Err(GenerationError::UnsupportedOperation {
            provider: PROVIDER,
            operation: "image generation".to_string(),
        })
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

#[cfg(test)]
mod tests {
    use super::*;
    use promptstage_core::models::StructuredSettings;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(server: &MockServer) -> AnthropicAdapter {
        AnthropicAdapter::with_base_url(HttpClient::default(), "sk-ant-test", server.uri())
    }

    #[tokio::test]
    async fn test_image_generation_fails_without_network_call() {
        let server = MockServer::start().await;

        let err = adapter(&server)
            .generate_image(&GenerationOptions::new("a cat"))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::UnsupportedOperation { .. }));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_image_extracts_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "sk-ant-test"))
            .and(header("anthropic-version", API_VERSION))
            .and(body_partial_json(json!({"model": ANALYSIS_MODEL})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": "A lighthouse at dusk."}]
            })))
            .mount(&server)
            .await;

        let description = adapter(&server)
            .analyze_image("https://images.example/lighthouse.png", None)
            .await
            .unwrap();
        assert_eq!(description, "A lighthouse at dusk.");
    }

    #[test]
    fn test_optimize_prompt_uses_claude_directive() {
        let server_less =
            AnthropicAdapter::new(HttpClient::default(), "sk-ant-test");
        let compiled =
            server_less.optimize_prompt("a cat on a roof", &StructuredSettings::default());
        assert!(
            compiled
                .text
                .starts_with("Create a detailed visual description")
        );
    }
}
