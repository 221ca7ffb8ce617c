//! Kling adapter: image and video generation.
//!
//! # Endpoints
//!
//! ```text
//! POST {base}/v1/images/generations
//! POST {base}/v1/videos/text2video
//! Authorization: Bearer <HS256 JWT>    (see [`jwt`])
//! ```
//!
//! Image calls return hosted URLs; video calls return a task id to poll,
//! surfaced as output metadata.

pub mod jwt;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use promptstage_core::{
    GenerationError, GenerationKind, GenerationOptions, GenerationResult, OutputAsset,
    ProviderKind, Quality, TokenUsage,
};

use crate::adapter::{ProviderAdapter, ensure_supported};
use crate::client::{HttpClient, error_from_status};

/// Base URL for the Kling API.
pub const API_BASE_URL: &str = "https://api-singapore.klingai.com";

const PROVIDER: ProviderKind = ProviderKind::Kling;

/// Adapter for Kling's generation endpoints.
#[derive(Debug, Clone)]
pub struct KlingAdapter {
    client: HttpClient,
    access_key: String,
    secret_key: String,
    base_url: String,
}

impl KlingAdapter {
    /// Creates an adapter against the production endpoint.
    pub fn new(
        client: HttpClient,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self::with_base_url(client, access_key, secret_key, API_BASE_URL)
    }

    /// Creates an adapter against a custom endpoint (used by tests).
    pub fn with_base_url(
        client: HttpClient,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Mints a fresh short-lived token per request.
    fn headers(&self) -> Vec<(&'static str, String)> {
        let token = jwt::sign(&self.access_key, &self.secret_key);
        vec![("authorization", format!("Bearer {token}"))]
    }

    fn quality_param(quality: Quality) -> &'static str {
        match quality {
            Quality::Standard => "standard",
            // Kling's API only distinguishes standard/high
            Quality::High | Quality::Ultra => "high",
        }
    }
}

#[async_trait]
impl ProviderAdapter for KlingAdapter {
    fn kind(&self) -> ProviderKind {
        PROVIDER
    }

    async fn is_available(&self) -> bool {
        // No unauthenticated probe endpoint exists; a well-formed key pair
        // is the best local signal.
        !self.access_key.is_empty() && !self.secret_key.is_empty()
    }

    #[instrument(skip(self, options), fields(provider = ?PROVIDER))]
    async fn generate_image(
        &self,
        options: &GenerationOptions,
    ) -> Result<GenerationResult, GenerationError> {
        ensure_supported(self.features(), GenerationKind::Image)?;

        let model = self.features().default_image_model.unwrap_or("kling-v1");
        let url = format!("{}/v1/images/generations", self.base_url);
        let body = json!({
            "model": model,
            "prompt": options.prompt,
            "aspect_ratio": options.aspect_ratio.as_str(),
            "quality": Self::quality_param(options.quality),
            "style": options.style.as_deref().unwrap_or("realistic")
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
                if let Some(task_id) = image.get("task_id").and_then(Value::as_str) {
                    asset = asset.with_metadata(json!({"taskId": task_id}));
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
        Ok(GenerationResult::new(
            outputs,
            TokenUsage::default(),
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

        let model = self.features().default_video_model.unwrap_or("kling-v1");
        let url = format!("{}/v1/videos/text2video", self.base_url);
        let body = json!({
            "model": model,
            "prompt": options.prompt,
            "aspect_ratio": options.aspect_ratio.as_str(),
            "duration": options.duration_secs.unwrap_or(5)
        });

        let response = self
            .client
            .post_json(PROVIDER, &url, &self.headers(), &body)
            .await?;
        if !response.is_success() {
            return Err(error_from_status(PROVIDER, response.status, &response.body));
        }

        let Some(task_id) = response
            .body
            .pointer("/data/task_id")
            .and_then(Value::as_str)
        else {
            return Err(GenerationError::UnknownResponse {
                provider: PROVIDER,
                detail: "no task id in video response".to_string(),
            });
        };

        let output = OutputAsset {
            url: None,
            data_base64: None,
            metadata: json!({"taskId": task_id}),
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
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(server: &MockServer) -> KlingAdapter {
        KlingAdapter::with_base_url(HttpClient::default(), "access", "secret", server.uri())
    }

    #[tokio::test]
    async fn test_generate_image_sends_bearer_jwt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .and(body_partial_json(json!({
                "model": "kling-v1",
                "style": "realistic"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"url": "https://cdn.kling.example/img.png", "task_id": "t-1"}]
            })))
            .mount(&server)
            .await;

        let result = adapter(&server)
            .generate_image(&GenerationOptions::new("a cat on a roof"))
            .await
            .unwrap();
        assert_eq!(result.outputs[0].metadata["taskId"], "t-1");

        let requests = server.received_requests().await.unwrap();
        let auth = requests[0]
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert!(auth.starts_with("Bearer "));
        // Bearer token is a three-segment JWT
        assert_eq!(auth.trim_start_matches("Bearer ").split('.').count(), 3);
    }

    #[tokio::test]
    async fn test_generate_video_returns_task_handle() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/videos/text2video"))
            .and(body_partial_json(json!({"duration": 5})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"task_id": "video-task-9"}
            })))
            .mount(&server)
            .await;

        let result = adapter(&server)
            .generate_video(&GenerationOptions::new("waves crashing"))
            .await
            .unwrap();
        assert_eq!(result.outputs[0].metadata["taskId"], "video-task-9");
        assert!(result.outputs[0].url.is_none());
    }

    #[tokio::test]
    async fn test_is_available_is_a_local_shape_check() {
        let adapter = KlingAdapter::new(HttpClient::default(), "access", "secret");
        assert!(adapter.is_available().await);

        let empty = KlingAdapter::new(HttpClient::default(), "", "secret");
        assert!(!empty.is_available().await);
    }
}
