//! HTTP client abstractions.
//!
//! All provider traffic goes through [`HttpClient`], which owns timeouts and
//! the retry loop. Transport failures and rate limits are retried; every
//! other non-success status is handed back to the adapter, which knows how
//! to read its provider's error bodies (see [`error_from_status`]).

use std::time::Duration;

use reqwest::{Client, StatusCode, header};
use serde_json::Value;
use tracing::{debug, warn};

use promptstage_core::{GenerationError, ProviderKind};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Characters of response body kept in error details.
const ERROR_DETAIL_MAX_CHARS: usize = 200;

// ============================================================================
// Retry Strategy
// ============================================================================

/// Strategy for retrying failed requests.
#[derive(Debug, Clone)]
pub struct RetryStrategy {
    /// Maximum number of retry attempts.
    pub max_attempts: u32,
    /// Base delay between retries in seconds.
    pub base_delay_secs: u64,
    /// Whether to use exponential backoff.
    pub exponential_backoff: bool,
    /// Maximum delay between retries.
    pub max_delay_secs: u64,
}

impl RetryStrategy {
    /// Creates a new retry strategy.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay_secs: 1,
            exponential_backoff: true,
            max_delay_secs: 60,
        }
    }

    /// Disables retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay_secs: 0,
            exponential_backoff: false,
            max_delay_secs: 0,
        }
    }

    /// Sets the base delay.
    pub fn with_base_delay(mut self, secs: u64) -> Self {
        self.base_delay_secs = secs;
        self
    }

    /// Calculates the delay for a given attempt number.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = if self.exponential_backoff {
            self.base_delay_secs * 2u64.pow(attempt.saturating_sub(1))
        } else {
            self.base_delay_secs
        };

        Duration::from_secs(delay.min(self.max_delay_secs))
    }

    /// Determines if a request error should be retried.
    pub fn should_retry(&self, error: &reqwest::Error) -> bool {
        // Retry on connection errors and timeouts
        error.is_connect() || error.is_timeout()
    }
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self::new(3)
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Status and parsed JSON body of one provider response.
///
/// Non-success statuses are returned here rather than as errors so adapters
/// can interpret provider-specific error bodies.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Parsed body; [`Value::Null`] if the body was not valid JSON.
    pub body: Value,
}

impl ApiResponse {
    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Maps a non-success provider response to the uniform error taxonomy.
///
/// The body's `message`/`error` text is truncated into the error detail so
/// the surfaced message carries the provider's own remediation hint.
pub fn error_from_status(provider: ProviderKind, status: u16, body: &Value) -> GenerationError {
    let detail = body_detail(body);

    match status {
        401 | 403 => GenerationError::CredentialInvalid {
            provider,
            detail: format!("provider rejected the credential (HTTP {status}): {detail}"),
        },
        429 => GenerationError::QuotaExceeded {
            provider,
            retry_after_secs: None,
        },
        400 if is_safety_block(&detail) => GenerationError::SafetyPolicyViolation {
            provider,
            categories: safety_categories(body),
        },
        500..=599 => GenerationError::Network {
            provider,
            detail: format!("server error (HTTP {status})"),
        },
        _ => GenerationError::UnknownResponse {
            provider,
            detail: format!("HTTP {status}: {detail}"),
        },
    }
}

/// Extracts the human-readable error text from a provider error body.
fn body_detail(body: &Value) -> String {
    let text = body
        .pointer("/error/message")
        .or_else(|| body.pointer("/message"))
        .or_else(|| body.pointer("/error"))
        .and_then(Value::as_str)
        .map_or_else(|| body.to_string(), ToString::to_string);

    let mut out: String = text.chars().take(ERROR_DETAIL_MAX_CHARS).collect();
    if text.chars().count() > ERROR_DETAIL_MAX_CHARS {
        out.push_str("...");
    }
    out
}

fn is_safety_block(detail: &str) -> bool {
    let lower = detail.to_lowercase();
    lower.contains("content_policy") || lower.contains("content policy") || lower.contains("safety")
}

/// Pulls policy category hints out of an error body, if the provider
/// supplied any.
fn safety_categories(body: &Value) -> Vec<String> {
    body.pointer("/error/categories")
        .or_else(|| body.pointer("/categories"))
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
}

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP client with retry capabilities.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    retry_strategy: RetryStrategy,
}

impl HttpClient {
    /// Creates a new HTTP client with default settings.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a new HTTP client with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("promptstage/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: client,
            retry_strategy: RetryStrategy::default(),
        })
    }

    /// Sets the retry strategy for this client.
    pub fn with_retry_strategy(mut self, strategy: RetryStrategy) -> Self {
        self.retry_strategy = strategy;
        self
    }

    /// Performs a JSON POST request with provider-specific headers.
    pub async fn post_json(
        &self,
        provider: ProviderKind,
        url: &str,
        headers: &[(&str, String)],
        body: &Value,
    ) -> Result<ApiResponse, GenerationError> {
        self.execute(provider, url, headers, Some(body)).await
    }

    /// Performs a JSON GET request with provider-specific headers.
    pub async fn get_json(
        &self,
        provider: ProviderKind,
        url: &str,
        headers: &[(&str, String)],
    ) -> Result<ApiResponse, GenerationError> {
        self.execute(provider, url, headers, None).await
    }

    async fn execute(
        &self,
        provider: ProviderKind,
        url: &str,
        headers: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<ApiResponse, GenerationError> {
        let mut attempts = 0;
        let max_attempts = self.retry_strategy.max_attempts;

        loop {
            attempts += 1;
            debug!(provider = ?provider, url = %url, attempt = attempts, "Sending request");

            let mut request = match body {
                Some(json) => self.inner.post(url).json(json),
                None => self.inner.get(url),
            };
            for (name, value) in headers {
                request = request.header(*name, value);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();

                    // Handle rate limiting
                    if status == StatusCode::TOO_MANY_REQUESTS {
                        let retry_after: Option<u64> = response
                            .headers()
                            .get(header::RETRY_AFTER)
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse().ok());

                        if attempts < max_attempts {
                            let wait_time =
                                retry_after.unwrap_or(self.retry_strategy.base_delay_secs);
                            warn!(
                                provider = ?provider,
                                wait_secs = wait_time,
                                "Rate limited, waiting before retry"
                            );
                            tokio::time::sleep(Duration::from_secs(wait_time)).await;
                            continue;
                        }

                        return Err(GenerationError::QuotaExceeded {
                            provider,
                            retry_after_secs: retry_after,
                        });
                    }

                    // Handle auth errors
                    if status == StatusCode::UNAUTHORIZED {
                        return Err(GenerationError::CredentialInvalid {
                            provider,
                            detail: "invalid or expired credentials (HTTP 401)".to_string(),
                        });
                    }

                    let status = status.as_u16();
                    let json = response.json::<Value>().await.unwrap_or(Value::Null);
                    return Ok(ApiResponse { status, body: json });
                }
                Err(e) => {
                    if attempts < max_attempts && self.retry_strategy.should_retry(&e) {
                        let delay = self.retry_strategy.delay_for_attempt(attempts);
                        warn!(
                            provider = ?provider,
                            error = %e,
                            delay_secs = delay.as_secs(),
                            "Request failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(GenerationError::Network {
                        provider,
                        detail: e.to_string(),
                    });
                }
            }
        }
    }
}

impl Default for HttpClient {
    /// Creates a default HTTP client.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created. This should only happen
    /// if the system's TLS configuration is broken, which indicates a
    /// fundamentally broken environment where the application cannot function.
    fn default() -> Self {
        Self::new().unwrap_or_else(|e| {
            panic!(
                "Failed to create default HTTP client: {e}. \
                This usually indicates a broken TLS/SSL configuration."
            )
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
