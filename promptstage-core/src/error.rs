//! The uniform error taxonomy for generation calls.
//!
//! Every adapter maps its provider's failure modes into [`GenerationError`]
//! so callers can branch on category without knowing which provider served
//! the call.

use thiserror::Error;

use crate::models::ProviderKind;

/// Result alias used throughout the generation pipeline.
pub type Result<T> = std::result::Result<T, GenerationError>;

/// Uniform error for generation operations, tagged with the provider that
/// produced it.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No credential is configured for the provider.
    #[error("{provider}: no credential configured")]
    CredentialMissing {
        /// Provider that was asked to serve the call.
        provider: ProviderKind,
    },

    /// A credential exists but the provider rejected it.
    #[error("{provider}: credential rejected: {detail}")]
    CredentialInvalid {
        /// Provider that rejected the credential.
        provider: ProviderKind,
        /// Provider-supplied detail, already stripped of secrets.
        detail: String,
    },

    /// The provider does not advertise the requested operation.
    #[error("{provider} does not support {operation}")]
    UnsupportedOperation {
        /// Provider that was asked.
        provider: ProviderKind,
        /// Human-readable operation name (e.g. "video generation").
        operation: String,
    },

    /// Rate limit or quota exhaustion.
    #[error("{provider}: quota exceeded")]
    QuotaExceeded {
        /// Provider that throttled the call.
        provider: ProviderKind,
        /// Seconds until a retry may succeed, when the provider said.
        retry_after_secs: Option<u64>,
    },

    /// The provider refused the content on safety grounds.
    #[error("{provider}: request blocked by safety policy")]
    SafetyPolicyViolation {
        /// Provider that blocked the request.
        provider: ProviderKind,
        /// Policy categories reported by the provider, if any.
        categories: Vec<String>,
    },

    /// Transport-level failure (connect, timeout, TLS).
    #[error("{provider}: network error: {detail}")]
    Network {
        /// Provider being reached.
        provider: ProviderKind,
        /// Transport detail.
        detail: String,
    },

    /// The provider answered, but with a body this layer cannot interpret.
    #[error("{provider}: unrecognized response: {detail}")]
    UnknownResponse {
        /// Provider that answered.
        provider: ProviderKind,
        /// What was wrong with the body.
        detail: String,
    },
}

impl GenerationError {
    /// The provider this error is attributed to.
    pub fn provider(&self) -> ProviderKind {
        match self {
            Self::CredentialMissing { provider }
            | Self::CredentialInvalid { provider, .. }
            | Self::UnsupportedOperation { provider, .. }
            | Self::QuotaExceeded { provider, .. }
            | Self::SafetyPolicyViolation { provider, .. }
            | Self::Network { provider, .. }
            | Self::UnknownResponse { provider, .. } => *provider,
        }
    }

    /// Returns true if retrying the same call may succeed without any
    /// configuration change.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::QuotaExceeded { .. })
    }

    /// Returns true if the failure is about credentials rather than the
    /// request itself.
    pub fn is_credential_failure(&self) -> bool {
        matches!(
            self,
            Self::CredentialMissing { .. } | Self::CredentialInvalid { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let network = GenerationError::Network {
            provider: ProviderKind::Google,
            detail: "connection reset".into(),
        };
        assert!(network.is_retryable());
        assert!(!network.is_credential_failure());
        assert_eq!(network.provider(), ProviderKind::Google);

        let missing = GenerationError::CredentialMissing {
            provider: ProviderKind::Kling,
        };
        assert!(missing.is_credential_failure());
        assert!(!missing.is_retryable());
    }

    #[test]
    fn test_display_does_not_leak_detail_for_quota() {
        let err = GenerationError::QuotaExceeded {
            provider: ProviderKind::ChatGpt,
            retry_after_secs: Some(30),
        };
        assert_eq!(err.to_string(), "ChatGPT: quota exceeded");
    }

    #[test]
    fn test_unsupported_operation_message() {
        let err = GenerationError::UnsupportedOperation {
            provider: ProviderKind::Anthropic,
            operation: "video generation".into(),
        };
        assert_eq!(
            err.to_string(),
            "Anthropic does not support video generation"
        );
    }
}
