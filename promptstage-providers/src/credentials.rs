//! Provider credentials and shape validation.
//!
//! Shape checks are purely syntactic and never touch the network; they exist
//! so a mistyped key fails at adapter construction instead of on the first
//! generation call. Credentials never appear in logs or `Debug` output in
//! full.

use std::fmt;

use promptstage_core::{GenerationError, ProviderKind};

/// A credential for one provider.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Single API key (Google, ChatGPT, Anthropic).
    ApiKey(String),
    /// Access/secret key pair (Kling).
    KeyPair {
        /// Access key, used as the JWT issuer.
        access_key: String,
        /// Secret key, used to sign the JWT.
        secret_key: String,
    },
}

impl Credential {
    /// Creates an API-key credential.
    pub fn api_key(key: impl Into<String>) -> Self {
        Self::ApiKey(key.into())
    }

    /// Creates a key-pair credential.
    pub fn key_pair(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self::KeyPair {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// The API key, if this is an [`Credential::ApiKey`].
    pub fn as_api_key(&self) -> Option<&str> {
        match self {
            Self::ApiKey(key) => Some(key),
            Self::KeyPair { .. } => None,
        }
    }

    /// The access/secret pair, if this is a [`Credential::KeyPair`].
    pub fn as_key_pair(&self) -> Option<(&str, &str)> {
        match self {
            Self::ApiKey(_) => None,
            Self::KeyPair {
                access_key,
                secret_key,
            } => Some((access_key, secret_key)),
        }
    }

    /// Checks that this credential has the shape the provider expects.
    ///
    /// Never performs I/O. An empty credential is reported as missing, a
    /// present-but-malformed one as invalid.
    pub fn validate_for(&self, provider: ProviderKind) -> Result<(), GenerationError> {
        match (provider, self) {
            (ProviderKind::Google, Self::ApiKey(key)) => {
                if key.is_empty() {
                    Err(GenerationError::CredentialMissing { provider })
                } else if key.starts_with("AI") {
                    Ok(())
                } else {
                    Err(invalid(provider, "Google API keys start with \"AI\""))
                }
            }
            (ProviderKind::ChatGpt, Self::ApiKey(key)) => {
                if key.is_empty() {
                    Err(GenerationError::CredentialMissing { provider })
                } else if key.starts_with("sk-") && !key.starts_with("sk-ant-") {
                    Ok(())
                } else {
                    Err(invalid(provider, "OpenAI API keys start with \"sk-\""))
                }
            }
            (ProviderKind::Anthropic, Self::ApiKey(key)) => {
                if key.is_empty() {
                    Err(GenerationError::CredentialMissing { provider })
                } else if key.starts_with("sk-ant-") {
                    Ok(())
                } else {
                    Err(invalid(provider, "Anthropic API keys start with \"sk-ant-\""))
                }
            }
            (ProviderKind::Kling, Self::KeyPair { access_key, secret_key }) => {
                if access_key.is_empty() || secret_key.is_empty() {
                    Err(GenerationError::CredentialMissing { provider })
                } else {
                    Ok(())
                }
            }
            (ProviderKind::Kling, Self::ApiKey(_)) => {
                Err(invalid(provider, "Kling requires an access/secret key pair"))
            }
            (_, Self::KeyPair { .. }) => {
                Err(invalid(provider, "expected a single API key"))
            }
        }
    }
}

fn invalid(provider: ProviderKind, detail: &str) -> GenerationError {
    GenerationError::CredentialInvalid {
        provider,
        detail: detail.to_string(),
    }
}

/// Shows at most the first four characters of a secret.
fn redact(secret: &str) -> String {
    let prefix: String = secret.chars().take(4).collect();
    format!("{prefix}\u{2026}")
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey(key) => f.debug_tuple("ApiKey").field(&redact(key)).finish(),
            Self::KeyPair { access_key, .. } => f
                .debug_struct("KeyPair")
                .field("access_key", &redact(access_key))
                .field("secret_key", &"\u{2026}")
                .finish(),
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
    fn test_shape_checks_per_provider() {
        assert!(Credential::api_key("AIzaSyExample")
            .validate_for(ProviderKind::Google)
            .is_ok());
        assert!(Credential::api_key("sk-proj-abc123")
            .validate_for(ProviderKind::ChatGpt)
            .is_ok());
        assert!(Credential::api_key("sk-ant-api03-abc")
            .validate_for(ProviderKind::Anthropic)
            .is_ok());
        assert!(Credential::key_pair("access", "secret")
            .validate_for(ProviderKind::Kling)
            .is_ok());
    }

    #[test]
    fn test_anthropic_key_rejected_for_chatgpt() {
        let err = Credential::api_key("sk-ant-api03-abc")
            .validate_for(ProviderKind::ChatGpt)
            .unwrap_err();
        assert!(err.is_credential_failure());
        assert!(!matches!(err, GenerationError::CredentialMissing { .. }));
    }

    #[test]
    fn test_empty_credential_is_missing() {
        let err = Credential::api_key("")
            .validate_for(ProviderKind::Google)
            .unwrap_err();
        assert!(matches!(err, GenerationError::CredentialMissing { .. }));

        let err = Credential::key_pair("access", "")
            .validate_for(ProviderKind::Kling)
            .unwrap_err();
        assert!(matches!(err, GenerationError::CredentialMissing { .. }));
    }

    #[test]
    fn test_key_pair_rejected_for_api_key_providers() {
        let err = Credential::key_pair("a", "b")
            .validate_for(ProviderKind::Google)
            .unwrap_err();
        assert!(matches!(err, GenerationError::CredentialInvalid { .. }));
    }

    #[test]
    fn test_debug_never_shows_full_secret() {
        let debug = format!("{:?}", Credential::api_key("sk-proj-supersecretvalue"));
        assert!(!debug.contains("supersecretvalue"));
        assert!(debug.contains("sk-p"));

        let debug = format!(
            "{:?}",
            Credential::key_pair("accesskey123", "secretkey456")
        );
        assert!(!debug.contains("secretkey456"));
    }
}
