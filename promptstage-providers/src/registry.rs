//! The adapter registry.
//!
//! The registry is the only component allowed to construct and cache
//! adapters. It is an explicitly constructed object owned by the application
//! root and passed by reference; there is no global instance.
//!
//! Cache policy: one entry per provider, keyed by the credential used to
//! build it. Requesting an adapter with the same credential returns the
//! cached instance; a different credential replaces it. [`invalidate`]
//! must be called on logout or credential change.
//!
//! [`invalidate`]: AdapterRegistry::invalidate

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use promptstage_core::{GenerationError, ProviderKind};

use crate::adapter::ProviderAdapter;
use crate::anthropic::AnthropicAdapter;
use crate::chatgpt::ChatGptAdapter;
use crate::client::HttpClient;
use crate::credentials::Credential;
use crate::google::GoogleAdapter;
use crate::kling::KlingAdapter;

struct CacheEntry {
    credential: Credential,
    adapter: Arc<dyn ProviderAdapter>,
}

/// Caching factory for provider adapters.
pub struct AdapterRegistry {
    client: HttpClient,
    cache: Mutex<HashMap<ProviderKind, CacheEntry>>,
}

impl AdapterRegistry {
    /// Creates a registry with a default HTTP client.
    pub fn new() -> Self {
        Self::with_client(HttpClient::default())
    }

    /// Creates a registry over a specific HTTP client.
    pub fn with_client(client: HttpClient) -> Self {
        Self {
            client,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached adapter, or constructs and caches a new one.
    ///
    /// Validates the credential's shape before construction; a malformed
    /// credential fails here with a credential error and no network call.
    /// A credential change replaces the cached instance.
    pub fn create_adapter(
        &self,
        provider: ProviderKind,
        credential: &Credential,
    ) -> Result<Arc<dyn ProviderAdapter>, GenerationError> {
        let mut cache = self.cache.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        if let Some(entry) = cache.get(&provider) {
            if entry.credential == *credential {
                debug!(provider = ?provider, "Reusing cached adapter");
                return Ok(Arc::clone(&entry.adapter));
            }
        }

        credential.validate_for(provider)?;
        let adapter = self.build(provider, credential);
        info!(provider = ?provider, "Constructed adapter");

        cache.insert(
            provider,
            CacheEntry {
                credential: credential.clone(),
                adapter: Arc::clone(&adapter),
            },
        );
        Ok(adapter)
    }

    /// Builds a fresh adapter. Only called after shape validation, so the
    /// credential accessors cannot miss.
    fn build(&self, provider: ProviderKind, credential: &Credential) -> Arc<dyn ProviderAdapter> {
        let client = self.client.clone();
        match provider {
            ProviderKind::Google => {
                let key = credential.as_api_key().unwrap_or_default();
                Arc::new(GoogleAdapter::new(client, key))
            }
            ProviderKind::ChatGpt => {
                let key = credential.as_api_key().unwrap_or_default();
                Arc::new(ChatGptAdapter::new(client, key))
            }
            ProviderKind::Anthropic => {
                let key = credential.as_api_key().unwrap_or_default();
                Arc::new(AnthropicAdapter::new(client, key))
            }
            ProviderKind::Kling => {
                let (access, secret) = credential.as_key_pair().unwrap_or_default();
                Arc::new(KlingAdapter::new(client, access, secret))
            }
        }
    }

    /// Returns the adapter cached for a provider, if any.
    pub fn cached(&self, provider: ProviderKind) -> Option<Arc<dyn ProviderAdapter>> {
        let cache = self.cache.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        cache.get(&provider).map(|entry| Arc::clone(&entry.adapter))
    }

    /// All providers the registry can construct adapters for.
    pub fn available_providers(&self) -> &'static [ProviderKind] {
        ProviderKind::all()
    }

    /// Probes whether a cached provider can currently serve calls.
    ///
    /// Returns false when no adapter is cached for the provider.
    pub async fn check_availability(&self, provider: ProviderKind) -> bool {
        match self.cached(provider) {
            Some(adapter) => adapter.is_available().await,
            None => false,
        }
    }

    /// Drops one cached adapter, or all of them.
    pub fn invalidate(&self, provider: Option<ProviderKind>) {
        let mut cache = self.cache.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match provider {
            Some(kind) => {
                if cache.remove(&kind).is_some() {
                    info!(provider = ?kind, "Invalidated cached adapter");
                }
            }
            None => {
                let count = cache.len();
                cache.clear();
                info!(count, "Invalidated all cached adapters");
            }
        }
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
