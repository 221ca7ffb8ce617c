//! Persistent generation defaults.
//!
//! Holds the provider chosen per generation kind, the structured scene
//! settings the prompt compiler consumes, and the last provider the user
//! selected. Saved to `settings.json` on every change.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{watch, RwLock};
use tracing::{debug, info};

use promptstage_core::{GenerationKind, ProviderKind, StructuredSettings};

use crate::error::StoreError;
use crate::persistence::{default_settings_path, load_json_or_default, save_json};

// ============================================================================
// Settings Shape
// ============================================================================

/// User-facing generation defaults.
///
/// Serialized in camelCase; missing fields fall back to defaults so older
/// settings files keep loading after upgrades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationDefaults {
    /// Preferred provider per generation kind.
    pub default_providers: HashMap<GenerationKind, ProviderKind>,
    /// Structured scene settings fed to the prompt compiler.
    pub structured: StructuredSettings,
    /// The provider last selected in the UI, if any.
    pub last_selected_provider: Option<ProviderKind>,
}

impl Default for GenerationDefaults {
    fn default() -> Self {
        let mut default_providers = HashMap::new();
        for kind in [
            GenerationKind::Text,
            GenerationKind::Image,
            GenerationKind::Video,
        ] {
            default_providers.insert(kind, ProviderKind::Google);
        }

        Self {
            default_providers,
            structured: StructuredSettings::default(),
            last_selected_provider: None,
        }
    }
}

impl GenerationDefaults {
    /// The preferred provider for a generation kind.
    ///
    /// Falls back to Google when the kind has no explicit entry.
    pub fn provider_for(&self, kind: GenerationKind) -> ProviderKind {
        self.default_providers
            .get(&kind)
            .copied()
            .unwrap_or(ProviderKind::Google)
    }
}

// ============================================================================
// Settings Store
// ============================================================================

/// Observable settings store with JSON persistence.
pub struct SettingsStore {
    inner: Arc<RwLock<GenerationDefaults>>,
    notify: watch::Sender<u64>,
    version: Arc<RwLock<u64>>,
    path: Option<PathBuf>,
}

impl SettingsStore {
    /// Creates a store persisted at the given path, starting from defaults.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            inner: Arc::new(RwLock::new(GenerationDefaults::default())),
            notify,
            version: Arc::new(RwLock::new(0)),
            path: Some(path.into()),
        }
    }

    /// Creates an in-memory store that never touches disk.
    pub fn in_memory() -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            inner: Arc::new(RwLock::new(GenerationDefaults::default())),
            notify,
            version: Arc::new(RwLock::new(0)),
            path: None,
        }
    }

    /// Opens the store at the given path, loading any saved settings.
    /// A missing or unreadable file starts from defaults.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let store = Self::new(path);
        store.reload().await;
        store
    }

    /// Opens the store at the platform default path.
    pub async fn open_default() -> Self {
        Self::open(default_settings_path()).await
    }

    /// Reloads settings from disk, replacing the in-memory copy.
    pub async fn reload(&self) {
        let Some(path) = &self.path else { return };
        let loaded: GenerationDefaults = load_json_or_default(path).await;
        {
            let mut inner = self.inner.write().await;
            *inner = loaded;
        }
        debug!(path = %path.display(), "Settings loaded");
    }

    // ========================================================================
    // Access
    // ========================================================================

    /// Returns a snapshot of the current settings.
    pub async fn get(&self) -> GenerationDefaults {
        self.inner.read().await.clone()
    }

    /// The preferred provider for a generation kind.
    pub async fn default_provider(&self, kind: GenerationKind) -> ProviderKind {
        self.inner.read().await.provider_for(kind)
    }

    /// The structured scene settings.
    pub async fn structured(&self) -> StructuredSettings {
        self.inner.read().await.structured.clone()
    }

    /// The last provider selected in the UI.
    pub async fn last_selected_provider(&self) -> Option<ProviderKind> {
        self.inner.read().await.last_selected_provider
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Sets the preferred provider for a generation kind.
    pub async fn set_default_provider(
        &self,
        kind: GenerationKind,
        provider: ProviderKind,
    ) -> Result<(), StoreError> {
        {
            let mut inner = self.inner.write().await;
            inner.default_providers.insert(kind, provider);
        }
        self.persist().await?;
        self.notify_change().await;
        info!(kind = %kind, provider = ?provider, "Default provider changed");
        Ok(())
    }

    /// Replaces the structured scene settings.
    pub async fn set_structured(&self, structured: StructuredSettings) -> Result<(), StoreError> {
        {
            let mut inner = self.inner.write().await;
            inner.structured = structured;
        }
        self.persist().await?;
        self.notify_change().await;
        Ok(())
    }

    /// Records the provider last selected in the UI.
    pub async fn set_last_selected_provider(
        &self,
        provider: Option<ProviderKind>,
    ) -> Result<(), StoreError> {
        {
            let mut inner = self.inner.write().await;
            inner.last_selected_provider = provider;
        }
        self.persist().await?;
        self.notify_change().await;
        Ok(())
    }

    // ========================================================================
    // Observable
    // ========================================================================

    /// Subscribes to settings changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    async fn notify_change(&self) {
        let mut version = self.version.write().await;
        *version += 1;
        let _ = self.notify.send(*version);
    }

    async fn persist(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let snapshot = self.inner.read().await.clone();
        save_json(path, &snapshot).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_defaults_prefer_google() {
        let store = SettingsStore::in_memory();
        assert_eq!(
            store.default_provider(GenerationKind::Image).await,
            ProviderKind::Google
        );
        assert_eq!(
            store.default_provider(GenerationKind::Video).await,
            ProviderKind::Google
        );
        assert!(store.last_selected_provider().await.is_none());
    }

    #[tokio::test]
    async fn test_set_default_provider() {
        let store = SettingsStore::in_memory();
        store
            .set_default_provider(GenerationKind::Image, ProviderKind::ChatGpt)
            .await
            .unwrap();

        assert_eq!(
            store.default_provider(GenerationKind::Image).await,
            ProviderKind::ChatGpt
        );
        // Other kinds are untouched
        assert_eq!(
            store.default_provider(GenerationKind::Video).await,
            ProviderKind::Google
        );
    }

    #[tokio::test]
    async fn test_settings_survive_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("settings.json");

        {
            let store = SettingsStore::open(&path).await;
            store
                .set_default_provider(GenerationKind::Video, ProviderKind::Kling)
                .await
                .unwrap();
            store
                .set_last_selected_provider(Some(ProviderKind::Kling))
                .await
                .unwrap();
        }

        let reopened = SettingsStore::open(&path).await;
        assert_eq!(
            reopened.default_provider(GenerationKind::Video).await,
            ProviderKind::Kling
        );
        assert_eq!(
            reopened.last_selected_provider().await,
            Some(ProviderKind::Kling)
        );
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let store = SettingsStore::in_memory();
        let mut rx = store.subscribe();

        store
            .set_default_provider(GenerationKind::Text, ProviderKind::Anthropic)
            .await
            .unwrap();

        assert!(rx.changed().await.is_ok());
    }
}
