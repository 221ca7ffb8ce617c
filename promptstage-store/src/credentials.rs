//! Credential storage.
//!
//! Provider credentials live in the system's secure credential storage:
//! - macOS: Keychain Services
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring, KDE Wallet)
//!
//! Access goes through the [`CredentialStore`] trait so the engine can run
//! against the real keychain in production and an in-memory map in tests.
//! Stored secrets never appear in logs; `Credential`'s `Debug` impl redacts
//! them.

use std::collections::HashMap;
use std::sync::Mutex;

use keyring::Entry;
use tracing::debug;

use promptstage_core::ProviderKind;
use promptstage_providers::Credential;

use crate::error::StoreError;

/// Service name prefix for Promptstage credentials.
const SERVICE_PREFIX: &str = "Promptstage";

/// Keychain account name for single-key providers.
const ACCOUNT_API_KEY: &str = "api_key";

/// Keychain account names for Kling's key pair.
const ACCOUNT_ACCESS_KEY: &str = "access_key";
const ACCOUNT_SECRET_KEY: &str = "secret_key";

// ============================================================================
// Trait
// ============================================================================

/// Synchronous credential storage keyed by provider.
pub trait CredentialStore: Send + Sync {
    /// Retrieves the stored credential for a provider.
    ///
    /// Returns `None` when nothing is stored or the stored value is empty.
    fn get(&self, provider: ProviderKind) -> Option<Credential>;

    /// Stores a credential, replacing any existing one.
    ///
    /// # Errors
    /// Fails when the credential's shape does not fit the provider (a key
    /// pair for an API-key provider or vice versa) or the backend rejects
    /// the write.
    fn set(&self, provider: ProviderKind, credential: &Credential) -> Result<(), StoreError>;

    /// Deletes the stored credential. Deleting an absent one is not an error.
    fn delete(&self, provider: ProviderKind) -> Result<(), StoreError>;

    /// Checks whether a credential is stored for the provider.
    fn has(&self, provider: ProviderKind) -> bool {
        self.get(provider).is_some()
    }
}

// ============================================================================
// Keychain Store
// ============================================================================

/// Credential store backed by the system keychain.
///
/// Each provider gets its own service entry, `Promptstage-{slug}`. Single-key
/// providers store one `api_key` account; Kling stores `access_key` and
/// `secret_key` accounts under the same service.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeychainCredentialStore;

impl KeychainCredentialStore {
    /// Creates a keychain-backed store.
    pub fn new() -> Self {
        Self
    }
}

fn service_name(provider: ProviderKind) -> String {
    format!("{SERVICE_PREFIX}-{}", provider.slug())
}

fn read_entry(service: &str, account: &str) -> Option<String> {
    let entry = Entry::new(service, account).ok()?;
    let secret = entry.get_password().ok()?;
    if secret.is_empty() { None } else { Some(secret) }
}

fn write_entry(service: &str, account: &str, secret: &str) -> Result<(), StoreError> {
    let entry = Entry::new(service, account)
        .map_err(|e| StoreError::Keychain(format!("Failed to create keychain entry: {e}")))?;
    entry
        .set_password(secret)
        .map_err(|e| StoreError::Keychain(format!("Failed to store credential: {e}")))
}

fn delete_entry(service: &str, account: &str) -> Result<(), StoreError> {
    let entry = Entry::new(service, account)
        .map_err(|e| StoreError::Keychain(format!("Failed to create keychain entry: {e}")))?;
    match entry.delete_credential() {
        Ok(()) => Ok(()),
        Err(keyring::Error::NoEntry) => Ok(()), // Already deleted, that's fine
        Err(e) => Err(StoreError::Keychain(format!(
            "Failed to delete credential: {e}"
        ))),
    }
}

impl CredentialStore for KeychainCredentialStore {
    fn get(&self, provider: ProviderKind) -> Option<Credential> {
        let service = service_name(provider);
        let credential = match provider {
            ProviderKind::Kling => {
                let access = read_entry(&service, ACCOUNT_ACCESS_KEY)?;
                let secret = read_entry(&service, ACCOUNT_SECRET_KEY)?;
                Credential::key_pair(access, secret)
            }
            _ => Credential::api_key(read_entry(&service, ACCOUNT_API_KEY)?),
        };

        debug!(provider = ?provider, "Credential retrieved from keychain");
        Some(credential)
    }

    fn set(&self, provider: ProviderKind, credential: &Credential) -> Result<(), StoreError> {
        let service = service_name(provider);
        match (provider, credential) {
            (ProviderKind::Kling, Credential::KeyPair { access_key, secret_key }) => {
                write_entry(&service, ACCOUNT_ACCESS_KEY, access_key)?;
                write_entry(&service, ACCOUNT_SECRET_KEY, secret_key)?;
            }
            (ProviderKind::Kling, Credential::ApiKey(_)) => {
                return Err(StoreError::Config(
                    "Kling requires an access/secret key pair".to_string(),
                ));
            }
            (_, Credential::ApiKey(key)) => {
                write_entry(&service, ACCOUNT_API_KEY, key)?;
            }
            (_, Credential::KeyPair { .. }) => {
                return Err(StoreError::Config(format!(
                    "{provider} expects a single API key"
                )));
            }
        }

        debug!(provider = ?provider, "Credential stored in keychain");
        Ok(())
    }

    fn delete(&self, provider: ProviderKind) -> Result<(), StoreError> {
        let service = service_name(provider);
        match provider {
            ProviderKind::Kling => {
                delete_entry(&service, ACCOUNT_ACCESS_KEY)?;
                delete_entry(&service, ACCOUNT_SECRET_KEY)?;
            }
            _ => delete_entry(&service, ACCOUNT_API_KEY)?,
        }

        debug!(provider = ?provider, "Credential deleted from keychain");
        Ok(())
    }
}

// ============================================================================
// Memory Store
// ============================================================================

/// In-memory credential store for tests and headless runs.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credentials: Mutex<HashMap<ProviderKind, Credential>>,
}

impl MemoryCredentialStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, provider: ProviderKind) -> Option<Credential> {
        self.credentials
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(&provider)
            .cloned()
    }

    fn set(&self, provider: ProviderKind, credential: &Credential) -> Result<(), StoreError> {
        self.credentials
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(provider, credential.clone());
        Ok(())
    }

    fn delete(&self, provider: ProviderKind) -> Result<(), StoreError> {
        self.credentials
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(&provider);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_name_format() {
        assert_eq!(service_name(ProviderKind::Google), "Promptstage-google");
        assert_eq!(service_name(ProviderKind::Kling), "Promptstage-kling");
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryCredentialStore::new();
        assert!(!store.has(ProviderKind::Google));

        let credential = Credential::api_key("AIzaSyTest");
        store.set(ProviderKind::Google, &credential).unwrap();
        assert_eq!(store.get(ProviderKind::Google), Some(credential));

        store.delete(ProviderKind::Google).unwrap();
        assert!(!store.has(ProviderKind::Google));
    }

    #[test]
    fn test_memory_store_keeps_providers_separate() {
        let store = MemoryCredentialStore::new();
        store
            .set(ProviderKind::Google, &Credential::api_key("AIzaSyOne"))
            .unwrap();
        store
            .set(ProviderKind::Kling, &Credential::key_pair("a", "b"))
            .unwrap();

        store.delete(ProviderKind::Google).unwrap();
        assert!(store.has(ProviderKind::Kling));
    }

    #[test]
    fn test_deleting_absent_credential_is_ok() {
        let store = MemoryCredentialStore::new();
        assert!(store.delete(ProviderKind::Anthropic).is_ok());
    }

    // Note: Actual keychain operations require platform access and are typically
    // run as integration tests. These unit tests verify the string formatting.
}
