// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Promptstage Store
//!
//! Persistence and state for the generation pipeline.
//!
//! This crate provides:
//!
//! - **`UsageLedger`**: Session and per-day usage accounting with watch
//!   channels and JSON persistence
//! - **`CredentialStore`**: Credential access behind a trait, with a system
//!   keychain implementation and an in-memory one for tests
//! - **`SettingsStore`**: Generation defaults with persistence
//! - **Persistence**: File I/O helpers for JSON data
//!
//! ## Usage
//!
//! ```ignore
//! use promptstage_store::UsageLedger;
//! use promptstage_core::GenerationKind;
//!
//! let ledger = UsageLedger::new(path);
//! ledger.record("dall-e-3", GenerationKind::Image, prompt, None).await?;
//!
//! let mut rx = ledger.subscribe();
//! while rx.changed().await.is_ok() {
//!     println!("Ledger updated!");
//! }
//! ```

pub mod credentials;
pub mod error;
pub mod ledger;
pub mod persistence;
pub mod settings_store;

pub use credentials::{CredentialStore, KeychainCredentialStore, MemoryCredentialStore};
pub use error::StoreError;
pub use ledger::UsageLedger;
pub use persistence::{
    default_config_dir, default_ledger_path, default_settings_path, load_json,
    load_json_or_default, save_json,
};
pub use settings_store::{GenerationDefaults, SettingsStore};
