// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Promptstage Engine
//!
//! The orchestration layer: one [`GenerationController`] per process owns
//! provider selection, dispatches generation calls through the adapter
//! registry, and attributes every call to the usage ledger.
//!
//! ## Key Types
//!
//! - [`GenerationController`] - Provider selection state machine and dispatcher
//! - [`ControllerError`] - Construction failures vs call failures
//! - [`NotificationSink`] - Where user-facing notifications go
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use promptstage_engine::GenerationController;
//! use promptstage_providers::AdapterRegistry;
//! use promptstage_store::{KeychainCredentialStore, SettingsStore, UsageLedger};
//!
//! let controller = GenerationController::with_tracing_sink(
//!     AdapterRegistry::new(),
//!     Arc::new(KeychainCredentialStore::new()),
//!     Arc::new(UsageLedger::open_default().await),
//!     Arc::new(SettingsStore::open_default().await),
//! );
//! controller.initialize().await?;
//! let result = controller.generate_image("a cat on a roof").await?;
//! ```

pub mod controller;
pub mod error;
pub mod notify;
pub mod telemetry;

pub use controller::{ControllerState, GenerationController, GenerationOutcome};
pub use error::ControllerError;
pub use notify::{Notification, NotificationKind, NotificationSink, TracingSink};
pub use telemetry::init_tracing;
