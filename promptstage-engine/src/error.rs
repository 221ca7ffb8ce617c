//! Controller error types.
//!
//! [`ControllerError`] separates adapter construction failures (credential
//! problems, shape checks) from call failures (network, quota, safety) so
//! callers can tell "fix your key" apart from "try again".

use thiserror::Error;

use promptstage_core::GenerationError;
use promptstage_store::StoreError;

/// Errors surfaced by the generation controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Adapter construction failed before any call was attempted.
    #[error("Adapter construction failed: {0}")]
    Construction(#[source] GenerationError),

    /// A generation call failed after dispatch.
    #[error("Generation call failed: {0}")]
    Call(#[source] GenerationError),

    /// No provider has a stored credential.
    #[error("No provider has a stored credential")]
    NoCredentials,

    /// The controller has no ready provider selected.
    #[error("Controller is not ready")]
    NotReady,

    /// A persistence operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ControllerError {
    /// Returns true when the underlying cause is a credential problem.
    pub fn is_credential_failure(&self) -> bool {
        match self {
            Self::Construction(e) | Self::Call(e) => e.is_credential_failure(),
            Self::NoCredentials => true,
            Self::NotReady | Self::Store(_) => false,
        }
    }
}
