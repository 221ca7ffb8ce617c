//! The uniform adapter trait.
//!
//! Every provider module implements [`ProviderAdapter`]. The trait carries
//! default bodies for the pure operations (prompt optimization, settings
//! validation) so providers only write the network-facing parts.

use async_trait::async_trait;

use promptstage_core::models::StructuredSettings;
use promptstage_core::{
    GenerationError, GenerationKind, GenerationOptions, GenerationResult, ProviderFeatures,
    ProviderKind,
};
use promptstage_prompt::{CompiledPrompt, compile};

use crate::catalog;

/// Uniform async interface over one configured provider.
///
/// Adapters are cheap handles over the shared HTTP client; the registry
/// caches them per provider and credential.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Which provider this adapter talks to.
    fn kind(&self) -> ProviderKind;

    /// The provider's static capability descriptor.
    fn features(&self) -> &'static ProviderFeatures {
        catalog::features(self.kind())
    }

    /// Compiles a base prompt and settings into provider-ready prose.
    ///
    /// Pure; never raises. Providers with post-processing beyond the shared
    /// compiler override this.
    fn optimize_prompt(&self, base: &str, settings: &StructuredSettings) -> CompiledPrompt {
        compile(base, settings, self.kind())
    }

    /// Checks ratio and quality membership against the descriptor.
    fn validate_settings(&self, settings: &StructuredSettings) -> bool {
        let features = self.features();
        settings
            .aspect_ratio
            .is_none_or(|ratio| features.supports_ratio(ratio))
            && settings
                .quality
                .is_none_or(|quality| features.supports_quality(quality))
    }

    /// Whether the provider can currently serve calls.
    ///
    /// May perform a live probe; must never raise.
    async fn is_available(&self) -> bool;

    /// Generates one or more images.
    async fn generate_image(
        &self,
        options: &GenerationOptions,
    ) -> Result<GenerationResult, GenerationError>;

    /// Generates a video.
    async fn generate_video(
        &self,
        options: &GenerationOptions,
    ) -> Result<GenerationResult, GenerationError>;
}

impl std::fmt::Debug for dyn ProviderAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderAdapter")
            .field("kind", &self.kind())
            .finish()
    }
}

/// Short-circuits an operation the descriptor does not advertise.
///
/// This is the local, synchronous check that guarantees no network call is
/// attempted for an unsupported operation.
pub fn ensure_supported(
    features: &ProviderFeatures,
    kind: GenerationKind,
) -> Result<(), GenerationError> {
    if features.supports(kind) {
        Ok(())
    } else {
        Err(GenerationError::UnsupportedOperation {
            provider: features.id,
            operation: format!("{kind} generation"),
        })
    }
}
