//! Domain models for Promptstage.
//!
//! Models are grouped by concern:
//! - [`provider`] - Provider identity and capability descriptors
//! - [`settings`] - Structured camera/lighting/color settings
//! - [`request`] - Generation requests, options, and results
//! - [`usage`] - Usage-accounting records and aggregates

pub mod provider;
pub mod request;
pub mod settings;
pub mod usage;

pub use provider::{AspectRatio, GenerationKind, ProviderFeatures, ProviderKind, Quality};
pub use request::{
    AssetRef, GenerationOptions, GenerationRequest, GenerationResult, OutputAsset, TokenUsage,
};
pub use settings::{
    CameraPosition, CameraSettings, ColorContrast, ColorPalette, ColorSaturation, ColorSettings,
    DepthOfField, LensType, LightDirection, LightIntensity, LightType, LightingSettings,
    MotionBlur, ShadowStyle, StructuredSettings,
};
pub use usage::{DailyUsage, SessionStats, UsageRecord};
