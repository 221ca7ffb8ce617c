// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Promptstage Core
//!
//! Core types, models, and the error taxonomy for the Promptstage
//! generation-orchestration layer.
//!
//! This crate provides the foundational abstractions used across all other
//! Promptstage crates, including:
//!
//! - Domain models (providers, structured settings, requests, results)
//! - The uniform [`GenerationError`] taxonomy
//! - Usage-accounting records and token/cost estimation
//!
//! ## Key Types
//!
//! ### Provider Types
//! - [`ProviderKind`] - Enum of all supported AI providers
//! - [`ProviderFeatures`] - Static capability descriptor per provider
//!
//! ### Settings Types
//! - [`StructuredSettings`] - Camera/lighting/color parameters a user
//!   configures instead of writing prose
//! - [`CameraSettings`], [`LightingSettings`], [`ColorSettings`]
//!
//! ### Request/Result Types
//! - [`GenerationRequest`] - One generation attempt (text/image/video)
//! - [`GenerationResult`] - Output handles plus token usage
//!
//! ### Usage Accounting
//! - [`UsageRecord`] - One record per attempted call
//! - [`SessionStats`] - Aggregate over the current session
//! - [`tokens::estimate_tokens`] - Script-aware token heuristic

pub mod error;
pub mod models;
pub mod tokens;

// Re-export error types
pub use error::GenerationError;

// Re-export all model types
pub use models::{
    // Provider types
    AspectRatio,
    GenerationKind,
    ProviderFeatures,
    ProviderKind,
    Quality,
    // Settings types
    CameraPosition,
    CameraSettings,
    ColorContrast,
    ColorPalette,
    ColorSaturation,
    ColorSettings,
    DepthOfField,
    LensType,
    LightDirection,
    LightIntensity,
    LightType,
    LightingSettings,
    MotionBlur,
    ShadowStyle,
    StructuredSettings,
    // Request/result types
    AssetRef,
    GenerationOptions,
    GenerationRequest,
    GenerationResult,
    OutputAsset,
    TokenUsage,
    // Usage accounting
    DailyUsage,
    SessionStats,
    UsageRecord,
};
