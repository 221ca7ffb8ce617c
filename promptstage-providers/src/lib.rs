// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Promptstage Providers
//!
//! Provider adapters, the capability catalog, and the adapter registry.
//!
//! Each supported provider gets one module implementing the
//! [`ProviderAdapter`] trait over the shared [`HttpClient`]. The
//! [`AdapterRegistry`] owns adapter construction and caching; nothing else
//! may construct or retain adapters.
//!
//! ## Key Types
//!
//! - [`ProviderAdapter`] - Uniform async interface every provider implements
//! - [`AdapterRegistry`] - Caching factory, invalidated on credential change
//! - [`Credential`] - API key or key pair, with per-provider shape checks
//! - [`catalog`] - Static capability descriptors per provider
//!
//! ## Providers
//!
//! - [`google`] - Gemini image models and Veo video models
//! - [`chatgpt`] - DALL-E 3 image generation
//! - [`anthropic`] - Prompt work and image analysis (no image output)
//! - [`kling`] - Kling image and video generation (JWT-authenticated)

pub mod adapter;
pub mod anthropic;
pub mod catalog;
pub mod chatgpt;
pub mod client;
pub mod credentials;
pub mod google;
pub mod kling;
pub mod registry;

pub use adapter::ProviderAdapter;
pub use client::{ApiResponse, HttpClient, RetryStrategy};
pub use credentials::Credential;
pub use registry::AdapterRegistry;
