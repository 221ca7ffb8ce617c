//! Provider-related types.
//!
//! This module contains types related to AI generation providers:
//! - [`ProviderKind`] - Enum of supported providers
//! - [`ProviderFeatures`] - Static capability descriptor
//! - [`GenerationKind`], [`AspectRatio`], [`Quality`] - Operation vocabulary

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Provider Kind
// ============================================================================

/// Supported AI generation providers.
///
/// This is a closed set: adding a provider means touching every exhaustive
/// match, which is intentional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Google AI (Gemini image models, Veo video models)
    Google,
    /// OpenAI ChatGPT (DALL-E image models)
    ChatGpt,
    /// Anthropic Claude (prompt work and image analysis only)
    Anthropic,
    /// Kling AI (image and video generation)
    Kling,
}

impl ProviderKind {
    /// Returns the display name for this provider.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::ChatGpt => "ChatGPT",
            Self::Anthropic => "Anthropic",
            Self::Kling => "Kling",
        }
    }

    /// Returns the lowercase identifier used in settings files and
    /// keychain entries.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::ChatGpt => "chatgpt",
            Self::Anthropic => "anthropic",
            Self::Kling => "kling",
        }
    }

    /// Returns all provider kinds.
    pub fn all() -> &'static [ProviderKind] {
        &[Self::Google, Self::ChatGpt, Self::Anthropic, Self::Kling]
    }

    /// Parses a slug back into a provider kind.
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.slug() == slug)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Operation Vocabulary
// ============================================================================

/// The kind of content a generation call produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationKind {
    /// Text generation or prompt optimization.
    Text,
    /// Still image generation.
    Image,
    /// Video generation.
    Video,
}

impl GenerationKind {
    /// Returns the lowercase name used in ledger records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for GenerationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output aspect ratios a provider may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 1:1
    #[serde(rename = "1:1")]
    Square,
    /// 16:9
    #[serde(rename = "16:9")]
    Wide,
    /// 9:16
    #[serde(rename = "9:16")]
    Tall,
    /// 4:3
    #[serde(rename = "4:3")]
    Classic,
    /// 3:4
    #[serde(rename = "3:4")]
    Portrait,
}

impl AspectRatio {
    /// Returns the "W:H" notation providers expect.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Wide => "16:9",
            Self::Tall => "9:16",
            Self::Classic => "4:3",
            Self::Portrait => "3:4",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output quality tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// Baseline quality.
    Standard,
    /// High quality.
    High,
    /// Maximum quality tier.
    Ultra,
}

impl Quality {
    /// Returns the lowercase name used in provider requests.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::High => "high",
            Self::Ultra => "ultra",
        }
    }
}

// ============================================================================
// Provider Features
// ============================================================================

/// Static capability descriptor for a provider.
///
/// Declared once per provider in the capability catalog and valid for the
/// process lifetime. Adapters consult their own descriptor to short-circuit
/// unsupported operations before any network traffic.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderFeatures {
    /// The provider this descriptor belongs to.
    pub id: ProviderKind,
    /// Whether the provider supports prompt optimization.
    pub prompt_optimization: bool,
    /// Whether the provider can generate images.
    pub image_generation: bool,
    /// Whether the provider can analyze images.
    pub image_analysis: bool,
    /// Whether the provider can generate video.
    pub video_generation: bool,
    /// Aspect ratios accepted by the provider's generation endpoints.
    pub supported_ratios: &'static [AspectRatio],
    /// Quality tiers accepted by the provider.
    pub supported_qualities: &'static [Quality],
    /// Names of the custom setting groups the provider honors
    /// (e.g. "camera", "lighting", "style").
    pub custom_settings: &'static [&'static str],
    /// Maximum prompt length in characters.
    pub max_prompt_length: usize,
    /// Default model for image generation, if supported.
    pub default_image_model: Option<&'static str>,
    /// Default model for video generation, if supported.
    pub default_video_model: Option<&'static str>,
}

impl ProviderFeatures {
    /// Returns true if the provider advertises the given operation kind.
    pub fn supports(&self, kind: GenerationKind) -> bool {
        match kind {
            GenerationKind::Text => self.prompt_optimization,
            GenerationKind::Image => self.image_generation,
            GenerationKind::Video => self.video_generation,
        }
    }

    /// Returns true if the ratio is accepted by this provider.
    pub fn supports_ratio(&self, ratio: AspectRatio) -> bool {
        self.supported_ratios.contains(&ratio)
    }

    /// Returns true if the quality tier is accepted by this provider.
    pub fn supports_quality(&self, quality: Quality) -> bool {
        self.supported_qualities.contains(&quality)
    }
}

// ============================================================================
// Tests
// ============================================================================
