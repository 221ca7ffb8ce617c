//! The capability catalog.
//!
//! One static [`ProviderFeatures`] descriptor per provider, declared here
//! and nowhere else. Adapters consult their own descriptor to short-circuit
//! unsupported operations before any network traffic; UI layers use it to
//! decide which controls to show.

use promptstage_core::{AspectRatio, ProviderFeatures, ProviderKind, Quality};

/// Every ratio the pipeline knows about.
const ALL_RATIOS: &[AspectRatio] = &[
    AspectRatio::Square,
    AspectRatio::Wide,
    AspectRatio::Tall,
    AspectRatio::Classic,
    AspectRatio::Portrait,
];

/// Google: Gemini image models plus Veo for video.
static GOOGLE: ProviderFeatures = ProviderFeatures {
    id: ProviderKind::Google,
    prompt_optimization: true,
    image_generation: true,
    image_analysis: false,
    video_generation: true,
    supported_ratios: ALL_RATIOS,
    supported_qualities: &[Quality::Standard, Quality::High, Quality::Ultra],
    custom_settings: &["camera", "lighting", "color", "style"],
    max_prompt_length: 4000,
    default_image_model: Some("gemini-2.5-flash-image"),
    default_video_model: Some("veo-3.0-generate-001"),
};

/// ChatGPT: DALL-E 3 image generation only.
static CHATGPT: ProviderFeatures = ProviderFeatures {
    id: ProviderKind::ChatGpt,
    prompt_optimization: true,
    image_generation: true,
    image_analysis: false,
    video_generation: false,
    supported_ratios: ALL_RATIOS,
    supported_qualities: &[Quality::Standard, Quality::High],
    custom_settings: &["style", "size"],
    max_prompt_length: 4000,
    default_image_model: Some("dall-e-3"),
    default_video_model: None,
};

/// Anthropic: prompt work and image analysis; no image or video output.
static ANTHROPIC: ProviderFeatures = ProviderFeatures {
    id: ProviderKind::Anthropic,
    prompt_optimization: true,
    image_generation: false,
    image_analysis: true,
    video_generation: false,
    supported_ratios: &[],
    supported_qualities: &[],
    custom_settings: &["analysis"],
    max_prompt_length: 200_000,
    default_image_model: None,
    default_video_model: None,
};

/// Kling: image and video generation behind JWT auth.
static KLING: ProviderFeatures = ProviderFeatures {
    id: ProviderKind::Kling,
    prompt_optimization: true,
    image_generation: true,
    image_analysis: false,
    video_generation: true,
    supported_ratios: ALL_RATIOS,
    supported_qualities: &[Quality::Standard, Quality::High],
    custom_settings: &["style", "model"],
    max_prompt_length: 2000,
    default_image_model: Some("kling-v1"),
    default_video_model: Some("kling-v1"),
};

/// Returns the capability descriptor for a provider.
pub fn features(provider: ProviderKind) -> &'static ProviderFeatures {
    match provider {
        ProviderKind::Google => &GOOGLE,
        ProviderKind::ChatGpt => &CHATGPT,
        ProviderKind::Anthropic => &ANTHROPIC,
        ProviderKind::Kling => &KLING,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use promptstage_core::GenerationKind;

    #[test]
    fn test_descriptor_ids_match_lookup_key() {
        for kind in ProviderKind::all() {
            assert_eq!(features(*kind).id, *kind);
        }
    }

    #[test]
    fn test_anthropic_has_no_generation_output() {
        let anthropic = features(ProviderKind::Anthropic);
        assert!(!anthropic.supports(GenerationKind::Image));
        assert!(!anthropic.supports(GenerationKind::Video));
        assert!(anthropic.supports(GenerationKind::Text));
        assert!(anthropic.image_analysis);
    }

    #[test]
    fn test_video_capable_providers() {
        let video: Vec<_> = ProviderKind::all()
            .iter()
            .filter(|k| features(**k).supports(GenerationKind::Video))
            .copied()
            .collect();
        assert_eq!(video, vec![ProviderKind::Google, ProviderKind::Kling]);
    }

    #[test]
    fn test_video_providers_declare_default_model() {
        for kind in ProviderKind::all() {
            let f = features(*kind);
            assert_eq!(f.video_generation, f.default_video_model.is_some());
            assert_eq!(f.image_generation, f.default_image_model.is_some());
        }
    }
}
