//! Phrase tables for the prompt compiler.
//!
//! Every enumerated settings value maps to one fixed English phrase. The
//! tables are total over their enums so adding a variant without a phrase is
//! a compile error, and they are the only place prompt wording lives.

use promptstage_core::models::settings::{
    CameraPosition, ColorContrast, ColorPalette, ColorSaturation, DepthOfField, LensType,
    LightDirection, LightIntensity, LightType, MotionBlur, ShadowStyle,
};
use promptstage_core::{ProviderKind, Quality};

// ============================================================================
// Directives
// ============================================================================

/// Returns true if the base text already carries a generation verb or
/// quality marker appropriate for the provider, making a directive redundant.
pub fn has_directive(base: &str, provider: ProviderKind) -> bool {
    let lower = base.to_lowercase();
    match provider {
        // Image-model providers key off the quality marker they inject.
        ProviderKind::Google | ProviderKind::ChatGpt => lower.contains("photorealistic"),
        // Text-first providers key off an explicit generation verb.
        ProviderKind::Anthropic | ProviderKind::Kling => {
            lower.contains("create") || lower.contains("generate")
        }
    }
}

/// Wraps the base text in the provider's canonical generation directive.
pub fn apply_directive(base: &str, provider: ProviderKind) -> String {
    match provider {
        ProviderKind::Google => format!("Generate a photorealistic image of {base}"),
        ProviderKind::ChatGpt => format!("Create a photorealistic image of {base}"),
        ProviderKind::Anthropic => {
            format!("Create a detailed visual description for image generation: {base}")
        }
        ProviderKind::Kling => format!("Create a high-quality image: {base}"),
    }
}

// ============================================================================
// Style & Quality
// ============================================================================

/// Expands a style keyword into the provider's preferred phrasing.
///
/// Unknown keywords pass through verbatim; style is an open vocabulary.
pub fn style_phrase(style: &str, provider: ProviderKind) -> String {
    let expanded = match provider {
        ProviderKind::Google => None,
        ProviderKind::ChatGpt => match style {
            "realistic" => Some("photorealistic, detailed, high quality"),
            "artistic" => Some("artistic, creative, stylized"),
            "cartoon" => Some("cartoon style, colorful, fun"),
            "anime" => Some("anime style, Japanese animation"),
            _ => None,
        },
        ProviderKind::Anthropic => match style {
            "realistic" => Some("photorealistic with natural lighting and realistic textures"),
            "artistic" => Some("artistic interpretation with creative composition"),
            "cartoon" => Some("cartoon-style illustration with vibrant colors"),
            "anime" => Some("anime-style artwork with detailed character design"),
            _ => None,
        },
        ProviderKind::Kling => match style {
            "realistic" => Some("photorealistic, detailed, natural lighting"),
            "artistic" => Some("artistic style, creative composition"),
            "cartoon" => Some("cartoon style, colorful, playful"),
            "anime" => Some("anime style, Japanese animation aesthetic"),
            _ => None,
        },
    };

    let label = match provider {
        ProviderKind::Anthropic => "Visual style",
        _ => "Style",
    };
    format!("{label}: {}", expanded.unwrap_or(style))
}

/// Expands a quality tier into the provider's preferred phrasing.
pub fn quality_phrase(quality: Quality, provider: ProviderKind) -> String {
    let expanded = match provider {
        ProviderKind::Google => match quality {
            Quality::Standard => "high quality",
            Quality::High => "ultra high quality",
            Quality::Ultra => "maximum quality",
        },
        ProviderKind::ChatGpt => match quality {
            Quality::Standard => "high quality",
            Quality::High => "ultra high quality, detailed",
            Quality::Ultra => "HD quality, ultra detailed",
        },
        ProviderKind::Anthropic => match quality {
            Quality::Standard => "good quality, clear",
            Quality::High => "high-quality, detailed, professional",
            Quality::Ultra => "ultra-high quality, extremely detailed, professional grade",
        },
        ProviderKind::Kling => match quality {
            Quality::Standard => "good quality, clear",
            Quality::High => "high quality, detailed, professional",
            Quality::Ultra => "ultra high quality, extremely detailed",
        },
    };

    let label = match provider {
        ProviderKind::Anthropic => "Quality level",
        _ => "Quality",
    };
    format!("{label}: {expanded}")
}

// ============================================================================
// Camera
// ============================================================================

/// Spatial preposition phrase for the camera position.
pub fn camera_position_phrase(position: CameraPosition) -> &'static str {
    match position {
        CameraPosition::Front => "positioned in front of the subject",
        CameraPosition::Back => "positioned behind the subject",
        CameraPosition::Side => "positioned to the side of the subject",
        CameraPosition::Top => "positioned above the subject",
        CameraPosition::Bottom => "positioned below the subject",
    }
}

/// Framing phrase for the camera distance, in meters.
pub fn camera_distance_phrase(distance: u8) -> &'static str {
    match distance {
        1 => "captured from about 2 meters away for intimate framing",
        2 => "captured from about 2.5 meters away for close-up framing",
        3 => "captured from about 3 meters away for medium framing",
        4 => "captured from about 4 meters away for full-body proportions",
        5 => "captured from about 5 meters away for environmental context",
        _ => "captured from appropriate distance",
    }
}

/// Focal-length-and-effect phrase for the lens.
pub fn lens_phrase(lens: LensType) -> &'static str {
    match lens {
        LensType::Standard => "shot with a 50mm standard lens",
        LensType::Wide => "shot with a 24mm wide-angle lens for an expansive field of view",
        LensType::Telephoto => "shot with an 85mm telephoto lens compressing the background",
        LensType::Macro => "shot with a 100mm macro lens revealing fine detail",
    }
}

/// Signed-angle phrase for the camera tilt; sign chooses elevated/lowered.
pub fn tilt_phrase(tilt_angle: i16) -> String {
    let angle = tilt_angle.unsigned_abs();
    if tilt_angle > 0 {
        format!(
            "capture from a slightly elevated high-angle position, \
             angled downward at approximately {angle}\u{b0}"
        )
    } else {
        format!(
            "capture from a slightly lowered low-angle position, \
             angled upward at approximately {angle}\u{b0}"
        )
    }
}

/// Signed-angle phrase for the camera pan.
pub fn pan_phrase(pan_angle: i16) -> String {
    let angle = pan_angle.unsigned_abs();
    let side = if pan_angle > 0 { "right" } else { "left" };
    format!("panned {angle}\u{b0} to the {side}")
}

/// Signed-angle phrase for the camera roll; sign chooses the tilt direction.
pub fn roll_phrase(roll_angle: i16) -> String {
    let angle = roll_angle.unsigned_abs();
    let direction = if roll_angle > 0 {
        "clockwise"
    } else {
        "counterclockwise"
    };
    format!("frame rolled {angle}\u{b0} {direction} for a dutch-angle tilt")
}

/// Rule-of-thirds phrase chosen by the signs of the screen offsets.
///
/// Returns `None` when both offsets are centered.
pub fn screen_position_phrase(screen_x: i8, screen_y: i8) -> Option<String> {
    let horizontal = match screen_x.signum() {
        -1 => Some("left third"),
        1 => Some("right third"),
        _ => None,
    };
    let vertical = match screen_y.signum() {
        -1 => Some("lower third"),
        1 => Some("upper third"),
        _ => None,
    };

    match (horizontal, vertical) {
        (Some(h), Some(v)) => Some(format!(
            "subject placed at the intersection of the {h} and {v} lines"
        )),
        (Some(h), None) => Some(format!("subject placed on the {h} line")),
        (None, Some(v)) => Some(format!("subject placed on the {v} line")),
        (None, None) => None,
    }
}

/// Bokeh-behavior phrase for depth of field.
pub fn depth_of_field_phrase(dof: DepthOfField) -> &'static str {
    match dof {
        DepthOfField::Medium => "balanced depth of field",
        DepthOfField::Shallow => "shallow depth of field with a softly blurred background",
        DepthOfField::Deep => "deep focus keeping the entire scene sharp",
    }
}

/// Phrase for non-default motion blur.
pub fn motion_blur_phrase(blur: MotionBlur) -> &'static str {
    match blur {
        MotionBlur::None => "frozen motion",
        MotionBlur::Subtle => "subtle motion blur on fast movement",
        MotionBlur::Strong => "strong motion blur conveying speed",
    }
}

// ============================================================================
// Lighting
// ============================================================================

/// Phrase for the key light direction.
pub fn light_direction_phrase(direction: LightDirection) -> &'static str {
    match direction {
        LightDirection::Front => "illuminate the scene with light coming from the front",
        LightDirection::Back => "illuminate the scene with light coming from behind the subject",
        LightDirection::Side => "illuminate the scene with light coming from the side",
        LightDirection::Top => "illuminate the scene with light coming from above",
        LightDirection::Bottom => "illuminate the scene with light coming from below",
    }
}

/// Phrase for the key light intensity.
pub fn light_intensity_phrase(intensity: LightIntensity) -> &'static str {
    match intensity {
        LightIntensity::Medium => "balanced lighting",
        LightIntensity::Soft => "soft, gentle lighting",
        LightIntensity::Bright => "bright, high-key lighting",
        LightIntensity::Dim => "dim, low-key lighting",
    }
}

/// Phrase for the overall lighting setup.
pub fn light_type_phrase(light_type: LightType) -> &'static str {
    match light_type {
        LightType::Natural => "natural ambient daylight",
        LightType::Studio => "controlled studio lighting",
        LightType::Golden => "warm golden-hour glow",
        LightType::Blue => "cool blue-hour tones",
        LightType::Dramatic => "high-contrast dramatic lighting",
    }
}

/// Phrase for shadow rendering.
pub fn shadow_phrase(shadows: ShadowStyle) -> &'static str {
    match shadows {
        ShadowStyle::Natural => "natural shadows",
        ShadowStyle::Soft => "soft diffused shadows",
        ShadowStyle::Hard => "crisp hard-edged shadows",
        ShadowStyle::Long => "long stretched shadows",
    }
}

/// Phrase pinning the color temperature in Kelvin.
pub fn color_temperature_phrase(kelvin: u16) -> String {
    format!("maintain balanced exposure around {kelvin}K")
}

// ============================================================================
// Color
// ============================================================================

/// Phrase for the color palette.
pub fn palette_phrase(palette: ColorPalette) -> &'static str {
    match palette {
        ColorPalette::Natural => "natural true-to-life color",
        ColorPalette::Warm => "a warm color palette",
        ColorPalette::Cool => "a cool color palette",
        ColorPalette::Monochrome => "a monochrome black-and-white palette",
        ColorPalette::Vintage => "faded vintage tones",
        ColorPalette::HighContrast => "a punchy high-contrast palette",
    }
}

/// Phrase for the saturation level.
pub fn saturation_phrase(saturation: ColorSaturation) -> &'static str {
    match saturation {
        ColorSaturation::Medium => "balanced saturation",
        ColorSaturation::Low => "muted, desaturated color",
        ColorSaturation::High => "rich, saturated color",
        ColorSaturation::Vivid => "vivid, maximally saturated color",
    }
}

/// Phrase for the contrast level.
pub fn contrast_phrase(contrast: ColorContrast) -> &'static str {
    match contrast {
        ColorContrast::Medium => "balanced contrast",
        ColorContrast::Low => "flat, low-contrast grading",
        ColorContrast::High => "punchy, high-contrast grading",
        ColorContrast::Dramatic => "dramatic contrast with crushed blacks and bright highlights",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_detection_per_provider() {
        assert!(has_directive(
            "a photorealistic portrait",
            ProviderKind::ChatGpt
        ));
        assert!(!has_directive("a portrait", ProviderKind::ChatGpt));
        assert!(has_directive("create a scene", ProviderKind::Kling));
        assert!(has_directive("Generate a city", ProviderKind::Anthropic));
        assert!(!has_directive("a city at night", ProviderKind::Anthropic));
    }

    #[test]
    fn test_unknown_style_passes_through() {
        let phrase = style_phrase("watercolor", ProviderKind::ChatGpt);
        assert_eq!(phrase, "Style: watercolor");
        let known = style_phrase("anime", ProviderKind::Kling);
        assert_eq!(known, "Style: anime style, Japanese animation aesthetic");
    }

    #[test]
    fn test_tilt_sign_chooses_elevation() {
        assert!(tilt_phrase(15).contains("elevated"));
        assert!(tilt_phrase(15).contains("15\u{b0}"));
        assert!(tilt_phrase(-20).contains("lowered"));
    }

    #[test]
    fn test_screen_position_thirds() {
        assert_eq!(screen_position_phrase(0, 0), None);
        let p = screen_position_phrase(-1, 0).unwrap();
        assert!(p.contains("left third"));
        let both = screen_position_phrase(1, 1).unwrap();
        assert!(both.contains("right third") && both.contains("upper third"));
    }

    #[test]
    fn test_distance_out_of_range_falls_back() {
        assert_eq!(
            camera_distance_phrase(9),
            "captured from appropriate distance"
        );
    }
}
