//! Structured visual settings.
//!
//! Users tune these instead of writing prose prompts; the prompt compiler
//! turns them into natural-language clauses. Every field has a documented
//! default, and a field left at its default contributes no prompt text.

use serde::{Deserialize, Serialize};

use super::provider::{AspectRatio, Quality};

// ============================================================================
// Camera
// ============================================================================

/// Camera placement relative to the subject. Default: [`CameraPosition::Front`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CameraPosition {
    /// In front of the subject.
    #[default]
    Front,
    /// Behind the subject.
    Back,
    /// To the side of the subject.
    Side,
    /// Above the subject.
    Top,
    /// Below the subject.
    Bottom,
}

/// Lens family. Default: [`LensType::Standard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LensType {
    /// 50mm standard lens.
    #[default]
    Standard,
    /// 24mm wide-angle lens.
    Wide,
    /// 85mm telephoto lens.
    Telephoto,
    /// 100mm macro lens.
    Macro,
}

/// Depth-of-field behavior. Default: [`DepthOfField::Medium`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DepthOfField {
    /// Balanced focus falloff.
    #[default]
    Medium,
    /// Blurred background, sharp subject.
    Shallow,
    /// Everything in focus.
    Deep,
}

/// Motion blur amount. Default: [`MotionBlur::None`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MotionBlur {
    /// Frozen motion.
    #[default]
    None,
    /// Slight trailing on fast movement.
    Subtle,
    /// Pronounced blur conveying speed.
    Strong,
}

/// Camera parameters.
///
/// `screen_x`/`screen_y` place the subject on rule-of-thirds lines:
/// -1 = left/lower third, 0 = center, 1 = right/upper third.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CameraSettings {
    /// Camera placement. Default `front`.
    pub position: CameraPosition,
    /// Distance from the subject in meters (1-10). Default unset.
    pub distance: Option<u8>,
    /// Lens family. Default `standard`.
    pub lens: LensType,
    /// Pan angle in degrees; negative pans left. Default 0.
    pub pan_angle: i16,
    /// Tilt angle in degrees; positive tilts upward. Default 0.
    pub tilt_angle: i16,
    /// Roll angle in degrees. Default 0.
    pub roll_angle: i16,
    /// Horizontal thirds offset (-1..=1). Default 0 (center).
    pub screen_x: i8,
    /// Vertical thirds offset (-1..=1). Default 0 (center).
    pub screen_y: i8,
    /// Depth of field. Default `medium`.
    pub depth_of_field: DepthOfField,
    /// Motion blur. Default `none`.
    pub motion_blur: MotionBlur,
}

// ============================================================================
// Lighting
// ============================================================================

/// Direction the key light comes from. Default: [`LightDirection::Front`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LightDirection {
    /// Light from the front.
    #[default]
    Front,
    /// Light from behind the subject.
    Back,
    /// Light from the side.
    Side,
    /// Light from above.
    Top,
    /// Light from below.
    Bottom,
}

/// Key light intensity. Default: [`LightIntensity::Medium`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LightIntensity {
    /// Balanced exposure.
    #[default]
    Medium,
    /// Soft, gentle light.
    Soft,
    /// Bright, high-key light.
    Bright,
    /// Dim, low-key light.
    Dim,
}

/// Overall lighting setup. Default: [`LightType::Natural`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LightType {
    /// Ambient daylight.
    #[default]
    Natural,
    /// Controlled studio lighting.
    Studio,
    /// Warm golden-hour light.
    Golden,
    /// Cool blue-hour light.
    Blue,
    /// High-contrast dramatic lighting.
    Dramatic,
}

/// Shadow rendering. Default: [`ShadowStyle::Natural`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShadowStyle {
    /// Whatever the light source produces.
    #[default]
    Natural,
    /// Diffused, soft-edged shadows.
    Soft,
    /// Crisp, hard-edged shadows.
    Hard,
    /// Long, stretched shadows.
    Long,
}

/// Lighting parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LightingSettings {
    /// Key light direction. Default `front`.
    pub direction: LightDirection,
    /// Key light intensity. Default `medium`.
    pub intensity: LightIntensity,
    /// Shadow rendering. Default `natural`.
    pub shadows: ShadowStyle,
    /// Overall setup. Default `natural`.
    pub light_type: LightType,
    /// Visible light shafts. Default off.
    pub volumetric: bool,
    /// Rim light separating subject from background. Default off.
    pub rim_light: bool,
    /// Force golden-hour warmth regardless of `light_type`. Default off.
    pub golden_hour: bool,
    /// Atmospheric haze. Default off.
    pub haze: bool,
    /// Color temperature in Kelvin. Default unset.
    pub color_temperature: Option<u16>,
}

// ============================================================================
// Color
// ============================================================================

/// Color palette. Default: [`ColorPalette::Natural`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ColorPalette {
    /// Unbiased, true-to-life color.
    #[default]
    Natural,
    /// Warm-leaning tones.
    Warm,
    /// Cool-leaning tones.
    Cool,
    /// Black and white.
    Monochrome,
    /// Faded vintage tones.
    Vintage,
    /// Punchy high-contrast grade.
    HighContrast,
}

/// Saturation level. Default: [`ColorSaturation::Medium`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorSaturation {
    /// Balanced saturation.
    #[default]
    Medium,
    /// Muted color.
    Low,
    /// Rich color.
    High,
    /// Maximum vividness.
    Vivid,
}

/// Contrast level. Default: [`ColorContrast::Medium`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorContrast {
    /// Balanced contrast.
    #[default]
    Medium,
    /// Flat, low-contrast look.
    Low,
    /// Punchy contrast.
    High,
    /// Crushed blacks and bright highlights.
    Dramatic,
}

/// Color grading parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ColorSettings {
    /// Palette. Default `natural`.
    pub palette: ColorPalette,
    /// Saturation. Default `medium`.
    pub saturation: ColorSaturation,
    /// Contrast. Default `medium`.
    pub contrast: ColorContrast,
    /// Warm accent highlights. Default off.
    pub warm_accent: bool,
    /// Cool accent highlights. Default off.
    pub cool_accent: bool,
}

// ============================================================================
// Structured Settings
// ============================================================================

/// The full structured-settings record a user configures.
///
/// Serializes with `#[serde(default)]` throughout so partially saved
/// documents load cleanly; missing fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StructuredSettings {
    /// Camera parameters.
    pub camera: CameraSettings,
    /// Lighting parameters.
    pub lighting: LightingSettings,
    /// Color grading parameters.
    pub color: ColorSettings,
    /// Requested output aspect ratio. Default unset (provider default).
    pub aspect_ratio: Option<AspectRatio>,
    /// Requested quality tier. Default unset.
    pub quality: Option<Quality>,
    /// Style keyword; known values map to fixed phrases, unknown values
    /// pass through verbatim. Default unset.
    pub style: Option<String>,
}

impl StructuredSettings {
    /// Returns true if every field is at its documented default.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_all_suppressing() {
        let settings = StructuredSettings::default();
        assert!(settings.is_default());
        assert_eq!(settings.camera.position, CameraPosition::Front);
        assert_eq!(settings.camera.distance, None);
        assert_eq!(settings.lighting.intensity, LightIntensity::Medium);
        assert_eq!(settings.color.palette, ColorPalette::Natural);
        assert!(settings.style.is_none());
    }

    #[test]
    fn test_partial_document_roundtrip() {
        // A persisted document that only pins the camera position must load
        // with every other field at its default.
        let json = r#"{"camera": {"position": "top"}}"#;
        let settings: StructuredSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.camera.position, CameraPosition::Top);
        assert_eq!(settings.camera.lens, LensType::Standard);
        assert_eq!(settings.lighting, LightingSettings::default());

        let back = serde_json::to_string(&settings).unwrap();
        let again: StructuredSettings = serde_json::from_str(&back).unwrap();
        assert_eq!(settings, again);
    }

    #[test]
    fn test_high_contrast_snake_case() {
        let json = serde_json::to_string(&ColorPalette::HighContrast).unwrap();
        assert_eq!(json, "\"high_contrast\"");
    }
}
