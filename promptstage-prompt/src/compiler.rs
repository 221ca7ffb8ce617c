//! The clause-rule compiler.
//!
//! Compilation runs in a fixed order: normalize the base text, prepend the
//! provider directive if the text lacks one, then walk the rule table
//! (style, quality, camera, lighting, color), appending one clause per rule
//! whose predicate fires. Rules see only the settings and the provider; the
//! directive step is the only one that inspects the base text.
//!
//! Fields left at their documented default never contribute text, so an
//! untouched settings record compiles to the base prompt alone.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use promptstage_core::models::settings::{
    CameraSettings, ColorSettings, LightingSettings, StructuredSettings,
};
use promptstage_core::tokens::estimate_tokens;
use promptstage_core::ProviderKind;

use crate::phrases;

// ============================================================================
// Output
// ============================================================================

/// The compiler's output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledPrompt {
    /// Final prompt text.
    pub text: String,
    /// Names of the clauses that actually fired, in application order.
    pub applied_techniques: Vec<&'static str>,
    /// Estimated token count of the final text.
    pub estimated_tokens: u32,
    /// The normalized base text the prompt was built from.
    pub source: String,
    /// Provider the prompt was compiled for.
    pub provider: ProviderKind,
}

// ============================================================================
// Clause Rules
// ============================================================================

/// Inputs visible to a clause rule.
#[derive(Debug, Clone, Copy)]
pub struct ClauseContext<'a> {
    /// The structured settings being compiled.
    pub settings: &'a StructuredSettings,
    /// Provider the prompt is being compiled for.
    pub provider: ProviderKind,
}

/// One entry in the fixed-order rule table.
///
/// `applies` must be a pure predicate and `render` must be deterministic;
/// the compiler's reproducibility guarantee rests on both.
pub struct ClauseRule {
    /// Technique name recorded in [`CompiledPrompt::applied_techniques`].
    pub name: &'static str,
    /// Whether this rule contributes a clause for the given context.
    pub applies: fn(&ClauseContext<'_>) -> bool,
    /// Renders the clause text. Only called when `applies` returned true.
    pub render: fn(&ClauseContext<'_>) -> String,
}

/// The rule table, in application order.
static CLAUSE_RULES: &[ClauseRule] = &[
    ClauseRule {
        name: "style",
        applies: |ctx| ctx.settings.style.is_some(),
        render: |ctx| match &ctx.settings.style {
            Some(style) => phrases::style_phrase(style, ctx.provider),
            None => String::new(),
        },
    },
    ClauseRule {
        name: "quality",
        applies: |ctx| ctx.settings.quality.is_some(),
        render: |ctx| match ctx.settings.quality {
            Some(quality) => phrases::quality_phrase(quality, ctx.provider),
            None => String::new(),
        },
    },
    ClauseRule {
        name: "camera",
        applies: |ctx| ctx.settings.camera != CameraSettings::default(),
        render: |ctx| render_camera(&ctx.settings.camera),
    },
    ClauseRule {
        name: "lighting",
        applies: |ctx| ctx.settings.lighting != LightingSettings::default(),
        render: |ctx| render_lighting(&ctx.settings.lighting),
    },
    ClauseRule {
        name: "color",
        applies: |ctx| ctx.settings.color != ColorSettings::default(),
        render: |ctx| render_color(&ctx.settings.color),
    },
];

// ============================================================================
// Compilation
// ============================================================================

/// Compiles a base prompt and settings into provider-ready prose.
///
/// Pure and deterministic; never fails. Unknown or default settings fields
/// are skipped, not rejected.
pub fn compile(
    base: &str,
    settings: &StructuredSettings,
    provider: ProviderKind,
) -> CompiledPrompt {
    let source = normalize(base);
    let mut applied = Vec::new();

    let opening = if phrases::has_directive(&source, provider) {
        source.clone()
    } else {
        applied.push("directive");
        phrases::apply_directive(&source, provider)
    };

    let mut clauses = vec![opening];
    let ctx = ClauseContext { settings, provider };
    for rule in CLAUSE_RULES {
        if (rule.applies)(&ctx) {
            applied.push(rule.name);
            clauses.push((rule.render)(&ctx));
        }
    }

    let text = cleanup(&clauses.join(". "));
    let estimated_tokens = estimate_tokens(&text);

    CompiledPrompt {
        text,
        applied_techniques: applied,
        estimated_tokens,
        source,
        provider,
    }
}

/// Trims and collapses internal whitespace.
fn normalize(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex"));

/// Empty parenthetical remnants like "()" or "(  )".
static EMPTY_PARENS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*\)").expect("Invalid regex"));

/// Runs of periods/commas with optional whitespace between them.
static REPEATED_PUNCT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([.,])(?:\s*[.,])+").expect("Invalid regex"));

/// Final cleanup pass over the joined clauses.
///
/// Collapses repeated punctuation and whitespace, strips empty parentheses,
/// and guarantees exactly one terminal period.
fn cleanup(text: &str) -> String {
    let text = EMPTY_PARENS_RE.replace_all(text, "");
    let text = REPEATED_PUNCT_RE.replace_all(&text, "$1");
    let mut out = WHITESPACE_RE.replace_all(text.trim(), " ").into_owned();

    while out.ends_with(['.', ',', ' ']) {
        out.pop();
    }
    if !out.is_empty() {
        out.push('.');
    }
    out
}

// ============================================================================
// Clause Renderers
// ============================================================================

/// Joins the non-default camera fields into one clause.
fn render_camera(camera: &CameraSettings) -> String {
    let defaults = CameraSettings::default();
    let mut parts: Vec<String> = Vec::new();

    if camera.position != defaults.position {
        parts.push(format!(
            "camera {}",
            phrases::camera_position_phrase(camera.position)
        ));
    }
    if let Some(distance) = camera.distance {
        parts.push(phrases::camera_distance_phrase(distance).to_string());
    }
    if camera.lens != defaults.lens {
        parts.push(phrases::lens_phrase(camera.lens).to_string());
    }
    if camera.tilt_angle != 0 {
        parts.push(phrases::tilt_phrase(camera.tilt_angle));
    }
    if camera.pan_angle != 0 {
        parts.push(phrases::pan_phrase(camera.pan_angle));
    }
    if camera.roll_angle != 0 {
        parts.push(phrases::roll_phrase(camera.roll_angle));
    }
    if let Some(position) = phrases::screen_position_phrase(camera.screen_x, camera.screen_y) {
        parts.push(position);
    }
    if camera.depth_of_field != defaults.depth_of_field {
        parts.push(phrases::depth_of_field_phrase(camera.depth_of_field).to_string());
    }
    if camera.motion_blur != defaults.motion_blur {
        parts.push(phrases::motion_blur_phrase(camera.motion_blur).to_string());
    }

    parts.join(", ")
}

/// Joins the non-default lighting fields into one clause.
fn render_lighting(lighting: &LightingSettings) -> String {
    let defaults = LightingSettings::default();
    let mut parts: Vec<String> = Vec::new();

    if lighting.direction != defaults.direction {
        parts.push(phrases::light_direction_phrase(lighting.direction).to_string());
    }
    if lighting.intensity != defaults.intensity {
        parts.push(format!(
            "using {}",
            phrases::light_intensity_phrase(lighting.intensity)
        ));
    }
    if lighting.light_type != defaults.light_type {
        parts.push(phrases::light_type_phrase(lighting.light_type).to_string());
    }
    if lighting.shadows != defaults.shadows {
        parts.push(format!("with {}", phrases::shadow_phrase(lighting.shadows)));
    }
    if lighting.volumetric {
        parts.push("volumetric light shafts".to_string());
    }
    if lighting.rim_light {
        parts.push("a rim light separating the subject from the background".to_string());
    }
    if lighting.golden_hour {
        parts.push("bathed in golden-hour light".to_string());
    }
    if lighting.haze {
        parts.push("a layer of atmospheric haze".to_string());
    }
    if let Some(kelvin) = lighting.color_temperature {
        parts.push(phrases::color_temperature_phrase(kelvin));
    }

    parts.join(", ")
}

/// Joins the non-default color fields into one clause.
fn render_color(color: &ColorSettings) -> String {
    let defaults = ColorSettings::default();
    let mut parts: Vec<String> = Vec::new();

    if color.palette != defaults.palette {
        parts.push(phrases::palette_phrase(color.palette).to_string());
    }
    if color.saturation != defaults.saturation {
        parts.push(phrases::saturation_phrase(color.saturation).to_string());
    }
    if color.contrast != defaults.contrast {
        parts.push(phrases::contrast_phrase(color.contrast).to_string());
    }
    if color.warm_accent {
        parts.push("warm accent highlights".to_string());
    }
    if color.cool_accent {
        parts.push("cool accent highlights".to_string());
    }

    parts.join(", ")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use promptstage_core::models::settings::{CameraPosition, LightIntensity};
    use promptstage_core::Quality;

    #[test]
    fn test_default_settings_compile_to_directive_only() {
        let settings = StructuredSettings::default();
        let compiled = compile("a cat on a roof", &settings, ProviderKind::ChatGpt);

        assert_eq!(
            compiled.text,
            "Create a photorealistic image of a cat on a roof."
        );
        assert_eq!(compiled.applied_techniques, vec!["directive"]);
        assert_eq!(compiled.source, "a cat on a roof");
    }

    #[test]
    fn test_compile_is_deterministic() {
        let mut settings = StructuredSettings::default();
        settings.camera.position = CameraPosition::Top;
        settings.lighting.intensity = LightIntensity::Soft;
        settings.style = Some("anime".to_string());

        let first = compile("a lighthouse in a storm", &settings, ProviderKind::Kling);
        let second = compile("a lighthouse in a storm", &settings, ProviderKind::Kling);
        assert_eq!(first, second);
    }

    #[test]
    fn test_top_camera_position_end_to_end() {
        let mut settings = StructuredSettings::default();
        settings.camera.position = CameraPosition::Top;

        let compiled = compile("a cat on a roof", &settings, ProviderKind::ChatGpt);

        assert!(compiled.text.contains("positioned above"));
        assert!(!compiled.text.to_lowercase().contains("illuminate"));
        assert!(!compiled.text.to_lowercase().contains("palette"));
        assert_eq!(compiled.applied_techniques, vec!["directive", "camera"]);
    }

    #[test]
    fn test_single_field_change_adds_single_clause() {
        let base = "create a forest scene";
        let default_compiled =
            compile(base, &StructuredSettings::default(), ProviderKind::Anthropic);

        let mut settings = StructuredSettings::default();
        settings.quality = Some(Quality::Ultra);
        let compiled = compile(base, &settings, ProviderKind::Anthropic);

        assert_eq!(default_compiled.applied_techniques.len(), 0);
        assert_eq!(compiled.applied_techniques, vec!["quality"]);
        assert!(compiled.text.starts_with(&default_compiled.text[..default_compiled.text.len() - 1]));
        assert!(compiled.text.contains("Quality level:"));
    }

    #[test]
    fn test_roll_only_change_renders_a_camera_clause() {
        let mut settings = StructuredSettings::default();
        settings.camera.roll_angle = -15;

        let compiled = compile("a cat on a roof", &settings, ProviderKind::ChatGpt);
        assert_eq!(compiled.applied_techniques, vec!["directive", "camera"]);
        assert!(compiled.text.contains("rolled 15\u{b0} counterclockwise"));
    }

    #[test]
    fn test_normalization_collapses_whitespace() {
        let compiled = compile(
            "  a   photorealistic\n portrait  ",
            &StructuredSettings::default(),
            ProviderKind::Google,
        );
        assert_eq!(compiled.source, "a photorealistic portrait");
        assert_eq!(compiled.text, "a photorealistic portrait.");
        assert!(compiled.applied_techniques.is_empty());
    }

    #[test]
    fn test_cleanup_collapses_punctuation() {
        assert_eq!(cleanup("a cat.. on a roof. . now"), "a cat. on a roof. now.");
        assert_eq!(cleanup("scene ()  done"), "scene done.");
        assert_eq!(cleanup(""), "");
    }

    #[test]
    fn test_estimated_tokens_tracks_text() {
        let compiled = compile(
            "create a tiny scene",
            &StructuredSettings::default(),
            ProviderKind::Kling,
        );
        assert_eq!(
            compiled.estimated_tokens,
            estimate_tokens(&compiled.text)
        );
        assert!(compiled.estimated_tokens > 0);
    }

    #[test]
    fn test_lighting_clause_includes_color_temperature() {
        let mut settings = StructuredSettings::default();
        settings.lighting.color_temperature = Some(5600);

        let compiled = compile("create a studio set", &settings, ProviderKind::Kling);
        assert!(compiled.text.contains("5600K"));
        assert_eq!(compiled.applied_techniques, vec!["lighting"]);
    }
}
