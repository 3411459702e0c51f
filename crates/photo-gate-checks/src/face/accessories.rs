// photo-gate-checks/src/face/accessories.rs
// ============================================================================
// Module: Accessories Check
// Description: Detects glasses, headwear, and hands covering the face.
// Purpose: Flag accessories that are not acceptable in identity photos.
// Dependencies: async-trait, photo-gate-core, crate::analysis
// ============================================================================

//! Accessories check: detects glasses, headwear, and hands covering the face.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde_json::json;

use photo_gate_core::BoundingBox;
use photo_gate_core::CapabilityTag;
use photo_gate_core::Check;
use photo_gate_core::CheckCategory;
use photo_gate_core::CheckDescriptor;
use photo_gate_core::CheckError;
use photo_gate_core::CheckEval;
use photo_gate_core::CheckName;
use photo_gate_core::EvalInput;
use photo_gate_core::FACE_REGIONS_TAG;
use photo_gate_core::ParameterKind;
use photo_gate_core::ParameterSpec;
use photo_gate_core::ParameterValue;
use photo_gate_core::PhotoRaster;

use crate::analysis::edge_density;
use crate::analysis::luma_stats;
use crate::analysis::skin_ratio;

// ============================================================================
// SECTION: Parameters
// ============================================================================

/// Stable check identifier.
pub const CHECK_NAME: &str = "accessories";

/// Enable glasses detection.
const PARAM_GLASSES: &str = "detect_glasses";

/// Enable headwear detection.
const PARAM_HEADWEAR: &str = "detect_headwear";

/// Enable hands-near-face detection.
const PARAM_HANDS: &str = "detect_hands";

/// Edge density over the eye strip above which glasses are suspected.
const GLASSES_EDGE_DENSITY: f64 = 0.28;

/// Luminance deviation below which the band above the head reads as headwear.
const HEADWEAR_STD_DEV: f64 = 18.0;

/// Minimum contrast between the band and the backdrop corners.
const HEADWEAR_BACKDROP_CONTRAST: f64 = 30.0;

/// Skin fraction beside the face above which a hand is suspected.
const HAND_SKIN_RATIO: f64 = 0.35;

// ============================================================================
// SECTION: Check
// ============================================================================

/// Accessories check.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessoriesCheck;

/// Builds one boolean toggle parameter spec.
fn toggle_param(name: &str, default: bool, description: &str) -> ParameterSpec {
    ParameterSpec {
        name: name.to_string(),
        kind: ParameterKind::Bool,
        default: Some(ParameterValue::Bool(default)),
        min: None,
        max: None,
        choices: None,
        required: false,
        description: description.to_string(),
    }
}

/// Clamps a float rectangle edge into the raster's coordinate space.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "Value is checked non-negative and clamped to the raster limit."
)]
fn clamp_u32(value: f32, limit: u32) -> u32 {
    if value <= 0.0 {
        0
    } else {
        let rounded = value as u64;
        u32::try_from(rounded.min(u64::from(limit))).unwrap_or(limit)
    }
}

/// Extracts the luminance samples of a sub-rectangle.
fn region_luma(photo: &PhotoRaster, left: u32, top: u32, right: u32, bottom: u32) -> Vec<u8> {
    let mut samples = Vec::new();
    for y in top..bottom.min(photo.height()) {
        for x in left..right.min(photo.width()) {
            if let Some([r, g, b]) = photo.rgb(x, y) {
                let luma =
                    (299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b)) / 1000;
                samples.push(u8::try_from(luma).unwrap_or(u8::MAX));
            }
        }
    }
    samples
}

impl AccessoriesCheck {
    /// Looks for a dense horizontal edge response across the eye strip.
    fn glasses_suspected(photo: &PhotoRaster, bbox: &BoundingBox) -> bool {
        let left = clamp_u32(bbox.x, photo.width());
        let right = clamp_u32(bbox.x + bbox.width, photo.width());
        let eye_top = clamp_u32(bbox.height.mul_add(0.25, bbox.y), photo.height());
        let eye_bottom = clamp_u32(bbox.height.mul_add(0.55, bbox.y), photo.height());
        if right <= left + 2 || eye_bottom <= eye_top + 2 {
            return false;
        }
        let strip = region_luma(photo, left, eye_top, right, eye_bottom);
        let width = (right - left) as usize;
        let height = (eye_bottom - eye_top) as usize;
        edge_density(&strip, width, height, 120.0) > GLASSES_EDGE_DENSITY
    }

    /// Looks for a uniform band directly above the head box that is neither
    /// skin nor backdrop.
    fn headwear_suspected(photo: &PhotoRaster, bbox: &BoundingBox) -> bool {
        let band_height = bbox.height * 0.3;
        let top = clamp_u32(bbox.y - band_height, photo.height());
        let bottom = clamp_u32(bbox.y, photo.height());
        let left = clamp_u32(bbox.x, photo.width());
        let right = clamp_u32(bbox.x + bbox.width, photo.width());
        if bottom <= top + 1 || right <= left + 1 {
            return false;
        }
        let band = region_luma(photo, left, top, right, bottom);
        if band.len() < 16 {
            return false;
        }
        let (band_mean, std_dev) = luma_stats(&band);
        if std_dev >= HEADWEAR_STD_DEV || skin_ratio(photo, left, top, right, bottom) >= 0.1 {
            return false;
        }
        // A uniform band matching the backdrop is just backdrop; sample the
        // top corners as the backdrop reference.
        let corner = photo.width().min(photo.height()).min(8);
        let left_corner = region_luma(photo, 0, 0, corner, corner);
        let right_corner =
            region_luma(photo, photo.width().saturating_sub(corner), 0, photo.width(), corner);
        let (left_mean, _) = luma_stats(&left_corner);
        let (right_mean, _) = luma_stats(&right_corner);
        let backdrop_mean = f64::midpoint(left_mean, right_mean);
        (band_mean - backdrop_mean).abs() > HEADWEAR_BACKDROP_CONTRAST
    }

    /// Looks for skin-toned areas pressed against the face sides.
    fn hands_suspected(photo: &PhotoRaster, bbox: &BoundingBox) -> bool {
        let margin = bbox.width * 0.35;
        let top = clamp_u32(bbox.y, photo.height());
        let bottom = clamp_u32(bbox.y + bbox.height, photo.height());
        let left_outer = clamp_u32(bbox.x - margin, photo.width());
        let left_inner = clamp_u32(bbox.x, photo.width());
        let right_inner = clamp_u32(bbox.x + bbox.width, photo.width());
        let right_outer = clamp_u32(bbox.x + bbox.width + margin, photo.width());

        let left_hit = left_inner > left_outer
            && skin_ratio(photo, left_outer, top, left_inner, bottom) > HAND_SKIN_RATIO;
        let right_hit = right_outer > right_inner
            && skin_ratio(photo, right_inner, top, right_outer, bottom) > HAND_SKIN_RATIO;
        left_hit || right_hit
    }
}

#[async_trait]
impl Check for AccessoriesCheck {
    fn describe(&self) -> CheckDescriptor {
        CheckDescriptor {
            name: CheckName::new(CHECK_NAME),
            display_name: "Accessories".to_string(),
            description: "Checks for glasses, headwear, or hands covering the face"
                .to_string(),
            category: CheckCategory::Face,
            version: "1.0.0".to_string(),
            author: "Photo Validation Team".to_string(),
            parameters: vec![
                toggle_param(PARAM_GLASSES, false, "Detect glasses over the eyes"),
                toggle_param(PARAM_HEADWEAR, true, "Detect hats and other headwear"),
                toggle_param(PARAM_HANDS, true, "Detect hands near the face"),
            ],
            dependencies: BTreeSet::from([CapabilityTag::new(FACE_REGIONS_TAG)]),
            enabled_by_default: true,
            time_limit_secs: None,
        }
    }

    async fn evaluate(&self, input: &EvalInput<'_>) -> Result<CheckEval, CheckError> {
        let detect_glasses = input.params.bool(PARAM_GLASSES)?;
        let detect_headwear = input.params.bool(PARAM_HEADWEAR)?;
        let detect_hands = input.params.bool(PARAM_HANDS)?;

        let regions = input.shared.face_regions(input.photo).await?;
        let Some(face) = regions.first() else {
            return Ok(CheckEval::skipped("No face detected"));
        };
        let bbox = face.bbox;

        let mut found = Vec::new();
        if detect_glasses && Self::glasses_suspected(input.photo, &bbox) {
            found.push("glasses");
        }
        if detect_headwear && Self::headwear_suspected(input.photo, &bbox) {
            found.push("headwear");
        }
        if detect_hands && Self::hands_suspected(input.photo, &bbox) {
            found.push("hands near face");
        }

        let details = json!({
            "face_bbox": bbox,
            "detected": found,
            "toggles": {
                "glasses": detect_glasses,
                "headwear": detect_headwear,
                "hands": detect_hands,
            },
        });

        if found.is_empty() {
            Ok(CheckEval::passed(details))
        } else {
            Ok(CheckEval::failed(format!("Accessories detected: {}", found.join(", ")), details))
        }
    }
}
