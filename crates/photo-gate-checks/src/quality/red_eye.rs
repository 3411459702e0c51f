// photo-gate-checks/src/quality/red_eye.rs
// ============================================================================
// Module: Red Eye Check
// Description: Detects flash-induced red-eye in landmarked eye regions.
// Purpose: Reject photos with the red-eye artifact.
// Dependencies: async-trait, photo-gate-core
// ============================================================================

//! Red eye check: detects flash-induced red-eye in landmarked eye regions.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::ops::Range;

use async_trait::async_trait;
use serde_json::json;

use photo_gate_core::CapabilityTag;
use photo_gate_core::Check;
use photo_gate_core::CheckCategory;
use photo_gate_core::CheckDescriptor;
use photo_gate_core::CheckError;
use photo_gate_core::CheckEval;
use photo_gate_core::CheckName;
use photo_gate_core::EvalInput;
use photo_gate_core::FACE_REGIONS_TAG;
use photo_gate_core::LEFT_EYE_LANDMARKS;
use photo_gate_core::LandmarkPoint;
use photo_gate_core::ParameterKind;
use photo_gate_core::ParameterSpec;
use photo_gate_core::ParameterValue;
use photo_gate_core::PhotoRaster;
use photo_gate_core::RIGHT_EYE_LANDMARKS;

// ============================================================================
// SECTION: Parameters
// ============================================================================

/// Stable check identifier.
pub const CHECK_NAME: &str = "red_eye";

/// Minimum red channel brightness for a red pixel.
const PARAM_RED_THRESHOLD: &str = "red_threshold";

/// Minimum red-to-other-channel ratio for a red pixel.
const PARAM_RED_RATIO: &str = "red_ratio_threshold";

/// Minimum fraction of red pixels in an eye region to flag it.
const PARAM_MIN_PIXEL_RATIO: &str = "min_red_pixel_ratio";

// ============================================================================
// SECTION: Check
// ============================================================================

/// Red eye check.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedEyeCheck;

impl RedEyeCheck {
    /// Measures the bright-red pixel fraction inside one eye's landmark box.
    fn eye_red_ratio(
        photo: &PhotoRaster,
        landmarks: &[LandmarkPoint],
        eye: Range<usize>,
        red_threshold: u8,
        red_ratio: f64,
    ) -> f64 {
        let points = &landmarks[eye];
        let min_x = points.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        let max_x = points.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
        let min_y = points.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let max_y = points.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
        if !min_x.is_finite() || max_x <= min_x || max_y <= min_y {
            return 0.0;
        }

        let mut red = 0usize;
        let mut total = 0usize;
        let left = min_x.max(0.0).floor();
        let top = min_y.max(0.0).floor();
        let mut y = top;
        while y <= max_y {
            let mut x = left;
            while x <= max_x {
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    reason = "Coordinates are clamped non-negative and bounds-checked by rgb()."
                )]
                let sample = photo.rgb(x as u32, y as u32);
                if let Some([r, g, b]) = sample {
                    total += 1;
                    let brightest_other = f64::from(g.max(b)).max(1.0);
                    if r >= red_threshold && f64::from(r) / brightest_other >= red_ratio {
                        red += 1;
                    }
                }
                x += 1.0;
            }
            y += 1.0;
        }
        if total == 0 {
            0.0
        } else {
            red as f64 / total as f64
        }
    }
}

#[async_trait]
impl Check for RedEyeCheck {
    fn describe(&self) -> CheckDescriptor {
        CheckDescriptor {
            name: CheckName::new(CHECK_NAME),
            display_name: "Red Eye".to_string(),
            description: "Checks for flash-induced red-eye in the eye regions".to_string(),
            category: CheckCategory::ImageQuality,
            version: "1.0.0".to_string(),
            author: "Photo Validation Team".to_string(),
            parameters: vec![
                ParameterSpec {
                    name: PARAM_RED_THRESHOLD.to_string(),
                    kind: ParameterKind::Int,
                    default: Some(ParameterValue::Int(180)),
                    min: Some(100.0),
                    max: Some(255.0),
                    choices: None,
                    required: true,
                    description: "Minimum red channel brightness".to_string(),
                },
                ParameterSpec {
                    name: PARAM_RED_RATIO.to_string(),
                    kind: ParameterKind::Float,
                    default: Some(ParameterValue::Float(1.8)),
                    min: Some(1.0),
                    max: Some(5.0),
                    choices: None,
                    required: true,
                    description: "Minimum red-to-other-channel ratio".to_string(),
                },
                ParameterSpec {
                    name: PARAM_MIN_PIXEL_RATIO.to_string(),
                    kind: ParameterKind::Float,
                    default: Some(ParameterValue::Float(0.15)),
                    min: Some(0.01),
                    max: Some(1.0),
                    choices: None,
                    required: true,
                    description: "Minimum fraction of red pixels to flag an eye".to_string(),
                },
            ],
            dependencies: BTreeSet::from([CapabilityTag::new(FACE_REGIONS_TAG)]),
            enabled_by_default: true,
            time_limit_secs: None,
        }
    }

    async fn evaluate(&self, input: &EvalInput<'_>) -> Result<CheckEval, CheckError> {
        let red_threshold = u8::try_from(input.params.int(PARAM_RED_THRESHOLD)?).unwrap_or(255);
        let red_ratio = input.params.float(PARAM_RED_RATIO)?;
        let min_pixel_ratio = input.params.float(PARAM_MIN_PIXEL_RATIO)?;

        let regions = input.shared.face_regions(input.photo).await?;
        let Some(landmarks) = regions.first().and_then(|face| face.full_landmarks()) else {
            // Without landmarks the eyes cannot be located; this is not a
            // reason to reject the photo.
            return Ok(CheckEval {
                status: photo_gate_core::CheckStatus::Passed,
                reason: Some("No landmarks available for red eye check".to_string()),
                details: serde_json::Value::Null,
            });
        };

        let left = Self::eye_red_ratio(
            input.photo,
            landmarks,
            LEFT_EYE_LANDMARKS,
            red_threshold,
            red_ratio,
        );
        let right = Self::eye_red_ratio(
            input.photo,
            landmarks,
            RIGHT_EYE_LANDMARKS,
            red_threshold,
            red_ratio,
        );

        let mut affected = Vec::new();
        if left >= min_pixel_ratio {
            affected.push("left");
        }
        if right >= min_pixel_ratio {
            affected.push("right");
        }

        let details = json!({
            "left_red_ratio": left,
            "right_red_ratio": right,
            "affected_eyes": affected,
            "thresholds": {
                "red_threshold": red_threshold,
                "red_ratio": red_ratio,
                "min_red_pixel_ratio": min_pixel_ratio,
            },
        });

        if affected.is_empty() {
            Ok(CheckEval::passed(details))
        } else {
            Ok(CheckEval::failed(
                format!("Red eye effect detected in {} eye(s)", affected.join(" and ")),
                details,
            ))
        }
    }
}
