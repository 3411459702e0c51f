// photo-gate-checks/src/face/position.rs
// ============================================================================
// Module: Face Position Check
// Description: Verifies face size, centering, and margins within the frame.
// Purpose: Reject faces that are too small, off-center, or clipped.
// Dependencies: async-trait, photo-gate-core
// ============================================================================

//! Face position check: verifies face size, centering, and margins within the frame.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

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
use photo_gate_core::ParameterKind;
use photo_gate_core::ParameterSpec;
use photo_gate_core::ParameterValue;

// ============================================================================
// SECTION: Parameters
// ============================================================================

/// Stable check identifier.
pub const CHECK_NAME: &str = "face_position";

/// Minimum face area as a fraction of the frame.
const PARAM_MIN_AREA: &str = "min_area_ratio";

/// Maximum face area as a fraction of the frame.
const PARAM_MAX_AREA: &str = "max_area_ratio";

/// Allowed center offset as a fraction of each frame dimension.
const PARAM_CENTER_TOLERANCE: &str = "center_tolerance";

/// Minimum margin between face box and frame edge, as a fraction.
const PARAM_MIN_MARGIN: &str = "min_margin_ratio";

// ============================================================================
// SECTION: Check
// ============================================================================

/// Face position and size check.
#[derive(Debug, Clone, Copy, Default)]
pub struct FacePositionCheck;

/// Builds one ratio parameter spec.
fn ratio_param(
    name: &str,
    default: f64,
    min: f64,
    max: f64,
    required: bool,
    description: &str,
) -> ParameterSpec {
    ParameterSpec {
        name: name.to_string(),
        kind: ParameterKind::Float,
        default: Some(ParameterValue::Float(default)),
        min: Some(min),
        max: Some(max),
        choices: None,
        required,
        description: description.to_string(),
    }
}

#[async_trait]
impl Check for FacePositionCheck {
    fn describe(&self) -> CheckDescriptor {
        CheckDescriptor {
            name: CheckName::new(CHECK_NAME),
            display_name: "Face Position".to_string(),
            description: "Checks that the face is properly sized and centered in the frame"
                .to_string(),
            category: CheckCategory::Face,
            version: "1.0.0".to_string(),
            author: "Photo Validation Team".to_string(),
            parameters: vec![
                ratio_param(
                    PARAM_MIN_AREA,
                    0.05,
                    0.01,
                    0.5,
                    true,
                    "Minimum face area ratio relative to image",
                ),
                ratio_param(
                    PARAM_MAX_AREA,
                    0.8,
                    0.5,
                    1.0,
                    true,
                    "Maximum face area ratio relative to image",
                ),
                ratio_param(
                    PARAM_CENTER_TOLERANCE,
                    0.4,
                    0.05,
                    0.5,
                    true,
                    "Allowed center offset as a fraction of each dimension",
                ),
                ratio_param(
                    PARAM_MIN_MARGIN,
                    0.03,
                    0.0,
                    0.2,
                    false,
                    "Minimum margin between face and frame edge",
                ),
            ],
            dependencies: BTreeSet::from([CapabilityTag::new(FACE_REGIONS_TAG)]),
            enabled_by_default: true,
            time_limit_secs: None,
        }
    }

    async fn evaluate(&self, input: &EvalInput<'_>) -> Result<CheckEval, CheckError> {
        let min_area = input.params.float(PARAM_MIN_AREA)?;
        let max_area = input.params.float(PARAM_MAX_AREA)?;
        let tolerance = input.params.float(PARAM_CENTER_TOLERANCE)?;
        let min_margin = input.params.float(PARAM_MIN_MARGIN)?;

        let regions = input.shared.face_regions(input.photo).await?;
        let Some(face) = regions.iter().max_by(|a, b| {
            a.bbox.area().partial_cmp(&b.bbox.area()).unwrap_or(std::cmp::Ordering::Equal)
        }) else {
            return Ok(CheckEval::skipped("No face detected"));
        };

        let frame_w = f64::from(input.photo.width());
        let frame_h = f64::from(input.photo.height());
        let bbox = face.bbox;
        let area_ratio = f64::from(bbox.area()) / (frame_w * frame_h);

        let x_offset = (f64::from(bbox.center_x()) - frame_w / 2.0).abs();
        let y_offset = (f64::from(bbox.center_y()) - frame_h / 2.0).abs();
        let tolerance_x = frame_w * tolerance;
        let tolerance_y = frame_h * tolerance;

        let left_margin = f64::from(bbox.x) / frame_w;
        let right_margin = (frame_w - f64::from(bbox.x) - f64::from(bbox.width)) / frame_w;
        let top_margin = f64::from(bbox.y) / frame_h;
        let bottom_margin = (frame_h - f64::from(bbox.y) - f64::from(bbox.height)) / frame_h;

        let mut reasons = Vec::new();
        if area_ratio < min_area {
            reasons.push(format!(
                "Face area ratio {area_ratio:.3} too small (min: {min_area:.3})"
            ));
        }
        if area_ratio > max_area {
            reasons.push(format!(
                "Face area ratio {area_ratio:.3} too large (max: {max_area:.3})"
            ));
        }
        if x_offset > tolerance_x {
            reasons.push(format!(
                "Face X offset {x_offset:.1}px exceeds tolerance {tolerance_x:.1}px"
            ));
        }
        if y_offset > tolerance_y {
            reasons.push(format!(
                "Face Y offset {y_offset:.1}px exceeds tolerance {tolerance_y:.1}px"
            ));
        }
        let smallest_margin =
            left_margin.min(right_margin).min(top_margin).min(bottom_margin);
        if smallest_margin < min_margin {
            reasons.push(format!(
                "Face margin {smallest_margin:.3} below minimum {min_margin:.3}"
            ));
        }

        let details = json!({
            "face_bbox": bbox,
            "face_area_ratio": area_ratio,
            "center_offset_x_px": x_offset,
            "center_offset_y_px": y_offset,
            "margins": {
                "left": left_margin,
                "right": right_margin,
                "top": top_margin,
                "bottom": bottom_margin,
            },
            "image_size": [input.photo.width(), input.photo.height()],
        });

        if reasons.is_empty() {
            Ok(CheckEval::passed(details))
        } else {
            Ok(CheckEval::failed(reasons.join("; "), details))
        }
    }
}
