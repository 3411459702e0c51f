// photo-gate-checks/src/quality/real_photo.rs
// ============================================================================
// Module: Real Photo Check
// Description: Distinguishes photographs from drawings and rendered graphics.
// Purpose: Reject sketches, cartoons, and synthetic images.
// Dependencies: async-trait, photo-gate-core, crate::analysis
// ============================================================================

//! Real photo check: distinguishes photographs from drawings and rendered graphics.

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
use photo_gate_core::LUMINANCE_PLANE_TAG;
use photo_gate_core::ParameterKind;
use photo_gate_core::ParameterSpec;
use photo_gate_core::ParameterValue;

use crate::analysis::distinct_coarse_colors;
use crate::analysis::sobel_gradient_mean;

// ============================================================================
// SECTION: Parameters
// ============================================================================

/// Stable check identifier.
pub const CHECK_NAME: &str = "real_photo";

/// Mean gradient below which texture reads as synthetic.
const PARAM_GRADIENT: &str = "gradient_mean_threshold";

/// Coarse color count below which the palette reads as synthetic.
const PARAM_COLORS: &str = "color_distribution_threshold";

/// Tie-break bias when the evidence is split.
const PARAM_BIAS: &str = "evidence_bias";

/// Bias value favoring acceptance.
const BIAS_PHOTO: &str = "photo";

/// Bias value favoring rejection review.
const BIAS_DRAWING: &str = "drawing";

// ============================================================================
// SECTION: Check
// ============================================================================

/// Real photo check.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealPhotoCheck;

#[async_trait]
impl Check for RealPhotoCheck {
    fn describe(&self) -> CheckDescriptor {
        CheckDescriptor {
            name: CheckName::new(CHECK_NAME),
            display_name: "Real Photo".to_string(),
            description:
                "Checks that the image is a real photo, not a drawing or rendered graphic"
                    .to_string(),
            category: CheckCategory::ImageQuality,
            version: "1.0.0".to_string(),
            author: "Photo Validation Team".to_string(),
            parameters: vec![
                ParameterSpec {
                    name: PARAM_GRADIENT.to_string(),
                    kind: ParameterKind::Int,
                    default: Some(ParameterValue::Int(20)),
                    min: Some(5.0),
                    max: Some(100.0),
                    choices: None,
                    required: true,
                    description: "Mean gradient threshold for natural texture".to_string(),
                },
                ParameterSpec {
                    name: PARAM_COLORS.to_string(),
                    kind: ParameterKind::Int,
                    default: Some(ParameterValue::Int(50)),
                    min: Some(10.0),
                    max: Some(200.0),
                    choices: None,
                    required: true,
                    description: "Coarse color count threshold for natural palettes"
                        .to_string(),
                },
                ParameterSpec {
                    name: PARAM_BIAS.to_string(),
                    kind: ParameterKind::Str,
                    default: Some(ParameterValue::Str(BIAS_PHOTO.to_string())),
                    min: None,
                    max: None,
                    choices: Some(vec![
                        ParameterValue::Str(BIAS_PHOTO.to_string()),
                        ParameterValue::Str(BIAS_DRAWING.to_string()),
                    ]),
                    required: false,
                    description: "Evidence bias when indicators disagree".to_string(),
                },
            ],
            dependencies: BTreeSet::from([CapabilityTag::new(LUMINANCE_PLANE_TAG)]),
            enabled_by_default: true,
            time_limit_secs: None,
        }
    }

    async fn evaluate(&self, input: &EvalInput<'_>) -> Result<CheckEval, CheckError> {
        let gradient_floor = input.params.int(PARAM_GRADIENT)?;
        let color_floor = input.params.int(PARAM_COLORS)?;
        let bias = input.params.str(PARAM_BIAS)?.to_string();

        let luma = input.shared.luminance(input.photo).await?;
        let gradient = sobel_gradient_mean(
            &luma,
            input.photo.width() as usize,
            input.photo.height() as usize,
        );
        let colors = distinct_coarse_colors(input.photo);

        let flat_texture = gradient < gradient_floor as f64;
        let narrow_palette = (colors as i64) < color_floor;

        let details = json!({
            "gradient_mean": gradient,
            "distinct_colors": colors,
            "thresholds": {
                "gradient_mean": gradient_floor,
                "color_distribution": color_floor,
            },
            "evidence_bias": bias,
        });

        if flat_texture && narrow_palette {
            return Ok(CheckEval::failed(
                "Image appears to be a drawing or rendered graphic",
                details,
            ));
        }
        if (flat_texture || narrow_palette) && bias == BIAS_DRAWING {
            return Ok(CheckEval::needs_review(
                "Mixed evidence: image may not be a real photo",
                details,
            ));
        }
        Ok(CheckEval::passed(details))
    }
}
