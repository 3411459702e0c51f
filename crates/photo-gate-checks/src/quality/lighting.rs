// photo-gate-checks/src/quality/lighting.rs
// ============================================================================
// Module: Lighting Check
// Description: Exposure and contrast analysis over the luminance plane.
// Purpose: Reject underexposed, overexposed, and flat images.
// Dependencies: async-trait, photo-gate-core, crate::analysis
// ============================================================================

//! Lighting check: exposure and contrast analysis over the luminance plane.

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

use crate::analysis::luma_stats;
use crate::analysis::ratio_above;
use crate::analysis::ratio_below;

// ============================================================================
// SECTION: Parameters
// ============================================================================

/// Stable check identifier.
pub const CHECK_NAME: &str = "lighting";

/// Luminance below which a pixel counts as shadow.
const PARAM_UNDER: &str = "underexposure_threshold";

/// Luminance above which a pixel counts as highlight.
const PARAM_OVER: &str = "overexposure_threshold";

/// Standard deviation below which the image counts as low-contrast.
const PARAM_CONTRAST: &str = "low_contrast_threshold";

/// Shadow fraction above which the image fails.
const PARAM_SHADOW_RATIO: &str = "shadow_ratio_threshold";

/// Highlight fraction above which the image fails.
const PARAM_HIGHLIGHT_RATIO: &str = "highlight_ratio_threshold";

// ============================================================================
// SECTION: Check
// ============================================================================

/// Lighting check.
#[derive(Debug, Clone, Copy, Default)]
pub struct LightingCheck;

/// Builds one integer threshold parameter spec.
fn int_param(name: &str, default: i64, min: f64, max: f64, description: &str) -> ParameterSpec {
    ParameterSpec {
        name: name.to_string(),
        kind: ParameterKind::Int,
        default: Some(ParameterValue::Int(default)),
        min: Some(min),
        max: Some(max),
        choices: None,
        required: true,
        description: description.to_string(),
    }
}

/// Builds one ratio threshold parameter spec.
fn ratio_param(name: &str, default: f64, description: &str) -> ParameterSpec {
    ParameterSpec {
        name: name.to_string(),
        kind: ParameterKind::Float,
        default: Some(ParameterValue::Float(default)),
        min: Some(0.1),
        max: Some(0.8),
        choices: None,
        required: false,
        description: description.to_string(),
    }
}

#[async_trait]
impl Check for LightingCheck {
    fn describe(&self) -> CheckDescriptor {
        CheckDescriptor {
            name: CheckName::new(CHECK_NAME),
            display_name: "Lighting".to_string(),
            description: "Checks exposure balance and contrast".to_string(),
            category: CheckCategory::ImageQuality,
            version: "1.0.0".to_string(),
            author: "Photo Validation Team".to_string(),
            parameters: vec![
                int_param(PARAM_UNDER, 25, 5.0, 100.0, "Threshold for underexposed pixels"),
                int_param(PARAM_OVER, 240, 200.0, 255.0, "Threshold for overexposed pixels"),
                int_param(
                    PARAM_CONTRAST,
                    20,
                    5.0,
                    100.0,
                    "Standard deviation threshold for low contrast",
                ),
                ratio_param(
                    PARAM_SHADOW_RATIO,
                    0.4,
                    "Maximum fraction of shadow pixels",
                ),
                ratio_param(
                    PARAM_HIGHLIGHT_RATIO,
                    0.3,
                    "Maximum fraction of highlight pixels",
                ),
            ],
            dependencies: BTreeSet::from([CapabilityTag::new(LUMINANCE_PLANE_TAG)]),
            enabled_by_default: true,
            time_limit_secs: None,
        }
    }

    async fn evaluate(&self, input: &EvalInput<'_>) -> Result<CheckEval, CheckError> {
        let under = input.params.int(PARAM_UNDER)?;
        let over = input.params.int(PARAM_OVER)?;
        let contrast_floor = input.params.int(PARAM_CONTRAST)?;
        let shadow_limit = input.params.float(PARAM_SHADOW_RATIO)?;
        let highlight_limit = input.params.float(PARAM_HIGHLIGHT_RATIO)?;

        let luma = input.shared.luminance(input.photo).await?;
        let (mean, std_dev) = luma_stats(&luma);
        let shadow_ratio = ratio_below(&luma, u8::try_from(under).unwrap_or(u8::MAX));
        let highlight_ratio = ratio_above(&luma, u8::try_from(over).unwrap_or(u8::MAX));

        let mut reasons = Vec::new();
        if shadow_ratio > shadow_limit {
            reasons.push(format!(
                "Underexposed: {:.0}% of pixels in shadow (limit {:.0}%)",
                shadow_ratio * 100.0,
                shadow_limit * 100.0
            ));
        }
        if highlight_ratio > highlight_limit {
            reasons.push(format!(
                "Overexposed: {:.0}% of pixels blown out (limit {:.0}%)",
                highlight_ratio * 100.0,
                highlight_limit * 100.0
            ));
        }
        if std_dev < contrast_floor as f64 {
            reasons.push(format!(
                "Low contrast: deviation {std_dev:.1} below threshold {contrast_floor}"
            ));
        }

        let details = json!({
            "mean_brightness": mean,
            "std_dev": std_dev,
            "shadow_ratio": shadow_ratio,
            "highlight_ratio": highlight_ratio,
            "thresholds": {
                "underexposure": under,
                "overexposure": over,
                "low_contrast": contrast_floor,
                "shadow_ratio": shadow_limit,
                "highlight_ratio": highlight_limit,
            },
        });

        if reasons.is_empty() {
            Ok(CheckEval::passed(details))
        } else {
            Ok(CheckEval::failed(reasons.join("; "), details))
        }
    }
}
