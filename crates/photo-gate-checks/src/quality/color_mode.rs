// photo-gate-checks/src/quality/color_mode.rs
// ============================================================================
// Module: Color Mode Check
// Description: Detects grayscale uploads via mean saturation.
// Purpose: Enforce the color-photo requirement.
// Dependencies: async-trait, photo-gate-core, crate::analysis
// ============================================================================

//! Color mode check: detects grayscale uploads via mean saturation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde_json::json;

use photo_gate_core::Check;
use photo_gate_core::CheckCategory;
use photo_gate_core::CheckDescriptor;
use photo_gate_core::CheckError;
use photo_gate_core::CheckEval;
use photo_gate_core::CheckName;
use photo_gate_core::EvalInput;
use photo_gate_core::ParameterKind;
use photo_gate_core::ParameterSpec;
use photo_gate_core::ParameterValue;

use crate::analysis::mean_saturation;

// ============================================================================
// SECTION: Parameters
// ============================================================================

/// Stable check identifier.
pub const CHECK_NAME: &str = "color_mode";

/// Mean saturation at or below which the image counts as grayscale.
const PARAM_THRESHOLD: &str = "grayscale_saturation_threshold";

/// Whether a color photo is required.
const PARAM_REQUIRE_COLOR: &str = "require_color";

// ============================================================================
// SECTION: Check
// ============================================================================

/// Color mode check.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorModeCheck;

#[async_trait]
impl Check for ColorModeCheck {
    fn describe(&self) -> CheckDescriptor {
        CheckDescriptor {
            name: CheckName::new(CHECK_NAME),
            display_name: "Color Mode".to_string(),
            description: "Checks that the image is a color photo, not grayscale".to_string(),
            category: CheckCategory::ImageQuality,
            version: "1.0.0".to_string(),
            author: "Photo Validation Team".to_string(),
            parameters: vec![
                ParameterSpec {
                    name: PARAM_THRESHOLD.to_string(),
                    kind: ParameterKind::Int,
                    default: Some(ParameterValue::Int(15)),
                    min: Some(5.0),
                    max: Some(50.0),
                    choices: None,
                    required: true,
                    description: "Saturation threshold for grayscale detection".to_string(),
                },
                ParameterSpec {
                    name: PARAM_REQUIRE_COLOR.to_string(),
                    kind: ParameterKind::Bool,
                    default: Some(ParameterValue::Bool(true)),
                    min: None,
                    max: None,
                    choices: None,
                    required: false,
                    description: "Require a color photo".to_string(),
                },
            ],
            dependencies: BTreeSet::new(),
            enabled_by_default: true,
            time_limit_secs: None,
        }
    }

    async fn evaluate(&self, input: &EvalInput<'_>) -> Result<CheckEval, CheckError> {
        let threshold = input.params.int(PARAM_THRESHOLD)?;
        let require_color = input.params.bool(PARAM_REQUIRE_COLOR)?;

        let saturation = mean_saturation(input.photo);
        let is_color = saturation > threshold as f64;

        let details = json!({
            "mean_saturation": saturation,
            "threshold": threshold,
            "is_color": is_color,
        });

        if require_color && !is_color {
            Ok(CheckEval::failed(
                format!("Image is grayscale (saturation {saturation:.1} <= {threshold})"),
                details,
            ))
        } else {
            Ok(CheckEval::passed(details))
        }
    }
}
