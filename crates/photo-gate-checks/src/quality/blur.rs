// photo-gate-checks/src/quality/blur.rs
// ============================================================================
// Module: Blurriness Check
// Description: Laplacian-variance sharpness measurement.
// Purpose: Reject out-of-focus or motion-blurred uploads.
// Dependencies: async-trait, photo-gate-core, crate::analysis
// ============================================================================

//! Blurriness check: Laplacian-variance sharpness measurement.

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

use crate::analysis::laplacian_variance;

// ============================================================================
// SECTION: Parameters
// ============================================================================

/// Stable check identifier.
pub const CHECK_NAME: &str = "blurriness";

/// Laplacian variance below which the image counts as blurry.
const PARAM_THRESHOLD: &str = "laplacian_threshold";

// ============================================================================
// SECTION: Check
// ============================================================================

/// Blurriness check.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlurrinessCheck;

#[async_trait]
impl Check for BlurrinessCheck {
    fn describe(&self) -> CheckDescriptor {
        CheckDescriptor {
            name: CheckName::new(CHECK_NAME),
            display_name: "Blurriness".to_string(),
            description: "Checks image sharpness via Laplacian variance".to_string(),
            category: CheckCategory::ImageQuality,
            version: "1.0.0".to_string(),
            author: "Photo Validation Team".to_string(),
            parameters: vec![ParameterSpec {
                name: PARAM_THRESHOLD.to_string(),
                kind: ParameterKind::Int,
                default: Some(ParameterValue::Int(40)),
                min: Some(10.0),
                max: Some(200.0),
                choices: None,
                required: true,
                description: "Laplacian variance threshold for blur detection".to_string(),
            }],
            dependencies: BTreeSet::from([CapabilityTag::new(LUMINANCE_PLANE_TAG)]),
            enabled_by_default: true,
            time_limit_secs: None,
        }
    }

    async fn evaluate(&self, input: &EvalInput<'_>) -> Result<CheckEval, CheckError> {
        let threshold = input.params.int(PARAM_THRESHOLD)?;
        let luma = input.shared.luminance(input.photo).await?;
        let score = laplacian_variance(
            &luma,
            input.photo.width() as usize,
            input.photo.height() as usize,
        );

        let details = json!({
            "blur_score": score,
            "threshold": threshold,
        });

        if score < threshold as f64 {
            Ok(CheckEval::failed(
                format!("Image too blurry: score {score:.2} below threshold {threshold}"),
                details,
            ))
        } else {
            Ok(CheckEval::passed(details))
        }
    }
}
