// photo-gate-checks/src/face/count.rs
// ============================================================================
// Module: Face Count Check
// Description: Verifies the image contains the required number of faces.
// Purpose: Reject group shots and faceless uploads before geometry checks.
// Dependencies: async-trait, photo-gate-core
// ============================================================================

//! Face count check: verifies the image contains the required number of faces.

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
pub const CHECK_NAME: &str = "face_count";

/// Minimum acceptable face count.
const PARAM_MIN_COUNT: &str = "min_count";

/// Maximum acceptable face count.
const PARAM_MAX_COUNT: &str = "max_count";

/// Detector confidence floor for a region to count as a face.
const PARAM_CONFIDENCE: &str = "confidence_threshold";

// ============================================================================
// SECTION: Check
// ============================================================================

/// Face count check.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaceCountCheck;

#[async_trait]
impl Check for FaceCountCheck {
    fn describe(&self) -> CheckDescriptor {
        CheckDescriptor {
            name: CheckName::new(CHECK_NAME),
            display_name: "Face Count".to_string(),
            description: "Checks that the image contains the required number of faces"
                .to_string(),
            category: CheckCategory::Face,
            version: "1.0.0".to_string(),
            author: "Photo Validation Team".to_string(),
            parameters: vec![
                ParameterSpec {
                    name: PARAM_MIN_COUNT.to_string(),
                    kind: ParameterKind::Int,
                    default: Some(ParameterValue::Int(1)),
                    min: Some(0.0),
                    max: Some(10.0),
                    choices: None,
                    required: true,
                    description: "Minimum number of faces".to_string(),
                },
                ParameterSpec {
                    name: PARAM_MAX_COUNT.to_string(),
                    kind: ParameterKind::Int,
                    default: Some(ParameterValue::Int(1)),
                    min: Some(1.0),
                    max: Some(10.0),
                    choices: None,
                    required: true,
                    description: "Maximum number of faces".to_string(),
                },
                ParameterSpec {
                    name: PARAM_CONFIDENCE.to_string(),
                    kind: ParameterKind::Float,
                    default: Some(ParameterValue::Float(0.4)),
                    min: Some(0.1),
                    max: Some(0.9),
                    choices: None,
                    required: false,
                    description: "Confidence threshold for face detection".to_string(),
                },
            ],
            dependencies: BTreeSet::from([CapabilityTag::new(FACE_REGIONS_TAG)]),
            enabled_by_default: true,
            time_limit_secs: None,
        }
    }

    async fn evaluate(&self, input: &EvalInput<'_>) -> Result<CheckEval, CheckError> {
        let min_count = input.params.int(PARAM_MIN_COUNT)?;
        let max_count = input.params.int(PARAM_MAX_COUNT)?;
        let confidence = input.params.float(PARAM_CONFIDENCE)?;

        let regions = input.shared.face_regions(input.photo).await?;
        let faces: Vec<_> = regions
            .iter()
            .filter(|face| f64::from(face.confidence) >= confidence)
            .collect();
        let face_count = faces.len() as i64;

        let details = json!({
            "face_count": face_count,
            "min_count_required": min_count,
            "max_count_allowed": max_count,
            "confidence_threshold": confidence,
            "faces": faces
                .iter()
                .map(|face| json!({
                    "bbox": face.bbox,
                    "confidence": face.confidence,
                }))
                .collect::<Vec<_>>(),
        });

        if face_count < min_count {
            return Ok(CheckEval::failed(
                format!("Not enough faces: found {face_count}, required minimum {min_count}"),
                details,
            ));
        }
        if face_count > max_count {
            return Ok(CheckEval::failed(
                format!("Too many faces: found {face_count}, maximum {max_count}"),
                details,
            ));
        }
        Ok(CheckEval::passed(details))
    }
}
