// photo-gate-checks/src/face/pose.rs
// ============================================================================
// Module: Face Pose Check
// Description: Verifies the subject faces the camera frontally.
// Purpose: Reject turned, tilted, or rotated head poses.
// Dependencies: async-trait, photo-gate-core
// ============================================================================

//! Face pose check: verifies the subject faces the camera frontally.

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
use photo_gate_core::FaceRegion;
use photo_gate_core::ParameterKind;
use photo_gate_core::ParameterSpec;
use photo_gate_core::ParameterValue;

// ============================================================================
// SECTION: Parameters
// ============================================================================

/// Stable check identifier.
pub const CHECK_NAME: &str = "face_pose";

/// Maximum left/right rotation in degrees.
const PARAM_MAX_YAW: &str = "max_yaw";

/// Maximum up/down tilt in degrees.
const PARAM_MAX_PITCH: &str = "max_pitch";

/// Maximum in-plane rotation in degrees.
const PARAM_MAX_ROLL: &str = "max_roll";

// ============================================================================
// SECTION: Check
// ============================================================================

/// Face pose check.
#[derive(Debug, Clone, Copy, Default)]
pub struct FacePoseCheck;

impl FacePoseCheck {
    /// Builds one angle-limit parameter spec.
    fn angle_param(name: &str, description: &str) -> ParameterSpec {
        ParameterSpec {
            name: name.to_string(),
            kind: ParameterKind::Float,
            default: Some(ParameterValue::Float(25.0)),
            min: Some(5.0),
            max: Some(90.0),
            choices: None,
            required: true,
            description: description.to_string(),
        }
    }

    /// Picks the dominant face: the one with the largest box area.
    fn primary(regions: &[FaceRegion]) -> Option<&FaceRegion> {
        regions
            .iter()
            .max_by(|a, b| a.bbox.area().partial_cmp(&b.bbox.area()).unwrap_or(std::cmp::Ordering::Equal))
    }
}

#[async_trait]
impl Check for FacePoseCheck {
    fn describe(&self) -> CheckDescriptor {
        CheckDescriptor {
            name: CheckName::new(CHECK_NAME),
            display_name: "Face Pose".to_string(),
            description: "Checks that the face is turned frontally toward the camera"
                .to_string(),
            category: CheckCategory::Face,
            version: "1.0.0".to_string(),
            author: "Photo Validation Team".to_string(),
            parameters: vec![
                Self::angle_param(PARAM_MAX_YAW, "Maximum head rotation left/right (degrees)"),
                Self::angle_param(PARAM_MAX_PITCH, "Maximum head tilt up/down (degrees)"),
                Self::angle_param(PARAM_MAX_ROLL, "Maximum in-plane head rotation (degrees)"),
            ],
            dependencies: BTreeSet::from([CapabilityTag::new(FACE_REGIONS_TAG)]),
            enabled_by_default: true,
            time_limit_secs: None,
        }
    }

    async fn evaluate(&self, input: &EvalInput<'_>) -> Result<CheckEval, CheckError> {
        let max_yaw = input.params.float(PARAM_MAX_YAW)?;
        let max_pitch = input.params.float(PARAM_MAX_PITCH)?;
        let max_roll = input.params.float(PARAM_MAX_ROLL)?;

        let regions = input.shared.face_regions(input.photo).await?;
        let Some(face) = Self::primary(&regions) else {
            return Ok(CheckEval::skipped("No face detected"));
        };
        let Some(pose) = face.pose else {
            return Ok(CheckEval::needs_review(
                "Cannot estimate head pose: detector supplied no pose angles",
                json!({ "bbox": face.bbox }),
            ));
        };

        let yaw = f64::from(pose.yaw);
        let pitch = f64::from(pose.pitch);
        let roll = f64::from(pose.roll);
        // Roll wraps: 178 degrees is a 2-degree deviation, not 178.
        let roll_deviation = (roll.abs() % 180.0).min(180.0 - roll.abs() % 180.0);

        let mut reasons = Vec::new();
        if yaw.abs() > max_yaw {
            reasons.push(format!("Head yaw {yaw:.1} degrees exceeds limit of {max_yaw:.1}"));
        }
        if pitch.abs() > max_pitch {
            reasons
                .push(format!("Head pitch {pitch:.1} degrees exceeds limit of {max_pitch:.1}"));
        }
        if roll_deviation > max_roll {
            reasons.push(format!(
                "Head roll {roll:.1} degrees exceeds limit (deviation {roll_deviation:.1}, \
                 maximum {max_roll:.1})"
            ));
        }

        let details = json!({
            "yaw": yaw,
            "pitch": pitch,
            "roll": roll,
            "thresholds": {
                "max_yaw": max_yaw,
                "max_pitch": max_pitch,
                "max_roll": max_roll,
            },
        });

        if reasons.is_empty() {
            Ok(CheckEval::passed(details))
        } else {
            Ok(CheckEval::failed(reasons.join("; "), details))
        }
    }
}
