// photo-gate-checks/src/background/extraneous.rs
// ============================================================================
// Module: Extraneous Objects Check
// Description: Detects additional people or objects around the subject.
// Purpose: Reject photos where the subject is not alone in the frame.
// Dependencies: async-trait, photo-gate-core, crate::analysis
// ============================================================================

//! Extraneous objects check: detects additional people or objects around the subject.

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
use photo_gate_core::LUMINANCE_PLANE_TAG;
use photo_gate_core::ParameterKind;
use photo_gate_core::ParameterSpec;
use photo_gate_core::ParameterValue;

use crate::analysis::background_samples;
use crate::analysis::edge_density;

// ============================================================================
// SECTION: Parameters
// ============================================================================

/// Stable check identifier.
pub const CHECK_NAME: &str = "extraneous_objects";

/// Minimum fraction of strong-edge background pixels that counts as an object.
const PARAM_MIN_AREA: &str = "min_object_area_ratio";

/// Lower gradient magnitude bound for the edge sweep.
const PARAM_EDGE_LOW: &str = "edge_low";

/// Upper gradient magnitude bound for the edge sweep.
const PARAM_EDGE_HIGH: &str = "edge_high";

/// Declared execution ceiling; the sweep is the most expensive built-in body.
const TIME_LIMIT_SECS: f64 = 3.0;

// ============================================================================
// SECTION: Check
// ============================================================================

/// Extraneous objects check.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtraneousObjectsCheck;

#[async_trait]
impl Check for ExtraneousObjectsCheck {
    fn describe(&self) -> CheckDescriptor {
        CheckDescriptor {
            name: CheckName::new(CHECK_NAME),
            display_name: "Extraneous Objects".to_string(),
            description: "Checks for additional people or objects in the background"
                .to_string(),
            category: CheckCategory::Background,
            version: "1.0.0".to_string(),
            author: "Photo Validation Team".to_string(),
            parameters: vec![
                ParameterSpec {
                    name: PARAM_MIN_AREA.to_string(),
                    kind: ParameterKind::Float,
                    default: Some(ParameterValue::Float(0.03)),
                    min: Some(0.001),
                    max: Some(0.5),
                    choices: None,
                    required: true,
                    description: "Minimum object-to-image area ratio".to_string(),
                },
                ParameterSpec {
                    name: PARAM_EDGE_LOW.to_string(),
                    kind: ParameterKind::Int,
                    default: Some(ParameterValue::Int(50)),
                    min: Some(10.0),
                    max: Some(150.0),
                    choices: None,
                    required: false,
                    description: "Lower edge magnitude bound".to_string(),
                },
                ParameterSpec {
                    name: PARAM_EDGE_HIGH.to_string(),
                    kind: ParameterKind::Int,
                    default: Some(ParameterValue::Int(150)),
                    min: Some(50.0),
                    max: Some(300.0),
                    choices: None,
                    required: false,
                    description: "Upper edge magnitude bound".to_string(),
                },
            ],
            dependencies: BTreeSet::from([
                CapabilityTag::new(FACE_REGIONS_TAG),
                CapabilityTag::new(LUMINANCE_PLANE_TAG),
            ]),
            enabled_by_default: true,
            time_limit_secs: Some(TIME_LIMIT_SECS),
        }
    }

    async fn evaluate(&self, input: &EvalInput<'_>) -> Result<CheckEval, CheckError> {
        let min_area = input.params.float(PARAM_MIN_AREA)?;
        let edge_low = input.params.int(PARAM_EDGE_LOW)?;
        let edge_high = input.params.int(PARAM_EDGE_HIGH)?;

        let luma = input.shared.luminance(input.photo).await?;
        let regions = input.shared.face_regions(input.photo).await?;
        let width = input.photo.width() as usize;
        let height = input.photo.height() as usize;

        let face_bbox = regions.first().map(|face| face.bbox);
        let backdrop = background_samples(&luma, width, height, face_bbox.as_ref());
        let backdrop_fraction = backdrop.len() as f64 / luma.len().max(1) as f64;

        // Strong edges in the masked-out backdrop approximate object
        // contours; scale by the backdrop share so a tight face crop does
        // not read as clutter. The weak-edge sweep is kept for diagnostics.
        let strong_edges = edge_density(&luma, width, height, edge_high as f64);
        let weak_edges = edge_density(&luma, width, height, edge_low as f64);
        let object_ratio = strong_edges * backdrop_fraction;

        let details = json!({
            "object_area_ratio": object_ratio,
            "strong_edge_density": strong_edges,
            "weak_edge_density": weak_edges,
            "backdrop_fraction": backdrop_fraction,
            "threshold": min_area,
            "face_masked": face_bbox.is_some(),
        });

        if object_ratio > min_area {
            Ok(CheckEval::failed(
                format!(
                    "Extraneous objects detected: contour area ratio {object_ratio:.3} \
                     above {min_area:.3}"
                ),
                details,
            ))
        } else {
            Ok(CheckEval::passed(details))
        }
    }
}
