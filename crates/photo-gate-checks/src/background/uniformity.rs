// photo-gate-checks/src/background/uniformity.rs
// ============================================================================
// Module: Background Check
// Description: Uniformity and brightness analysis of the backdrop.
// Purpose: Reject busy, cluttered, or too-dark backgrounds.
// Dependencies: async-trait, photo-gate-core, crate::analysis
// ============================================================================

//! Background check: uniformity and brightness analysis of the backdrop.

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
use crate::analysis::luma_stats;

// ============================================================================
// SECTION: Parameters
// ============================================================================

/// Stable check identifier.
pub const CHECK_NAME: &str = "background";

/// Luminance deviation above which the backdrop counts as non-uniform.
const PARAM_STD_DEV: &str = "std_dev_threshold";

/// Mean luminance below which the backdrop counts as too dark.
const PARAM_DARK: &str = "is_dark_threshold";

/// Edge density above which the backdrop counts as cluttered.
const PARAM_EDGE_DENSITY: &str = "edge_density_threshold";

// ============================================================================
// SECTION: Check
// ============================================================================

/// Background uniformity check.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackgroundCheck;

#[async_trait]
impl Check for BackgroundCheck {
    fn describe(&self) -> CheckDescriptor {
        CheckDescriptor {
            name: CheckName::new(CHECK_NAME),
            display_name: "Background".to_string(),
            description: "Checks that the background is uniform and bright enough"
                .to_string(),
            category: CheckCategory::Background,
            version: "1.0.0".to_string(),
            author: "Photo Validation Team".to_string(),
            parameters: vec![
                ParameterSpec {
                    name: PARAM_STD_DEV.to_string(),
                    kind: ParameterKind::Float,
                    default: Some(ParameterValue::Float(110.0)),
                    min: Some(50.0),
                    max: Some(200.0),
                    choices: None,
                    required: true,
                    description: "Standard deviation threshold for uniformity".to_string(),
                },
                ParameterSpec {
                    name: PARAM_DARK.to_string(),
                    kind: ParameterKind::Int,
                    default: Some(ParameterValue::Int(80)),
                    min: Some(30.0),
                    max: Some(150.0),
                    choices: None,
                    required: true,
                    description: "Mean brightness threshold for dark backgrounds".to_string(),
                },
                ParameterSpec {
                    name: PARAM_EDGE_DENSITY.to_string(),
                    kind: ParameterKind::Float,
                    default: Some(ParameterValue::Float(0.08)),
                    min: Some(0.01),
                    max: Some(0.5),
                    choices: None,
                    required: false,
                    description: "Edge density threshold for clutter".to_string(),
                },
            ],
            dependencies: BTreeSet::from([
                CapabilityTag::new(FACE_REGIONS_TAG),
                CapabilityTag::new(LUMINANCE_PLANE_TAG),
            ]),
            enabled_by_default: true,
            time_limit_secs: None,
        }
    }

    async fn evaluate(&self, input: &EvalInput<'_>) -> Result<CheckEval, CheckError> {
        let std_dev_limit = input.params.float(PARAM_STD_DEV)?;
        let dark_limit = input.params.int(PARAM_DARK)?;
        let edge_limit = input.params.float(PARAM_EDGE_DENSITY)?;

        let luma = input.shared.luminance(input.photo).await?;
        let regions = input.shared.face_regions(input.photo).await?;
        let width = input.photo.width() as usize;
        let height = input.photo.height() as usize;

        let face_bbox = regions.first().map(|face| face.bbox);
        let backdrop = background_samples(&luma, width, height, face_bbox.as_ref());
        let (mean, std_dev) = luma_stats(&backdrop);
        // Clutter is measured over the full plane; masking would cut edges
        // at the box boundary and inflate the density.
        let clutter = edge_density(&luma, width, height, 120.0);

        let mut reasons = Vec::new();
        if std_dev > std_dev_limit {
            reasons.push(format!(
                "Background not uniform: deviation {std_dev:.1} above {std_dev_limit:.1}"
            ));
        }
        if mean < dark_limit as f64 {
            reasons.push(format!(
                "Background too dark: brightness {mean:.1} below {dark_limit}"
            ));
        }
        if clutter > edge_limit {
            reasons.push(format!(
                "Background cluttered: edge density {clutter:.3} above {edge_limit:.3}"
            ));
        }

        let details = json!({
            "background_mean": mean,
            "background_std_dev": std_dev,
            "edge_density": clutter,
            "face_masked": face_bbox.is_some(),
            "thresholds": {
                "std_dev": std_dev_limit,
                "dark": dark_limit,
                "edge_density": edge_limit,
            },
        });

        if reasons.is_empty() {
            Ok(CheckEval::passed(details))
        } else {
            Ok(CheckEval::failed(reasons.join("; "), details))
        }
    }
}
