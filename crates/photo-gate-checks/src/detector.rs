// photo-gate-checks/src/detector.rs
// ============================================================================
// Module: Heuristic Face Detector
// Description: Dependency-free fallback implementation of the detector contract.
// Purpose: Keep the engine usable without a model-backed detection service.
// Dependencies: async-trait, photo-gate-core, crate::analysis
// ============================================================================

//! ## Overview
//! Production deployments plug a model-backed service into the core
//! [`FaceDetector`] interface. This fallback approximates a single dominant
//! face from skin-tone density: it finds the bounding box of skin-classified
//! pixels and reports one region when the evidence is strong enough. It
//! produces neither landmarks nor pose angles, so landmark-dependent checks
//! take their documented degraded paths.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use tracing::debug;

use photo_gate_core::BoundingBox;
use photo_gate_core::DetectError;
use photo_gate_core::FaceDetector;
use photo_gate_core::FaceRegion;
use photo_gate_core::PhotoRaster;

use crate::analysis::is_skin_tone;

// ============================================================================
// SECTION: Detector
// ============================================================================

/// Minimum fraction of skin-classified pixels for a detection to be reported.
const MIN_SKIN_FRACTION: f64 = 0.02;

/// Minimum skin density inside the candidate box.
const MIN_BOX_DENSITY: f64 = 0.25;

/// Skin-tone bounding-box face detector.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicFaceDetector;

#[async_trait]
impl FaceDetector for HeuristicFaceDetector {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Confidence is clamped to 0..=1 before narrowing to f32."
    )]
    async fn detect(&self, photo: &PhotoRaster) -> Result<Vec<FaceRegion>, DetectError> {
        let width = photo.width();
        let height = photo.height();
        let mut min_x = width;
        let mut min_y = height;
        let mut max_x = 0u32;
        let mut max_y = 0u32;
        let mut skin_pixels = 0u64;

        for y in 0..height {
            for x in 0..width {
                let Some(rgb) = photo.rgb(x, y) else {
                    continue;
                };
                if is_skin_tone(rgb) {
                    skin_pixels += 1;
                    min_x = min_x.min(x);
                    min_y = min_y.min(y);
                    max_x = max_x.max(x);
                    max_y = max_y.max(y);
                }
            }
        }

        let total = photo.pixel_count() as f64;
        let fraction = skin_pixels as f64 / total;
        if fraction < MIN_SKIN_FRACTION || max_x <= min_x || max_y <= min_y {
            debug!(fraction, "no face evidence above threshold");
            return Ok(Vec::new());
        }

        let box_width = max_x - min_x + 1;
        let box_height = max_y - min_y + 1;
        let box_area = f64::from(box_width) * f64::from(box_height);
        let density = skin_pixels as f64 / box_area;
        if density < MIN_BOX_DENSITY {
            debug!(density, "skin evidence too scattered for a face box");
            return Ok(Vec::new());
        }

        let confidence = density.min(1.0) as f32;
        debug!(box_width, box_height, confidence, "heuristic face detected");
        Ok(vec![FaceRegion {
            bbox: BoundingBox {
                x: min_x as f32,
                y: min_y as f32,
                width: box_width as f32,
                height: box_height as f32,
            },
            confidence,
            pose: None,
            landmarks: None,
        }])
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
