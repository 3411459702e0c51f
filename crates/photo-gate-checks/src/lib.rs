// photo-gate-checks/src/lib.rs
// ============================================================================
// Module: Photo Gate Checks Library
// Description: Built-in check battery and registry discovery entry point.
// Purpose: Assemble the registered check set into a validated registry.
// Dependencies: photo-gate-core, crate submodules
// ============================================================================

//! ## Overview
//! The built-in battery covers every detection family of the validation
//! service: face presence and geometry, photographic quality, and background
//! content. Discovery iterates the registered variant set below — there is
//! no runtime module scanning — and yields a validated
//! [`photo_gate_core::Registry`] plus the record of any excluded check.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod analysis;
pub mod background;
pub mod detector;
pub mod face;
pub mod quality;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use photo_gate_core::Check;
use photo_gate_core::DiscoveryError;
use photo_gate_core::DiscoveryReport;
use photo_gate_core::Registry;

pub use detector::HeuristicFaceDetector;

// ============================================================================
// SECTION: Discovery
// ============================================================================

/// Returns the registered built-in check set, in canonical discovery order.
///
/// The order seeds the default `check_order` of derived configurations:
/// face presence first, then geometry, then quality, then background.
#[must_use]
pub fn builtin_checks() -> Vec<Arc<dyn Check>> {
    vec![
        Arc::new(face::FaceCountCheck),
        Arc::new(face::FacePoseCheck),
        Arc::new(face::FacePositionCheck),
        Arc::new(face::AccessoriesCheck),
        Arc::new(quality::BlurrinessCheck),
        Arc::new(quality::ColorModeCheck),
        Arc::new(quality::LightingCheck),
        Arc::new(quality::RealPhotoCheck),
        Arc::new(quality::RedEyeCheck),
        Arc::new(background::BackgroundCheck),
        Arc::new(background::ExtraneousObjectsCheck),
    ]
}

/// Discovers the built-in check battery into a validated registry.
///
/// # Errors
///
/// Returns [`DiscoveryError`] when discovery is fatally inconsistent
/// (duplicate names or an empty surviving set).
pub fn discover() -> Result<DiscoveryReport, DiscoveryError> {
    Registry::discover(builtin_checks())
}
