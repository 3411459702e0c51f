// photo-gate-checks/src/quality/mod.rs
// ============================================================================
// Module: Image Quality Checks
// Description: Sharpness, color, exposure, authenticity, and red-eye checks.
// Purpose: Group the photographic-quality check family.
// Dependencies: crate submodules
// ============================================================================

//! Image-quality checks. The luminance-dependent ones share one grayscale
//! plane through the shared context.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod blur;
pub mod color_mode;
pub mod lighting;
pub mod real_photo;
pub mod red_eye;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use blur::BlurrinessCheck;
pub use color_mode::ColorModeCheck;
pub use lighting::LightingCheck;
pub use real_photo::RealPhotoCheck;
pub use red_eye::RedEyeCheck;
