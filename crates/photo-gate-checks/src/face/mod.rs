// photo-gate-checks/src/face/mod.rs
// ============================================================================
// Module: Face Checks
// Description: Face presence, geometry, and accessory checks.
// Purpose: Group the checks consuming detector-produced face regions.
// Dependencies: crate submodules
// ============================================================================

//! Face-family checks. All of them read face regions through the shared
//! context, so whichever runs first triggers the single detector invocation.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod accessories;
pub mod count;
pub mod pose;
pub mod position;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use accessories::AccessoriesCheck;
pub use count::FaceCountCheck;
pub use pose::FacePoseCheck;
pub use position::FacePositionCheck;
