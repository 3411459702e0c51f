// photo-gate-config/src/lib.rs
// ============================================================================
// Module: Photo Gate Config Library
// Description: Public API surface for configuration management.
// Purpose: Expose the canonical configuration model and validation.
// Dependencies: crate::config
// ============================================================================

//! ## Overview
//! This crate owns the versioned Photo Gate configuration document: parsing
//! from TOML or JSON snapshots, exhaustive validation against the check
//! registry, deep-merge updates, export, and defaults derivation. The
//! runtime consumes the lowered [`photo_gate_core::ValidationPlan`]; this
//! crate is the single authority on the document around it.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::CONFIG_VERSION;
pub use config::ConfigError;
pub use config::MAX_CHECK_TIME_SECS;
pub use config::MAX_CONCURRENT_IMAGES;
pub use config::MIN_CHECK_TIME_SECS;
pub use config::MIN_CONCURRENT_IMAGES;
pub use config::PhotoGateConfig;
pub use config::SystemSettings;
pub use config::ValidationIssue;
