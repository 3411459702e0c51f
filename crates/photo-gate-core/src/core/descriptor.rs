// photo-gate-core/src/core/descriptor.rs
// ============================================================================
// Module: Check Descriptors
// Description: Static self-description of a check implementation.
// Purpose: Provide immutable metadata for discovery, configuration, and display.
// Dependencies: serde, thiserror, crate::core::{identifiers, params}
// ============================================================================

//! ## Overview
//! A [`CheckDescriptor`] is produced once per check at discovery time and is
//! immutable for the process lifetime. It names the check, buckets it into a
//! category, declares its parameter schemas and shared-context dependencies,
//! and carries the default-enabled flag that seeds derived configurations.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::CapabilityTag;
use crate::core::identifiers::CheckName;
use crate::core::params::ParameterSpec;
use crate::core::params::ParameterSpecError;

// ============================================================================
// SECTION: Categories
// ============================================================================

/// Category bucket for a check.
///
/// The set is fixed but extensible: adding a family means adding a variant,
/// not widening a stringly-typed namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckCategory {
    /// Face geometry and presence checks.
    Face,
    /// Photographic quality checks.
    ImageQuality,
    /// Background content checks.
    Background,
}

impl CheckCategory {
    /// All known categories, in display order.
    pub const ALL: [Self; 3] = [Self::Face, Self::ImageQuality, Self::Background];
}

impl fmt::Display for CheckCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Face => "face",
            Self::ImageQuality => "image_quality",
            Self::Background => "background",
        };
        f.write_str(label)
    }
}

// ============================================================================
// SECTION: Check Descriptor
// ============================================================================

/// Static metadata for one check implementation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckDescriptor {
    /// Globally unique, stable check identifier.
    pub name: CheckName,
    /// Human-readable display name.
    pub display_name: String,
    /// Human-readable description.
    pub description: String,
    /// Category bucket.
    pub category: CheckCategory,
    /// Semantic version of the implementation.
    pub version: String,
    /// Implementation author.
    pub author: String,
    /// Ordered parameter schemas.
    pub parameters: Vec<ParameterSpec>,
    /// Shared-context capabilities this check reads through.
    #[serde(default)]
    pub dependencies: BTreeSet<CapabilityTag>,
    /// Whether derived default configurations enable this check.
    pub enabled_by_default: bool,
    /// Check-declared execution ceiling, when stricter than the system one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit_secs: Option<f64>,
}

impl CheckDescriptor {
    /// Validates the descriptor for registration.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError`] when identity fields are empty, parameter
    /// names collide, a parameter schema is inconsistent, or the declared
    /// time limit is not positive.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if self.name.as_str().trim().is_empty() {
            return Err(DescriptorError::EmptyName);
        }
        if self.version.trim().is_empty() {
            return Err(DescriptorError::EmptyVersion {
                check: self.name.clone(),
            });
        }
        for (index, spec) in self.parameters.iter().enumerate() {
            if self.parameters.iter().skip(index + 1).any(|other| other.name == spec.name) {
                return Err(DescriptorError::DuplicateParameter {
                    check: self.name.clone(),
                    parameter: spec.name.clone(),
                });
            }
            spec.validate().map_err(|source| DescriptorError::Parameter {
                check: self.name.clone(),
                source,
            })?;
        }
        if let Some(limit) = self.time_limit_secs
            && limit <= 0.0
        {
            return Err(DescriptorError::NonPositiveTimeLimit {
                check: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Returns the parameter spec with the given name, when declared.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|spec| spec.name == name)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Descriptor validation errors surfaced at discovery time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DescriptorError {
    /// Check name is empty.
    #[error("check name must not be empty")]
    EmptyName,
    /// Version string is empty.
    #[error("check {check} declares an empty version")]
    EmptyVersion {
        /// Offending check.
        check: CheckName,
    },
    /// Two parameters share a name.
    #[error("check {check} declares parameter {parameter} more than once")]
    DuplicateParameter {
        /// Offending check.
        check: CheckName,
        /// Colliding parameter name.
        parameter: String,
    },
    /// A parameter schema is inconsistent.
    #[error("check {check} has an invalid parameter: {source}")]
    Parameter {
        /// Offending check.
        check: CheckName,
        /// Underlying schema error.
        source: ParameterSpecError,
    },
    /// Declared time limit is zero or negative.
    #[error("check {check} declares a non-positive time limit")]
    NonPositiveTimeLimit {
        /// Offending check.
        check: CheckName,
    },
}
