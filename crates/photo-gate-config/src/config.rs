// photo-gate-config/src/config.rs
// ============================================================================
// Module: Photo Gate Configuration
// Description: Versioned configuration document with exhaustive validation.
// Purpose: Map declarative settings onto typed, registry-validated parameters.
// Dependencies: photo-gate-core, serde, serde_json, toml
// ============================================================================

//! ## Overview
//! The configuration is a single versioned document: a system block, the
//! execution order, and a per-check settings map. Candidates are validated
//! in full against registry-supplied schemas before they become visible —
//! validation enumerates every offending field in one pass so an operator
//! sees a complete report, and a rejected candidate leaves the prior
//! configuration active. Updates are expressed as deep merges; derived
//! defaults come straight from the registry descriptors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use tracing::warn;

use photo_gate_core::CheckName;
use photo_gate_core::CheckPlan;
use photo_gate_core::PlanIssue;
use photo_gate_core::Registry;
use photo_gate_core::Timestamp;
use photo_gate_core::ValidationPlan;

// ============================================================================
// SECTION: Bounds
// ============================================================================

/// Default configuration schema version.
pub const CONFIG_VERSION: &str = "2.1";

/// Minimum allowed per-check time ceiling in seconds.
pub const MIN_CHECK_TIME_SECS: f64 = 1.0;

/// Maximum allowed per-check time ceiling in seconds.
pub const MAX_CHECK_TIME_SECS: f64 = 30.0;

/// Minimum allowed concurrent image validations.
pub const MIN_CONCURRENT_IMAGES: usize = 1;

/// Maximum allowed concurrent image validations.
pub const MAX_CONCURRENT_IMAGES: usize = 20;

/// Default per-check time ceiling in seconds.
const fn default_max_check_time() -> f64 {
    5.0
}

/// Default concurrent image validations.
const fn default_max_concurrent() -> usize {
    5
}

// ============================================================================
// SECTION: System Settings
// ============================================================================

/// Global system block of the configuration document.
///
/// Storage and logging settings owned by other subsystems are retained as
/// opaque pass-through so a round-trip never drops them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSettings {
    /// Ceiling in seconds applied to every check unless a check declares a
    /// stricter internal limit.
    #[serde(default = "default_max_check_time")]
    pub max_check_time: f64,
    /// Stop launching later checks once one fails.
    #[serde(default)]
    pub stop_on_failure: bool,
    /// Number of images that may be validated simultaneously.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Opaque settings owned by collaborating subsystems.
    #[serde(flatten)]
    pub passthrough: BTreeMap<String, Value>,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            max_check_time: default_max_check_time(),
            stop_on_failure: false,
            max_concurrent: default_max_concurrent(),
            passthrough: BTreeMap::new(),
        }
    }
}

// ============================================================================
// SECTION: Configuration Document
// ============================================================================

/// Versioned Photo Gate configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoGateConfig {
    /// Monotonic schema version string.
    pub version: String,
    /// Stamped by the persistence collaborator on save; absent on freshly
    /// derived defaults so derivation stays idempotent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,
    /// Global system block.
    #[serde(default)]
    pub system: SystemSettings,
    /// Evaluation order; the sole source of execution order.
    #[serde(default)]
    pub check_order: Vec<CheckName>,
    /// Per-check settings, a permutation of `check_order`.
    #[serde(default)]
    pub checks: BTreeMap<CheckName, CheckPlan>,
}

impl PhotoGateConfig {
    /// Parses a TOML document without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the document is malformed.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Parses a JSON snapshot without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the snapshot is malformed.
    pub fn from_json_value(raw: Value) -> Result<Self, ConfigError> {
        serde_json::from_value(raw).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Parses and fully validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed input and
    /// [`ConfigError::Rejected`] listing every violation otherwise; a
    /// rejected candidate must not replace the active configuration.
    pub fn load(raw: &str, registry: &Registry) -> Result<Self, ConfigError> {
        let candidate = Self::from_toml_str(raw)?;
        candidate.into_validated(registry)
    }

    /// Validates a parsed candidate, consuming it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Rejected`] listing every violation.
    pub fn into_validated(self, registry: &Registry) -> Result<Self, ConfigError> {
        let issues = self.validate(registry);
        if issues.is_empty() {
            debug!(version = %self.version, checks = self.checks.len(), "configuration accepted");
            Ok(self)
        } else {
            warn!(count = issues.len(), "configuration rejected");
            Err(ConfigError::Rejected(issues))
        }
    }

    /// Validates the document against registry-supplied schemas.
    ///
    /// Enumerates every offending field in one pass; an empty list means the
    /// document is valid.
    #[must_use]
    pub fn validate(&self, registry: &Registry) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if self.version.trim().is_empty() {
            issues.push(ValidationIssue::EmptyVersion);
        }
        let time = self.system.max_check_time;
        if !(MIN_CHECK_TIME_SECS..=MAX_CHECK_TIME_SECS).contains(&time) {
            issues.push(ValidationIssue::CheckTimeOutOfRange {
                value: time,
            });
        }
        let concurrent = self.system.max_concurrent;
        if !(MIN_CONCURRENT_IMAGES..=MAX_CONCURRENT_IMAGES).contains(&concurrent) {
            issues.push(ValidationIssue::ConcurrencyOutOfRange {
                value: concurrent,
            });
        }
        issues.extend(self.plan().validate(registry).into_iter().map(ValidationIssue::Plan));
        issues
    }

    /// Lowers the document to the execution-facing snapshot the runner takes.
    #[must_use]
    pub fn plan(&self) -> ValidationPlan {
        ValidationPlan {
            max_check_time: self.system.max_check_time,
            stop_on_failure: self.system.stop_on_failure,
            check_order: self.check_order.clone(),
            checks: self.checks.clone(),
        }
    }

    /// Exports a serializable snapshot.
    ///
    /// Importing the snapshot with [`Self::from_json_value`] yields an
    /// identical configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] when the document cannot be
    /// represented as JSON (non-finite floats).
    pub fn export(&self) -> Result<Value, ConfigError> {
        serde_json::to_value(self).map_err(|err| ConfigError::Serialize(err.to_string()))
    }

    /// Applies partial updates with deep-merge semantics.
    ///
    /// Provided keys overwrite, omitted keys retain base values, and
    /// per-check `params` merge at the individual-parameter level. The
    /// merged candidate is fully re-validated; on rejection the base remains
    /// the active configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the patch produces an unparseable or
    /// invalid document.
    pub fn merge(&self, patch: &Value, registry: &Registry) -> Result<Self, ConfigError> {
        let mut base = self.export()?;
        deep_merge(&mut base, patch);
        let candidate = Self::from_json_value(base)?;
        candidate.into_validated(registry)
    }

    /// Derives the default configuration from registry descriptors.
    ///
    /// Enablement comes from `enabled_by_default`, parameter values from the
    /// declared defaults, and the canonical `check_order` is discovery
    /// order. The operation is idempotent: deriving twice yields the same
    /// document.
    #[must_use]
    pub fn reset_to_defaults(registry: &Registry) -> Self {
        let mut checks = BTreeMap::new();
        let mut check_order = Vec::new();
        for name in registry.names() {
            let Some(descriptor) = registry.descriptor(name) else {
                continue;
            };
            let params = descriptor
                .parameters
                .iter()
                .filter_map(|spec| {
                    spec.default.clone().map(|default| (spec.name.clone(), default))
                })
                .collect();
            check_order.push(name.clone());
            checks.insert(name.clone(), CheckPlan {
                enabled: descriptor.enabled_by_default,
                params,
            });
        }
        Self {
            version: CONFIG_VERSION.to_string(),
            last_modified: None,
            system: SystemSettings::default(),
            check_order,
            checks,
        }
    }
}

// ============================================================================
// SECTION: Deep Merge
// ============================================================================

/// Deep-merges `patch` into `base`: objects merge key-wise, everything else
/// overwrites.
fn deep_merge(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, patch_value) in patch_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge(base_value, patch_value),
                    None => {
                        base_map.insert(key.clone(), patch_value.clone());
                    }
                }
            }
        }
        (base_slot, patch_value) => {
            *base_slot = patch_value.clone();
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// One configuration violation found during validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationIssue {
    /// Version string is empty.
    #[error("version must not be empty")]
    EmptyVersion,
    /// Per-check time ceiling is outside the allowed range.
    #[error(
        "system.max_check_time {value} outside {MIN_CHECK_TIME_SECS}..={MAX_CHECK_TIME_SECS}"
    )]
    CheckTimeOutOfRange {
        /// Offending value.
        value: f64,
    },
    /// Concurrency limit is outside the allowed range.
    #[error(
        "system.max_concurrent {value} outside {MIN_CONCURRENT_IMAGES}..={MAX_CONCURRENT_IMAGES}"
    )]
    ConcurrencyOutOfRange {
        /// Offending value.
        value: usize,
    },
    /// Violation reported by plan validation.
    #[error(transparent)]
    Plan(PlanIssue),
}

/// Configuration loading and update errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Document or snapshot failed to parse.
    #[error("configuration parse error: {0}")]
    Parse(String),
    /// Candidate rejected; every violation is listed.
    #[error("configuration rejected with {} issue(s)", .0.len())]
    Rejected(Vec<ValidationIssue>),
    /// Document could not be serialized for export or merge.
    #[error("configuration serialize error: {0}")]
    Serialize(String),
}
