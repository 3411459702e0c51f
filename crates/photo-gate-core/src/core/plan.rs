// photo-gate-core/src/core/plan.rs
// ============================================================================
// Module: Validation Plan
// Description: Execution-facing snapshot of the check configuration.
// Purpose: Define the ordered, typed check set the runner executes.
// Dependencies: serde, thiserror, crate::core
// ============================================================================

//! ## Overview
//! A [`ValidationPlan`] is the part of the configuration document the runner
//! actually consumes: the per-check timeout ceiling, the short-circuit flag,
//! the execution order, and the per-check enablement plus parameter
//! overrides. The configuration crate owns the full versioned document and
//! lowers it to this snapshot; both validate against registry-supplied
//! schemas through [`ValidationPlan::validate`], which enumerates every
//! offending field in one pass rather than failing fast.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::descriptor::CheckDescriptor;
use crate::core::identifiers::CheckName;
use crate::core::params::ParameterValue;
use crate::core::params::ValueViolation;
use crate::core::registry::Registry;

// ============================================================================
// SECTION: Plan Types
// ============================================================================

/// Per-check settings within a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckPlan {
    /// Whether the check participates in validation runs.
    pub enabled: bool,
    /// Parameter overrides keyed by parameter name.
    #[serde(default)]
    pub params: BTreeMap<String, ParameterValue>,
}

/// Execution-facing configuration snapshot for one validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationPlan {
    /// Ceiling in seconds applied to every check unless the check declares a
    /// stricter internal limit.
    pub max_check_time: f64,
    /// Stop launching later checks once one fails.
    pub stop_on_failure: bool,
    /// Evaluation order; implicitly the priority for short-circuiting.
    pub check_order: Vec<CheckName>,
    /// Per-check settings, a permutation of `check_order`.
    pub checks: BTreeMap<CheckName, CheckPlan>,
}

impl ValidationPlan {
    /// Validates the plan against registry-supplied schemas.
    ///
    /// Returns every violation found, in field order; an empty list means
    /// the plan is valid. Callers that hot-replace configuration must treat
    /// a non-empty list as an atomic rejection of the whole candidate.
    #[must_use]
    pub fn validate(&self, registry: &Registry) -> Vec<PlanIssue> {
        let mut issues = Vec::new();

        if self.max_check_time <= 0.0 {
            issues.push(PlanIssue::NonPositiveCheckTime {
                value: self.max_check_time,
            });
        }

        let mut seen = BTreeSet::new();
        for name in &self.check_order {
            if !seen.insert(name.clone()) {
                issues.push(PlanIssue::DuplicateOrderEntry {
                    check: name.clone(),
                });
            }
            if !self.checks.contains_key(name) {
                issues.push(PlanIssue::OrderNotConfigured {
                    check: name.clone(),
                });
            }
        }

        for (name, settings) in &self.checks {
            if !seen.contains(name) {
                issues.push(PlanIssue::ConfiguredNotOrdered {
                    check: name.clone(),
                });
            }
            let Some(descriptor) = registry.descriptor(name) else {
                issues.push(PlanIssue::UnknownCheck {
                    check: name.clone(),
                });
                continue;
            };
            Self::validate_params(descriptor, settings, &mut issues);
        }

        for name in &self.check_order {
            if !self.checks.contains_key(name) && registry.descriptor(name).is_none() {
                issues.push(PlanIssue::UnknownCheck {
                    check: name.clone(),
                });
            }
        }

        issues
    }

    /// Validates one check's parameter overrides against its descriptor.
    fn validate_params(
        descriptor: &CheckDescriptor,
        settings: &CheckPlan,
        issues: &mut Vec<PlanIssue>,
    ) {
        for (param, value) in &settings.params {
            match descriptor.parameter(param) {
                None => issues.push(PlanIssue::UnknownParameter {
                    check: descriptor.name.clone(),
                    parameter: param.clone(),
                }),
                Some(spec) => {
                    if let Err(violation) = spec.admit(value) {
                        issues.push(PlanIssue::InvalidValue {
                            check: descriptor.name.clone(),
                            parameter: param.clone(),
                            violation,
                        });
                    }
                }
            }
        }
        for spec in &descriptor.parameters {
            if spec.required
                && spec.default.is_none()
                && !settings.params.contains_key(&spec.name)
            {
                issues.push(PlanIssue::MissingRequired {
                    check: descriptor.name.clone(),
                    parameter: spec.name.clone(),
                });
            }
        }
    }

    /// Effective timeout for a check: the stricter of the system ceiling and
    /// any check-declared limit.
    #[must_use]
    pub fn effective_timeout(&self, descriptor: &CheckDescriptor) -> Duration {
        let ceiling = self.max_check_time.max(0.0);
        let secs = descriptor
            .time_limit_secs
            .map_or(ceiling, |declared| declared.min(ceiling));
        Duration::from_secs_f64(secs)
    }
}

// ============================================================================
// SECTION: Plan Issues
// ============================================================================

/// One configuration violation found during plan validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanIssue {
    /// Check time ceiling is zero or negative.
    #[error("max_check_time must be positive, got {value}")]
    NonPositiveCheckTime {
        /// Offending value.
        value: f64,
    },
    /// A check name appears twice in the execution order.
    #[error("check {check} appears more than once in check_order")]
    DuplicateOrderEntry {
        /// Offending check.
        check: CheckName,
    },
    /// An ordered check has no settings entry.
    #[error("check {check} is in check_order but not configured")]
    OrderNotConfigured {
        /// Offending check.
        check: CheckName,
    },
    /// A configured check is missing from the execution order.
    #[error("check {check} is configured but missing from check_order")]
    ConfiguredNotOrdered {
        /// Offending check.
        check: CheckName,
    },
    /// A referenced check is not in the registry.
    #[error("unknown check: {check}")]
    UnknownCheck {
        /// Offending check.
        check: CheckName,
    },
    /// A parameter override names an undeclared parameter.
    #[error("check {check} has no parameter named {parameter}")]
    UnknownParameter {
        /// Offending check.
        check: CheckName,
        /// Offending parameter name.
        parameter: String,
    },
    /// A parameter value violates its declared schema.
    #[error("check {check} parameter {parameter}: {violation}")]
    InvalidValue {
        /// Offending check.
        check: CheckName,
        /// Offending parameter name.
        parameter: String,
        /// Constraint the value breaks.
        violation: ValueViolation,
    },
    /// A required parameter without a declared default is not supplied.
    #[error("check {check} requires parameter {parameter}")]
    MissingRequired {
        /// Offending check.
        check: CheckName,
        /// Missing parameter name.
        parameter: String,
    },
}
