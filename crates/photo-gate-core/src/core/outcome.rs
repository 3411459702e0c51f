// photo-gate-core/src/core/outcome.rs
// ============================================================================
// Module: Check Outcomes and Verdicts
// Description: Per-check result records and the final reduced verdict.
// Purpose: Provide immutable, serializable outcome types for one validation run.
// Dependencies: serde, crate::core::identifiers
// ============================================================================

//! ## Overview
//! Every executed check produces exactly one [`CheckOutcome`] per validation
//! run; the runner reduces the ordered outcome trail into a [`Verdict`]. Both
//! are immutable once produced. Check implementations report pass/fail
//! dispositions via [`CheckEval`]; the `Error`, `Timeout`, and runner-side
//! `Skipped` statuses are assigned by the orchestration engine only.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::CheckName;

// ============================================================================
// SECTION: Check Status
// ============================================================================

/// Terminal status of one check within a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckStatus {
    /// Check ran and the image satisfies it.
    Passed,
    /// Check ran and the image deliberately fails it.
    Failed,
    /// Check ran but could not decide; a human should look.
    NeedsReview,
    /// Check raised an unexpected error; captured, not propagated.
    Error,
    /// Check exceeded its effective time limit.
    Timeout,
    /// Check never entered execution.
    Skipped,
}

impl CheckStatus {
    /// Returns true for statuses that mean the check actually executed.
    #[must_use]
    pub const fn executed(self) -> bool {
        matches!(self, Self::Passed | Self::Failed | Self::NeedsReview)
    }
}

// ============================================================================
// SECTION: Check Evaluation
// ============================================================================

/// Disposition returned by a check implementation.
///
/// Implementations may report `Passed`, `Failed`, `NeedsReview`, or a
/// dependency-missing `Skipped`; the runner owns `Error` and `Timeout`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckEval {
    /// Reported status.
    pub status: CheckStatus,
    /// Human-readable reason, required when the status is not `Passed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Opaque structured payload: measured metrics and thresholds used.
    #[serde(default)]
    pub details: serde_json::Value,
}

impl CheckEval {
    /// Builds a passing evaluation.
    #[must_use]
    pub const fn passed(details: serde_json::Value) -> Self {
        Self {
            status: CheckStatus::Passed,
            reason: None,
            details,
        }
    }

    /// Builds a failing evaluation with a reason.
    #[must_use]
    pub fn failed(reason: impl Into<String>, details: serde_json::Value) -> Self {
        Self {
            status: CheckStatus::Failed,
            reason: Some(reason.into()),
            details,
        }
    }

    /// Builds a needs-review evaluation with a reason.
    #[must_use]
    pub fn needs_review(reason: impl Into<String>, details: serde_json::Value) -> Self {
        Self {
            status: CheckStatus::NeedsReview,
            reason: Some(reason.into()),
            details,
        }
    }

    /// Builds a dependency-missing skip disposition.
    #[must_use]
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Skipped,
            reason: Some(reason.into()),
            details: serde_json::Value::Null,
        }
    }
}

// ============================================================================
// SECTION: Check Outcome
// ============================================================================

/// Immutable record of one check's result within a validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    /// Check identifier.
    pub check: CheckName,
    /// Terminal status.
    pub status: CheckStatus,
    /// Human-readable reason, present when the status is not `Passed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Opaque structured payload.
    #[serde(default)]
    pub details: serde_json::Value,
    /// Measured execution time in milliseconds.
    pub duration_ms: u64,
}

// ============================================================================
// SECTION: Verdict
// ============================================================================

/// Final reduction of all check outcomes for one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictStatus {
    /// Every executed check passed.
    Approved,
    /// At least one executed check failed.
    Rejected,
    /// No failure, but at least one check needs review, errored, or timed out.
    ManualReview,
    /// Infrastructure-class verdict: no check produced evidence.
    Failed,
}

/// Verdict plus the per-check result trail for one validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Reduced status.
    pub status: VerdictStatus,
    /// Outcomes ordered by the configured check order.
    pub check_results: Vec<CheckOutcome>,
    /// Number of checks that passed.
    pub checks_passed: usize,
    /// Number of checks accounted for (executed plus skipped).
    pub total_checks: usize,
    /// Wall-clock time for the whole run in milliseconds.
    pub processing_time_ms: u64,
}

impl Verdict {
    /// Number of outcomes with the given status in the trail.
    #[must_use]
    pub fn count(&self, status: CheckStatus) -> usize {
        self.check_results.iter().filter(|outcome| outcome.status == status).count()
    }
}
