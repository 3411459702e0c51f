// photo-gate-core/src/core/time.rs
// ============================================================================
// Module: Photo Gate Time Model
// Description: Canonical timestamp representation for persisted documents.
// Purpose: Provide deterministic, replayable time values across Photo Gate records.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Photo Gate uses explicit time values embedded in configuration documents
//! and validation records to keep replay deterministic. The core engine never
//! reads wall-clock time for semantics; hosts supply timestamps at the
//! persistence boundary, and measured durations come from monotonic clocks.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Canonical timestamp used in Photo Gate documents.
///
/// # Invariants
/// - Values are explicitly provided by callers; the core never reads wall-clock time.
/// - No validation is performed; monotonicity is a caller responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Timestamp {
    /// Unix epoch milliseconds.
    UnixMillis(i64),
    /// Monotonic logical time value.
    Logical(u64),
}

impl Timestamp {
    /// Returns the timestamp as unix milliseconds when available.
    #[must_use]
    pub const fn as_unix_millis(&self) -> Option<i64> {
        match self {
            Self::UnixMillis(value) => Some(*value),
            Self::Logical(_) => None,
        }
    }

    /// Returns the timestamp as logical time when available.
    #[must_use]
    pub const fn as_logical(&self) -> Option<u64> {
        match self {
            Self::UnixMillis(_) => None,
            Self::Logical(value) => Some(*value),
        }
    }
}
