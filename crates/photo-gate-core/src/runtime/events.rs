// photo-gate-core/src/runtime/events.rs
// ============================================================================
// Module: Runner Event Stream
// Description: Read-only progress events emitted during a validation run.
// Purpose: Decouple progress observation from aggregation logic.
// Dependencies: serde, crate::core
// ============================================================================

//! ## Overview
//! Monitoring collaborators subscribe to the runner's broadcast channel and
//! receive one `Started` event when a check enters execution plus one
//! `Completed` event carrying the terminal outcome, in completion order.
//! Subscribers never influence aggregation; a slow or absent subscriber
//! costs nothing beyond the channel's bounded buffer.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::CheckName;
use crate::core::outcome::CheckOutcome;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Progress event for one check within a validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CheckEvent {
    /// Check entered execution.
    Started {
        /// Check identifier.
        check: CheckName,
    },
    /// Check reached a terminal state.
    Completed {
        /// Terminal outcome record.
        outcome: CheckOutcome,
    },
}
