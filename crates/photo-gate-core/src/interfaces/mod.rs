// photo-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Photo Gate Interfaces
// Description: Backend-agnostic contracts for checks, detection, and metrics.
// Purpose: Define the surfaces the orchestration engine integrates through.
// Dependencies: async-trait, thiserror, crate::{core, runtime}
// ============================================================================

//! ## Overview
//! Interfaces define how the orchestration engine integrates with check
//! implementations and external collaborators without embedding
//! backend-specific details. Check bodies are opaque to the engine: they
//! satisfy [`Check`] and nothing else. Heavyweight detection backends live
//! behind [`FaceDetector`]; validation history sinks behind [`VerdictSink`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use thiserror::Error;

use crate::core::descriptor::CheckDescriptor;
use crate::core::identifiers::CapabilityTag;
use crate::core::image::FaceRegion;
use crate::core::image::PhotoRaster;
use crate::core::outcome::CheckEval;
use crate::core::outcome::Verdict;
use crate::core::params::ParamAccessError;
use crate::core::params::ResolvedParams;
use crate::runtime::context::SharedContext;

// ============================================================================
// SECTION: Check Contract
// ============================================================================

/// Evaluation input handed to a check: the raster, the per-run shared
/// context, and the resolved parameter set.
pub struct EvalInput<'run> {
    /// Decoded image under validation.
    pub photo: &'run PhotoRaster,
    /// Per-run shared context for declared dependencies.
    pub shared: &'run SharedContext,
    /// Effective parameters (descriptor defaults overlaid with configuration).
    pub params: &'run ResolvedParams,
}

/// Errors a check may surface during evaluation.
///
/// These become `ERROR` outcomes; they never abort sibling checks.
#[derive(Debug, Clone, Error)]
pub enum CheckError {
    /// Parameter lookup failed; indicates a descriptor/configuration bug.
    #[error("parameter error: {0}")]
    Param(#[from] ParamAccessError),
    /// A shared-context dependency failed to compute.
    #[error(transparent)]
    Dependency(#[from] DependencyError),
    /// Unexpected failure inside the check body.
    #[error("check execution error: {0}")]
    Execution(String),
}

/// One independent, named unit of image analysis.
///
/// Implementations are stateless with respect to individual runs: all
/// per-run inputs arrive through [`EvalInput`], and all tuning arrives
/// through the resolved parameters declared in the descriptor.
#[async_trait]
pub trait Check: Send + Sync {
    /// Returns the static self-description of this check.
    fn describe(&self) -> CheckDescriptor;

    /// Evaluates the image and reports a disposition.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError`] on unexpected failure; the runner records it as
    /// an `ERROR` outcome.
    async fn evaluate(&self, input: &EvalInput<'_>) -> Result<CheckEval, CheckError>;
}

// ============================================================================
// SECTION: Face Detection Backend
// ============================================================================

/// Face detection errors reported by the backend.
#[derive(Debug, Clone, Error)]
pub enum DetectError {
    /// Backend reported an error.
    #[error("face detection backend error: {0}")]
    Backend(String),
}

/// Face detection backend contract.
///
/// The engine caches the result per run through the shared context, so a
/// backend is invoked at most once per validated image.
#[async_trait]
pub trait FaceDetector: Send + Sync {
    /// Detects faces in the raster.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError`] when the backend cannot produce a result; the
    /// failure is cached and replayed to every dependent check.
    async fn detect(&self, photo: &PhotoRaster) -> Result<Vec<FaceRegion>, DetectError>;
}

// ============================================================================
// SECTION: Dependency Computation Errors
// ============================================================================

/// Failure of a shared-context dependency computation.
///
/// Cloneable so the cached failure replays identically to every waiter;
/// consumers may have divergent fallback behavior but must observe a
/// consistent upstream failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("dependency {tag} failed: {message}")]
pub struct DependencyError {
    /// Capability tag that failed to compute.
    pub tag: CapabilityTag,
    /// Human-readable failure description.
    pub message: String,
}

impl DependencyError {
    /// Creates a new dependency failure record.
    #[must_use]
    pub fn new(tag: impl Into<CapabilityTag>, message: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// SECTION: Verdict Sink
// ============================================================================

/// Metrics/history sink receiving one verdict per validation.
///
/// Emission is fire-and-forget: the engine never blocks on acknowledgement
/// and ignores sink-side failures.
pub trait VerdictSink: Send + Sync {
    /// Records a completed verdict.
    fn record(&self, verdict: &Verdict);
}

/// Sink that discards every verdict.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullVerdictSink;

impl VerdictSink for NullVerdictSink {
    fn record(&self, _verdict: &Verdict) {}
}
