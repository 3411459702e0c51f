// photo-gate-core/src/runtime/context.rs
// ============================================================================
// Module: Shared Validation Context
// Description: Per-image cache for expensive cross-check dependencies.
// Purpose: Guarantee at-most-one computation per capability tag per run.
// Dependencies: tokio, tracing, crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! A [`SharedContext`] lives for exactly one image's validation run and is
//! never shared across images, so it needs no cross-request locking. Each
//! capability tag resolves through a single-flight slot: the first caller
//! executes the compute future, concurrent callers await the same slot and
//! receive the identical value. A compute failure is cached and replayed to
//! every waiter; it is never silently retried within the run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::Mutex;

use tokio::sync::OnceCell;
use tracing::debug;

use crate::core::identifiers::CapabilityTag;
use crate::core::identifiers::FACE_REGIONS_TAG;
use crate::core::identifiers::LUMINANCE_PLANE_TAG;
use crate::core::image::FaceRegion;
use crate::core::image::PhotoRaster;
use crate::interfaces::DependencyError;
use crate::interfaces::FaceDetector;

// ============================================================================
// SECTION: Context Values
// ============================================================================

/// A cached shared-context value.
///
/// Payloads are `Arc`-wrapped so every consumer receives the identical
/// allocation, not a recomputation or a copy.
#[derive(Debug, Clone)]
pub enum ContextValue {
    /// Detector-produced face regions.
    FaceRegions(Arc<Vec<FaceRegion>>),
    /// 8-bit luminance plane, row-major.
    Luminance(Arc<Vec<u8>>),
}

/// Slot type: a single-flight cell holding the computation's result,
/// success or failure alike.
type Slot = Arc<OnceCell<Result<ContextValue, DependencyError>>>;

// ============================================================================
// SECTION: Shared Context
// ============================================================================

/// Per-run scratch space for expensive intermediate results.
pub struct SharedContext {
    /// Detection backend used by the `face-regions` capability.
    detector: Arc<dyn FaceDetector>,
    /// Single-flight slots keyed by capability tag.
    slots: Mutex<BTreeMap<CapabilityTag, Slot>>,
}

impl SharedContext {
    /// Creates a fresh context for one validation run.
    #[must_use]
    pub fn new(detector: Arc<dyn FaceDetector>) -> Self {
        Self {
            detector,
            slots: Mutex::new(BTreeMap::new()),
        }
    }

    /// Resolves a capability tag, computing it at most once per run.
    ///
    /// The first caller for a tag executes `compute`; concurrent callers for
    /// the same tag await the same slot and receive the identical result.
    /// Distinct tags proceed independently.
    ///
    /// # Errors
    ///
    /// Returns the cached [`DependencyError`] when the computation failed,
    /// identically for every waiter.
    pub async fn get_or_compute<F, Fut>(
        &self,
        tag: CapabilityTag,
        compute: F,
    ) -> Result<ContextValue, DependencyError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ContextValue, DependencyError>>,
    {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            Arc::clone(slots.entry(tag.clone()).or_default())
        };
        let result = slot
            .get_or_init(|| async move {
                debug!(tag = %tag, "computing shared-context dependency");
                compute().await
            })
            .await;
        result.clone()
    }

    /// Returns the detector-produced face regions, computed at most once.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyError`] when the detection backend failed; the
    /// same failure is replayed to every dependent check.
    pub async fn face_regions(
        &self,
        photo: &PhotoRaster,
    ) -> Result<Arc<Vec<FaceRegion>>, DependencyError> {
        let detector = Arc::clone(&self.detector);
        let value = self
            .get_or_compute(CapabilityTag::new(FACE_REGIONS_TAG), || async move {
                let faces = detector.detect(photo).await.map_err(|err| {
                    DependencyError::new(FACE_REGIONS_TAG, err.to_string())
                })?;
                Ok(ContextValue::FaceRegions(Arc::new(faces)))
            })
            .await?;
        match value {
            ContextValue::FaceRegions(faces) => Ok(faces),
            ContextValue::Luminance(_) => {
                Err(DependencyError::new(FACE_REGIONS_TAG, "context slot holds a foreign value"))
            }
        }
    }

    /// Returns the 8-bit luminance plane, computed at most once.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyError`] when the cached slot holds a foreign
    /// value; the computation itself is infallible.
    pub async fn luminance(
        &self,
        photo: &PhotoRaster,
    ) -> Result<Arc<Vec<u8>>, DependencyError> {
        let value = self
            .get_or_compute(CapabilityTag::new(LUMINANCE_PLANE_TAG), || async move {
                Ok(ContextValue::Luminance(Arc::new(photo.luminance_plane())))
            })
            .await?;
        match value {
            ContextValue::Luminance(plane) => Ok(plane),
            ContextValue::FaceRegions(_) => {
                Err(DependencyError::new(LUMINANCE_PLANE_TAG, "context slot holds a foreign value"))
            }
        }
    }
}
