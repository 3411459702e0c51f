// photo-gate-core/src/core/image.rs
// ============================================================================
// Module: Raster and Face Models
// Description: Decoded image raster and detector-produced face geometry.
// Purpose: Define the image contract supplied by the upload collaborator.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! The validation engine consumes a decoded, bounds-checked RGB raster; it
//! never parses container formats. Face geometry is produced by a
//! [`FaceDetector`](crate::interfaces::FaceDetector) collaborator and cached
//! in the shared context for every check that declares the dependency.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Raster
// ============================================================================

/// Decoded 8-bit RGB raster plus upload metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRaster {
    /// Width in pixels.
    width: u32,
    /// Height in pixels.
    height: u32,
    /// Interleaved RGB bytes, row-major, length `width * height * 3`.
    pixels: Vec<u8>,
    /// Size of the original upload in bytes.
    byte_size: u64,
}

impl PhotoRaster {
    /// Wraps a decoded RGB buffer.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError`] when dimensions are zero or the buffer length
    /// does not match `width * height * 3`.
    pub fn new(
        width: u32,
        height: u32,
        pixels: Vec<u8>,
        byte_size: u64,
    ) -> Result<Self, RasterError> {
        if width == 0 || height == 0 {
            return Err(RasterError::EmptyDimensions {
                width,
                height,
            });
        }
        let expected = (width as usize) * (height as usize) * 3;
        if pixels.len() != expected {
            return Err(RasterError::BufferMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
            byte_size,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Size of the original upload in bytes.
    #[must_use]
    pub const fn byte_size(&self) -> u64 {
        self.byte_size
    }

    /// Total pixel count.
    #[must_use]
    pub const fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Interleaved RGB bytes.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns the RGB triple at `(x, y)`, when in bounds.
    #[must_use]
    pub fn rgb(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = ((y as usize) * (self.width as usize) + (x as usize)) * 3;
        Some([self.pixels[offset], self.pixels[offset + 1], self.pixels[offset + 2]])
    }

    /// Computes the Rec. 601 luminance plane, row-major, one byte per pixel.
    #[must_use]
    pub fn luminance_plane(&self) -> Vec<u8> {
        self.pixels
            .chunks_exact(3)
            .map(|rgb| {
                let luma = 299 * u32::from(rgb[0]) + 587 * u32::from(rgb[1]) + 114 * u32::from(rgb[2]);
                u8::try_from(luma / 1000).unwrap_or(u8::MAX)
            })
            .collect()
    }
}

/// Raster construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RasterError {
    /// Width or height is zero.
    #[error("raster dimensions must be non-zero, got {width}x{height}")]
    EmptyDimensions {
        /// Supplied width.
        width: u32,
        /// Supplied height.
        height: u32,
    },
    /// Buffer length disagrees with the dimensions.
    #[error("raster buffer length mismatch: expected {expected} bytes, got {actual}")]
    BufferMismatch {
        /// Expected byte length.
        expected: usize,
        /// Actual byte length.
        actual: usize,
    },
}

// ============================================================================
// SECTION: Face Geometry
// ============================================================================

/// Axis-aligned bounding box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Box width.
    pub width: f32,
    /// Box height.
    pub height: f32,
}

impl BoundingBox {
    /// Box area in square pixels.
    #[must_use]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Horizontal center.
    #[must_use]
    pub fn center_x(&self) -> f32 {
        self.width.mul_add(0.5, self.x)
    }

    /// Vertical center.
    #[must_use]
    pub fn center_y(&self) -> f32 {
        self.height.mul_add(0.5, self.y)
    }
}

/// A single landmark point in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

/// Index range of the left eye in a 68-point landmark set.
pub const LEFT_EYE_LANDMARKS: std::ops::Range<usize> = 36..42;

/// Index range of the right eye in a 68-point landmark set.
pub const RIGHT_EYE_LANDMARKS: std::ops::Range<usize> = 42..48;

/// Number of points in a full landmark set.
pub const LANDMARK_COUNT: usize = 68;

/// One detected face with optional landmark geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceRegion {
    /// Face bounding box.
    pub bbox: BoundingBox,
    /// Detector confidence in `0.0..=1.0`.
    pub confidence: f32,
    /// Estimated head pose angles in degrees, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pose: Option<PoseAngles>,
    /// 68-point landmark set, when the detector produces one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<Vec<LandmarkPoint>>,
}

impl FaceRegion {
    /// Returns the landmark set when it is complete.
    #[must_use]
    pub fn full_landmarks(&self) -> Option<&[LandmarkPoint]> {
        self.landmarks.as_deref().filter(|points| points.len() >= LANDMARK_COUNT)
    }
}

/// Head pose angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseAngles {
    /// Left/right rotation.
    pub yaw: f32,
    /// Up/down tilt.
    pub pitch: f32,
    /// In-plane rotation.
    pub roll: f32,
}
