// photo-gate-checks/src/analysis.rs
// ============================================================================
// Module: Raster Analysis Helpers
// Description: Pixel statistics shared by the built-in check battery.
// Purpose: Keep per-check bodies small and the math in one audited place.
// Dependencies: photo-gate-core
// ============================================================================

//! ## Overview
//! Lightweight, dependency-free raster statistics: Laplacian variance for
//! sharpness, saturation and luminance histograms, Sobel gradients, and
//! region masking around a face box. Heavyweight model inference is out of
//! scope here; it lives behind the core `FaceDetector` interface.

// ============================================================================
// SECTION: Imports
// ============================================================================

use photo_gate_core::BoundingBox;
use photo_gate_core::PhotoRaster;

// ============================================================================
// SECTION: Luminance Statistics
// ============================================================================

/// Mean and standard deviation of a luminance plane.
#[must_use]
pub fn luma_stats(luma: &[u8]) -> (f64, f64) {
    if luma.is_empty() {
        return (0.0, 0.0);
    }
    let count = luma.len() as f64;
    let sum: f64 = luma.iter().map(|&value| f64::from(value)).sum();
    let mean = sum / count;
    let variance: f64 =
        luma.iter().map(|&value| (f64::from(value) - mean).powi(2)).sum::<f64>() / count;
    (mean, variance.sqrt())
}

/// Fraction of samples strictly below `threshold`.
#[must_use]
pub fn ratio_below(luma: &[u8], threshold: u8) -> f64 {
    if luma.is_empty() {
        return 0.0;
    }
    let hits = luma.iter().filter(|&&value| value < threshold).count();
    hits as f64 / luma.len() as f64
}

/// Fraction of samples strictly above `threshold`.
#[must_use]
pub fn ratio_above(luma: &[u8], threshold: u8) -> f64 {
    if luma.is_empty() {
        return 0.0;
    }
    let hits = luma.iter().filter(|&&value| value > threshold).count();
    hits as f64 / luma.len() as f64
}

// ============================================================================
// SECTION: Sharpness
// ============================================================================

/// Variance of the 4-neighbor Laplacian over a luminance plane.
///
/// Sharp images produce strong second derivatives at edges; a low variance
/// is the classic blur signal.
#[must_use]
pub fn laplacian_variance(luma: &[u8], width: usize, height: usize) -> f64 {
    if width < 3 || height < 3 || luma.len() < width * height {
        return 0.0;
    }
    let mut responses = Vec::with_capacity((width - 2) * (height - 2));
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let center = f64::from(luma[y * width + x]);
            let north = f64::from(luma[(y - 1) * width + x]);
            let south = f64::from(luma[(y + 1) * width + x]);
            let west = f64::from(luma[y * width + x - 1]);
            let east = f64::from(luma[y * width + x + 1]);
            responses.push(4.0f64.mul_add(center, -(north + south + west + east)));
        }
    }
    let count = responses.len() as f64;
    let mean: f64 = responses.iter().sum::<f64>() / count;
    responses.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / count
}

// ============================================================================
// SECTION: Gradients and Edges
// ============================================================================

/// Mean Sobel gradient magnitude over a luminance plane.
#[must_use]
pub fn sobel_gradient_mean(luma: &[u8], width: usize, height: usize) -> f64 {
    if width < 3 || height < 3 || luma.len() < width * height {
        return 0.0;
    }
    let mut sum = 0.0f64;
    let mut count = 0usize;
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let (gx, gy) = sobel_at(luma, width, x, y);
            sum += gx.hypot(gy);
            count += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Fraction of interior pixels whose gradient magnitude exceeds `threshold`.
#[must_use]
pub fn edge_density(luma: &[u8], width: usize, height: usize, threshold: f64) -> f64 {
    if width < 3 || height < 3 || luma.len() < width * height {
        return 0.0;
    }
    let mut hits = 0usize;
    let mut count = 0usize;
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let (gx, gy) = sobel_at(luma, width, x, y);
            if gx.hypot(gy) > threshold {
                hits += 1;
            }
            count += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        hits as f64 / count as f64
    }
}

/// Sobel response at one interior pixel.
fn sobel_at(luma: &[u8], width: usize, x: usize, y: usize) -> (f64, f64) {
    let sample = |dx: isize, dy: isize| -> f64 {
        let sx = (x as isize + dx) as usize;
        let sy = (y as isize + dy) as usize;
        f64::from(luma[sy * width + sx])
    };
    let gx = (sample(1, -1) + 2.0 * sample(1, 0) + sample(1, 1))
        - (sample(-1, -1) + 2.0 * sample(-1, 0) + sample(-1, 1));
    let gy = (sample(-1, 1) + 2.0 * sample(0, 1) + sample(1, 1))
        - (sample(-1, -1) + 2.0 * sample(0, -1) + sample(1, -1));
    (gx, gy)
}

// ============================================================================
// SECTION: Color Statistics
// ============================================================================

/// Mean saturation over the raster, scaled to `0..=255`.
///
/// Saturation follows the HSV definition: `(max - min) / max`.
#[must_use]
pub fn mean_saturation(photo: &PhotoRaster) -> f64 {
    let pixels = photo.pixels();
    if pixels.is_empty() {
        return 0.0;
    }
    let mut sum = 0.0f64;
    for rgb in pixels.chunks_exact(3) {
        let max = rgb.iter().copied().max().unwrap_or(0);
        let min = rgb.iter().copied().min().unwrap_or(0);
        if max > 0 {
            sum += f64::from(max - min) / f64::from(max) * 255.0;
        }
    }
    sum / photo.pixel_count() as f64
}

/// Number of distinct colors after quantizing each channel to 3 bits.
///
/// Rendered graphics and sketches occupy far fewer coarse color cells than
/// photographs of real scenes.
#[must_use]
pub fn distinct_coarse_colors(photo: &PhotoRaster) -> usize {
    let mut cells = [false; 512];
    for rgb in photo.pixels().chunks_exact(3) {
        let index = ((usize::from(rgb[0]) >> 5) << 6)
            | ((usize::from(rgb[1]) >> 5) << 3)
            | (usize::from(rgb[2]) >> 5);
        cells[index] = true;
    }
    cells.iter().filter(|&&occupied| occupied).count()
}

// ============================================================================
// SECTION: Region Masking
// ============================================================================

/// Collects luminance samples outside an expanded face box.
///
/// Used by background analysis: the subject is masked out so statistics
/// describe only the backdrop. Without a face box the whole plane is
/// background.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "Box coordinates are clamped non-negative before integer conversion."
)]
pub fn background_samples(
    luma: &[u8],
    width: usize,
    height: usize,
    face: Option<&BoundingBox>,
) -> Vec<u8> {
    let Some(bbox) = face else {
        return luma.to_vec();
    };
    // Expand the box slightly so hair and shoulders stay masked.
    let expand_x = f64::from(bbox.width) * 0.15;
    let expand_y = f64::from(bbox.height) * 0.25;
    let left = (f64::from(bbox.x) - expand_x).max(0.0) as usize;
    let top = (f64::from(bbox.y) - expand_y).max(0.0) as usize;
    let right = ((f64::from(bbox.x) + f64::from(bbox.width) + expand_x).max(0.0) as usize)
        .min(width);
    let bottom = ((f64::from(bbox.y) + f64::from(bbox.height) + expand_y).max(0.0) as usize)
        .min(height);

    let mut samples = Vec::new();
    for y in 0..height {
        for x in 0..width {
            let masked = x >= left && x < right && y >= top && y < bottom;
            if !masked && let Some(&value) = luma.get(y * width + x) {
                samples.push(value);
            }
        }
    }
    samples
}

/// Fraction of pixels in a rectangle satisfying a skin-tone predicate.
#[must_use]
pub fn skin_ratio(photo: &PhotoRaster, left: u32, top: u32, right: u32, bottom: u32) -> f64 {
    let mut hits = 0usize;
    let mut count = 0usize;
    for y in top..bottom.min(photo.height()) {
        for x in left..right.min(photo.width()) {
            if let Some(rgb) = photo.rgb(x, y) {
                count += 1;
                if is_skin_tone(rgb) {
                    hits += 1;
                }
            }
        }
    }
    if count == 0 {
        0.0
    } else {
        hits as f64 / count as f64
    }
}

/// Classic RGB skin-tone predicate.
#[must_use]
pub fn is_skin_tone(rgb: [u8; 3]) -> bool {
    let [r, g, b] = rgb;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    r > 95 && g > 40 && b > 20 && r > g && r > b && max.saturating_sub(min) > 15
}

// ============================================================================
// SECTION: Tests
// ============================================================================
