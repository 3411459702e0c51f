// crates/photo-gate-checks/tests/evaluation.rs
// ============================================================================
// Module: Battery Evaluation Tests
// Description: Behavioral checks on synthetic rasters.
// Purpose: Ensure each detection family reacts to its signal and takes its
//          documented degraded path when dependencies are missing.
// ============================================================================

//! Evaluation tests for the built-in check battery.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::cast_possible_truncation,
    reason = "Test-only assertions, helpers, and synthetic-pixel casts are permitted."
)]

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use photo_gate_checks::background::BackgroundCheck;
use photo_gate_checks::background::ExtraneousObjectsCheck;
use photo_gate_checks::face::AccessoriesCheck;
use photo_gate_checks::face::FaceCountCheck;
use photo_gate_checks::face::FacePoseCheck;
use photo_gate_checks::face::FacePositionCheck;
use photo_gate_checks::quality::BlurrinessCheck;
use photo_gate_checks::quality::ColorModeCheck;
use photo_gate_checks::quality::LightingCheck;
use photo_gate_checks::quality::RealPhotoCheck;
use photo_gate_checks::quality::RedEyeCheck;
use photo_gate_core::BoundingBox;
use photo_gate_core::Check;
use photo_gate_core::CheckEval;
use photo_gate_core::CheckStatus;
use photo_gate_core::DetectError;
use photo_gate_core::EvalInput;
use photo_gate_core::FaceDetector;
use photo_gate_core::FaceRegion;
use photo_gate_core::LANDMARK_COUNT;
use photo_gate_core::LandmarkPoint;
use photo_gate_core::PhotoRaster;
use photo_gate_core::PoseAngles;
use photo_gate_core::ResolvedParams;
use photo_gate_core::SharedContext;

// ============================================================================
// SECTION: Test Fixtures
// ============================================================================

/// Detector returning a fixed face list.
struct StaticDetector {
    faces: Vec<FaceRegion>,
}

#[async_trait]
impl FaceDetector for StaticDetector {
    async fn detect(&self, _photo: &PhotoRaster) -> Result<Vec<FaceRegion>, DetectError> {
        Ok(self.faces.clone())
    }
}

/// Evaluates one check with default parameters against a static face list.
async fn run_check(
    check: &dyn Check,
    photo: &PhotoRaster,
    faces: Vec<FaceRegion>,
) -> CheckEval {
    let shared = SharedContext::new(Arc::new(StaticDetector {
        faces,
    }));
    let descriptor = check.describe();
    let params = ResolvedParams::resolve(&descriptor.parameters, &BTreeMap::new());
    let input = EvalInput {
        photo,
        shared: &shared,
        params: &params,
    };
    check.evaluate(&input).await.unwrap()
}

/// Builds a flat raster of one RGB color.
fn flat(width: u32, height: u32, rgb: [u8; 3]) -> PhotoRaster {
    PhotoRaster::new(width, height, rgb.repeat((width * height) as usize), 1024).unwrap()
}

/// Builds a black/white checkerboard.
fn checkerboard(size: u32) -> PhotoRaster {
    let mut pixels = Vec::with_capacity((size * size * 3) as usize);
    for y in 0..size {
        for x in 0..size {
            let value = if (x + y) % 2 == 0 { 255 } else { 0 };
            pixels.extend_from_slice(&[value, value, value]);
        }
    }
    PhotoRaster::new(size, size, pixels, 1024).unwrap()
}

/// Builds a top-to-bottom luminance gradient.
fn gradient(size: u32) -> PhotoRaster {
    let mut pixels = Vec::with_capacity((size * size * 3) as usize);
    for y in 0..size {
        let value = u8::try_from(y * 255 / size.max(1)).unwrap_or(255);
        for _ in 0..size {
            pixels.extend_from_slice(&[value, value, value]);
        }
    }
    PhotoRaster::new(size, size, pixels, 1024).unwrap()
}

/// Builds deterministic high-frequency color noise.
fn noise(size: u32) -> PhotoRaster {
    let mut pixels = Vec::with_capacity((size * size * 3) as usize);
    for y in 0..size {
        for x in 0..size {
            pixels.push(((x * 37 + y * 101) % 256) as u8);
            pixels.push(((x * 57 + y * 23) % 256) as u8);
            pixels.push(((x * 11 + y * 71) % 256) as u8);
        }
    }
    PhotoRaster::new(size, size, pixels, 1024).unwrap()
}

/// One face region without landmarks or pose.
fn bare_face(x: f32, y: f32, width: f32, height: f32) -> FaceRegion {
    FaceRegion {
        bbox: BoundingBox {
            x,
            y,
            width,
            height,
        },
        confidence: 0.9,
        pose: None,
        landmarks: None,
    }
}

// ============================================================================
// SECTION: Quality Checks
// ============================================================================

#[tokio::test]
async fn blurriness_fails_on_flat_and_passes_on_sharp() {
    let check = BlurrinessCheck;
    let soft = run_check(&check, &flat(32, 32, [128, 128, 128]), Vec::new()).await;
    assert_eq!(soft.status, CheckStatus::Failed);

    let sharp = run_check(&check, &checkerboard(32), Vec::new()).await;
    assert_eq!(sharp.status, CheckStatus::Passed);
}

#[tokio::test]
async fn color_mode_fails_on_grayscale_and_passes_on_color() {
    let check = ColorModeCheck;
    let gray = run_check(&check, &flat(32, 32, [120, 120, 120]), Vec::new()).await;
    assert_eq!(gray.status, CheckStatus::Failed);

    let colored = run_check(&check, &flat(32, 32, [200, 60, 60]), Vec::new()).await;
    assert_eq!(colored.status, CheckStatus::Passed);
}

#[tokio::test]
async fn lighting_fails_in_the_dark_and_passes_on_balanced_exposure() {
    let check = LightingCheck;
    let dark = run_check(&check, &flat(32, 32, [10, 10, 10]), Vec::new()).await;
    assert_eq!(dark.status, CheckStatus::Failed);

    let balanced = run_check(&check, &gradient(64), Vec::new()).await;
    assert_eq!(balanced.status, CheckStatus::Passed);
}

#[tokio::test]
async fn real_photo_fails_on_solid_graphics_and_passes_on_texture() {
    let check = RealPhotoCheck;
    let graphic = run_check(&check, &flat(64, 64, [90, 140, 220]), Vec::new()).await;
    assert_eq!(graphic.status, CheckStatus::Failed);

    let textured = run_check(&check, &noise(64), Vec::new()).await;
    assert_eq!(textured.status, CheckStatus::Passed);
}

#[tokio::test]
async fn red_eye_passes_with_a_note_when_landmarks_are_missing() {
    let check = RedEyeCheck;
    let eval =
        run_check(&check, &flat(64, 64, [150, 150, 150]), vec![bare_face(10.0, 10.0, 40.0, 40.0)])
            .await;
    assert_eq!(eval.status, CheckStatus::Passed);
    assert!(eval.reason.unwrap().contains("landmarks"));
}

#[tokio::test]
async fn red_eye_fails_when_eye_regions_glow_red() {
    let check = RedEyeCheck;
    // Saturated red everywhere makes both landmarked eye boxes read as red.
    let photo = flat(100, 100, [230, 40, 40]);
    let mut landmarks = vec![
        LandmarkPoint {
            x: 50.0,
            y: 80.0,
        };
        LANDMARK_COUNT
    ];
    for (index, point) in landmarks.iter_mut().enumerate().take(42).skip(36) {
        point.x = 20.0 + (index - 36) as f32 * 2.0;
        point.y = 40.0 + f32::from(u8::from(index % 2 == 0)) * 4.0;
    }
    for (index, point) in landmarks.iter_mut().enumerate().take(48).skip(42) {
        point.x = 60.0 + (index - 42) as f32 * 2.0;
        point.y = 40.0 + f32::from(u8::from(index % 2 == 0)) * 4.0;
    }
    let face = FaceRegion {
        landmarks: Some(landmarks),
        ..bare_face(10.0, 20.0, 70.0, 60.0)
    };
    let eval = run_check(&check, &photo, vec![face]).await;
    assert_eq!(eval.status, CheckStatus::Failed);
    assert!(eval.reason.unwrap().contains("Red eye"));
}

// ============================================================================
// SECTION: Face Checks
// ============================================================================

#[tokio::test]
async fn face_count_fails_without_a_face_and_passes_with_one() {
    let check = FaceCountCheck;
    let photo = flat(64, 64, [128, 128, 128]);
    let missing = run_check(&check, &photo, Vec::new()).await;
    assert_eq!(missing.status, CheckStatus::Failed);

    let present = run_check(&check, &photo, vec![bare_face(16.0, 16.0, 32.0, 32.0)]).await;
    assert_eq!(present.status, CheckStatus::Passed);
}

#[tokio::test]
async fn face_count_ignores_low_confidence_detections() {
    let check = FaceCountCheck;
    let photo = flat(64, 64, [128, 128, 128]);
    let mut face = bare_face(16.0, 16.0, 32.0, 32.0);
    face.confidence = 0.2;
    let eval = run_check(&check, &photo, vec![face]).await;
    assert_eq!(eval.status, CheckStatus::Failed);
}

#[tokio::test]
async fn face_pose_covers_skip_review_fail_and_pass() {
    let check = FacePoseCheck;
    let photo = flat(64, 64, [128, 128, 128]);

    let absent = run_check(&check, &photo, Vec::new()).await;
    assert_eq!(absent.status, CheckStatus::Skipped);

    let unknown = run_check(&check, &photo, vec![bare_face(16.0, 16.0, 32.0, 32.0)]).await;
    assert_eq!(unknown.status, CheckStatus::NeedsReview);

    let turned = FaceRegion {
        pose: Some(PoseAngles {
            yaw: 40.0,
            pitch: 0.0,
            roll: 0.0,
        }),
        ..bare_face(16.0, 16.0, 32.0, 32.0)
    };
    let failed = run_check(&check, &photo, vec![turned]).await;
    assert_eq!(failed.status, CheckStatus::Failed);

    let frontal = FaceRegion {
        pose: Some(PoseAngles {
            yaw: 5.0,
            pitch: 3.0,
            roll: 2.0,
        }),
        ..bare_face(16.0, 16.0, 32.0, 32.0)
    };
    let passed = run_check(&check, &photo, vec![frontal]).await;
    assert_eq!(passed.status, CheckStatus::Passed);
}

#[tokio::test]
async fn face_position_rejects_a_tiny_face_and_accepts_a_centered_one() {
    let check = FacePositionCheck;
    let photo = flat(100, 100, [128, 128, 128]);

    let centered = run_check(&check, &photo, vec![bare_face(30.0, 30.0, 40.0, 40.0)]).await;
    assert_eq!(centered.status, CheckStatus::Passed);

    let tiny = run_check(&check, &photo, vec![bare_face(10.0, 10.0, 2.0, 2.0)]).await;
    assert_eq!(tiny.status, CheckStatus::Failed);
}

#[tokio::test]
async fn accessories_pass_on_a_clean_portrait_and_flag_headwear() {
    let check = AccessoriesCheck;
    let clean = flat(100, 100, [220, 220, 220]);
    let face = bare_face(30.0, 40.0, 40.0, 30.0);
    let eval = run_check(&check, &clean, vec![face.clone()]).await;
    assert_eq!(eval.status, CheckStatus::Passed);

    // Paint a dark uniform band above the face box.
    let mut pixels = [220u8, 220, 220].repeat(100 * 100);
    for y in 28..40u32 {
        for x in 30..70u32 {
            let offset = ((y * 100 + x) * 3) as usize;
            pixels[offset] = 20;
            pixels[offset + 1] = 20;
            pixels[offset + 2] = 20;
        }
    }
    let hatted = PhotoRaster::new(100, 100, pixels, 1024).unwrap();
    let eval = run_check(&check, &hatted, vec![face]).await;
    assert_eq!(eval.status, CheckStatus::Failed);
    assert!(eval.reason.unwrap().contains("headwear"));
}

// ============================================================================
// SECTION: Background Checks
// ============================================================================

#[tokio::test]
async fn background_passes_on_bright_uniform_and_fails_on_dark() {
    let check = BackgroundCheck;
    let bright = run_check(&check, &flat(64, 64, [210, 210, 210]), Vec::new()).await;
    assert_eq!(bright.status, CheckStatus::Passed);

    let dark = run_check(&check, &flat(64, 64, [30, 30, 30]), Vec::new()).await;
    assert_eq!(dark.status, CheckStatus::Failed);
}

#[tokio::test]
async fn extraneous_objects_pass_on_a_clean_backdrop() {
    let check = ExtraneousObjectsCheck;
    let eval = run_check(&check, &flat(64, 64, [200, 200, 200]), Vec::new()).await;
    assert_eq!(eval.status, CheckStatus::Passed);
}
