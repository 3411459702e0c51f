// crates/photo-gate-checks/tests/descriptors.rs
// ============================================================================
// Module: Battery Descriptor Tests
// Description: Discovery, identity, category, and dependency declarations.
// Purpose: Ensure the built-in battery registers cleanly and completely.
// ============================================================================

//! Descriptor tests for the built-in check battery.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use photo_gate_checks::builtin_checks;
use photo_gate_checks::discover;
use photo_gate_core::CapabilityTag;
use photo_gate_core::CheckCategory;
use photo_gate_core::CheckName;
use photo_gate_core::FACE_REGIONS_TAG;

/// Every stable identifier in canonical discovery order.
const EXPECTED_ORDER: [&str; 11] = [
    "face_count",
    "face_pose",
    "face_position",
    "accessories",
    "blurriness",
    "color_mode",
    "lighting",
    "real_photo",
    "red_eye",
    "background",
    "extraneous_objects",
];

#[test]
fn discovery_registers_the_whole_battery() {
    let report = discover().unwrap();
    assert_eq!(report.registry.len(), EXPECTED_ORDER.len());
    assert!(report.rejected.is_empty(), "rejected: {:?}", report.rejected);
}

#[test]
fn discovery_order_matches_the_registered_set() {
    let report = discover().unwrap();
    let names: Vec<&str> = report.registry.names().iter().map(CheckName::as_str).collect();
    assert_eq!(names, EXPECTED_ORDER);
}

#[test]
fn every_descriptor_validates_on_its_own() {
    for check in builtin_checks() {
        let descriptor = check.describe();
        descriptor.validate().unwrap();
    }
}

#[test]
fn categories_partition_the_battery() {
    let report = discover().unwrap();
    let buckets = report.registry.by_category();
    assert_eq!(buckets[&CheckCategory::Face].len(), 4);
    assert_eq!(buckets[&CheckCategory::ImageQuality].len(), 5);
    assert_eq!(buckets[&CheckCategory::Background].len(), 2);
    let total: usize = buckets.values().map(Vec::len).sum();
    assert_eq!(total, report.registry.len());
}

#[test]
fn face_geometry_checks_declare_the_face_dependency() {
    let report = discover().unwrap();
    let face_tag = CapabilityTag::new(FACE_REGIONS_TAG);
    for name in ["face_count", "face_pose", "face_position", "accessories", "red_eye"] {
        let descriptor = report.registry.descriptor(&CheckName::new(name)).unwrap();
        assert!(
            descriptor.dependencies.contains(&face_tag),
            "{name} must declare {FACE_REGIONS_TAG}"
        );
    }
}

#[test]
fn extraneous_objects_declares_a_stricter_time_limit() {
    let report = discover().unwrap();
    let descriptor =
        report.registry.descriptor(&CheckName::new("extraneous_objects")).unwrap();
    let limit = descriptor.time_limit_secs.unwrap();
    assert!((limit - 3.0).abs() < f64::EPSILON);
}

#[test]
fn every_check_is_enabled_by_default() {
    let report = discover().unwrap();
    for (_, descriptor) in report.registry.all() {
        assert!(descriptor.enabled_by_default);
    }
}
