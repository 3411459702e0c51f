// crates/photo-gate-config/tests/merge_defaults.rs
// ============================================================================
// Module: Merge, Export, and Defaults Tests
// Description: Deep-merge semantics, snapshot round-trips, derived defaults.
// Purpose: Ensure updates are atomic and defaults derivation is idempotent.
// ============================================================================

//! Merge, export, and defaults tests against the built-in registry.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use photo_gate_checks::discover;
use photo_gate_config::CONFIG_VERSION;
use photo_gate_config::PhotoGateConfig;
use photo_gate_core::CheckName;
use photo_gate_core::ParameterValue;
use photo_gate_core::Registry;
use proptest::prelude::Just;
use proptest::prelude::Strategy;
use proptest::prop_assert;
use proptest::proptest;
use serde_json::json;

// ============================================================================
// SECTION: Test Fixtures
// ============================================================================

/// Returns the built-in registry.
fn registry() -> Registry {
    discover().unwrap().registry
}

// ============================================================================
// SECTION: Defaults Derivation
// ============================================================================

#[test]
fn defaults_cover_the_whole_registry_in_discovery_order() {
    let registry = registry();
    let config = PhotoGateConfig::reset_to_defaults(&registry);
    assert_eq!(config.version, CONFIG_VERSION);
    assert_eq!(config.check_order, registry.names());
    assert_eq!(config.checks.len(), registry.len());
    assert!(config.validate(&registry).is_empty());
}

#[test]
fn defaults_honor_enabled_by_default_flags() {
    let registry = registry();
    let config = PhotoGateConfig::reset_to_defaults(&registry);
    for (name, settings) in &config.checks {
        let descriptor = registry.descriptor(name).unwrap();
        assert_eq!(settings.enabled, descriptor.enabled_by_default);
    }
}

#[test]
fn defaults_derivation_is_idempotent() {
    let registry = registry();
    let first = PhotoGateConfig::reset_to_defaults(&registry);
    let second = PhotoGateConfig::reset_to_defaults(&registry);
    assert_eq!(first, second);
    assert_eq!(first.export().unwrap(), second.export().unwrap());
}

// ============================================================================
// SECTION: Export Round-Trip
// ============================================================================

#[test]
fn export_then_import_yields_an_identical_configuration() {
    let registry = registry();
    let config = PhotoGateConfig::reset_to_defaults(&registry);
    let snapshot = config.export().unwrap();
    let imported = PhotoGateConfig::from_json_value(snapshot).unwrap();
    assert_eq!(config, imported);
}

#[test]
fn passthrough_system_keys_survive_a_round_trip() {
    let registry = registry();
    let raw = r#"
version = "2.1"

[system]
max_check_time = 5.0
storage_path = "./local_storage"
log_level = "INFO"

check_order = ["blurriness"]

[checks.blurriness]
enabled = true
"#;
    let config = PhotoGateConfig::load(raw, &registry).unwrap();
    let snapshot = config.export().unwrap();
    assert_eq!(snapshot["system"]["storage_path"], json!("./local_storage"));
    assert_eq!(snapshot["system"]["log_level"], json!("INFO"));
    let imported = PhotoGateConfig::from_json_value(snapshot).unwrap();
    assert_eq!(config, imported);
}

// ============================================================================
// SECTION: Deep Merge
// ============================================================================

#[test]
fn merge_overwrites_one_parameter_and_keeps_the_rest() {
    let registry = registry();
    let base = PhotoGateConfig::reset_to_defaults(&registry);
    let patch = json!({
        "checks": {
            "lighting": {
                "params": {
                    "underexposure_threshold": 30
                }
            }
        }
    });
    let merged = base.merge(&patch, &registry).unwrap();

    let lighting = &merged.checks[&CheckName::new("lighting")];
    assert_eq!(
        lighting.params.get("underexposure_threshold"),
        Some(&ParameterValue::Int(30))
    );
    // Sibling parameters of the same check retain their base values.
    assert_eq!(
        lighting.params.get("overexposure_threshold"),
        Some(&ParameterValue::Int(240))
    );
    // Unrelated checks are untouched.
    assert_eq!(
        merged.checks[&CheckName::new("blurriness")],
        base.checks[&CheckName::new("blurriness")]
    );
}

#[test]
fn merge_updates_system_keys_without_dropping_the_rest() {
    let registry = registry();
    let base = PhotoGateConfig::reset_to_defaults(&registry);
    let merged = base
        .merge(&json!({ "system": { "stop_on_failure": true } }), &registry)
        .unwrap();
    assert!(merged.system.stop_on_failure);
    assert!((merged.system.max_check_time - base.system.max_check_time).abs() < f64::EPSILON);
    assert_eq!(merged.system.max_concurrent, base.system.max_concurrent);
}

#[test]
fn rejected_merge_leaves_the_base_untouched() {
    let registry = registry();
    let base = PhotoGateConfig::reset_to_defaults(&registry);
    let patch = json!({
        "checks": {
            "blurriness": {
                "params": {
                    "laplacian_threshold": 100_000
                }
            }
        }
    });
    let error = base.merge(&patch, &registry);
    assert!(error.is_err());
    // The base is still the valid document it was.
    assert!(base.validate(&registry).is_empty());
}

#[test]
fn merge_can_disable_a_check() {
    let registry = registry();
    let base = PhotoGateConfig::reset_to_defaults(&registry);
    let merged = base
        .merge(&json!({ "checks": { "red_eye": { "enabled": false } } }), &registry)
        .unwrap();
    assert!(!merged.checks[&CheckName::new("red_eye")].enabled);
    assert!(!merged.checks[&CheckName::new("red_eye")].params.is_empty());
}

// ============================================================================
// SECTION: Permutation Property
// ============================================================================

proptest! {
    #[test]
    fn any_permutation_of_the_default_order_validates(
        order in Just((0..11usize).collect::<Vec<_>>()).prop_shuffle()
    ) {
        let registry = registry();
        let base = PhotoGateConfig::reset_to_defaults(&registry);
        let mut permuted = base.clone();
        permuted.check_order =
            order.iter().map(|&index| base.check_order[index].clone()).collect();
        prop_assert!(permuted.validate(&registry).is_empty());
    }
}
