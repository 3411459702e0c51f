// crates/photo-gate-core/tests/registry.rs
// ============================================================================
// Module: Registry Tests
// Description: Discovery validation, exclusion, and category bucketing.
// Purpose: Ensure malformed checks are excluded without aborting discovery
//          and fatal conditions stay fatal.
// ============================================================================

//! Registry discovery tests.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use photo_gate_core::Check;
use photo_gate_core::CheckCategory;
use photo_gate_core::CheckDescriptor;
use photo_gate_core::CheckError;
use photo_gate_core::CheckEval;
use photo_gate_core::CheckName;
use photo_gate_core::DiscoveryError;
use photo_gate_core::EvalInput;
use photo_gate_core::ParameterKind;
use photo_gate_core::ParameterSpec;
use photo_gate_core::ParameterValue;
use photo_gate_core::Registry;

// ============================================================================
// SECTION: Test Fixtures
// ============================================================================

/// Minimal check with a configurable descriptor.
struct FixtureCheck {
    descriptor: CheckDescriptor,
}

impl FixtureCheck {
    fn named(name: &str, category: CheckCategory) -> Self {
        Self {
            descriptor: CheckDescriptor {
                name: CheckName::new(name),
                display_name: name.to_string(),
                description: "fixture".to_string(),
                category,
                version: "1.0.0".to_string(),
                author: "tests".to_string(),
                parameters: Vec::new(),
                dependencies: BTreeSet::new(),
                enabled_by_default: true,
                time_limit_secs: None,
            },
        }
    }

    fn with_parameters(mut self, parameters: Vec<ParameterSpec>) -> Self {
        self.descriptor.parameters = parameters;
        self
    }
}

#[async_trait]
impl Check for FixtureCheck {
    fn describe(&self) -> CheckDescriptor {
        self.descriptor.clone()
    }

    async fn evaluate(&self, _input: &EvalInput<'_>) -> Result<CheckEval, CheckError> {
        Ok(CheckEval::passed(serde_json::Value::Null))
    }
}

/// Parameter spec whose default breaks its own bounds.
fn broken_parameter() -> ParameterSpec {
    ParameterSpec {
        name: "threshold".to_string(),
        kind: ParameterKind::Int,
        default: Some(ParameterValue::Int(500)),
        min: Some(0.0),
        max: Some(100.0),
        choices: None,
        required: true,
        description: "default outside bounds".to_string(),
    }
}

/// Boxes fixtures into discovery sources.
fn sources(checks: Vec<FixtureCheck>) -> Vec<Arc<dyn Check>> {
    checks.into_iter().map(|check| Arc::new(check) as Arc<dyn Check>).collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn duplicate_name_is_fatal() {
    let error = Registry::discover(sources(vec![
        FixtureCheck::named("twin", CheckCategory::Face),
        FixtureCheck::named("twin", CheckCategory::Background),
    ]))
    .unwrap_err();
    assert!(matches!(error, DiscoveryError::DuplicateName(name) if name.as_str() == "twin"));
}

#[test]
fn empty_result_set_is_fatal() {
    let error = Registry::discover(Vec::new()).unwrap_err();
    assert!(matches!(error, DiscoveryError::Empty));
}

#[test]
fn malformed_descriptor_excludes_only_that_check() {
    let report = Registry::discover(sources(vec![
        FixtureCheck::named("good", CheckCategory::Face),
        FixtureCheck::named("bad", CheckCategory::ImageQuality)
            .with_parameters(vec![broken_parameter()]),
    ]))
    .unwrap();

    assert_eq!(report.registry.len(), 1);
    assert!(report.registry.get(&CheckName::new("good")).is_some());
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].name.as_str(), "bad");
}

#[test]
fn all_malformed_empties_the_registry_and_is_fatal() {
    let error = Registry::discover(sources(vec![
        FixtureCheck::named("bad", CheckCategory::Face).with_parameters(vec![broken_parameter()]),
    ]))
    .unwrap_err();
    assert!(matches!(error, DiscoveryError::Empty));
}

#[test]
fn category_buckets_partition_the_registry() {
    let report = Registry::discover(sources(vec![
        FixtureCheck::named("face_a", CheckCategory::Face),
        FixtureCheck::named("face_b", CheckCategory::Face),
        FixtureCheck::named("quality_a", CheckCategory::ImageQuality),
        FixtureCheck::named("backdrop_a", CheckCategory::Background),
    ]))
    .unwrap();

    let buckets = report.registry.by_category();
    let bucketed: usize = buckets.values().map(Vec::len).sum();
    assert_eq!(bucketed, report.registry.len());
    assert_eq!(buckets[&CheckCategory::Face].len(), 2);
    assert_eq!(buckets[&CheckCategory::ImageQuality].len(), 1);
    assert_eq!(buckets[&CheckCategory::Background].len(), 1);
}

#[test]
fn discovery_order_is_preserved() {
    let report = Registry::discover(sources(vec![
        FixtureCheck::named("zeta", CheckCategory::Face),
        FixtureCheck::named("alpha", CheckCategory::Face),
    ]))
    .unwrap();
    let names: Vec<&str> = report.registry.names().iter().map(CheckName::as_str).collect();
    assert_eq!(names, vec!["zeta", "alpha"]);
}
