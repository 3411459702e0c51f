// crates/photo-gate-core/tests/runner_orchestration.rs
// ============================================================================
// Module: Runner Orchestration Tests
// Description: Scheduling, short-circuit, aggregation, and ordering behavior.
// Purpose: Ensure per-check failures never corrupt a run and verdicts are
//          deterministic under concurrency.
// ============================================================================

//! Orchestration tests for the check runner.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use photo_gate_core::CapabilityTag;
use photo_gate_core::Check;
use photo_gate_core::CheckCategory;
use photo_gate_core::CheckDescriptor;
use photo_gate_core::CheckError;
use photo_gate_core::CheckEval;
use photo_gate_core::CheckName;
use photo_gate_core::CheckPlan;
use photo_gate_core::CheckStatus;
use photo_gate_core::DetectError;
use photo_gate_core::EvalInput;
use photo_gate_core::FACE_REGIONS_TAG;
use photo_gate_core::FaceDetector;
use photo_gate_core::FaceRegion;
use photo_gate_core::ParameterValue;
use photo_gate_core::PhotoRaster;
use photo_gate_core::Registry;
use photo_gate_core::Runner;
use photo_gate_core::RunnerConfig;
use photo_gate_core::RunnerError;
use photo_gate_core::ValidationPlan;
use photo_gate_core::VerdictStatus;

// ============================================================================
// SECTION: Test Fixtures
// ============================================================================

/// Detector that reports no faces and never fails.
struct EmptyDetector;

#[async_trait]
impl FaceDetector for EmptyDetector {
    async fn detect(&self, _photo: &PhotoRaster) -> Result<Vec<FaceRegion>, DetectError> {
        Ok(Vec::new())
    }
}

/// Disposition a scripted check should take.
#[derive(Clone, Copy)]
enum Script {
    Pass,
    Fail,
    Review,
    Error,
}

/// Check returning a scripted disposition after an optional delay.
struct ScriptedCheck {
    name: &'static str,
    script: Script,
    delay: Duration,
    needs_faces: bool,
}

impl ScriptedCheck {
    fn new(name: &'static str, script: Script) -> Self {
        Self {
            name,
            script,
            delay: Duration::ZERO,
            needs_faces: false,
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn with_face_dependency(mut self) -> Self {
        self.needs_faces = true;
        self
    }
}

#[async_trait]
impl Check for ScriptedCheck {
    fn describe(&self) -> CheckDescriptor {
        let dependencies = if self.needs_faces {
            BTreeSet::from([CapabilityTag::new(FACE_REGIONS_TAG)])
        } else {
            BTreeSet::new()
        };
        CheckDescriptor {
            name: CheckName::new(self.name),
            display_name: self.name.to_string(),
            description: "scripted test check".to_string(),
            category: CheckCategory::ImageQuality,
            version: "1.0.0".to_string(),
            author: "tests".to_string(),
            parameters: Vec::new(),
            dependencies,
            enabled_by_default: true,
            time_limit_secs: None,
        }
    }

    async fn evaluate(&self, input: &EvalInput<'_>) -> Result<CheckEval, CheckError> {
        if self.needs_faces {
            let _ = input.shared.face_regions(input.photo).await?;
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.script {
            Script::Pass => Ok(CheckEval::passed(serde_json::Value::Null)),
            Script::Fail => Ok(CheckEval::failed("scripted failure", serde_json::Value::Null)),
            Script::Review => {
                Ok(CheckEval::needs_review("scripted review", serde_json::Value::Null))
            }
            Script::Error => Err(CheckError::Execution("scripted error".to_string())),
        }
    }
}

/// Builds a small gray test raster.
fn photo() -> Arc<PhotoRaster> {
    Arc::new(PhotoRaster::new(8, 8, vec![128u8; 8 * 8 * 3], 256).unwrap())
}

/// Builds a plan enabling every named check with no overrides.
fn plan_for(names: &[&str], stop_on_failure: bool) -> ValidationPlan {
    let checks: BTreeMap<CheckName, CheckPlan> = names
        .iter()
        .map(|name| {
            (CheckName::new(*name), CheckPlan {
                enabled: true,
                params: BTreeMap::new(),
            })
        })
        .collect();
    ValidationPlan {
        max_check_time: 5.0,
        stop_on_failure,
        check_order: names.iter().map(|name| CheckName::new(*name)).collect(),
        checks,
    }
}

/// Discovers a registry over the given scripted checks.
fn registry_of(checks: Vec<ScriptedCheck>) -> Arc<Registry> {
    let sources: Vec<Arc<dyn Check>> =
        checks.into_iter().map(|check| Arc::new(check) as Arc<dyn Check>).collect();
    Arc::new(Registry::discover(sources).unwrap().registry)
}

/// Builds a runner over the empty detector.
fn runner() -> Runner {
    Runner::new(Arc::new(EmptyDetector))
}

/// Status of the outcome at a given order position.
fn status_at(verdict: &photo_gate_core::Verdict, index: usize) -> CheckStatus {
    verdict.check_results[index].status
}

// ============================================================================
// SECTION: Aggregation
// ============================================================================

#[tokio::test]
async fn all_passed_is_approved() {
    let registry = registry_of(vec![
        ScriptedCheck::new("a", Script::Pass),
        ScriptedCheck::new("b", Script::Pass),
    ]);
    let verdict =
        runner().run(&photo(), &plan_for(&["a", "b"], false), &registry).await.unwrap();
    assert_eq!(verdict.status, VerdictStatus::Approved);
    assert_eq!(verdict.checks_passed, 2);
    assert_eq!(verdict.total_checks, 2);
}

#[tokio::test]
async fn one_failed_is_rejected() {
    let registry = registry_of(vec![
        ScriptedCheck::new("a", Script::Pass),
        ScriptedCheck::new("b", Script::Fail),
        ScriptedCheck::new("c", Script::Pass),
    ]);
    let verdict =
        runner().run(&photo(), &plan_for(&["a", "b", "c"], false), &registry).await.unwrap();
    assert_eq!(verdict.status, VerdictStatus::Rejected);
    assert_eq!(verdict.checks_passed, 2);
}

#[tokio::test]
async fn needs_review_without_failure_is_manual_review() {
    let registry = registry_of(vec![
        ScriptedCheck::new("a", Script::Pass),
        ScriptedCheck::new("b", Script::Review),
    ]);
    let verdict =
        runner().run(&photo(), &plan_for(&["a", "b"], false), &registry).await.unwrap();
    assert_eq!(verdict.status, VerdictStatus::ManualReview);
}

#[tokio::test]
async fn check_error_is_recovered_and_reviewed() {
    let registry = registry_of(vec![
        ScriptedCheck::new("a", Script::Error),
        ScriptedCheck::new("b", Script::Pass),
    ]);
    let verdict =
        runner().run(&photo(), &plan_for(&["a", "b"], false), &registry).await.unwrap();
    assert_eq!(verdict.status, VerdictStatus::ManualReview);
    assert_eq!(status_at(&verdict, 0), CheckStatus::Error);
    assert_eq!(status_at(&verdict, 1), CheckStatus::Passed);
}

#[tokio::test]
async fn zero_executed_checks_is_infrastructure_failure() {
    let registry = registry_of(vec![ScriptedCheck::new("a", Script::Pass)]);
    let mut plan = plan_for(&["a"], false);
    if let Some(settings) = plan.checks.get_mut(&CheckName::new("a")) {
        settings.enabled = false;
    }
    let verdict = runner().run(&photo(), &plan, &registry).await.unwrap();
    assert_eq!(verdict.status, VerdictStatus::Failed);
    assert_eq!(status_at(&verdict, 0), CheckStatus::Skipped);
    assert_eq!(verdict.total_checks, 1);
}

// ============================================================================
// SECTION: Short-Circuit
// ============================================================================

#[tokio::test]
async fn stop_on_failure_skips_later_positions() {
    let registry = registry_of(vec![
        ScriptedCheck::new("a", Script::Fail),
        ScriptedCheck::new("b", Script::Pass),
        ScriptedCheck::new("c", Script::Pass),
    ]);
    let verdict =
        runner().run(&photo(), &plan_for(&["a", "b", "c"], true), &registry).await.unwrap();
    assert_eq!(verdict.status, VerdictStatus::Rejected);
    assert_eq!(status_at(&verdict, 0), CheckStatus::Failed);
    assert_eq!(status_at(&verdict, 1), CheckStatus::Skipped);
    assert_eq!(status_at(&verdict, 2), CheckStatus::Skipped);
}

#[tokio::test]
async fn without_stop_on_failure_every_check_runs() {
    let registry = registry_of(vec![
        ScriptedCheck::new("a", Script::Fail),
        ScriptedCheck::new("b", Script::Pass),
        ScriptedCheck::new("c", Script::Pass),
    ]);
    let verdict =
        runner().run(&photo(), &plan_for(&["a", "b", "c"], false), &registry).await.unwrap();
    assert_eq!(verdict.status, VerdictStatus::Rejected);
    assert_eq!(status_at(&verdict, 1), CheckStatus::Passed);
    assert_eq!(status_at(&verdict, 2), CheckStatus::Passed);
}

// ============================================================================
// SECTION: Ordering and Determinism
// ============================================================================

#[tokio::test]
async fn trail_is_resequenced_into_order() {
    // The first check completes last; the trail must still be in order.
    let registry = registry_of(vec![
        ScriptedCheck::new("slow", Script::Pass).with_delay(Duration::from_millis(80)),
        ScriptedCheck::new("fast", Script::Pass),
    ]);
    let verdict =
        runner().run(&photo(), &plan_for(&["slow", "fast"], false), &registry).await.unwrap();
    assert_eq!(verdict.check_results[0].check.as_str(), "slow");
    assert_eq!(verdict.check_results[1].check.as_str(), "fast");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_runs_agree_on_statuses() {
    let registry = registry_of(vec![
        ScriptedCheck::new("a", Script::Pass).with_delay(Duration::from_millis(10)),
        ScriptedCheck::new("b", Script::Fail),
        ScriptedCheck::new("c", Script::Review).with_delay(Duration::from_millis(5)),
    ]);
    let runner = runner();
    let plan = plan_for(&["a", "b", "c"], false);
    let image = photo();
    let (first, second) =
        tokio::join!(runner.run(&image, &plan, &registry), runner.run(&image, &plan, &registry));
    let first = first.unwrap();
    let second = second.unwrap();
    assert_eq!(first.status, second.status);
    let statuses = |verdict: &photo_gate_core::Verdict| {
        verdict.check_results.iter().map(|outcome| outcome.status).collect::<Vec<_>>()
    };
    assert_eq!(statuses(&first), statuses(&second));
}

// ============================================================================
// SECTION: Skips and Accounting
// ============================================================================

#[tokio::test]
async fn stale_registry_reference_is_skipped_not_rejected() {
    let registry = registry_of(vec![ScriptedCheck::new("a", Script::Pass)]);
    let mut plan = plan_for(&["a"], false);
    plan.check_order.push(CheckName::new("vanished"));
    plan.checks.insert(CheckName::new("vanished"), CheckPlan {
        enabled: true,
        params: BTreeMap::new(),
    });
    let verdict = runner().run(&photo(), &plan, &registry).await.unwrap();
    assert_eq!(verdict.status, VerdictStatus::Approved);
    assert_eq!(status_at(&verdict, 1), CheckStatus::Skipped);
    assert_eq!(verdict.total_checks, 2);
}

#[tokio::test]
async fn accounting_sums_hold_without_recorded_skips() {
    let registry = registry_of(vec![
        ScriptedCheck::new("a", Script::Pass),
        ScriptedCheck::new("b", Script::Pass),
    ]);
    let mut plan = plan_for(&["a", "b"], false);
    if let Some(settings) = plan.checks.get_mut(&CheckName::new("b")) {
        settings.enabled = false;
    }
    let runner = Runner::with_config(Arc::new(EmptyDetector), RunnerConfig {
        record_skipped: false,
        ..RunnerConfig::default()
    });
    let verdict = runner.run(&photo(), &plan, &registry).await.unwrap();
    assert_eq!(verdict.check_results.len(), 1);
    assert_eq!(verdict.total_checks, 2);
    assert_eq!(verdict.checks_passed, 1);
}

// ============================================================================
// SECTION: Progress Events
// ============================================================================

#[tokio::test]
async fn subscribers_observe_started_and_completed_events() {
    use photo_gate_core::CheckEvent;

    let registry = registry_of(vec![
        ScriptedCheck::new("a", Script::Pass),
        ScriptedCheck::new("b", Script::Fail),
    ]);
    let runner = runner();
    let mut events = runner.subscribe();
    let verdict =
        runner.run(&photo(), &plan_for(&["a", "b"], false), &registry).await.unwrap();
    assert_eq!(verdict.status, VerdictStatus::Rejected);

    let mut started = 0usize;
    let mut completed = 0usize;
    while let Ok(event) = events.try_recv() {
        match event {
            CheckEvent::Started {
                ..
            } => started += 1,
            CheckEvent::Completed {
                ..
            } => completed += 1,
        }
    }
    assert_eq!(started, 2);
    assert_eq!(completed, 2);
}

// ============================================================================
// SECTION: Shared Dependencies
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_dependent_checks_detect_faces_once() {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    struct CountingDetector {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl FaceDetector for CountingDetector {
        async fn detect(&self, _photo: &PhotoRaster) -> Result<Vec<FaceRegion>, DetectError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok(Vec::new())
        }
    }

    let registry = registry_of(vec![
        ScriptedCheck::new("a", Script::Pass).with_face_dependency(),
        ScriptedCheck::new("b", Script::Pass).with_face_dependency(),
        ScriptedCheck::new("c", Script::Pass).with_face_dependency(),
    ]);
    let calls = Arc::new(AtomicUsize::new(0));
    let runner = Runner::new(Arc::new(CountingDetector {
        calls: Arc::clone(&calls),
    }));
    let verdict =
        runner.run(&photo(), &plan_for(&["a", "b", "c"], false), &registry).await.unwrap();

    assert_eq!(verdict.status, VerdictStatus::Approved);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn dependency_failure_is_a_consistent_error_for_every_dependent() {
    struct FailingDetector;

    #[async_trait]
    impl FaceDetector for FailingDetector {
        async fn detect(&self, _photo: &PhotoRaster) -> Result<Vec<FaceRegion>, DetectError> {
            Err(DetectError::Backend("model unavailable".to_string()))
        }
    }

    let registry = registry_of(vec![
        ScriptedCheck::new("a", Script::Pass).with_face_dependency(),
        ScriptedCheck::new("b", Script::Pass).with_face_dependency(),
        ScriptedCheck::new("independent", Script::Pass),
    ]);
    let runner = Runner::new(Arc::new(FailingDetector));
    let verdict = runner
        .run(&photo(), &plan_for(&["a", "b", "independent"], false), &registry)
        .await
        .unwrap();

    assert_eq!(verdict.status, VerdictStatus::ManualReview);
    assert_eq!(status_at(&verdict, 0), CheckStatus::Error);
    assert_eq!(status_at(&verdict, 1), CheckStatus::Error);
    assert_eq!(status_at(&verdict, 2), CheckStatus::Passed);
    assert_eq!(verdict.check_results[0].reason, verdict.check_results[1].reason);
}

// ============================================================================
// SECTION: Request Rejection
// ============================================================================

#[tokio::test]
async fn invalid_parameter_value_rejects_the_request() {
    struct ParamCheck;

    #[async_trait]
    impl Check for ParamCheck {
        fn describe(&self) -> CheckDescriptor {
            CheckDescriptor {
                name: CheckName::new("bounded"),
                display_name: "Bounded".to_string(),
                description: "check with a bounded parameter".to_string(),
                category: CheckCategory::ImageQuality,
                version: "1.0.0".to_string(),
                author: "tests".to_string(),
                parameters: vec![photo_gate_core::ParameterSpec {
                    name: "limit".to_string(),
                    kind: photo_gate_core::ParameterKind::Int,
                    default: Some(ParameterValue::Int(5)),
                    min: Some(1.0),
                    max: Some(10.0),
                    choices: None,
                    required: true,
                    description: "bounded limit".to_string(),
                }],
                dependencies: BTreeSet::new(),
                enabled_by_default: true,
                time_limit_secs: None,
            }
        }

        async fn evaluate(&self, _input: &EvalInput<'_>) -> Result<CheckEval, CheckError> {
            Ok(CheckEval::passed(serde_json::Value::Null))
        }
    }

    let registry =
        Arc::new(Registry::discover(vec![Arc::new(ParamCheck) as Arc<dyn Check>])
            .unwrap()
            .registry);
    let mut plan = plan_for(&["bounded"], false);
    if let Some(settings) = plan.checks.get_mut(&CheckName::new("bounded")) {
        settings.params.insert("limit".to_string(), ParameterValue::Int(99));
    }
    let error = runner().run(&photo(), &plan, &registry).await.unwrap_err();
    assert!(matches!(error, RunnerError::InvalidPlan(issues) if issues.len() == 1));
}
