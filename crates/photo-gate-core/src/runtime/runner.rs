// photo-gate-core/src/runtime/runner.rs
// ============================================================================
// Module: Check Runner
// Description: Orchestration engine executing the configured check set.
// Purpose: Schedule checks under concurrency, timeout, and short-circuit
//          constraints and reduce outcomes to a verdict.
// Dependencies: tokio, tracing, crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! The runner is the single canonical execution path for one image's
//! validation. It resolves the enabled subset of the configured order,
//! executes it — concurrently under a worker budget, or one order position
//! at a time when short-circuiting is requested — enforces per-check and
//! whole-run deadlines, re-sequences completions into configuration order,
//! and reduces the trail into a [`Verdict`]. Per-check failures of any kind
//! are recovered into outcomes and never escape; only an unusable registry
//! or a rejected configuration aborts a request before execution.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::core::identifiers::CheckName;
use crate::core::image::PhotoRaster;
use crate::core::outcome::CheckEval;
use crate::core::outcome::CheckOutcome;
use crate::core::outcome::CheckStatus;
use crate::core::outcome::Verdict;
use crate::core::outcome::VerdictStatus;
use crate::core::params::ResolvedParams;
use crate::core::plan::PlanIssue;
use crate::core::plan::ValidationPlan;
use crate::core::registry::Registry;
use crate::interfaces::Check;
use crate::interfaces::EvalInput;
use crate::interfaces::FaceDetector;
use crate::interfaces::NullVerdictSink;
use crate::interfaces::VerdictSink;
use crate::runtime::context::SharedContext;
use crate::runtime::events::CheckEvent;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Scheduling slack added on top of the summed per-check timeouts.
const RUN_DEADLINE_SLACK: Duration = Duration::from_millis(500);

// ============================================================================
// SECTION: Runner Configuration
// ============================================================================

/// Architectural knobs for the runner, distinct from the validated
/// configuration document.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Worker budget bounding concurrent checks within one image's run.
    ///
    /// `None` means no limit beyond dependency readiness. This is independent
    /// of the image-level admission pool.
    pub check_workers: Option<usize>,
    /// Strict accounting: keep skipped checks in the result trail.
    ///
    /// When disabled, skipped entries are dropped from the trail but still
    /// counted, so passed + failed-class + skipped always equals the total.
    pub record_skipped: bool,
    /// Buffer capacity of the progress event channel.
    pub event_capacity: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            check_workers: None,
            record_skipped: true,
            event_capacity: 64,
        }
    }
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Orchestration engine for one-image validation runs.
pub struct Runner {
    /// Detection backend handed to each run's shared context.
    detector: Arc<dyn FaceDetector>,
    /// Metrics/history sink receiving each verdict, fire-and-forget.
    sink: Arc<dyn VerdictSink>,
    /// Architectural knobs.
    config: RunnerConfig,
    /// Progress event channel.
    events: broadcast::Sender<CheckEvent>,
}

impl Runner {
    /// Creates a runner with default knobs and a discarding sink.
    #[must_use]
    pub fn new(detector: Arc<dyn FaceDetector>) -> Self {
        Self::with_config(detector, RunnerConfig::default())
    }

    /// Creates a runner with explicit knobs.
    #[must_use]
    pub fn with_config(detector: Arc<dyn FaceDetector>, config: RunnerConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            detector,
            sink: Arc::new(NullVerdictSink),
            config,
            events,
        }
    }

    /// Replaces the verdict sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn VerdictSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Subscribes to the read-only progress event stream.
    ///
    /// Events are emitted in completion order and never influence
    /// aggregation; dropping the receiver has no effect on the run.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CheckEvent> {
        self.events.subscribe()
    }

    /// Validates one image against the plan and reduces a verdict.
    ///
    /// Dropping the returned future aborts every in-flight check task, so
    /// cancelling the surrounding request cancels its children rather than
    /// leaking them.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError`] before any check executes when the registry
    /// is unusable or the plan is rejected. Checks referencing a name absent
    /// from the (possibly refreshed) registry are not a rejection: they are
    /// recorded as skipped.
    pub async fn run(
        &self,
        photo: &Arc<PhotoRaster>,
        plan: &ValidationPlan,
        registry: &Arc<Registry>,
    ) -> Result<Verdict, RunnerError> {
        let started = Instant::now();
        if registry.is_empty() {
            return Err(RunnerError::EmptyRegistry);
        }
        let stale = Self::reject_or_mark_stale(plan, registry)?;

        info!(
            checks = plan.check_order.len(),
            stop_on_failure = plan.stop_on_failure,
            "starting validation run"
        );

        let shared = Arc::new(SharedContext::new(Arc::clone(&self.detector)));
        let total = plan.check_order.len();
        let mut outcomes: Vec<Option<CheckOutcome>> = Vec::with_capacity(total);
        outcomes.resize_with(total, || None);
        let mut launches = Vec::new();

        for (index, name) in plan.check_order.iter().enumerate() {
            let outcome = if stale.contains(name) {
                Some(self.skip(name, "check not present in registry"))
            } else {
                let Some(settings) = plan.checks.get(name) else {
                    // Unreachable past validation; recorded rather than panicked.
                    outcomes[index] = Some(self.skip(name, "check has no settings entry"));
                    continue;
                };
                if settings.enabled {
                    let entry = registry
                        .get(name)
                        .ok_or_else(|| RunnerError::Internal(name.clone()))?;
                    launches.push(CheckLaunch {
                        index,
                        name: name.clone(),
                        implementation: Arc::clone(&entry.implementation),
                        params: ResolvedParams::resolve(
                            &entry.descriptor.parameters,
                            &settings.params,
                        ),
                        timeout: plan.effective_timeout(&entry.descriptor),
                    });
                    None
                } else {
                    Some(self.skip(name, "disabled in configuration"))
                }
            };
            outcomes[index] = outcome;
        }

        if plan.stop_on_failure {
            self.run_sequential(photo, &shared, launches, &mut outcomes).await;
        } else {
            self.run_concurrent(photo, &shared, launches, &mut outcomes).await;
        }

        let verdict = self.aggregate(outcomes, started);
        info!(status = ?verdict.status, passed = verdict.checks_passed, "validation run complete");
        self.sink.record(&verdict);
        Ok(verdict)
    }

    /// Rejects structurally invalid plans; unknown-check references survive
    /// as a skip set so a stale configuration still produces a verdict.
    fn reject_or_mark_stale(
        plan: &ValidationPlan,
        registry: &Registry,
    ) -> Result<BTreeSet<CheckName>, RunnerError> {
        let mut stale = BTreeSet::new();
        let mut fatal = Vec::new();
        for issue in plan.validate(registry) {
            match issue {
                PlanIssue::UnknownCheck {
                    check,
                } => {
                    warn!(check = %check, "configured check absent from registry; will skip");
                    stale.insert(check);
                }
                other => fatal.push(other),
            }
        }
        if fatal.is_empty() {
            Ok(stale)
        } else {
            Err(RunnerError::InvalidPlan(fatal))
        }
    }

    /// Runs the launch set fully concurrently under the worker budget,
    /// buffering completions and re-sequencing them into order positions.
    async fn run_concurrent(
        &self,
        photo: &Arc<PhotoRaster>,
        shared: &Arc<SharedContext>,
        launches: Vec<CheckLaunch>,
        outcomes: &mut [Option<CheckOutcome>],
    ) {
        if launches.is_empty() {
            return;
        }
        // Sum policy plus scheduling slack, so a check hitting its own
        // deadline still reports as a per-check timeout rather than being
        // swallowed by the run deadline.
        let run_deadline: Duration =
            launches.iter().map(|launch| launch.timeout).sum::<Duration>() + RUN_DEADLINE_SLACK;
        let workers = self
            .config
            .check_workers
            .map(|budget| Arc::new(Semaphore::new(budget.max(1))));
        let mut join = JoinSet::new();
        let launched: Vec<(usize, CheckName)> =
            launches.iter().map(|launch| (launch.index, launch.name.clone())).collect();

        for launch in launches {
            let photo = Arc::clone(photo);
            let shared = Arc::clone(shared);
            let workers = workers.clone();
            let events = self.events.clone();
            join.spawn(async move {
                let _permit = match workers {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                let outcome = execute_check(&photo, &shared, &launch, &events).await;
                (launch.index, outcome)
            });
        }

        let collect = async {
            while let Some(joined) = join.join_next().await {
                if let Ok((index, outcome)) = joined {
                    self.emit(CheckEvent::Completed {
                        outcome: outcome.clone(),
                    });
                    if let Some(slot) = outcomes.get_mut(index) {
                        *slot = Some(outcome);
                    }
                }
            }
        };
        let deadline_hit = timeout(run_deadline, collect).await.is_err();
        if deadline_hit {
            join.abort_all();
            warn!("run deadline exceeded; aborting in-flight checks");
        }

        for (index, name) in launched {
            if outcomes[index].is_none() {
                let outcome = CheckOutcome {
                    check: name,
                    status: CheckStatus::Timeout,
                    reason: Some("run deadline exceeded".to_string()),
                    details: serde_json::Value::Null,
                    duration_ms: 0,
                };
                self.emit(CheckEvent::Completed {
                    outcome: outcome.clone(),
                });
                outcomes[index] = Some(outcome);
            }
        }
    }

    /// Runs the launch set one order position at a time so a failure
    /// deterministically prevents later positions from launching.
    async fn run_sequential(
        &self,
        photo: &Arc<PhotoRaster>,
        shared: &Arc<SharedContext>,
        launches: Vec<CheckLaunch>,
        outcomes: &mut [Option<CheckOutcome>],
    ) {
        let mut short_circuited = false;
        for launch in launches {
            let outcome = if short_circuited {
                self.skip(&launch.name, "short-circuited by earlier failure")
            } else {
                let outcome = execute_check(photo, shared, &launch, &self.events).await;
                if outcome.status == CheckStatus::Failed {
                    debug!(check = %launch.name, "stop_on_failure engaged");
                    short_circuited = true;
                }
                self.emit(CheckEvent::Completed {
                    outcome: outcome.clone(),
                });
                outcome
            };
            if let Some(slot) = outcomes.get_mut(launch.index) {
                *slot = Some(outcome);
            }
        }
    }

    /// Builds a skipped outcome and announces it on the event stream.
    fn skip(&self, name: &CheckName, reason: &str) -> CheckOutcome {
        let outcome = CheckOutcome {
            check: name.clone(),
            status: CheckStatus::Skipped,
            reason: Some(reason.to_string()),
            details: serde_json::Value::Null,
            duration_ms: 0,
        };
        self.emit(CheckEvent::Completed {
            outcome: outcome.clone(),
        });
        outcome
    }

    /// Sends a progress event, ignoring the no-subscriber case.
    fn emit(&self, event: CheckEvent) {
        let _ = self.events.send(event);
    }

    /// Reduces the completed outcome set into a verdict.
    fn aggregate(&self, outcomes: Vec<Option<CheckOutcome>>, started: Instant) -> Verdict {
        let trail: Vec<CheckOutcome> = outcomes.into_iter().flatten().collect();
        let total_checks = trail.len();
        let checks_passed =
            trail.iter().filter(|outcome| outcome.status == CheckStatus::Passed).count();
        let any = |status: CheckStatus| trail.iter().any(|outcome| outcome.status == status);

        let status = if any(CheckStatus::Failed) {
            VerdictStatus::Rejected
        } else if any(CheckStatus::NeedsReview)
            || any(CheckStatus::Error)
            || any(CheckStatus::Timeout)
        {
            VerdictStatus::ManualReview
        } else if checks_passed > 0 {
            VerdictStatus::Approved
        } else {
            // Zero executed checks: approving with no evidence is disallowed.
            VerdictStatus::Failed
        };

        let check_results = if self.config.record_skipped {
            trail
        } else {
            trail.into_iter().filter(|outcome| outcome.status != CheckStatus::Skipped).collect()
        };

        Verdict {
            status,
            check_results,
            checks_passed,
            total_checks,
            processing_time_ms: duration_ms(started.elapsed()),
        }
    }
}

// ============================================================================
// SECTION: Check Execution
// ============================================================================

/// Everything needed to execute one enabled check.
struct CheckLaunch {
    /// Position in the configured order.
    index: usize,
    /// Check identifier.
    name: CheckName,
    /// Shared implementation handle.
    implementation: Arc<dyn Check>,
    /// Effective parameters for this run.
    params: ResolvedParams,
    /// Effective timeout: min(system ceiling, check-declared limit).
    timeout: Duration,
}

/// Executes one check under its effective timeout and normalizes the result.
async fn execute_check(
    photo: &Arc<PhotoRaster>,
    shared: &Arc<SharedContext>,
    launch: &CheckLaunch,
    events: &broadcast::Sender<CheckEvent>,
) -> CheckOutcome {
    let _ = events.send(CheckEvent::Started {
        check: launch.name.clone(),
    });
    let started = Instant::now();
    let input = EvalInput {
        photo: photo.as_ref(),
        shared: shared.as_ref(),
        params: &launch.params,
    };
    let result = timeout(launch.timeout, launch.implementation.evaluate(&input)).await;
    let duration = duration_ms(started.elapsed());

    match result {
        Ok(Ok(eval)) => finalize(launch.name.clone(), eval, duration),
        Ok(Err(error)) => {
            warn!(check = %launch.name, %error, "check raised an error");
            CheckOutcome {
                check: launch.name.clone(),
                status: CheckStatus::Error,
                reason: Some(error.to_string()),
                details: serde_json::Value::Null,
                duration_ms: duration,
            }
        }
        Err(_elapsed) => {
            warn!(check = %launch.name, timeout = ?launch.timeout, "check timed out");
            CheckOutcome {
                check: launch.name.clone(),
                status: CheckStatus::Timeout,
                reason: Some(format!(
                    "check timed out after {:.3}s",
                    launch.timeout.as_secs_f64()
                )),
                details: serde_json::Value::Null,
                duration_ms: duration,
            }
        }
    }
}

/// Normalizes an implementation-reported evaluation into an outcome record.
///
/// Implementations own the pass/fail/review/skip dispositions; `Error` and
/// `Timeout` belong to the engine, so a stray report of either is coerced to
/// `Error`. A non-passing outcome always carries a reason.
fn finalize(name: CheckName, eval: CheckEval, duration_ms: u64) -> CheckOutcome {
    let status = match eval.status {
        CheckStatus::Error | CheckStatus::Timeout => CheckStatus::Error,
        reported => reported,
    };
    let reason = match (&eval.reason, status) {
        (None, CheckStatus::Passed) => None,
        (None, _) => Some("no reason reported".to_string()),
        (Some(reason), _) => Some(reason.clone()),
    };
    CheckOutcome {
        check: name,
        status,
        reason,
        details: eval.details,
        duration_ms,
    }
}

/// Converts a duration to whole milliseconds, saturating.
fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Request-rejection errors surfaced before any check executes.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Registry has no usable checks; no verdict is possible.
    #[error("registry has no usable checks")]
    EmptyRegistry,
    /// Configuration rejected; the prior configuration remains active.
    #[error("configuration rejected with {} issue(s)", .0.len())]
    InvalidPlan(Vec<PlanIssue>),
    /// Invariant breach between validation and launch.
    #[error("registry entry vanished during launch: {0}")]
    Internal(CheckName),
}
