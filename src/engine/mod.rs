//! # Execution Engine
//!
//! Drives a journey's steps strictly in order against a browser driver,
//! enforcing per-step timeout policy, capturing evidence at defined
//! checkpoints, and deciding continue-vs-abort after every step.
//!
//! The engine never raises for step-level failures: the caller always gets a
//! well-formed `JourneyResult` back. Failure handling is one uniform branch
//! for every action kind:
//!
//! - success → `succeeded`; evidence only if the step is a checkpoint
//! - `DriverError::Unavailable` → `failed_hard`, abort regardless of the
//!   `required` flag
//! - any other driver error on a required step → `failed_hard`, abort
//! - any other driver error on an optional step → `failed_soft`, continue
//!
//! Evidence is captured best-effort on every failure; capture failures are
//! logged and swallowed.
//!
//! There is no implicit retry loop. Retry, where wanted, is expressed as
//! repeated step definitions with distinct identifiers, which keeps the
//! executed sequence fully deterministic and auditable.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::driver::BrowserDriver;
use crate::errors::DriverError;
use crate::evidence::EvidenceSink;
use crate::protocol::{
    ActionKind, Journey, JourneyOutcome, JourneyResult, StepDefinition, StepOutcome, StepResult,
};

// ============================================================================
// CANCELLATION
// ============================================================================

/// Cooperative cancellation flag for a running journey.
///
/// Checked between steps only: raising the signal aborts after the
/// currently-in-flight step completes or times out, never mid-action. Clone
/// it freely; all clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal(Arc<AtomicBool>);

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ============================================================================
// ENGINE
// ============================================================================

/// Iterates a journey's steps in order and produces the terminal report.
///
/// Stateless: one engine value can run any number of journeys, but each
/// `run` call exclusively borrows one driver and one sink for its duration.
#[derive(Debug, Default)]
pub struct Engine;

impl Engine {
    pub fn new() -> Self {
        Self
    }

    /// Executes every step of the journey in sequence.
    ///
    /// Returns once the journey completes, a hard failure aborts it, or the
    /// cancellation signal is observed between steps. The driver handle
    /// stays owned by the caller and must be closed after this returns,
    /// whatever the outcome.
    #[instrument(skip_all, fields(journey_id = %journey.id(), steps = journey.len()))]
    pub async fn run<D, S>(
        &self,
        journey: &Journey,
        driver: &D,
        sink: &mut S,
        cancel: Option<&CancelSignal>,
    ) -> JourneyResult
    where
        D: BrowserDriver,
        S: EvidenceSink,
    {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let run_start = Instant::now();

        info!(%run_id, "journey started");

        let mut steps = Vec::with_capacity(journey.len());
        let mut outcome = JourneyOutcome::Completed;

        for step in journey.steps() {
            if cancel.is_some_and(CancelSignal::is_cancelled) {
                warn!(step_id = %step.id, "cancellation raised, aborting journey");
                steps.push(StepResult {
                    step_id: step.id.clone(),
                    outcome: StepOutcome::Skipped,
                    duration_ms: 0,
                    evidence_path: None,
                    error: Some("cancelled before execution".to_string()),
                });
                outcome = JourneyOutcome::Aborted;
                break;
            }

            let result = self.run_step(step, driver, sink).await;
            let aborts = result.outcome == StepOutcome::FailedHard;
            steps.push(result);
            if aborts {
                outcome = JourneyOutcome::Aborted;
                break;
            }
        }

        let total_duration_ms = run_start.elapsed().as_millis() as u64;
        info!(%run_id, ?outcome, total_duration_ms, "🏁 journey finished");

        JourneyResult {
            journey_id: journey.id().to_string(),
            run_id,
            outcome,
            total_duration_ms,
            started_at: started_at.to_rfc3339(),
            finished_at: Utc::now().to_rfc3339(),
            steps,
        }
    }

    async fn run_step<D, S>(&self, step: &StepDefinition, driver: &D, sink: &mut S) -> StepResult
    where
        D: BrowserDriver,
        S: EvidenceSink,
    {
        let start = Instant::now();

        match self.drive(step, driver).await {
            Ok(()) => {
                if !step.settle.is_zero() {
                    sleep(step.settle).await;
                }
                let evidence_path = if step.checkpoint {
                    self.capture(sink, &step.id)
                } else {
                    None
                };
                let duration_ms = start.elapsed().as_millis() as u64;
                info!(step_id = %step.id, action = %step.action, duration_ms, "step succeeded");
                StepResult {
                    step_id: step.id.clone(),
                    outcome: StepOutcome::Succeeded,
                    duration_ms,
                    evidence_path,
                    error: None,
                }
            }
            Err(err) => {
                let evidence_path = self.capture(sink, &step.id);
                let duration_ms = start.elapsed().as_millis() as u64;
                // A lost driver handle is fatal no matter what the step says.
                let hard = step.required || matches!(err, DriverError::Unavailable(_));
                if hard {
                    error!(step_id = %step.id, error = %err, "step failed hard, aborting journey");
                } else {
                    warn!(step_id = %step.id, error = %err, "optional step failed, continuing");
                }
                StepResult {
                    step_id: step.id.clone(),
                    outcome: if hard {
                        StepOutcome::FailedHard
                    } else {
                        StepOutcome::FailedSoft
                    },
                    duration_ms,
                    evidence_path,
                    error: Some(err.to_string()),
                }
            }
        }
    }

    /// One uniform path for every action kind: `wait_for` maps onto the
    /// driver's wait primitive, everything else resolves then acts.
    async fn drive<D>(&self, step: &StepDefinition, driver: &D) -> Result<(), DriverError>
    where
        D: BrowserDriver,
    {
        match step.action {
            ActionKind::WaitFor => driver.wait(&step.locator, step.timeout).await,
            kind => {
                let handle = driver.resolve(&step.locator, step.timeout).await?;
                driver.act(&handle, kind, step.payload.as_deref()).await
            }
        }
    }

    fn capture<S: EvidenceSink>(&self, sink: &mut S, step_id: &str) -> Option<std::path::PathBuf> {
        match sink.capture(step_id) {
            Ok(path) => Some(path),
            Err(err) => {
                warn!(step_id = %step_id, error = %err, "evidence capture failed, continuing");
                None
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
