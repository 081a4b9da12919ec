//! # Protocol - Journey and Result Data Model
//!
//! Declarative description of a UI journey and the report produced by one
//! execution attempt.
//!
//! A `Journey` is an ordered, immutable sequence of `StepDefinition`s;
//! insertion order is the execution order, there is no reordering and no
//! parallelism within a journey. Validation happens once, at construction:
//! a `Journey` that exists is a journey the engine will accept.
//!
//! `JourneyResult` / `StepResult` serialize to the camelCase report document
//! consumed by external tooling:
//!
//! ```json
//! {
//!   "journeyId": "cleartrip_roundtrip",
//!   "outcome": "completed",
//!   "totalDurationMs": 8412,
//!   "steps": [
//!     { "id": "open_home", "outcome": "succeeded", "durationMs": 1200 }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::InvalidStepDefinition;

/// Policy-level default applied when a step does not set its own timeout.
pub const DEFAULT_STEP_TIMEOUT_MS: u64 = 10_000;

// ============================================================================
// ACTIONS
// ============================================================================

/// The enumerated set of UI primitives a step can perform.
///
/// Locator semantics are owned by the driver; for `navigate` the locator is
/// the target URL, for everything else it is an opaque selector string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Navigate,
    Click,
    Fill,
    WaitFor,
    AssertVisible,
}

impl ActionKind {
    /// Only `fill` carries an input payload; every other kind must omit it.
    pub fn takes_payload(&self) -> bool {
        matches!(self, ActionKind::Fill)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Navigate => "navigate",
            ActionKind::Click => "click",
            ActionKind::Fill => "fill",
            ActionKind::WaitFor => "wait_for",
            ActionKind::AssertVisible => "assert_visible",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// STEP DEFINITION
// ============================================================================

/// One declarative UI interaction: locate, act, wait.
///
/// Pure data, no behavior. Built with the chained constructors below and
/// validated when the owning `Journey` is assembled.
#[derive(Debug, Clone)]
pub struct StepDefinition {
    /// Unique within a journey. Duplicates are a construction-time error.
    pub id: String,
    pub action: ActionKind,
    /// Opaque selector string; semantics owned by the browser driver.
    pub locator: String,
    /// Input payload, e.g. text to fill. Required for `fill`, forbidden
    /// for every other action kind.
    pub payload: Option<String>,
    /// Budget for locator resolution / wait conditions. Must be > 0.
    pub timeout: Duration,
    /// If false, a failure is recorded as soft and the journey continues.
    pub required: bool,
    /// Scheduling pause applied after the action, may be zero.
    pub settle: Duration,
    /// Opt-in evidence capture on success. Failures always capture
    /// best-effort, independent of this flag.
    pub checkpoint: bool,
}

impl StepDefinition {
    pub fn new(
        id: impl Into<String>,
        action: ActionKind,
        locator: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            action,
            locator: locator.into(),
            payload: None,
            timeout: Duration::from_millis(DEFAULT_STEP_TIMEOUT_MS),
            required: true,
            settle: Duration::ZERO,
            checkpoint: false,
        }
    }

    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Marks the step as non-fatal: a failure is logged and recorded as
    /// `failed_soft`, and the journey continues.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Flags the step as a checkpoint so evidence is captured on success.
    pub fn with_checkpoint(mut self) -> Self {
        self.checkpoint = true;
        self
    }

    /// Step-local validation. Id uniqueness is checked by `Journey::new`.
    pub fn validate(&self) -> Result<(), InvalidStepDefinition> {
        if self.id.trim().is_empty() {
            return Err(InvalidStepDefinition::EmptyId);
        }
        if self.timeout.is_zero() {
            return Err(InvalidStepDefinition::ZeroTimeout(self.id.clone()));
        }
        if self.action.takes_payload() && self.payload.is_none() {
            return Err(InvalidStepDefinition::MissingPayload(self.id.clone()));
        }
        if !self.action.takes_payload() && self.payload.is_some() {
            return Err(InvalidStepDefinition::UnexpectedPayload {
                id: self.id.clone(),
                action: self.action.to_string(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// JOURNEY
// ============================================================================

/// An ordered sequence of steps representing one end-to-end user scenario.
///
/// Immutable once constructed. `Journey::new` validates every step and
/// rejects duplicate ids, so the engine never has to re-check.
#[derive(Debug, Clone)]
pub struct Journey {
    id: String,
    steps: Vec<StepDefinition>,
}

impl Journey {
    pub fn new(
        id: impl Into<String>,
        steps: Vec<StepDefinition>,
    ) -> Result<Self, InvalidStepDefinition> {
        let mut seen = HashSet::new();
        for step in &steps {
            step.validate()?;
            if !seen.insert(step.id.clone()) {
                return Err(InvalidStepDefinition::DuplicateId(step.id.clone()));
            }
        }
        Ok(Self {
            id: id.into(),
            steps,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn steps(&self) -> &[StepDefinition] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

// ============================================================================
// RESULTS
// ============================================================================

/// Terminal state of one executed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    Succeeded,
    /// Non-fatal failure of an optional step; the journey continued.
    FailedSoft,
    /// Fatal failure; always the last recorded step of an aborted journey.
    FailedHard,
    /// The step never ran (cancellation raised before it started).
    Skipped,
}

/// Overall outcome of a journey execution.
///
/// `Completed` alone does not mean a clean run: optional steps may have
/// failed soft. Callers that need strict pass/fail semantics must also
/// inspect the per-step outcomes (see `JourneyResult::is_clean`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyOutcome {
    Completed,
    Aborted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    #[serde(rename = "id")]
    pub step_id: String,
    pub outcome: StepOutcome,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Report for one journey execution attempt. Produced exactly once per run
/// and immutable after the engine returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyResult {
    pub journey_id: String,
    pub run_id: Uuid,
    pub outcome: JourneyOutcome,
    pub total_duration_ms: u64,
    pub started_at: String,
    pub finished_at: String,
    /// Parallel to the journey's steps, truncated if the run aborted early.
    pub steps: Vec<StepResult>,
}

impl JourneyResult {
    /// True only for a fully clean run: completed with every step succeeded.
    /// A completed-but-degraded journey (soft failures) returns false.
    pub fn is_clean(&self) -> bool {
        self.outcome == JourneyOutcome::Completed
            && self.steps.iter().all(|s| s.outcome == StepOutcome::Succeeded)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn click(id: &str) -> StepDefinition {
        StepDefinition::new(id, ActionKind::Click, "#button")
    }

    #[test]
    fn journey_rejects_duplicate_ids() {
        let err = Journey::new("j", vec![click("a"), click("b"), click("a")]).unwrap_err();
        assert_eq!(err, InvalidStepDefinition::DuplicateId("a".to_string()));
    }

    #[test]
    fn journey_rejects_empty_id() {
        let err = Journey::new("j", vec![click("  ")]).unwrap_err();
        assert_eq!(err, InvalidStepDefinition::EmptyId);
    }

    #[test]
    fn journey_rejects_zero_timeout() {
        let step = click("a").with_timeout(Duration::ZERO);
        let err = Journey::new("j", vec![step]).unwrap_err();
        assert_eq!(err, InvalidStepDefinition::ZeroTimeout("a".to_string()));
    }

    #[test]
    fn fill_requires_payload() {
        let step = StepDefinition::new("from", ActionKind::Fill, "#from-city");
        let err = Journey::new("j", vec![step]).unwrap_err();
        assert_eq!(err, InvalidStepDefinition::MissingPayload("from".to_string()));

        let step = StepDefinition::new("from", ActionKind::Fill, "#from-city")
            .with_payload("Bengaluru");
        assert!(Journey::new("j", vec![step]).is_ok());
    }

    #[test]
    fn non_fill_rejects_payload() {
        let step = click("a").with_payload("unexpected");
        let err = Journey::new("j", vec![step]).unwrap_err();
        assert!(matches!(err, InvalidStepDefinition::UnexpectedPayload { .. }));
    }

    #[test]
    fn empty_journey_is_valid() {
        let journey = Journey::new("empty", vec![]).unwrap();
        assert!(journey.is_empty());
        assert_eq!(journey.len(), 0);
    }

    #[test]
    fn step_defaults() {
        let step = click("a");
        assert!(step.required);
        assert!(!step.checkpoint);
        assert_eq!(step.settle, Duration::ZERO);
        assert_eq!(step.timeout, Duration::from_millis(DEFAULT_STEP_TIMEOUT_MS));
    }

    #[test]
    fn action_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ActionKind::WaitFor).unwrap();
        assert_eq!(json, "\"wait_for\"");
        let back: ActionKind = serde_json::from_str("\"assert_visible\"").unwrap();
        assert_eq!(back, ActionKind::AssertVisible);
    }

    #[test]
    fn report_serializes_camel_case() {
        let result = JourneyResult {
            journey_id: "j".to_string(),
            run_id: Uuid::new_v4(),
            outcome: JourneyOutcome::Completed,
            total_duration_ms: 42,
            started_at: "2026-01-01T00:00:00Z".to_string(),
            finished_at: "2026-01-01T00:00:01Z".to_string(),
            steps: vec![StepResult {
                step_id: "open_home".to_string(),
                outcome: StepOutcome::Succeeded,
                duration_ms: 42,
                evidence_path: None,
                error: None,
            }],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["outcome"], "completed");
        assert_eq!(json["totalDurationMs"], 42);
        assert_eq!(json["steps"][0]["id"], "open_home");
        assert_eq!(json["steps"][0]["outcome"], "succeeded");
        assert!(json["steps"][0].get("evidencePath").is_none());
    }

    #[test]
    fn degraded_run_is_not_clean() {
        let mk = |outcome| StepResult {
            step_id: "s".to_string(),
            outcome,
            duration_ms: 0,
            evidence_path: None,
            error: None,
        };
        let mut result = JourneyResult {
            journey_id: "j".to_string(),
            run_id: Uuid::new_v4(),
            outcome: JourneyOutcome::Completed,
            total_duration_ms: 0,
            started_at: String::new(),
            finished_at: String::new(),
            steps: vec![mk(StepOutcome::Succeeded), mk(StepOutcome::FailedSoft)],
        };
        assert!(!result.is_clean());
        result.steps[1].outcome = StepOutcome::Succeeded;
        assert!(result.is_clean());
    }
}
