//! # Error Taxonomy
//!
//! Structured error types for the journey runner, split by the seam where
//! they occur:
//!
//! | Type                    | Raised by            | Fatal to a journey?            |
//! |-------------------------|----------------------|--------------------------------|
//! | `InvalidStepDefinition` | Journey construction | Yes, before any step runs      |
//! | `DriverError`           | Browser driver       | Depends on the `required` flag |
//! | `EvidenceError`         | Evidence sink        | Never (logged only)            |
//! | `ProviderError`         | Data provider        | N/A (outside the engine)       |
//!
//! The engine itself never returns an error for step-level failures: those
//! are recorded inside the `JourneyResult` and execution continues or aborts
//! according to the propagation policy. Only malformed journeys (caught at
//! construction) and a lost driver handle escalate beyond a step result.

use std::path::PathBuf;
use thiserror::Error;

/// Construction-time validation failures for a journey definition.
///
/// These are programmer errors in the journey itself and are always surfaced
/// before any step executes — never mid-run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidStepDefinition {
    #[error("step id must not be empty")]
    EmptyId,

    #[error("duplicate step id '{0}' in journey")]
    DuplicateId(String),

    #[error("step '{0}': timeout must be greater than zero")]
    ZeroTimeout(String),

    #[error("step '{0}': action 'fill' requires a payload")]
    MissingPayload(String),

    #[error("step '{id}': action '{action}' does not take a payload")]
    UnexpectedPayload { id: String, action: String },
}

/// Failures reported by a browser driver while executing one step.
#[derive(Debug, Error, Clone)]
pub enum DriverError {
    /// Locator resolution (or a wait condition) exceeded the step timeout.
    #[error("locator '{locator}' did not resolve within {timeout_ms}ms")]
    LocatorTimeout { locator: String, timeout_ms: u64 },

    /// The driver accepted the locator but rejected or failed the action.
    #[error("driver action failed: {0}")]
    ActionFailure(String),

    /// The driver handle is invalid or closed. Aborts the journey
    /// immediately, regardless of the step's `required` flag.
    #[error("driver unavailable: {0}")]
    Unavailable(String),
}

/// Failures while persisting an evidence artifact.
///
/// Capture failures are never fatal: the engine logs them and records the
/// step's evidence path as absent.
#[derive(Debug, Error)]
pub enum EvidenceError {
    #[error("failed to create evidence artifact {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create evidence root {path:?}")]
    RootUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures in the spreadsheet data provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("tabular file not found: {0:?}")]
    FileNotFound(PathBuf),

    #[error("unsupported tabular format: {0:?}")]
    UnsupportedFormat(PathBuf),

    #[error("sheet '{requested}' not found (available: {available})")]
    UnknownSheet { requested: String, available: String },

    #[error("cell ({row}, {col}) is out of range")]
    CellOutOfRange { row: u32, col: u32 },

    #[error("failed to read workbook")]
    Workbook(#[from] calamine::Error),

    #[error("failed to read CSV file")]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_step_messages_name_the_step() {
        let err = InvalidStepDefinition::ZeroTimeout("open_home".to_string());
        assert!(err.to_string().contains("open_home"));

        let err = InvalidStepDefinition::UnexpectedPayload {
            id: "click_search".to_string(),
            action: "click".to_string(),
        };
        assert!(err.to_string().contains("click_search"));
        assert!(err.to_string().contains("click"));
    }

    #[test]
    fn driver_timeout_reports_locator_and_budget() {
        let err = DriverError::LocatorTimeout {
            locator: "#results".to_string(),
            timeout_ms: 5000,
        };
        let msg = err.to_string();
        assert!(msg.contains("#results"));
        assert!(msg.contains("5000"));
    }
}
