//! # Loader - Journey Configuration Documents
//!
//! Reads and parses journey files from disk and resolves them into validated
//! `Journey` values. Selector strings live in these documents, not in code:
//! the same engine serves any web journey by swapping the document.
//!
//! ## Document shape
//!
//! ```json
//! {
//!   "meta": { "id": "flight_search", "name": "Round trip search" },
//!   "defaults": { "timeout_ms": 10000, "settle_ms": 1000 },
//!   "steps": [
//!     { "id": "open_home", "action": "navigate", "locator": "https://cleartrip.com" },
//!     { "id": "close_popup", "action": "click",
//!       "locator": "svg[data-testid='closeIcon']", "required": false },
//!     { "id": "from_city", "action": "fill",
//!       "locator": "[placeholder='Where from?']", "payload": "${from_city}" },
//!     { "id": "pick_departure", "action": "click",
//!       "locator": "//div[@aria-label='${date+7}']", "checkpoint": true }
//!   ]
//! }
//! ```
//!
//! Placeholders (`${...}`) in locators and payloads are resolved against a
//! `ParamContext` when the document is turned into a `Journey`.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};

use crate::params::ParamContext;
use crate::protocol::{ActionKind, Journey, StepDefinition, DEFAULT_STEP_TIMEOUT_MS};

#[derive(Debug, Deserialize, Serialize)]
pub struct JourneyFile {
    pub meta: Meta,
    #[serde(default)]
    pub defaults: Defaults,
    pub steps: Vec<StepSpec>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Meta {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Journey-level fallbacks applied to steps that do not set their own.
#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub settle_ms: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_STEP_TIMEOUT_MS,
            settle_ms: 0,
        }
    }
}

fn default_timeout_ms() -> u64 {
    DEFAULT_STEP_TIMEOUT_MS
}

fn default_true() -> bool {
    true
}

/// One step record of the configuration document.
#[derive(Debug, Deserialize, Serialize)]
pub struct StepSpec {
    pub id: String,
    pub action: ActionKind,
    pub locator: String,
    #[serde(default)]
    pub payload: Option<String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(default)]
    pub settle_ms: Option<u64>,
    #[serde(default)]
    pub checkpoint: bool,
}

/// Loads a journey document from a JSON file.
pub fn load_journey_file<P: AsRef<Path>>(path: P) -> Result<JourneyFile> {
    let path_ref = path.as_ref();

    let content = fs::read_to_string(path_ref)
        .with_context(|| format!("Failed to read journey file {:?}", path_ref))?;

    let file = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse journey JSON {:?}", path_ref))?;

    Ok(file)
}

impl JourneyFile {
    /// Resolves placeholders and defaults into a validated `Journey`.
    ///
    /// Fails on unresolved placeholders and on any construction-time rule
    /// (duplicate ids, missing `fill` payload, zero timeout).
    pub fn resolve(&self, params: &ParamContext) -> Result<Journey> {
        let mut steps = Vec::with_capacity(self.steps.len());
        for spec in &self.steps {
            let locator = params
                .interpolate(&spec.locator)
                .with_context(|| format!("step '{}': locator", spec.id))?;

            let mut step = StepDefinition::new(&spec.id, spec.action, locator)
                .with_timeout(Duration::from_millis(
                    spec.timeout_ms.unwrap_or(self.defaults.timeout_ms),
                ))
                .with_settle(Duration::from_millis(
                    spec.settle_ms.unwrap_or(self.defaults.settle_ms),
                ));

            if let Some(payload) = &spec.payload {
                let payload = params
                    .interpolate(payload)
                    .with_context(|| format!("step '{}': payload", spec.id))?;
                step = step.with_payload(payload);
            }
            if !spec.required {
                step = step.optional();
            }
            if spec.checkpoint {
                step = step.with_checkpoint();
            }
            steps.push(step);
        }

        Journey::new(&self.meta.id, steps).map_err(anyhow::Error::from)
    }
}
