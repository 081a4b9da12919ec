//! # journey-runner
//!
//! A declarative UI-journey automation core plus a spreadsheet data-provider
//! for data-driven journeys.
//!
//! A journey is an ordered sequence of step definitions (locate, act, wait,
//! verify); the engine executes them strictly in order against any
//! `BrowserDriver` implementation, capturing evidence at checkpoints and
//! classifying every failure as soft (continue) or hard (abort). The caller
//! always receives a complete `JourneyResult` — step failures are data, not
//! errors.
//!
//! ```no_run
//! use journey_runner::{ActionKind, Engine, FsEvidenceSink, Journey, StepDefinition};
//!
//! # async fn example(driver: impl journey_runner::BrowserDriver) -> anyhow::Result<()> {
//! let journey = Journey::new(
//!     "flight_search",
//!     vec![
//!         StepDefinition::new("open_home", ActionKind::Navigate, "https://cleartrip.com"),
//!         StepDefinition::new("close_popup", ActionKind::Click, "svg[data-testid='closeIcon']")
//!             .optional(),
//!         StepDefinition::new("results", ActionKind::WaitFor, "#results").with_checkpoint(),
//!     ],
//! )?;
//!
//! let mut sink = FsEvidenceSink::new("screenshots");
//! let result = Engine::new().run(&journey, &driver, &mut sink, None).await;
//! driver.close().await?;
//! println!("{}", serde_json::to_string_pretty(&result)?);
//! # Ok(())
//! # }
//! ```

pub mod dataprovider;
pub mod driver;
pub mod engine;
pub mod errors;
pub mod evidence;
pub mod loader;
pub mod params;
pub mod protocol;

pub use driver::BrowserDriver;
pub use engine::{CancelSignal, Engine};
pub use errors::{DriverError, EvidenceError, InvalidStepDefinition, ProviderError};
pub use evidence::{EvidenceSink, FsEvidenceSink};
pub use loader::{load_journey_file, JourneyFile};
pub use params::ParamContext;
pub use protocol::{
    ActionKind, Journey, JourneyOutcome, JourneyResult, StepDefinition, StepOutcome, StepResult,
};
