// Module: Driver
// Capability set the engine consumes from a page-automation handle.

use std::time::Duration;

use async_trait::async_trait;

use crate::errors::DriverError;
use crate::protocol::ActionKind;

/// Contract for any browser-automation backend driving a journey.
///
/// The engine is generic over this trait and never depends on a concrete
/// browser product's types; a Playwright, WebDriver or fully scripted fake
/// implementation all look the same from the engine's side.
///
/// Ownership: the handle belongs to the caller for the duration of one
/// journey execution. The engine never calls `close` and never holds the
/// driver across executions — the caller releases it after `run` returns,
/// regardless of outcome.
///
/// `Send + Sync` so independent journeys can run in parallel, each with its
/// own driver instance.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Opaque element handle produced by locator resolution.
    type Handle: Send;

    /// Resolves a locator within the given budget.
    ///
    /// Drivers own both the selector semantics and the timeout enforcement;
    /// an expired budget is reported as `DriverError::LocatorTimeout`.
    async fn resolve(
        &self,
        locator: &str,
        timeout: Duration,
    ) -> Result<Self::Handle, DriverError>;

    /// Performs the action kind's primitive against a resolved handle.
    async fn act(
        &self,
        handle: &Self::Handle,
        kind: ActionKind,
        payload: Option<&str>,
    ) -> Result<(), DriverError>;

    /// Blocks until the condition holds or the budget expires.
    async fn wait(&self, condition: &str, timeout: Duration) -> Result<(), DriverError>;

    /// Title of the current page, for verification by callers.
    async fn current_title(&self) -> Result<String, DriverError>;

    /// Releases the underlying browser resources. Caller-invoked; the
    /// engine never calls this.
    async fn close(&self) -> Result<(), DriverError>;
}
