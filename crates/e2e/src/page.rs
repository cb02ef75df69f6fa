//! The page handle every interaction goes through

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

use crate::error::E2eResult;
use crate::locator::Locator;

/// One browser tab under test.
///
/// Every method suspends until the browser has finished the action, so
/// callers get strictly sequential behaviour by awaiting in order.
#[async_trait]
pub trait Page: Send {
    /// Navigate to an absolute URL
    async fn goto(&mut self, url: &str) -> E2eResult<()>;

    /// Current document title
    async fn title(&mut self) -> E2eResult<String>;

    /// Replace the value of an input
    async fn fill(&mut self, locator: &Locator, value: &str) -> E2eResult<()>;

    async fn click(&mut self, locator: &Locator) -> E2eResult<()>;

    /// Point-in-time visibility; does not wait
    async fn is_visible(&mut self, locator: &Locator) -> E2eResult<bool>;

    async fn screenshot(&mut self, path: &Path) -> E2eResult<()>;

    /// Unconditional pause
    async fn wait_for_timeout(&mut self, ms: u64) -> E2eResult<()> {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        Ok(())
    }

    /// Tear the page down. Further calls are invalid.
    async fn close(&mut self) -> E2eResult<()>;
}

/// Produces a fresh page for each test case
#[async_trait]
pub trait Launcher: Send + Sync {
    type Page: Page;

    async fn launch(&self) -> E2eResult<Self::Page>;
}
