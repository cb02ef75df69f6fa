//! Auto-retrying assertions
//!
//! Assertions poll the page until the condition holds or the timeout runs
//! out, the same way Playwright's `expect` does. Errors from the page itself
//! are not retried.

use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;
use crate::page::Page;

/// Polling intervals; the last one repeats
const POLL_INTERVALS_MS: [u64; 4] = [100, 250, 500, 1000];

pub const DEFAULT_EXPECT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Wait until the document title equals `expected`
pub async fn expect_title<P>(page: &mut P, expected: &str, timeout: Duration) -> E2eResult<()>
where
    P: Page + ?Sized,
{
    let start = Instant::now();
    let mut attempt = 0;

    loop {
        let title = page.title().await?;
        if title == expected {
            debug!("Title matched '{}' after {} attempt(s)", expected, attempt + 1);
            return Ok(());
        }

        if !backoff(start, timeout, attempt).await {
            return Err(E2eError::AssertionFailed {
                expected: format!("title '{}'", expected),
                actual: format!("'{}'", title),
                waited_ms: start.elapsed().as_millis() as u64,
            });
        }
        attempt += 1;
    }
}

/// Wait until `locator` resolves to a visible element
pub async fn expect_visible<P>(page: &mut P, locator: &Locator, timeout: Duration) -> E2eResult<()>
where
    P: Page + ?Sized,
{
    let start = Instant::now();
    let mut attempt = 0;

    loop {
        if page.is_visible(locator).await? {
            debug!("'{}' visible after {} attempt(s)", locator, attempt + 1);
            return Ok(());
        }

        if !backoff(start, timeout, attempt).await {
            return Err(E2eError::AssertionFailed {
                expected: format!("'{}' to be visible", locator),
                actual: "hidden or missing".to_string(),
                waited_ms: start.elapsed().as_millis() as u64,
            });
        }
        attempt += 1;
    }
}

/// Sleep before the next poll. Returns false once the deadline has passed.
async fn backoff(start: Instant, timeout: Duration, attempt: usize) -> bool {
    let elapsed = start.elapsed();
    if elapsed >= timeout {
        return false;
    }

    let interval = Duration::from_millis(POLL_INTERVALS_MS[attempt.min(POLL_INTERVALS_MS.len() - 1)]);
    // Never sleep past the deadline; one last poll happens right at it.
    sleep(interval.min(timeout - elapsed)).await;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::path::Path;

    /// Page whose title and visibility follow a script, then stick at the last value
    struct Scripted {
        titles: VecDeque<String>,
        visible: VecDeque<bool>,
        polls: usize,
    }

    impl Scripted {
        fn titles(titles: &[&str]) -> Self {
            Self {
                titles: titles.iter().map(|t| t.to_string()).collect(),
                visible: VecDeque::new(),
                polls: 0,
            }
        }

        fn visibility(states: &[bool]) -> Self {
            Self {
                titles: VecDeque::new(),
                visible: states.iter().copied().collect(),
                polls: 0,
            }
        }
    }

    #[async_trait]
    impl Page for Scripted {
        async fn goto(&mut self, _url: &str) -> E2eResult<()> {
            Ok(())
        }

        async fn title(&mut self) -> E2eResult<String> {
            self.polls += 1;
            if self.titles.len() > 1 {
                Ok(self.titles.pop_front().unwrap_or_default())
            } else {
                Ok(self.titles.front().cloned().unwrap_or_default())
            }
        }

        async fn fill(&mut self, _locator: &Locator, _value: &str) -> E2eResult<()> {
            Ok(())
        }

        async fn click(&mut self, _locator: &Locator) -> E2eResult<()> {
            Ok(())
        }

        async fn is_visible(&mut self, _locator: &Locator) -> E2eResult<bool> {
            self.polls += 1;
            if self.visible.len() > 1 {
                Ok(self.visible.pop_front().unwrap_or(false))
            } else {
                Ok(self.visible.front().copied().unwrap_or(false))
            }
        }

        async fn screenshot(&mut self, _path: &Path) -> E2eResult<()> {
            Ok(())
        }

        async fn close(&mut self) -> E2eResult<()> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_title_matches_immediately() {
        let mut page = Scripted::titles(&["Swag Labs"]);
        expect_title(&mut page, "Swag Labs", DEFAULT_EXPECT_TIMEOUT).await.unwrap();
        assert_eq!(page.polls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_title_retries_until_it_settles() {
        let mut page = Scripted::titles(&["", "Loading", "Swag Labs"]);
        let start = Instant::now();
        expect_title(&mut page, "Swag Labs", DEFAULT_EXPECT_TIMEOUT).await.unwrap();

        assert_eq!(page.polls, 3);
        assert!(start.elapsed() >= Duration::from_millis(100 + 250));
        assert!(start.elapsed() < Duration::from_millis(100 + 250 + 500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_title_mismatch_times_out() {
        let mut page = Scripted::titles(&["Other Shop"]);
        let err = expect_title(&mut page, "Swag Labs", Duration::from_millis(1200))
            .await
            .unwrap_err();

        match err {
            E2eError::AssertionFailed { actual, waited_ms, .. } => {
                assert_eq!(actual, "'Other Shop'");
                assert!((1200..1300).contains(&waited_ms));
            }
            other => panic!("unexpected error: {other}"),
        }
        // 0, 100, 350, 850, 1200
        assert_eq!(page.polls, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_visible_after_a_few_polls() {
        let mut page = Scripted::visibility(&[false, false, true]);
        expect_visible(&mut page, &Locator::class("inventory_list"), DEFAULT_EXPECT_TIMEOUT)
            .await
            .unwrap();
        assert_eq!(page.polls, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_visible_fails_at_deadline() {
        let mut page = Scripted::visibility(&[false]);
        let start = Instant::now();
        let err = expect_visible(&mut page, &Locator::class("inventory_list"), DEFAULT_EXPECT_TIMEOUT)
            .await
            .unwrap_err();

        assert!(matches!(err, E2eError::AssertionFailed { .. }));
        assert!(start.elapsed() >= DEFAULT_EXPECT_TIMEOUT);
    }
}
