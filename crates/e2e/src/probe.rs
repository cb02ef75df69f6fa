//! Reachability check for the site under test

use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

const RETRY_INTERVAL: Duration = Duration::from_millis(250);

/// Poll `url` until it answers with a non-server-error status
pub async fn wait_for_reachable(url: &str, timeout_duration: Duration) -> E2eResult<()> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|e| E2eError::Config(format!("invalid URL '{}': {}", url, e)))?;

    let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(5));
    // A local target never goes through the system proxy
    if matches!(parsed.host_str(), Some("localhost" | "127.0.0.1" | "[::1]")) {
        builder = builder.no_proxy();
    }
    let client = builder.build()?;

    let start = Instant::now();
    let mut attempts = 0;

    loop {
        attempts += 1;

        match client.get(url).send().await {
            Ok(resp) if !resp.status().is_server_error() => {
                info!("{} reachable ({})", url, resp.status());
                return Ok(());
            }
            Ok(resp) => {
                warn!("Probe of {} returned {}", url, resp.status());
            }
            Err(e) => {
                if attempts == 1 {
                    info!("Waiting for {} ...", url);
                }
                if !e.is_connect() && !e.is_timeout() {
                    warn!("Probe error: {}", e);
                }
            }
        }

        if start.elapsed() + RETRY_INTERVAL >= timeout_duration {
            return Err(E2eError::Unreachable {
                url: url.to_string(),
                attempts,
            });
        }
        sleep(RETRY_INTERVAL).await;
    }
}
