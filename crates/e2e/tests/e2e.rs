//! E2E test harness entry point
//!
//! Runs the login smoke flow against a real browser, plus the YAML scenarios
//! in `--specs <dir>` when one is given.
//! Run with: cargo test --package swaglabs-e2e --test e2e
//!
//! Without `--strict`, a machine with no Playwright install or no route to
//! the shop skips instead of failing.

use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use swaglabs_e2e::harness::{is_list_request, HarnessArgs};
use swaglabs_e2e::playwright::{check_playwright_installed, Browser, PlaywrightLauncher};
use swaglabs_e2e::probe::wait_for_reachable;
use swaglabs_e2e::runner::TestRunner;
use swaglabs_e2e::{E2eResult, Launcher, Page, SuiteConfig};

/// Outcome of a harness run, mapped to the exit code
enum Outcome {
    Passed,
    Failed,
    Skipped,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // `cargo test --list` enumerates tests; this binary has none to list.
    if is_list_request(std::env::args()) {
        return;
    }

    let args = HarnessArgs::from_env();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {}", e);
            std::process::exit(2);
        }
    };

    match rt.block_on(async_main(args)) {
        Ok(Outcome::Passed) | Ok(Outcome::Skipped) => std::process::exit(0),
        Ok(Outcome::Failed) => std::process::exit(1),
        Err(e) => {
            error!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

async fn async_main(args: HarnessArgs) -> E2eResult<Outcome> {
    let mut config = SuiteConfig::load(&args.config)?;
    config.apply_env()?;

    if let Some(browser) = &args.browser {
        config.browser.engine = browser.parse::<Browser>()?;
    }
    if args.headed {
        config.browser.headless = false;
    }
    if let Some(output) = args.output {
        config.output.dir = output;
    }

    let launcher = PlaywrightLauncher::new(config.playwright());
    if let Err(e) = check_environment(&config, &launcher).await {
        if e.is_environmental() && !args.strict {
            warn!("Skipping browser tests: {}", e);
            return Ok(Outcome::Skipped);
        }
        return Err(e);
    }

    let runner = TestRunner::new(config, launcher);

    let cases = runner.collect_cases(args.specs.as_deref())?;
    let name = args.name.as_deref().or(args.filter.as_deref());
    let cases = TestRunner::<PlaywrightLauncher>::select(cases, name, args.tag.as_deref());
    if cases.is_empty() {
        warn!("No tests matched the given filters");
        return Ok(Outcome::Skipped);
    }

    let results = runner.run_cases(&cases).await;
    runner.write_results(&results)?;

    if results.success() {
        info!("All {} test(s) passed", results.total);
        Ok(Outcome::Passed)
    } else {
        Ok(Outcome::Failed)
    }
}

/// Install check, a throwaway browser launch, then the target itself
async fn check_environment(config: &SuiteConfig, launcher: &PlaywrightLauncher) -> E2eResult<()> {
    check_playwright_installed().await?;
    launcher.launch().await?.close().await?;
    wait_for_reachable(&config.site.base_url, Duration::from_secs(10)).await
}
