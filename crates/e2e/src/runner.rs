//! Main test runner: one fresh page per case, steps in order, stop at the first failure

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::SuiteConfig;
use crate::error::{E2eError, E2eResult};
use crate::page::{Launcher, Page};
use crate::pages::HomePage;
use crate::spec::{StepContext, TestSpec};

pub const DEFAULT_SUITE_NAME: &str = "Suite 1: purchase page validation";
pub const LOGIN_FLOW_NAME: &str = "login and inventory checks";

/// Result of executing a test step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub success: bool,
    pub step_name: String,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Result of running a single test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub steps: Vec<StepResult>,
    pub screenshot_path: Option<PathBuf>,
    pub error: Option<String>,
}

/// Result of running all tests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub suite: String,
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

impl TestSuiteResult {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// A runnable test case
#[derive(Debug, Clone)]
pub enum TestCase {
    /// open → validate title → login → inventory visible
    LoginFlow,
    /// A declarative scenario
    Spec(TestSpec),
}

impl TestCase {
    pub fn name(&self) -> &str {
        match self {
            TestCase::LoginFlow => LOGIN_FLOW_NAME,
            TestCase::Spec(spec) => &spec.name,
        }
    }

    fn has_tag(&self, tag: &str) -> bool {
        match self {
            TestCase::LoginFlow => tag == "smoke",
            TestCase::Spec(spec) => spec.has_tag(tag),
        }
    }
}

/// Records each step's outcome as it runs
#[derive(Debug, Default)]
pub struct StepRecorder {
    steps: Vec<StepResult>,
}

impl StepRecorder {
    /// Await one step and record how it went
    pub async fn record<F, T>(&mut self, name: &str, step: F) -> E2eResult<T>
    where
        F: Future<Output = E2eResult<T>>,
    {
        let start = Instant::now();
        info!("→ {}", name);
        let result = step.await;
        let duration_ms = start.elapsed().as_millis() as u64;

        self.steps.push(StepResult {
            success: result.is_ok(),
            step_name: name.to_string(),
            duration_ms,
            error: result.as_ref().err().map(|e| e.to_string()),
        });

        result.map_err(|e| E2eError::StepFailed {
            step: name.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn into_steps(self) -> Vec<StepResult> {
        self.steps
    }
}

/// Run the login flow against `page`, step by step
pub async fn run_login_flow<P>(
    page: &mut P,
    config: &SuiteConfig,
    recorder: &mut StepRecorder,
) -> E2eResult<()>
where
    P: Page + ?Sized,
{
    let mut home = HomePage::with_config(
        page,
        config.site.clone(),
        config.pacing.clone(),
        config.assertions.timeout(),
    );

    recorder.record("open", home.open()).await?;
    recorder.record("validate_title", home.validate_title()).await?;
    recorder.record("login", home.login()).await?;
    recorder.record("page_inventory", home.page_inventory()).await?;
    Ok(())
}

/// Run every step of a scenario against `page`
pub async fn run_spec_steps<P>(
    page: &mut P,
    spec: &TestSpec,
    config: &SuiteConfig,
    recorder: &mut StepRecorder,
) -> E2eResult<()>
where
    P: Page + ?Sized,
{
    let screenshot_dir = config.output.screenshot_dir();
    let ctx = StepContext {
        base_url: &config.site.base_url,
        expect_timeout: config.assertions.timeout(),
        screenshot_dir: &screenshot_dir,
    };

    for step in &spec.steps {
        recorder.record(&step.name(), step.execute(&mut *page, &ctx)).await?;
    }
    Ok(())
}

/// Main E2E test runner
pub struct TestRunner<L: Launcher> {
    config: SuiteConfig,
    launcher: L,
    suite_name: String,
}

impl<L: Launcher> TestRunner<L> {
    pub fn new(config: SuiteConfig, launcher: L) -> Self {
        Self {
            config,
            launcher,
            suite_name: DEFAULT_SUITE_NAME.to_string(),
        }
    }

    /// The built-in flow, followed by every scenario in `specs_dir` when one is given
    pub fn collect_cases(&self, specs_dir: Option<&Path>) -> E2eResult<Vec<TestCase>> {
        let mut cases = vec![TestCase::LoginFlow];
        if let Some(dir) = specs_dir {
            if dir.is_dir() {
                cases.extend(TestSpec::load_all(dir)?.into_iter().map(TestCase::Spec));
            } else {
                warn!("Specs directory {} not found, running built-in flow only", dir.display());
            }
        }
        Ok(cases)
    }

    /// Keep cases matching an optional name and an optional tag
    pub fn select(cases: Vec<TestCase>, name: Option<&str>, tag: Option<&str>) -> Vec<TestCase> {
        cases
            .into_iter()
            .filter(|c| name.map_or(true, |n| c.name() == n))
            .filter(|c| tag.map_or(true, |t| c.has_tag(t)))
            .collect()
    }

    /// Run cases one after another
    pub async fn run_cases(&self, cases: &[TestCase]) -> TestSuiteResult {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut results = Vec::with_capacity(cases.len());

        info!("{}: running {} test(s)...", self.suite_name, cases.len());

        for case in cases {
            let result = self.run_case(case).await;
            if result.success {
                info!("✓ {} ({} ms)", result.name, result.duration_ms);
            } else {
                error!(
                    "✗ {} - {}",
                    result.name,
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
            results.push(result);
        }

        let passed = results.iter().filter(|r| r.success).count();
        let failed = results.len() - passed;
        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Test Results: {} passed, {} failed ({} ms)",
            passed, failed, duration_ms
        );

        TestSuiteResult {
            suite: self.suite_name.clone(),
            started_at,
            total: results.len(),
            passed,
            failed,
            duration_ms,
            results,
        }
    }

    /// Run one case on a fresh page. The page is always closed afterwards.
    pub async fn run_case(&self, case: &TestCase) -> TestResult {
        let start = Instant::now();
        let name = case.name().to_string();
        debug!("Running test: {}", name);

        let mut page = match self.launcher.launch().await {
            Ok(page) => page,
            Err(e) => {
                return TestResult {
                    name,
                    success: false,
                    duration_ms: start.elapsed().as_millis() as u64,
                    steps: vec![],
                    screenshot_path: None,
                    error: Some(e.to_string()),
                };
            }
        };

        let mut recorder = StepRecorder::default();
        let outcome = match case {
            TestCase::LoginFlow => run_login_flow(&mut page, &self.config, &mut recorder).await,
            TestCase::Spec(spec) => run_spec_steps(&mut page, spec, &self.config, &mut recorder).await,
        };

        let screenshot_path = match &outcome {
            Err(_) if self.config.output.screenshot_on_failure => {
                self.capture_failure(&mut page, &name).await
            }
            _ => None,
        };

        if let Err(e) = page.close().await {
            warn!("Failed to close page for '{}': {}", name, e);
        }

        TestResult {
            name,
            success: outcome.is_ok(),
            duration_ms: start.elapsed().as_millis() as u64,
            steps: recorder.into_steps(),
            screenshot_path,
            error: outcome.err().map(|e| e.to_string()),
        }
    }

    async fn capture_failure(&self, page: &mut L::Page, name: &str) -> Option<PathBuf> {
        let path = self
            .config
            .output
            .screenshot_dir()
            .join(format!("{}.png", file_stem(name)));

        match page.screenshot(&path).await {
            Ok(()) => {
                info!("Failure screenshot: {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("Could not capture failure screenshot for '{}': {}", name, e);
                None
            }
        }
    }

    /// Write test results to JSON file
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output.dir)?;

        let path = self.config.output.results_path();
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

/// Filesystem-safe version of a test name
fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect()
}
