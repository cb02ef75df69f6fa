//! Declarative YAML scenarios

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::error::{E2eError, E2eResult};
use crate::expect::{expect_title, expect_visible};
use crate::locator::Locator;
use crate::page::Page;

/// A complete scenario parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSpec {
    /// Unique name for this test
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering tests
    #[serde(default)]
    pub tags: Vec<String>,

    /// Steps to execute in order
    pub steps: Vec<TestStep>,
}

/// A single step in a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TestStep {
    /// Navigate to a URL (absolute, or relative to the base URL)
    Navigate { url: String },

    /// Fill an input field
    Fill { selector: String, value: String },

    /// Click an element
    Click { selector: String },

    /// Wait for a fixed amount of time
    Sleep { ms: u64 },

    /// Document title must equal `title`
    AssertTitle {
        title: String,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// Element must become visible
    AssertVisible {
        selector: String,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// Take a full-page screenshot
    Screenshot { name: String },

    /// Log a message
    Log { message: String },
}

/// What a step needs from its surroundings
#[derive(Debug, Clone)]
pub struct StepContext<'a> {
    pub base_url: &'a str,
    pub expect_timeout: Duration,
    pub screenshot_dir: &'a Path,
}

impl TestStep {
    /// Short name used in results and logs
    pub fn name(&self) -> String {
        match self {
            TestStep::Navigate { url } => format!("navigate:{}", url),
            TestStep::Fill { selector, .. } => format!("fill:{}", selector),
            TestStep::Click { selector } => format!("click:{}", selector),
            TestStep::Sleep { ms } => format!("sleep:{}ms", ms),
            TestStep::AssertTitle { title, .. } => format!("assert_title:{}", title),
            TestStep::AssertVisible { selector, .. } => format!("assert_visible:{}", selector),
            TestStep::Screenshot { name } => format!("screenshot:{}", name),
            TestStep::Log { message } => {
                format!("log:{}", message.chars().take(30).collect::<String>())
            }
        }
    }

    /// Run this step against a page
    pub async fn execute<P>(&self, page: &mut P, ctx: &StepContext<'_>) -> E2eResult<()>
    where
        P: Page + ?Sized,
    {
        let timeout = |ms: &Option<u64>| ms.map(Duration::from_millis).unwrap_or(ctx.expect_timeout);

        match self {
            TestStep::Navigate { url } => page.goto(&resolve_url(ctx.base_url, url)).await,
            TestStep::Fill { selector, value } => page.fill(&Locator::new(selector.as_str()), value).await,
            TestStep::Click { selector } => page.click(&Locator::new(selector.as_str())).await,
            TestStep::Sleep { ms } => page.wait_for_timeout(*ms).await,
            TestStep::AssertTitle { title, timeout_ms } => {
                expect_title(page, title, timeout(timeout_ms)).await
            }
            TestStep::AssertVisible { selector, timeout_ms } => {
                expect_visible(page, &Locator::new(selector.as_str()), timeout(timeout_ms)).await
            }
            TestStep::Screenshot { name } => {
                page.screenshot(&ctx.screenshot_dir.join(format!("{}.png", name)))
                    .await
            }
            TestStep::Log { message } => {
                info!("[TEST LOG] {}", message);
                Ok(())
            }
        }
    }
}

/// Join a step URL onto the base URL unless it is already absolute
pub fn resolve_url(base_url: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        url.trim_start_matches('/')
    )
}

impl TestSpec {
    /// Parse a test spec from YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let spec: Self = serde_yaml::from_str(yaml)?;
        if spec.name.trim().is_empty() {
            return Err(E2eError::SpecParse("spec name must not be empty".to_string()));
        }
        if spec.steps.is_empty() {
            return Err(E2eError::SpecParse(format!("spec '{}' has no steps", spec.name)));
        }
        Ok(spec)
    }

    /// Parse a test spec from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| E2eError::SpecParse(format!("{}: {}", path.display(), e)))
    }

    /// Load all test specs from a directory, in path order
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut specs = Vec::new();

        for entry in walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
        {
            specs.push(Self::from_file(entry.path())?);
        }

        Ok(specs)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
