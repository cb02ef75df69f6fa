//! Suite configuration
//!
//! Defaults reproduce the fixed smoke flow: the public demo shop, its
//! standard user and the pacing the flow was written with. A TOML file and a
//! handful of `SWAGLABS_*` environment variables can override them.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{E2eError, E2eResult};
use crate::playwright::{Browser, PlaywrightConfig};

pub const DEFAULT_BASE_URL: &str = "https://www.saucedemo.com/";
pub const DEFAULT_TITLE: &str = "Swag Labs";
pub const DEFAULT_USERNAME: &str = "standard_user";
pub const DEFAULT_PASSWORD: &str = "secret_sauce";

/// Complete suite configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Site under test and the credentials used against it
    pub site: SiteConfig,

    /// Fixed delays between interactions
    pub pacing: PacingConfig,

    /// Browser launch options
    pub browser: BrowserConfig,

    /// Auto-retrying assertion options
    pub assertions: AssertionConfig,

    /// Result and artifact output
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: String,
    pub expected_title: String,
    pub username: String,
    pub password: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            expected_title: DEFAULT_TITLE.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Pause after the title check
    pub title_settle_ms: u64,

    /// Pause after each login form interaction
    pub step_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            title_settle_ms: 1000,
            step_delay_ms: 2000,
        }
    }
}

impl PacingConfig {
    /// Pacing with every delay removed
    pub fn none() -> Self {
        Self {
            title_settle_ms: 0,
            step_delay_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub engine: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub navigation_timeout_ms: u64,
    pub action_timeout_ms: u64,

    /// Directory Node resolves the `playwright` package from
    pub workdir: PathBuf,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            engine: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            navigation_timeout_ms: 30_000,
            action_timeout_ms: 30_000,
            workdir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssertionConfig {
    pub timeout_ms: u64,
}

impl Default for AssertionConfig {
    fn default() -> Self {
        Self { timeout_ms: 5000 }
    }
}

impl AssertionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub screenshot_on_failure: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("test-results"),
            screenshot_on_failure: true,
        }
    }
}

impl OutputConfig {
    pub fn screenshot_dir(&self) -> PathBuf {
        self.dir.join("screenshots")
    }

    pub fn results_path(&self) -> PathBuf {
        self.dir.join("test-results.json")
    }
}

impl SuiteConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> E2eResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file, falling back to defaults when it is absent
    pub fn load(path: &Path) -> E2eResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply `SWAGLABS_*` overrides from the process environment
    pub fn apply_env(&mut self) -> E2eResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> E2eResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SWAGLABS_BASE_URL") {
            self.site.base_url = url;
        }
        if let Some(username) = lookup("SWAGLABS_USERNAME") {
            self.site.username = username;
        }
        if let Some(password) = lookup("SWAGLABS_PASSWORD") {
            self.site.password = password;
        }
        if let Some(headless) = lookup("SWAGLABS_HEADLESS") {
            self.browser.headless = parse_bool(&headless).ok_or_else(|| {
                E2eError::Config(format!("SWAGLABS_HEADLESS must be a boolean, got '{}'", headless))
            })?;
        }
        self.validate()
    }

    pub fn validate(&self) -> E2eResult<()> {
        if self.site.base_url.trim().is_empty() {
            return Err(E2eError::Config("site.base_url must not be empty".to_string()));
        }
        if !self.site.base_url.starts_with("http://") && !self.site.base_url.starts_with("https://") {
            return Err(E2eError::Config(format!(
                "site.base_url must be an http(s) URL, got '{}'",
                self.site.base_url
            )));
        }
        if self.assertions.timeout_ms == 0 {
            return Err(E2eError::Config("assertions.timeout_ms must be greater than zero".to_string()));
        }
        Ok(())
    }

    /// Launch options for the Playwright bridge
    pub fn playwright(&self) -> PlaywrightConfig {
        PlaywrightConfig {
            browser: self.browser.engine,
            headless: self.browser.headless,
            viewport_width: self.browser.viewport_width,
            viewport_height: self.browser.viewport_height,
            navigation_timeout_ms: self.browser.navigation_timeout_ms,
            action_timeout_ms: self.browser.action_timeout_ms,
            workdir: self.browser.workdir.clone(),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
