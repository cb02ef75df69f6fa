//! Error types for the smoke suite

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("Browser unavailable: {0} (is `npx playwright install` done and browser.workdir set?)")]
    BrowserUnavailable(String),

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Bridge protocol error: {0}")]
    Bridge(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Test spec parse error: {0}")]
    SpecParse(String),

    #[error("Step failed: {step} - {reason}")]
    StepFailed { step: String, reason: String },

    #[error("Assertion failed: expected {expected}, last observed {actual} (after {waited_ms} ms)")]
    AssertionFailed {
        expected: String,
        actual: String,
        waited_ms: u64,
    },

    #[error("Target {url} unreachable after {attempts} attempts")]
    Unreachable { url: String, attempts: usize },

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl E2eError {
    /// Whether this error means the environment cannot run browser tests at all,
    /// as opposed to a test that ran and failed.
    pub fn is_environmental(&self) -> bool {
        matches!(
            self,
            E2eError::PlaywrightNotFound | E2eError::BrowserUnavailable(_) | E2eError::Unreachable { .. }
        )
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
