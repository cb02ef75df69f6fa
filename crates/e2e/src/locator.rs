//! Element locators
//!
//! A locator is only a selector string. It is handed to the browser on every
//! interaction and resolved against whatever the DOM looks like at that moment.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator(String);

impl Locator {
    /// Any Playwright selector, passed through untouched
    pub fn new(selector: impl Into<String>) -> Self {
        Self(selector.into())
    }

    /// `#id`
    pub fn id(id: &str) -> Self {
        Self(format!("#{}", id))
    }

    /// `.class`
    pub fn class(class: &str) -> Self {
        Self(format!(".{}", class))
    }

    /// `[data-test="value"]`
    pub fn data_test(value: &str) -> Self {
        Self(format!("[data-test=\"{}\"]", value))
    }

    pub fn selector(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
