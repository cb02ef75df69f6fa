//! Swag Labs E2E Smoke Suite
//!
//! A Rust-controlled browser test for the Swag Labs demo shop that:
//! - Drives Playwright through a line-oriented JSON bridge running under Node
//! - Opens the shop, checks the title, logs in and waits for the inventory
//! - Runs extra declarative YAML scenarios against the same page API
//! - Writes a JSON report and failure screenshots
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    E2E Test Runner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner<L: Launcher>                                    │
//! │    ├── launch() -> Page (one per case)                      │
//! │    ├── run_login_flow(page)                                 │
//! │    │     open → validate_title → login → page_inventory     │
//! │    ├── run_spec_steps(page, spec)                           │
//! │    └── write_results(suite) -> test-results.json            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Page (trait)                                               │
//! │    └── PlaywrightSession ── stdin/stdout JSON ── node       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod expect;
pub mod harness;
pub mod locator;
pub mod page;
pub mod pages;
pub mod playwright;
pub mod probe;
pub mod runner;
pub mod spec;

pub use config::SuiteConfig;
pub use error::{E2eError, E2eResult};
pub use locator::Locator;
pub use page::{Launcher, Page};
pub use pages::HomePage;
pub use runner::TestRunner;
pub use spec::{TestSpec, TestStep};
