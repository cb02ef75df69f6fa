//! Scripted stand-in for a browser page

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use swaglabs_e2e::{E2eError, E2eResult, Launcher, Locator, Page};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Goto(String),
    Title,
    Fill(String, String),
    Click(String),
    Visible(String),
    Wait(u64),
    Screenshot(PathBuf),
    Close,
}

/// How the fake site behaves
#[derive(Debug, Clone)]
pub struct Behavior {
    pub title: String,
    /// Selector that becomes visible once the login button is clicked
    pub revealed_by_login: String,
    pub login_button: String,
    /// Visibility never turns on, as with rejected credentials
    pub login_rejected: bool,
    pub goto_error: Option<String>,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            title: "Swag Labs".to_string(),
            revealed_by_login: ".inventory_list".to_string(),
            login_button: "#login-button".to_string(),
            login_rejected: false,
            goto_error: None,
        }
    }
}

pub struct FakePage {
    behavior: Behavior,
    calls: Arc<Mutex<Vec<Call>>>,
    logged_in: bool,
}

impl FakePage {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(Mutex::new(Vec::new())),
            logged_in: false,
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Page for FakePage {
    async fn goto(&mut self, url: &str) -> E2eResult<()> {
        self.push(Call::Goto(url.to_string()));
        match &self.behavior.goto_error {
            Some(msg) => Err(E2eError::Playwright(msg.clone())),
            None => Ok(()),
        }
    }

    async fn title(&mut self) -> E2eResult<String> {
        self.push(Call::Title);
        Ok(self.behavior.title.clone())
    }

    async fn fill(&mut self, locator: &Locator, value: &str) -> E2eResult<()> {
        self.push(Call::Fill(locator.selector().to_string(), value.to_string()));
        Ok(())
    }

    async fn click(&mut self, locator: &Locator) -> E2eResult<()> {
        self.push(Call::Click(locator.selector().to_string()));
        if locator.selector() == self.behavior.login_button && !self.behavior.login_rejected {
            self.logged_in = true;
        }
        Ok(())
    }

    async fn is_visible(&mut self, locator: &Locator) -> E2eResult<bool> {
        self.push(Call::Visible(locator.selector().to_string()));
        Ok(self.logged_in && locator.selector() == self.behavior.revealed_by_login)
    }

    async fn screenshot(&mut self, path: &Path) -> E2eResult<()> {
        self.push(Call::Screenshot(path.to_path_buf()));
        Ok(())
    }

    async fn wait_for_timeout(&mut self, ms: u64) -> E2eResult<()> {
        self.push(Call::Wait(ms));
        tokio::time::sleep(Duration::from_millis(ms)).await;
        Ok(())
    }

    async fn close(&mut self) -> E2eResult<()> {
        self.push(Call::Close);
        Ok(())
    }
}

/// Hands out fake pages that all log into one shared call list
#[derive(Clone, Default)]
pub struct FakeLauncher {
    pub behavior: Behavior,
    pub fail_launch: bool,
    calls: Arc<Mutex<Vec<Call>>>,
    launches: Arc<AtomicUsize>,
}

impl FakeLauncher {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            ..Default::default()
        }
    }

    /// Every launch fails as if Playwright were missing
    pub fn failing() -> Self {
        Self {
            fail_launch: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Launcher for FakeLauncher {
    type Page = FakePage;

    async fn launch(&self) -> E2eResult<FakePage> {
        if self.fail_launch {
            return Err(E2eError::PlaywrightNotFound);
        }
        self.launches.fetch_add(1, Ordering::SeqCst);
        Ok(FakePage {
            behavior: self.behavior.clone(),
            calls: Arc::clone(&self.calls),
            logged_in: false,
        })
    }
}

/// Drop repeated polls so call lists read as the flow's steps
pub fn without_repeat_polls(calls: &[Call]) -> Vec<Call> {
    let mut out: Vec<Call> = Vec::new();
    for call in calls {
        let is_poll = matches!(call, Call::Title | Call::Visible(_));
        if is_poll && out.last() == Some(call) {
            continue;
        }
        out.push(call.clone());
    }
    out
}
