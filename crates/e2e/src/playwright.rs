//! Playwright browser automation
//!
//! Playwright runs under Node. Each session is one `node` process running a
//! small bridge script that owns a single page; requests and replies cross
//! stdin/stdout as one JSON object per line. The Rust side waits for every
//! reply before sending the next request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::str::FromStr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;
use crate::page::{Launcher, Page};

const BRIDGE_SCRIPT: &str = include_str!("bridge.js");

/// Browser start-up can be slow on a cold cache
const LAUNCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Slack on top of Playwright's own timeout before the bridge is declared hung
const REPLY_GRACE: Duration = Duration::from_secs(5);

const EXIT_TIMEOUT: Duration = Duration::from_secs(5);

const INSTALL_CHECK_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl FromStr for Browser {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" => Ok(Browser::Webkit),
            other => Err(E2eError::Config(format!("unknown browser '{}'", other))),
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone, Serialize)]
pub struct PlaywrightConfig {
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub navigation_timeout_ms: u64,
    pub action_timeout_ms: u64,
    #[serde(skip)]
    pub workdir: PathBuf,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            navigation_timeout_ms: 30_000,
            action_timeout_ms: 30_000,
            workdir: PathBuf::from("."),
        }
    }
}

impl PlaywrightConfig {
    /// How long to wait for any single bridge reply
    fn reply_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms.max(self.action_timeout_ms)) + REPLY_GRACE
    }
}

/// Check if Playwright is installed
pub async fn check_playwright_installed() -> E2eResult<()> {
    // --no-install keeps npx from fetching the package over the network
    let mut cmd = Command::new("npx");
    cmd.args(["--no-install", "playwright", "--version"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    match timeout(INSTALL_CHECK_TIMEOUT, cmd.status()).await {
        Ok(Ok(status)) if status.success() => Ok(()),
        _ => Err(E2eError::PlaywrightNotFound),
    }
}

/// A request to the bridge
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Op {
    Goto { url: String },
    Title,
    Fill { selector: String, value: String },
    Click { selector: String },
    Visible { selector: String },
    Screenshot { path: String },
    Close,
}

impl Op {
    /// Loggable description; never includes filled values
    fn describe(&self) -> String {
        match self {
            Op::Goto { url } => format!("goto {}", url),
            Op::Title => "title".to_string(),
            Op::Fill { selector, .. } => format!("fill {}", selector),
            Op::Click { selector } => format!("click {}", selector),
            Op::Visible { selector } => format!("visible {}", selector),
            Op::Screenshot { path } => format!("screenshot {}", path),
            Op::Close => "close".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Reply {
    id: i64,
    ok: bool,
    #[serde(default)]
    value: serde_json::Value,
    #[serde(default)]
    error: Option<String>,
}

fn encode_request(id: u64, op: &Op) -> E2eResult<String> {
    let mut value = serde_json::to_value(op)?;
    if let Some(obj) = value.as_object_mut() {
        obj.insert("id".to_string(), id.into());
    }
    Ok(serde_json::to_string(&value)?)
}

fn check_reply(reply: Reply, id: u64, op: &Op) -> E2eResult<serde_json::Value> {
    if reply.id != id as i64 {
        return Err(E2eError::Bridge(format!(
            "reply id {} does not match request id {} ({})",
            reply.id,
            id,
            op.describe()
        )));
    }
    if !reply.ok {
        return Err(E2eError::Playwright(
            reply.error.unwrap_or_else(|| format!("{} failed", op.describe())),
        ));
    }
    Ok(reply.value)
}

/// A bridge that exits or reports an error before `ready` could not load
/// Playwright or start the browser; its stderr has already been logged.
fn check_ready(ready: E2eResult<Reply>) -> E2eResult<()> {
    match ready {
        Ok(reply) if reply.id != 0 => Err(E2eError::Bridge(format!(
            "expected ready reply, got id {}",
            reply.id
        ))),
        Ok(reply) if reply.ok => Ok(()),
        Ok(reply) => Err(E2eError::BrowserUnavailable(
            reply.error.unwrap_or_else(|| "bridge failed to start".to_string()),
        )),
        Err(E2eError::Bridge(reason)) => Err(E2eError::BrowserUnavailable(reason)),
        Err(e) => Err(e),
    }
}

/// Playwright browser handle
pub struct PlaywrightSession {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    next_id: u64,
    reply_timeout: Duration,
    closed: bool,
}

impl PlaywrightSession {
    /// Launch a browser and open one page
    pub async fn launch(config: &PlaywrightConfig) -> E2eResult<Self> {
        check_playwright_installed().await?;

        info!(
            "Launching {} ({})",
            config.browser.as_str(),
            if config.headless { "headless" } else { "headed" }
        );

        let options = serde_json::to_string(config)?;
        let mut child = Command::new("node")
            .arg("-e")
            .arg(BRIDGE_SCRIPT)
            .env("SWAGLABS_BRIDGE_OPTIONS", options)
            .current_dir(&config.workdir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| E2eError::Playwright(format!("Failed to spawn node: {}", e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::Bridge("bridge stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::Bridge("bridge stdout unavailable".to_string()))?;

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    warn!("[bridge] {}", line);
                }
            });
        }

        let mut session = Self {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            next_id: 1,
            reply_timeout: config.reply_timeout(),
            closed: false,
        };

        let ready = timeout(LAUNCH_TIMEOUT, session.read_reply())
            .await
            .map_err(|_| E2eError::Timeout("browser launch".to_string()))?;
        check_ready(ready)?;

        debug!("Bridge ready (pid: {:?})", session.child.id());
        Ok(session)
    }

    async fn read_reply(&mut self) -> E2eResult<Reply> {
        loop {
            let line = self
                .stdout
                .next_line()
                .await?
                .ok_or_else(|| E2eError::Bridge("bridge exited".to_string()))?;

            match serde_json::from_str::<Reply>(&line) {
                Ok(reply) => return Ok(reply),
                // Stray output from Node or Playwright itself
                Err(_) => debug!("[bridge stdout] {}", line),
            }
        }
    }

    async fn request(&mut self, op: Op) -> E2eResult<serde_json::Value> {
        if self.closed {
            return Err(E2eError::Bridge("page already closed".to_string()));
        }

        let id = self.next_id;
        self.next_id += 1;

        debug!(">> #{} {}", id, op.describe());
        let mut line = encode_request(id, &op)?;
        line.push('\n');
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;

        let reply = timeout(self.reply_timeout, self.read_reply())
            .await
            .map_err(|_| E2eError::Timeout(format!("bridge reply to {}", op.describe())))??;

        debug!("<< #{} ok={}", reply.id, reply.ok);
        check_reply(reply, id, &op)
    }

    /// SIGTERM, then kill if the bridge is still around after a grace period
    async fn terminate(&mut self) {
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            if let Some(pid) = self.child.id() {
                if kill(Pid::from_raw(pid as i32), Signal::SIGTERM).is_ok()
                    && timeout(EXIT_TIMEOUT, self.child.wait()).await.is_ok()
                {
                    return;
                }
            }
        }

        let _ = self.child.start_kill();
        let _ = self.child.wait().await;
    }
}

#[async_trait]
impl Page for PlaywrightSession {
    async fn goto(&mut self, url: &str) -> E2eResult<()> {
        self.request(Op::Goto { url: url.to_string() }).await?;
        Ok(())
    }

    async fn title(&mut self) -> E2eResult<String> {
        match self.request(Op::Title).await? {
            serde_json::Value::String(title) => Ok(title),
            other => Err(E2eError::Bridge(format!("title reply was not a string: {}", other))),
        }
    }

    async fn fill(&mut self, locator: &Locator, value: &str) -> E2eResult<()> {
        self.request(Op::Fill {
            selector: locator.selector().to_string(),
            value: value.to_string(),
        })
        .await?;
        Ok(())
    }

    async fn click(&mut self, locator: &Locator) -> E2eResult<()> {
        self.request(Op::Click { selector: locator.selector().to_string() })
            .await?;
        Ok(())
    }

    async fn is_visible(&mut self, locator: &Locator) -> E2eResult<bool> {
        match self
            .request(Op::Visible { selector: locator.selector().to_string() })
            .await?
        {
            serde_json::Value::Bool(visible) => Ok(visible),
            other => Err(E2eError::Bridge(format!("visible reply was not a bool: {}", other))),
        }
    }

    async fn screenshot(&mut self, path: &Path) -> E2eResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // The bridge runs in the configured workdir; hand it an absolute path.
        let path = std::path::absolute(path)?;
        self.request(Op::Screenshot { path: path.to_string_lossy().to_string() })
            .await?;
        Ok(())
    }

    async fn close(&mut self) -> E2eResult<()> {
        if self.closed {
            return Ok(());
        }
        if let Err(e) = self.request(Op::Close).await {
            warn!("Bridge did not acknowledge close: {}", e);
        }
        self.closed = true;

        match timeout(EXIT_TIMEOUT, self.child.wait()).await {
            Ok(Ok(status)) => debug!("Bridge exited with {}", status),
            Ok(Err(e)) => warn!("Failed to reap bridge: {}", e),
            Err(_) => {
                warn!("Bridge still running after close, terminating");
                self.terminate().await;
            }
        }
        Ok(())
    }
}

impl Drop for PlaywrightSession {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.child.start_kill();
        }
    }
}

/// Launches one Playwright page per test case
#[derive(Debug, Clone, Default)]
pub struct PlaywrightLauncher {
    config: PlaywrightConfig,
}

impl PlaywrightLauncher {
    pub fn new(config: PlaywrightConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Launcher for PlaywrightLauncher {
    type Page = PlaywrightSession;

    async fn launch(&self) -> E2eResult<PlaywrightSession> {
        PlaywrightSession::launch(&self.config).await
    }
}
