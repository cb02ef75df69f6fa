//! Command line of the live harness binary
//!
//! `cargo test` hands libtest's own flags to every test binary in the
//! package, including `harness = false` ones. They are stripped here before
//! clap sees the rest.

use clap::builder::BoolishValueParser;
use clap::Parser;
use std::path::PathBuf;

/// libtest flags that take no value
const LIBTEST_SWITCHES: &[&str] = &[
    "--nocapture",
    "--quiet",
    "-q",
    "--show-output",
    "--include-ignored",
    "--ignored",
    "--exact",
    "--bench",
    "--test",
    "--force-run-in-process",
    "--report-time",
    "--ensure-time",
    "--shuffle",
];

/// libtest flags that take a value, either `--flag value` or `--flag=value`
const LIBTEST_OPTIONS: &[&str] = &[
    "--skip",
    "--test-threads",
    "--format",
    "--color",
    "--logfile",
    "--shuffle-seed",
    "-Z",
];

#[derive(Parser, Debug)]
#[command(name = "swaglabs-e2e")]
#[command(about = "Login smoke test for the Swag Labs demo shop")]
pub struct HarnessArgs {
    /// Path to a TOML configuration file
    #[arg(short, long, default_value = "swaglabs-e2e.toml")]
    pub config: PathBuf,

    /// Directory of YAML scenarios to run after the built-in flow
    #[arg(short, long)]
    pub specs: Option<PathBuf>,

    /// Run only tests matching this tag
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Run only a specific test by name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Browser engine (chromium, firefox, webkit)
    #[arg(short, long)]
    pub browser: Option<String>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Output directory for results
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Fail instead of skipping when Playwright or the site is unavailable
    #[arg(long, env = "SWAGLABS_E2E_STRICT", value_parser = BoolishValueParser::new())]
    pub strict: bool,

    /// Test name filter as passed by `cargo test <filter>`
    #[arg(hide = true)]
    pub filter: Option<String>,
}

impl HarnessArgs {
    /// Parse the process arguments, ignoring whatever libtest added
    pub fn from_env() -> Self {
        Self::parse_from(strip_libtest_args(std::env::args()))
    }
}

/// Whether `cargo test --list` is asking for the test names
pub fn is_list_request<I, S>(args: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter().any(|a| a.as_ref() == "--list")
}

/// Drop libtest flags, along with the value that follows a value-taking one
pub fn strip_libtest_args<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut kept = Vec::new();
    let mut args = args.into_iter().map(Into::into);

    while let Some(arg) = args.next() {
        if LIBTEST_SWITCHES.contains(&arg.as_str()) {
            continue;
        }
        if LIBTEST_OPTIONS.contains(&arg.as_str()) {
            args.next();
            continue;
        }
        let joined = LIBTEST_OPTIONS.iter().any(|opt| {
            arg.strip_prefix(*opt)
                .is_some_and(|rest| rest.starts_with('=') || (*opt == "-Z" && !rest.is_empty()))
        });
        if !joined {
            kept.push(arg);
        }
    }
    kept
}
