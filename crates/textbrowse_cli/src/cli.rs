use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use log::LevelFilter;
use textbrowse_engine::{FetchSettings, DEFAULT_USER_AGENT};

/// Page shown when no URL is given on the command line.
pub const DEFAULT_FILE: &str = "index.html";

/// Fetch a URL and print it as plain text.
#[derive(Debug, Parser)]
#[command(name = "textbrowse", version)]
#[command(about = "Fetch a URL and print its text with markup stripped", long_about = None)]
pub struct Cli {
    /// URL to load: http://, https://, file://, data: or view-source:
    pub url: Option<String>,

    /// Local page loaded when no URL is given.
    #[arg(long, default_value = DEFAULT_FILE)]
    pub default_file: PathBuf,

    /// Seconds to wait for the TCP connection; 0 leaves it to the OS.
    #[arg(long, default_value_t = 10)]
    pub connect_timeout: u64,

    /// Seconds to wait for response data; 0 waits forever.
    #[arg(long, default_value_t = 30)]
    pub read_timeout: u64,

    /// Log level written to stderr (off, error, warn, info, debug, trace).
    #[arg(long, default_value = "warn", value_parser = parse_level)]
    pub log_level: LevelFilter,

    /// Also write logs to this file.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn target_url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!("file://{}", self.default_file.display()),
        }
    }

    pub fn settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout),
            read_timeout: (self.read_timeout > 0).then(|| Duration::from_secs(self.read_timeout)),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

fn parse_level(raw: &str) -> Result<LevelFilter, String> {
    raw.parse()
        .map_err(|_| format!("unknown log level {raw:?}"))
}
