#![deny(missing_docs)]
//! Logging macros shared by the textbrowse crates.
//!
//! The engine never writes diagnostics to stdout, because stdout carries the
//! page text. Every macro here goes through the `log` facade; the binary picks
//! the backend.

/// Logs a trace-level message, e.g. individual response header fields.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        log::trace!(target: "textbrowse", $($arg)*);
    }};
}

/// Logs a debug-level message.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        log::debug!(target: "textbrowse", $($arg)*);
    }};
}

/// Logs an info-level message: one line per load and per connection.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        log::info!(target: "textbrowse", $($arg)*);
    }};
}

/// Logs a warn-level message for recoverable oddities and failed fetches.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        log::warn!(target: "textbrowse", $($arg)*);
    }};
}

/// Logs an error-level message.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        log::error!(target: "textbrowse", $($arg)*);
    }};
}

/// Initializes a stderr logger for tests.
///
/// Safe to call from every test: it no-ops once a logger is installed.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let _ = TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Never);
}
