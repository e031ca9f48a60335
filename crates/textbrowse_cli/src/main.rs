mod cli;
mod logging;

use std::io;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use engine_logging::engine_error;
use textbrowse_engine::Browser;

use crate::cli::Cli;
use crate::logging::LogDestination;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let destination = match cli.log_file.as_deref() {
        Some(path) => LogDestination::Both(path),
        None => LogDestination::Terminal,
    };
    logging::initialize(destination, cli.log_level);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            engine_error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let url = cli.target_url();
    let browser = Browser::new(cli.settings());
    let mut stdout = io::stdout().lock();
    browser
        .load(&url, &mut stdout)
        .with_context(|| format!("cannot load {url}"))
}
