//! afetch - browse GitHub releases and download their assets.
//!
//! Starts at the release list, or directly at the asset list when a release
//! tag or asset mask narrows the listing.

mod error;
mod startup;
mod tui_app;
mod ui;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use afetch::download::TransferEngine;
use afetch::logging::{init_logging, LoggingConfig};

use error::CliError;
use tui_app::TuiAppConfig;

#[derive(Parser, Debug)]
#[command(name = "afetch")]
#[command(version = afetch::VERSION)]
#[command(about = "Browse GitHub releases and download their assets", long_about = None)]
struct Cli {
    /// GitHub URL: https://github.com/<owner>/<repo>[/releases[/tag/<tag>]]
    url: Option<String>,

    /// Only list assets whose name matches (one `*` wildcard)
    #[arg(short, long)]
    mask: Option<String>,

    /// Configuration file (default: next to the executable, then the user config dir)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory downloaded files are written to
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Download every listed asset without the interactive UI
    #[arg(short, long)]
    yes: bool,

    /// Timeout for GitHub API requests, in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory for afetch.log
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    // Logging is best effort; a read-only cache dir must not stop downloads
    let _log_guard = match init_logging(LoggingConfig {
        log_dir: cli.log_dir.clone(),
        verbose: cli.verbose,
    }) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: {}", e);
            None
        }
    };
    tracing::info!(version = afetch::VERSION, "afetch starting");

    let config = startup::load_config(cli.config.as_deref(), cli.url.is_some())?;
    let target = startup::resolve_target(cli.url.as_deref(), cli.mask.as_deref(), &config)?;
    tracing::info!(
        owner = %target.owner,
        repo = %target.repo,
        tag = ?target.tag,
        mask = ?target.mask.as_ref().map(|m| m.as_str()),
        "Resolved target"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(e.to_string()))?;

    let timeout = cli.timeout.map(Duration::from_secs);
    let mut session = runtime.block_on(startup::open_session(&target, timeout))?;
    let engine = TransferEngine::new(target.token.clone())?.with_output_dir(cli.output_dir.clone());

    if cli.yes || !atty::is(atty::Stream::Stdout) {
        tui_app::run_headless(&mut session, &engine, &runtime)?;
    } else {
        tui_app::run_tui(TuiAppConfig {
            session: &mut session,
            engine: &engine,
            runtime: runtime.handle(),
        })?;
    }

    tui_app::print_report(&session);
    Ok(())
}
