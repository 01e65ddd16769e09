//! Interactive and headless run loops.
//!
//! Both loops own the [`Session`] for the duration of the run and leave it in
//! its final state so the caller can print the report.

use std::sync::mpsc;
use std::time::{Duration, Instant};

use console::style;
use crossterm::event::{self, Event};
use indicatif::{ProgressBar, ProgressStyle};
use ratatui::DefaultTerminal;
use tokio::runtime::{Handle, Runtime};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use afetch::download::{TransferEngine, TransferReport};
use afetch::session::{run_transfers, Command, Intent, Outcome, Phase, Session, TransferJob};
use afetch::FetchResult;

use crate::error::CliError;
use crate::ui;

/// Terminal event poll interval.
const TICK_RATE: Duration = Duration::from_millis(50);

type TransferResult = (u64, FetchResult<TransferReport>);

/// Inputs for [`run_tui`].
pub struct TuiAppConfig<'a> {
    pub session: &'a mut Session,
    pub engine: &'a TransferEngine,
    /// Runtime the transfers are spawned on; the UI loop stays on this thread.
    pub runtime: &'a Handle,
}

/// Run the full-screen UI until the session finishes or the user quits.
///
/// The terminal is restored before returning, on both success and error.
pub fn run_tui(config: TuiAppConfig) -> Result<(), CliError> {
    let TuiAppConfig {
        session,
        engine,
        runtime,
    } = config;

    let mut terminal = ratatui::try_init()?;
    let mut tasks = Vec::new();
    let result = event_loop(&mut terminal, session, engine, runtime, &mut tasks);
    ratatui::restore();

    // Cancelled transfers still have a partial file to remove
    for task in tasks {
        if let Err(e) = runtime.block_on(task) {
            tracing::warn!(error = %e, "Transfer task did not shut down cleanly");
        }
    }
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    session: &mut Session,
    engine: &TransferEngine,
    runtime: &Handle,
    tasks: &mut Vec<JoinHandle<()>>,
) -> Result<(), CliError> {
    let (result_tx, result_rx) = mpsc::channel::<TransferResult>();

    loop {
        terminal.draw(|frame| ui::draw(frame, session))?;
        if session.is_finished() {
            return Ok(());
        }

        // Transfer results (non-blocking)
        while let Ok((id, result)) = result_rx.try_recv() {
            if let Some(command) = session.on_transfer_finished(id, result) {
                if dispatch(command, engine, runtime, &result_tx, tasks) {
                    return Ok(());
                }
            }
        }
        tasks.retain(|task| !task.is_finished());
        session.tick(Instant::now());

        if !event::poll(TICK_RATE)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            let Some(intent) = ui::map_key(key) else {
                continue;
            };
            if let Some(command) = session.handle(intent) {
                if dispatch(command, engine, runtime, &result_tx, tasks) {
                    return Ok(());
                }
            }
        }
    }
}

/// Carry out a session command. Returns true when the UI should exit.
fn dispatch(
    command: Command,
    engine: &TransferEngine,
    runtime: &Handle,
    result_tx: &mpsc::Sender<TransferResult>,
    tasks: &mut Vec<JoinHandle<()>>,
) -> bool {
    match command {
        Command::Start(job) => {
            tasks.push(spawn_transfer(engine, runtime, job, result_tx.clone()));
            false
        }
        Command::Quit => true,
    }
}

fn spawn_transfer(
    engine: &TransferEngine,
    runtime: &Handle,
    job: TransferJob,
    result_tx: mpsc::Sender<TransferResult>,
) -> JoinHandle<()> {
    let engine = engine.clone();
    let TransferJob {
        id,
        asset,
        cancel,
        reporter,
    } = job;
    runtime.spawn(async move {
        let result = engine.transfer(asset, cancel, reporter).await;
        // The UI may already have exited
        let _ = result_tx.send((id, result));
    })
}

/// Run without a terminal UI (non-TTY stdout or `--yes`).
///
/// Downloads every asset of the entry listing. Ctrl+C cancels the active
/// transfer and ends the run.
pub fn run_headless(
    session: &mut Session,
    engine: &TransferEngine,
    runtime: &Runtime,
) -> Result<(), CliError> {
    if session.phase() != Phase::ChoosingAssets {
        return Err(CliError::Config(
            "Headless mode needs a release tag or an asset mask to choose assets".to_string(),
        ));
    }

    let interrupt = CancellationToken::new();
    let trigger = interrupt.clone();
    ctrlc::set_handler(move || trigger.cancel())
        .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    session.list_mut().select_all();
    let first = session.handle(Intent::Select);
    println!(
        "Downloading {} asset(s) to {}",
        session.queue().len(),
        engine.output_dir().display()
    );
    println!("Press Ctrl+C to cancel.");
    println!();

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template(
            "{msg:40} [{bar:30.cyan/blue}] {bytes}/{total_bytes} {bytes_per_sec}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━━╌"),
    );

    let mut shown = None;
    runtime.block_on(run_transfers(session, engine, first, interrupt, |s| {
        update_bar(&bar, s, &mut shown)
    }));
    bar.finish_and_clear();
    Ok(())
}

/// Point the bar at the queue's current entry.
fn update_bar(bar: &ProgressBar, session: &Session, shown: &mut Option<usize>) {
    let queue = session.queue();
    let (Some(asset), Some(progress)) = (queue.current(), queue.current_progress()) else {
        return;
    };

    let index = queue.current_index();
    if *shown != Some(index) {
        *shown = Some(index);
        bar.reset();
        bar.set_message(asset.name.clone());
    }
    bar.set_length(progress.total.max(asset.size));
    bar.set_position(progress.downloaded);
}

/// Print the final table and summary after a run.
pub fn print_report(session: &Session) {
    if session.is_finished() {
        print!("{}", ui::final_report(session));
        if let Some(result) = session.result() {
            println!();
            match result.outcome {
                Outcome::Success => println!("{}", style(&result.summary).green().bold()),
                Outcome::Failed => {
                    println!("{}", style(&result.summary).yellow().bold());
                    for failure in session.failures() {
                        let name = session
                            .queue()
                            .assets()
                            .get(failure.index)
                            .map(|a| a.name.as_str())
                            .unwrap_or("?");
                        println!("  {} {}: {}", style("✗").red(), name, failure.error);
                    }
                }
            }
        }
    } else if let Some(notice) = session.notice() {
        println!("{}", notice);
    }
}
