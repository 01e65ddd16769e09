//! Async event loop that runs a session's download queue.
//!
//! Transfers run as spawned tasks, one at a time. The loop waits on three
//! things: the running transfer, the session's next progress poll, and an
//! external interrupt token. It returns once nothing is in flight, which
//! after an interrupt means the cancelled transfer has finished its cleanup.

use std::time::Instant;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::error;

use super::machine::{Command, Intent, Session, TransferJob};
use crate::download::{TransferEngine, TransferReport, DEFAULT_POLL_INTERVAL};
use crate::error::{FetchError, FetchResult};

/// Run transfers until the queue finishes, the session quits, or an
/// interrupt has been fully processed.
///
/// `first` is the command returned by the intent that started downloading.
/// `on_update` is called after every state change and progress poll.
pub async fn run_transfers<F>(
    session: &mut Session,
    engine: &TransferEngine,
    first: Option<Command>,
    interrupt: CancellationToken,
    mut on_update: F,
) where
    F: FnMut(&Session),
{
    let mut command = first;
    let mut running: Option<(u64, JoinHandle<FetchResult<TransferReport>>)> = None;
    let mut interrupted = false;

    loop {
        match command.take() {
            Some(Command::Start(job)) => running = Some(spawn_transfer(engine, job)),
            Some(Command::Quit) => break,
            None => {}
        }
        let Some((id, handle)) = running.as_mut() else {
            break;
        };
        let id = *id;

        let wait = session
            .next_tick_in(Instant::now())
            .unwrap_or(DEFAULT_POLL_INTERVAL);

        tokio::select! {
            joined = handle => {
                running = None;
                let result = joined.unwrap_or_else(|e| {
                    error!(id, error = %e, "Transfer task failed");
                    Err(FetchError::Network {
                        url: String::new(),
                        reason: format!("transfer task failed: {}", e),
                    })
                });
                command = session.on_transfer_finished(id, result);
                on_update(session);
            }
            _ = tokio::time::sleep(wait) => {
                if session.tick(Instant::now()) {
                    on_update(session);
                }
            }
            _ = interrupt.cancelled(), if !interrupted => {
                interrupted = true;
                command = session.handle(Intent::Interrupt);
                on_update(session);
            }
        }
    }
}

fn spawn_transfer(
    engine: &TransferEngine,
    job: TransferJob,
) -> (u64, JoinHandle<FetchResult<TransferReport>>) {
    let engine = engine.clone();
    let TransferJob {
        id,
        asset,
        cancel,
        reporter,
    } = job;
    let handle = tokio::spawn(async move { engine.transfer(asset, cancel, reporter).await });
    (id, handle)
}
