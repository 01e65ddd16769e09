//! The session state machine.
//!
//! A [`Session`] reacts to user [`Intent`]s and transfer results and answers
//! with [`Command`]s for whoever owns the event loop. It never performs I/O
//! itself: starting a transfer means handing out a [`TransferJob`], and the
//! owner reports the outcome back through [`Session::on_transfer_finished`].

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::list::ListView;
use crate::catalog::{build_catalog, release_assets, AssetDescriptor, AssetMask};
use crate::download::{
    progress_channel, DownloadQueue, ProgressReporter, ProgressTicker, ProgressWatcher,
    TransferReport,
};
use crate::error::{FetchError, FetchResult};
use crate::github::Release;

/// Notice shown after the user interrupts a download.
pub const CANCELLED_NOTICE: &str = "Download cancelled by user";

/// Summary when every queued asset succeeded.
pub const SUCCESS_SUMMARY: &str = "All files downloaded and verified successfully";

/// Summary when at least one asset failed.
pub const PARTIAL_FAILURE_SUMMARY: &str = "Downloads completed with errors";

/// Session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    ChoosingRelease,
    ChoosingAssets,
    Downloading,
    Finished,
}

/// User input, already decoded from keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Up,
    Down,
    /// Confirm (enter).
    Select,
    /// Flip selection (space).
    Toggle,
    /// Quit, or cancel a running download.
    Interrupt,
}

/// Everything needed to run one transfer.
#[derive(Debug)]
pub struct TransferJob {
    /// Identifies the result when it comes back.
    pub id: u64,
    pub asset: AssetDescriptor,
    pub cancel: CancellationToken,
    pub reporter: ProgressReporter,
}

/// Action requested from the event loop owner.
#[derive(Debug)]
pub enum Command {
    Start(TransferJob),
    Quit,
}

/// Terminal classification of a finished queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failed,
}

/// Final result surfaced once the queue is exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResult {
    pub outcome: Outcome,
    pub summary: String,
}

/// A queue entry whose transfer failed.
#[derive(Debug)]
pub struct FailedTransfer {
    pub index: usize,
    pub error: FetchError,
}

#[derive(Debug)]
struct ActiveTransfer {
    id: u64,
    watcher: ProgressWatcher,
}

/// Application controller from release choice to the final summary.
#[derive(Debug)]
pub struct Session {
    phase: Phase,
    list: ListView,
    queue: DownloadQueue,
    result: Option<SessionResult>,
    notice: Option<String>,
    cancel: CancellationToken,
    ticker: ProgressTicker,
    active: Option<ActiveTransfer>,
    next_id: u64,
    failures: Vec<FailedTransfer>,
    cancelled: bool,
}

impl Session {
    /// Start by choosing among `releases`.
    pub fn choosing_release(releases: Vec<Release>) -> Self {
        Self::new(Phase::ChoosingRelease, ListView::releases(releases))
    }

    /// Start by choosing among `assets`.
    pub fn choosing_assets(assets: Vec<AssetDescriptor>) -> Self {
        Self::new(Phase::ChoosingAssets, ListView::assets(assets))
    }

    /// Pick the entry state for a full release listing.
    ///
    /// Without a mask the user picks a release first. With a mask the flat,
    /// filtered catalog is offered directly; no match is an error.
    pub fn from_listing(releases: Vec<Release>, mask: Option<&AssetMask>) -> FetchResult<Self> {
        let Some(mask) = mask else {
            return Ok(Self::choosing_release(releases));
        };

        let catalog = build_catalog(&releases, Some(mask));
        if catalog.is_empty() {
            return Err(FetchError::NoAssetsMatched {
                mask: mask.as_str().to_string(),
            });
        }
        info!(mask = mask.as_str(), matched = catalog.len(), "Filtered assets");
        Ok(Self::choosing_assets(catalog))
    }

    /// Start directly in the assets of one release.
    pub fn from_release(release: &Release) -> Self {
        Self::choosing_assets(release_assets(release))
    }

    fn new(phase: Phase, list: ListView) -> Self {
        Self {
            phase,
            list,
            queue: DownloadQueue::new(),
            result: None,
            notice: None,
            cancel: CancellationToken::new(),
            ticker: ProgressTicker::default(),
            active: None,
            next_id: 1,
            failures: Vec::new(),
            cancelled: false,
        }
    }

    /// Use a different progress poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.ticker = ProgressTicker::new(interval);
        self
    }

    /// React to a user intent.
    pub fn handle(&mut self, intent: Intent) -> Option<Command> {
        match self.phase {
            Phase::ChoosingRelease => self.handle_choosing_release(intent),
            Phase::ChoosingAssets => self.handle_choosing_assets(intent),
            Phase::Downloading => {
                if intent == Intent::Interrupt {
                    self.interrupt();
                }
                None
            }
            Phase::Finished => Some(Command::Quit),
        }
    }

    fn handle_choosing_release(&mut self, intent: Intent) -> Option<Command> {
        match intent {
            Intent::Up => self.list.up(),
            Intent::Down => self.list.down(),
            Intent::Select | Intent::Toggle => {
                let Some(release) = self.list.current_release() else {
                    return None;
                };
                debug!(tag = %release.tag_name, "Release chosen");
                let assets = release_assets(release);
                self.list = ListView::assets(assets);
                self.phase = Phase::ChoosingAssets;
                self.notice = None;
            }
            Intent::Interrupt => return Some(Command::Quit),
        }
        None
    }

    fn handle_choosing_assets(&mut self, intent: Intent) -> Option<Command> {
        match intent {
            Intent::Up => self.list.up(),
            Intent::Down => self.list.down(),
            Intent::Toggle => self.list.toggle(),
            Intent::Select => return self.start_queue(),
            Intent::Interrupt => return Some(Command::Quit),
        }
        None
    }

    /// Load the selection (or the highlighted asset) and start the first transfer.
    fn start_queue(&mut self) -> Option<Command> {
        let mut selection = self.list.selected_assets();
        if selection.is_empty() {
            selection.extend(self.list.current_asset().cloned());
        }
        if selection.is_empty() {
            self.notice = Some("No assets to download".to_string());
            return None;
        }

        info!(count = selection.len(), "Starting downloads");
        self.queue.load(selection);
        self.failures.clear();
        self.result = None;
        self.notice = None;
        self.cancelled = false;
        self.phase = Phase::Downloading;
        self.ticker.start(Instant::now());
        self.start_current().map(Command::Start)
    }

    fn start_current(&mut self) -> Option<TransferJob> {
        let asset = self.queue.current()?.clone();
        let id = self.next_id;
        self.next_id += 1;

        let (reporter, watcher) = progress_channel();
        self.active = Some(ActiveTransfer { id, watcher });
        debug!(id, asset = %asset.name, "Dispatching transfer");

        Some(TransferJob {
            id,
            asset,
            cancel: self.cancel.clone(),
            reporter,
        })
    }

    /// Cancel the running transfer and return to asset selection.
    ///
    /// The token is replaced so later transfers are not cancelled at birth.
    fn interrupt(&mut self) {
        info!("Download interrupted by user");
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.active = None;
        self.ticker.stop();
        self.cancelled = true;
        self.phase = Phase::ChoosingAssets;
        self.notice = Some(CANCELLED_NOTICE.to_string());
    }

    /// Process a transfer's terminal result.
    ///
    /// Results for anything but the active transfer are discarded.
    pub fn on_transfer_finished(
        &mut self,
        id: u64,
        result: FetchResult<TransferReport>,
    ) -> Option<Command> {
        let active = match self.active.take() {
            Some(active) if active.id == id => active,
            other => {
                self.active = other;
                debug!(id, "Discarding stale transfer result");
                return None;
            }
        };

        match result {
            Ok(report) => {
                let last = active.watcher.snapshot();
                self.queue.update_progress(last.downloaded, last.total);
                self.queue.complete_current(report.size);
            }
            Err(error) => {
                let index = self.queue.current_index();
                warn!(index, error = %error, "Transfer failed");
                self.queue.record_failure();
                self.failures.push(FailedTransfer { index, error });
            }
        }

        if self.queue.advance() {
            return self.start_current().map(Command::Start);
        }
        self.finish();
        None
    }

    fn finish(&mut self) {
        self.ticker.stop();
        self.active = None;
        self.phase = Phase::Finished;

        let result = self.summarize();
        info!(outcome = ?result.outcome, summary = %result.summary, "Downloads finished");
        self.result = Some(result);
    }

    fn summarize(&self) -> SessionResult {
        match self.failures.as_slice() {
            [] => SessionResult {
                outcome: Outcome::Success,
                summary: SUCCESS_SUMMARY.to_string(),
            },
            [FailedTransfer {
                index,
                error: FetchError::ChecksumMismatch {
                    expected, actual, ..
                },
            }] => {
                let name = self
                    .queue
                    .assets()
                    .get(*index)
                    .map(|a| a.name.as_str())
                    .unwrap_or_default();
                SessionResult {
                    outcome: Outcome::Failed,
                    summary: format!(
                        "Checksum verification failed for {}: expected {}, got {}",
                        name, expected, actual
                    ),
                }
            }
            _ => SessionResult {
                outcome: Outcome::Failed,
                summary: PARTIAL_FAILURE_SUMMARY.to_string(),
            },
        }
    }

    /// Poll transfer progress if the ticker is due. Returns true if it polled.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.phase != Phase::Downloading || !self.ticker.poll(now) {
            return false;
        }
        if let Some(ref active) = self.active {
            let snapshot = active.watcher.snapshot();
            self.queue.update_progress(snapshot.downloaded, snapshot.total);
        }
        true
    }

    /// Time until the next progress poll; `None` while no transfer runs.
    pub fn next_tick_in(&self, now: Instant) -> Option<Duration> {
        self.ticker.time_until_due(now)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn list(&self) -> &ListView {
        &self.list
    }

    /// Mutable list access, e.g. for selecting everything in headless mode.
    pub fn list_mut(&mut self) -> &mut ListView {
        &mut self.list
    }

    pub fn queue(&self) -> &DownloadQueue {
        &self.queue
    }

    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn failures(&self) -> &[FailedTransfer] {
        &self.failures
    }

    /// Whether the failure list names queue entry `index`.
    pub fn is_failed(&self, index: usize) -> bool {
        self.failures.iter().any(|f| f.index == index)
    }

    /// Id of the transfer the session is waiting on.
    pub fn active_transfer(&self) -> Option<u64> {
        self.active.as_ref().map(|a| a.id)
    }

    /// Whether the ticker is armed.
    pub fn is_polling(&self) -> bool {
        self.ticker.is_active()
    }

    /// Whether the last download run was interrupted by the user.
    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }
}
