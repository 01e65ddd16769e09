//! Progress reporting from the transfer engine to the session.
//!
//! Each transfer owns a [`ProgressReporter`] that publishes cumulative byte
//! counts into a `tokio::sync::watch` channel. The session holds the matching
//! [`ProgressWatcher`] and samples it whenever its [`ProgressTicker`] fires.
//! The watch channel only keeps the latest snapshot, so a slow poller never
//! backs up the transfer.

use std::time::{Duration, Instant};

use tokio::sync::watch;

/// Default interval between progress polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Snapshot of one transfer's progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferProgress {
    /// Cumulative bytes written to disk.
    pub downloaded: u64,
    /// Expected total; 0 when unknown.
    pub total: u64,
}

/// Create a connected reporter/watcher pair starting at zero.
pub fn progress_channel() -> (ProgressReporter, ProgressWatcher) {
    let (tx, rx) = watch::channel(TransferProgress::default());
    (ProgressReporter { tx }, ProgressWatcher { rx })
}

/// Transfer-side handle that publishes progress snapshots.
#[derive(Debug)]
pub struct ProgressReporter {
    tx: watch::Sender<TransferProgress>,
}

impl ProgressReporter {
    /// Publish the cumulative byte count. Works even if the watcher was dropped.
    pub fn report(&self, downloaded: u64, total: u64) {
        self.tx.send_replace(TransferProgress { downloaded, total });
    }
}

/// Session-side handle that reads the latest snapshot.
#[derive(Debug, Clone)]
pub struct ProgressWatcher {
    rx: watch::Receiver<TransferProgress>,
}

impl ProgressWatcher {
    /// Latest published snapshot.
    pub fn snapshot(&self) -> TransferProgress {
        *self.rx.borrow()
    }

    /// Wait for the next snapshot. Returns false once the reporter is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

/// Re-arming poll timer that only runs while a transfer is active.
#[derive(Debug, Clone)]
pub struct ProgressTicker {
    interval: Duration,
    next_due: Option<Instant>,
}

impl Default for ProgressTicker {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl ProgressTicker {
    /// Create a stopped ticker.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    /// Arm the ticker; the first poll is due one interval from `now`.
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    /// Disarm the ticker.
    pub fn stop(&mut self) {
        self.next_due = None;
    }

    /// Whether the ticker is armed.
    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    /// Returns true if a poll is due at `now`, re-arming for the next interval.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }

    /// Time remaining until the next poll, if armed.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }
}
