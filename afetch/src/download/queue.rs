//! Download queue: an ordered asset list with a forward-only cursor.
//!
//! Assets and their progress entries are parallel vectors paired by position.
//! Only [`DownloadQueue::load`] and [`DownloadQueue::reset`] change the asset
//! list, and both rebuild every vector together.

use crate::catalog::AssetDescriptor;

/// Per-asset progress entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadProgress {
    /// Bytes transferred so far.
    pub downloaded: u64,
    /// Bytes expected; revised to the on-disk size on completion.
    pub total: u64,
    pub completed: bool,
}

/// Ordered, single-cursor sequence of assets to download.
#[derive(Debug, Clone, Default)]
pub struct DownloadQueue {
    assets: Vec<AssetDescriptor>,
    progress: Vec<DownloadProgress>,
    cursor: usize,
    /// Entries whose transfer failed (by index).
    failed: Vec<usize>,
}

impl DownloadQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue wholesale and rewind the cursor.
    ///
    /// Must not be called while a transfer for the previous queue is in flight.
    pub fn load(&mut self, assets: Vec<AssetDescriptor>) {
        self.progress = vec![DownloadProgress::default(); assets.len()];
        self.assets = assets;
        self.cursor = 0;
        self.failed.clear();
    }

    /// Clear assets, progress, failures and cursor together.
    pub fn reset(&mut self) {
        self.assets.clear();
        self.progress.clear();
        self.failed.clear();
        self.cursor = 0;
    }

    /// The asset at the cursor, or `None` when empty or exhausted.
    pub fn current(&self) -> Option<&AssetDescriptor> {
        self.assets.get(self.cursor)
    }

    /// Cursor position; equals `len()` once exhausted.
    pub fn current_index(&self) -> usize {
        self.cursor
    }

    /// Progress entry at the cursor.
    pub fn current_progress(&self) -> Option<&DownloadProgress> {
        self.progress.get(self.cursor)
    }

    /// Overwrite the progress entry at the cursor.
    ///
    /// No-op when the cursor is out of range.
    pub fn update_progress(&mut self, downloaded: u64, total: u64) {
        if let Some(entry) = self.progress.get_mut(self.cursor) {
            entry.downloaded = downloaded;
            entry.total = total;
            entry.completed = downloaded >= total && total > 0;
        }
    }

    /// Finalize the entry at the cursor after a successful transfer.
    ///
    /// The final size is the first non-zero of: `actual_size` (on-disk),
    /// the declared asset size, the last downloaded count. If all three are
    /// zero the entry is still marked completed with a size of 0, since an
    /// empty file is a legitimate outcome.
    pub fn complete_current(&mut self, actual_size: u64) {
        let Some(asset) = self.assets.get(self.cursor) else {
            return;
        };
        let Some(entry) = self.progress.get_mut(self.cursor) else {
            return;
        };

        let size = [actual_size, asset.size, entry.downloaded]
            .into_iter()
            .find(|&s| s > 0)
            .unwrap_or(0);

        entry.downloaded = size;
        entry.total = size;
        entry.completed = true;
    }

    /// Record a failed transfer for the entry at the cursor.
    ///
    /// A failed entry is never completed, even if every byte arrived before
    /// verification rejected it.
    pub fn record_failure(&mut self) {
        let Some(entry) = self.progress.get_mut(self.cursor) else {
            return;
        };
        entry.completed = false;
        if !self.failed.contains(&self.cursor) {
            self.failed.push(self.cursor);
        }
    }

    /// Move the cursor forward; returns whether a next asset exists.
    ///
    /// Repeated calls past the end keep returning `false`.
    pub fn advance(&mut self) -> bool {
        if self.cursor < self.assets.len() {
            self.cursor += 1;
        }
        self.cursor < self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether the cursor has moved past the last asset.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.assets.len()
    }

    pub fn assets(&self) -> &[AssetDescriptor] {
        &self.assets
    }

    pub fn progress(&self) -> &[DownloadProgress] {
        &self.progress
    }

    /// Indices of entries whose transfer failed.
    pub fn failures(&self) -> &[usize] {
        &self.failed
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    /// Number of entries marked completed.
    pub fn completed_count(&self) -> usize {
        self.progress.iter().filter(|p| p.completed).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn asset(name: &str, size: u64) -> AssetDescriptor {
        AssetDescriptor {
            id: 1,
            name: name.to_string(),
            url: format!("http://localhost/{}", name),
            browser_download_url: String::new(),
            size,
            release_tag: "v1".to_string(),
            release_name: "v1".to_string(),
            created_at: String::new(),
            formatted_date: String::new(),
            size_label: String::new(),
            digest: None,
            label: name.to_string(),
        }
    }

    fn assets(n: usize) -> Vec<AssetDescriptor> {
        (0..n).map(|i| asset(&format!("file{}.bin", i), 100)).collect()
    }

    #[test]
    fn test_new_queue_is_empty() {
        let queue = DownloadQueue::new();
        assert!(queue.is_empty());
        assert!(queue.is_exhausted());
        assert!(queue.current().is_none());
    }

    #[test]
    fn test_load_resets_cursor_and_progress() {
        let mut queue = DownloadQueue::new();
        queue.load(assets(2));
        queue.update_progress(50, 100);
        queue.record_failure();
        queue.advance();

        queue.load(assets(3));

        assert_eq!(queue.current_index(), 0);
        assert_eq!(queue.progress().len(), 3);
        assert!(queue.progress().iter().all(|p| *p == DownloadProgress::default()));
        assert!(!queue.has_failures());
    }

    #[test]
    fn test_update_progress_derives_completed() {
        let mut queue = DownloadQueue::new();
        queue.load(assets(1));

        queue.update_progress(50, 100);
        assert!(!queue.current_progress().unwrap().completed);

        queue.update_progress(100, 100);
        assert!(queue.current_progress().unwrap().completed);

        // Unknown total never completes
        queue.update_progress(100, 0);
        assert!(!queue.current_progress().unwrap().completed);
    }

    #[test]
    fn test_update_progress_when_exhausted_is_noop() {
        let mut queue = DownloadQueue::new();
        queue.load(assets(1));
        queue.advance();
        queue.update_progress(10, 10);
        assert_eq!(queue.progress()[0], DownloadProgress::default());
    }

    #[test]
    fn test_complete_current_prefers_actual_size() {
        let mut queue = DownloadQueue::new();
        queue.load(vec![asset("a", 500)]);
        queue.update_progress(400, 500);

        queue.complete_current(512);

        assert_eq!(
            queue.progress()[0],
            DownloadProgress {
                downloaded: 512,
                total: 512,
                completed: true
            }
        );
    }

    #[test]
    fn test_complete_current_falls_back_to_declared_size() {
        let mut queue = DownloadQueue::new();
        queue.load(vec![asset("a", 500)]);
        queue.update_progress(500, 500);

        queue.complete_current(0);

        assert_eq!(
            queue.progress()[0],
            DownloadProgress {
                downloaded: 500,
                total: 500,
                completed: true
            }
        );
    }

    #[test]
    fn test_complete_current_falls_back_to_downloaded() {
        let mut queue = DownloadQueue::new();
        queue.load(vec![asset("a", 0)]);
        queue.update_progress(321, 0);

        queue.complete_current(0);

        let entry = queue.progress()[0];
        assert_eq!(entry.total, 321);
        assert_eq!(entry.downloaded, 321);
        assert!(entry.completed);
    }

    #[test]
    fn test_complete_current_with_all_sizes_zero() {
        let mut queue = DownloadQueue::new();
        queue.load(vec![asset("empty", 0)]);

        queue.complete_current(0);

        let entry = queue.progress()[0];
        assert_eq!(entry.total, 0);
        assert!(entry.completed);
    }

    #[test]
    fn test_advance_is_idempotent_past_end() {
        let mut queue = DownloadQueue::new();
        queue.load(assets(2));

        assert!(queue.advance());
        assert!(!queue.advance());
        assert!(!queue.advance());
        assert_eq!(queue.current_index(), 2);
        assert!(queue.current().is_none());
    }

    #[test]
    fn test_record_failure_and_counts() {
        let mut queue = DownloadQueue::new();
        queue.load(assets(3));

        queue.complete_current(100);
        queue.advance();
        queue.record_failure();
        queue.record_failure();
        queue.advance();
        queue.complete_current(100);

        assert_eq!(queue.failures(), &[1]);
        assert_eq!(queue.failure_count(), 1);
        assert_eq!(queue.completed_count(), 2);
    }

    #[test]
    fn test_record_failure_clears_completed() {
        let mut queue = DownloadQueue::new();
        queue.load(assets(1));
        queue.update_progress(100, 100);

        queue.record_failure();

        assert!(!queue.progress()[0].completed);
        assert_eq!(queue.progress()[0].downloaded, 100);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut queue = DownloadQueue::new();
        queue.load(assets(2));
        queue.advance();
        queue.record_failure();

        queue.reset();

        assert!(queue.is_empty());
        assert!(queue.progress().is_empty());
        assert_eq!(queue.current_index(), 0);
        assert!(!queue.has_failures());
    }

    proptest! {
        #[test]
        fn prop_load_then_advance_exhausts(n in 0usize..20) {
            let mut queue = DownloadQueue::new();
            queue.load(assets(n));

            prop_assert_eq!(queue.assets().len(), n);
            prop_assert_eq!(queue.progress().len(), n);
            prop_assert_eq!(queue.current_index(), 0);

            for _ in 0..n {
                queue.advance();
            }
            prop_assert!(queue.current().is_none());
        }

        #[test]
        fn prop_completed_is_sticky_for_monotonic_updates(
            total in 1u64..10_000,
            mut steps in proptest::collection::vec(0u64..20_000, 1..30),
        ) {
            steps.sort_unstable();
            let mut queue = DownloadQueue::new();
            queue.load(assets(1));

            let mut seen_completed = false;
            for downloaded in steps {
                queue.update_progress(downloaded, total);
                let completed = queue.progress()[0].completed;
                prop_assert!(!(seen_completed && !completed));
                seen_completed |= completed;
            }
        }
    }
}
