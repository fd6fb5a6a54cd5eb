/// Trait for reporting pipeline progress.
///
/// The CLI implements it with tracing/indicatif; tests use [`SilentReporter`].
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_index_start(&self, _root: &str) {}
    fn on_index_progress(&self, _entries_flushed: usize) {}
    fn on_index_complete(&self, _total_entries: usize, _duration_secs: f64) {}
    fn on_hash_start(&self) {}
    fn on_hash_progress(&self, _files_hashed: usize, _files_seen: usize) {}
    fn on_hash_complete(&self, _files_hashed: usize, _duration_secs: f64) {}
    fn on_stats_start(&self) {}
    fn on_stats_progress(&self, _rows_written: usize) {}
    fn on_stats_complete(&self, _rows_written: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
