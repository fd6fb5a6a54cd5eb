use filed_core::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// CLI progress reporter using indicatif spinners, one per stage.
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn start_spinner(&self, message: String) {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
        }
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(80));

        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.take() {
                old.finish_and_clear();
            }
            *guard = Some(pb);
        }
    }

    fn update(&self, message: String) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                pb.set_message(message);
            }
        }
    }

    fn finish(&self, summary: String) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
        eprintln!("  \x1b[32m✓\x1b[0m {}", summary);
    }
}

impl ProgressReporter for CliReporter {
    fn on_index_start(&self, root: &str) {
        self.start_spinner(format!("Indexing {}...", root));
    }

    fn on_index_progress(&self, entries_flushed: usize) {
        self.update(format!("Indexing... {} files/folders stored", entries_flushed));
    }

    fn on_index_complete(&self, total_entries: usize, duration_secs: f64) {
        self.finish(format!(
            "Index complete: {} files/folders in {:.2}s",
            total_entries, duration_secs
        ));
    }

    fn on_hash_start(&self) {
        self.start_spinner("Hashing files...".to_string());
    }

    fn on_hash_progress(&self, files_hashed: usize, files_seen: usize) {
        self.update(format!("Hashing... {} hashed, {} visited", files_hashed, files_seen));
    }

    fn on_hash_complete(&self, files_hashed: usize, duration_secs: f64) {
        self.finish(format!(
            "Hash complete: {} files in {:.2}s",
            files_hashed, duration_secs
        ));
    }

    fn on_stats_start(&self) {
        self.start_spinner("Calculating statistics...".to_string());
    }

    fn on_stats_progress(&self, rows_written: usize) {
        self.update(format!("Calculating statistics... {} rows", rows_written));
    }

    fn on_stats_complete(&self, rows_written: usize, duration_secs: f64) {
        self.finish(format!(
            "Statistics complete: {} rows in {:.2}s",
            rows_written, duration_secs
        ));
    }
}
