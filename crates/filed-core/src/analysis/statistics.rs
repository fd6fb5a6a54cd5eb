use crate::error::{Error, Result};
use crate::progress::ProgressReporter;
use crate::storage::models::DuplicateStat;
use crate::storage::Database;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Snapshots one statistics row per distinct content hash.
///
/// Every run appends a fresh snapshot; earlier rows are never touched.
pub struct StatisticsAggregator {
    batch_size: usize,
}

#[derive(Debug, Default)]
pub struct StatsSummary {
    pub groups_seen: usize,
    pub rows_written: usize,
    pub batches_dropped: usize,
    /// Groups whose members disagree on size.
    pub inconsistent_groups: usize,
    pub duration: Duration,
}

impl StatisticsAggregator {
    pub fn new(batch_size: usize) -> Self {
        Self { batch_size }
    }

    /// A page that fails to insert is logged and dropped; a failed read aborts the run.
    pub fn aggregate(
        &self,
        db: &Database,
        reporter: &dyn ProgressReporter,
    ) -> Result<StatsSummary> {
        if self.batch_size < 1 {
            return Err(Error::InvalidConfiguration(format!(
                "statistics batch size must be at least 1, got {}",
                self.batch_size
            )));
        }

        info!("Calculating duplicate statistics...");
        reporter.on_stats_start();
        let start = Instant::now();

        let mut summary = StatsSummary::default();
        let mut cursor = db.duplicate_group_cursor(self.batch_size);

        loop {
            let groups = cursor.next_page()?;
            if groups.is_empty() {
                break;
            }
            summary.groups_seen += groups.len();
            for group in groups.iter().filter(|g| !g.is_consistent()) {
                warn!(
                    "Hash {} groups {} files of differing size ({} bytes total, {} smallest)",
                    group.hash, group.file_count, group.total_size, group.file_size
                );
                summary.inconsistent_groups += 1;
            }

            let stats: Vec<DuplicateStat> = groups.into_iter().map(DuplicateStat::from).collect();
            match db.insert_duplicate_stats(&stats) {
                Ok(written) => {
                    summary.rows_written += written;
                    debug!("Files statistics processed {}", summary.rows_written);
                    reporter.on_stats_progress(summary.rows_written);
                }
                Err(err) => {
                    error!("Dropping {} statistics rows: {}", stats.len(), err);
                    summary.batches_dropped += 1;
                }
            }
        }

        summary.duration = start.elapsed();
        info!(
            "Wrote {} statistics rows ({} batches dropped)",
            summary.rows_written, summary.batches_dropped
        );
        reporter.on_stats_complete(summary.rows_written, summary.duration.as_secs_f64());
        Ok(summary)
    }
}
