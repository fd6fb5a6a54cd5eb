use crate::analysis::{StatisticsAggregator, StatsSummary};
use crate::config::AppConfig;
use crate::error::Result;
use crate::hasher::{HashStats, Hasher};
use crate::progress::ProgressReporter;
use crate::scanner::{IndexOptions, IndexStats, Indexer};
use crate::storage::Database;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Builds the three stages from one [`AppConfig`] and runs them in order.
pub struct Engine {
    config: AppConfig,
}

#[derive(Debug)]
pub struct RunResult {
    pub index: IndexStats,
    pub hash: HashStats,
    pub stats: StatsSummary,
}

impl RunResult {
    pub fn total_duration(&self) -> Duration {
        self.index.duration + self.hash.duration + self.stats.duration
    }
}

impl Engine {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn index(
        &self,
        db: &Database,
        root: &Path,
        reporter: &dyn ProgressReporter,
    ) -> Result<IndexStats> {
        Indexer::new(IndexOptions::from(&self.config)).index(db, root, reporter)
    }

    pub fn hash(&self, db: &Database, reporter: &dyn ProgressReporter) -> Result<HashStats> {
        let mut hasher = Hasher::new(self.config.hash_batch_size);
        if let Some(threshold) = self.config.rehash_older_than {
            hasher = hasher.with_rehash_older_than(threshold);
        }
        hasher.hash_all(db, reporter)
    }

    pub fn aggregate(
        &self,
        db: &Database,
        reporter: &dyn ProgressReporter,
    ) -> Result<StatsSummary> {
        StatisticsAggregator::new(self.config.stats_batch_size).aggregate(db, reporter)
    }

    /// Run the full pipeline:
    /// 1. Walk `root` and store a record per entry
    /// 2. Hash every stored file
    /// 3. Snapshot per-hash duplicate statistics
    pub fn run(
        &self,
        db: &Database,
        root: &Path,
        reporter: &dyn ProgressReporter,
    ) -> Result<RunResult> {
        let index = self.index(db, root, reporter)?;
        let hash = self.hash(db, reporter)?;
        let stats = self.aggregate(db, reporter)?;

        let result = RunResult { index, hash, stats };
        info!(
            "Index: {:.2}s, Hash: {:.2}s, Stats: {:.2}s",
            result.index.duration.as_secs_f64(),
            result.hash.duration.as_secs_f64(),
            result.stats.duration.as_secs_f64(),
        );
        Ok(result)
    }
}
