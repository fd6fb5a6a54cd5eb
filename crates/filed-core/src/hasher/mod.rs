pub mod digest;

use crate::error::{Error, Result};
use crate::progress::ProgressReporter;
use crate::storage::models::{FileRecord, HashDigest};
use crate::storage::Database;
use crate::units::humanize_size;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Content hashing pass over every stored non-directory record.
pub struct Hasher {
    batch_size: usize,
    rehash_older_than: Option<i64>,
}

#[derive(Debug, Default)]
pub struct HashStats {
    pub files_seen: usize,
    pub files_hashed: usize,
    pub files_failed: usize,
    /// Symlinks and other non-regular entries, left unhashed.
    pub files_skipped: usize,
    pub batches: usize,
    pub duration: Duration,
}

impl Hasher {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            rehash_older_than: None,
        }
    }

    /// Also re-digest files whose `hashed_at` is before `timestamp` (unix seconds).
    pub fn with_rehash_older_than(mut self, timestamp: i64) -> Self {
        self.rehash_older_than = Some(timestamp);
        self
    }

    fn needs_hash(&self, record: &FileRecord) -> bool {
        if record.is_directory {
            return false;
        }
        match (&record.hash, record.hashed_at, self.rehash_older_than) {
            (None, _, _) => true,
            (Some(_), Some(hashed_at), Some(threshold)) => hashed_at < threshold,
            _ => false,
        }
    }

    /// Walk the file cursor once, hashing every record that needs it.
    ///
    /// Files that cannot be read are logged and left unhashed. Storage failures abort the run.
    pub fn hash_all(&self, db: &Database, reporter: &dyn ProgressReporter) -> Result<HashStats> {
        if self.batch_size < 1 {
            return Err(Error::InvalidConfiguration(format!(
                "hash batch size must be at least 1, got {}",
                self.batch_size
            )));
        }

        info!("Hashing stored files...");
        reporter.on_hash_start();
        let start = Instant::now();

        let mut stats = HashStats::default();
        let mut cursor = db.file_cursor(self.batch_size);
        let mut pending: Vec<HashDigest> = Vec::with_capacity(self.batch_size);

        loop {
            let page = cursor.next_page()?;
            if page.is_empty() {
                break;
            }
            stats.files_seen += page.len();

            let candidates: Vec<&FileRecord> =
                page.iter().filter(|record| self.needs_hash(record)).collect();
            if !candidates.is_empty() {
                let bytes: i64 = candidates.iter().map(|record| record.size.max(0)).sum();
                debug!("Hashing {} of files", humanize_size(bytes as u64));
            }

            for record in candidates {
                match digest::hash_regular_file(Path::new(&record.path)) {
                    Ok(Some(hash)) => {
                        pending.push(HashDigest {
                            file_id: record.id,
                            hash,
                            hashed_at: chrono::Utc::now().timestamp(),
                        });
                        if pending.len() == self.batch_size {
                            flush_digests(db, &mut pending, &mut stats)?;
                        }
                    }
                    Ok(None) => {
                        debug!("Not a regular file, skipping {}", record.path);
                        stats.files_skipped += 1;
                    }
                    Err(err) => {
                        warn!("Could not hash {}: {}", record.path, err);
                        stats.files_failed += 1;
                    }
                }
            }

            reporter.on_hash_progress(stats.files_hashed, stats.files_seen);
        }

        if !pending.is_empty() {
            flush_digests(db, &mut pending, &mut stats)?;
            reporter.on_hash_progress(stats.files_hashed, stats.files_seen);
        }

        stats.duration = start.elapsed();
        info!(
            "Hashed {} of {} files ({} unreadable, {} not regular files)",
            stats.files_hashed, stats.files_seen, stats.files_failed, stats.files_skipped
        );
        reporter.on_hash_complete(stats.files_hashed, stats.duration.as_secs_f64());
        Ok(stats)
    }
}

fn flush_digests(
    db: &Database,
    pending: &mut Vec<HashDigest>,
    stats: &mut HashStats,
) -> Result<()> {
    let written = db.update_file_hashes(pending)?;
    pending.clear();
    stats.files_hashed += written;
    stats.batches += 1;
    debug!("Hashed {} files", stats.files_hashed);
    Ok(())
}
