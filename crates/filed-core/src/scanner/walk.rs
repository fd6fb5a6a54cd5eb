use crate::config::{AppConfig, DEFAULT_BATCH_SIZE};
use crate::error::{Error, Result};
use crate::platform;
use crate::progress::ProgressReporter;
use crate::storage::models::FileRecord;
use crate::storage::Database;
use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, UNIX_EPOCH};
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone)]
pub struct IndexOptions {
    /// Records buffered before each flush. Must be at least 1.
    pub batch_size: usize,
    pub skip_hidden: bool,
    /// Glob patterns; matching entries are skipped and matching directories pruned.
    pub ignore_patterns: Vec<String>,
    /// Flush workers. 1 flushes inline on the walking thread.
    pub workers: usize,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            skip_hidden: false,
            ignore_patterns: Vec::new(),
            workers: 1,
        }
    }
}

impl From<&AppConfig> for IndexOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            batch_size: config.index_batch_size,
            skip_hidden: config.skip_hidden,
            ignore_patterns: config.ignore_patterns.clone(),
            workers: config.index_workers,
        }
    }
}

#[derive(Debug, Default)]
pub struct IndexStats {
    pub entries: usize,
    pub batches: usize,
    pub duration: Duration,
}

/// Walks a directory tree and stores one [`FileRecord`] per entry.
pub struct Indexer {
    options: IndexOptions,
}

/// Decides which entries the walk yields and which directories it descends into.
struct EntryFilter {
    skip_hidden: bool,
    ignore: Vec<Pattern>,
    excluded: Vec<PathBuf>,
}

impl EntryFilter {
    fn keep(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return true;
        }

        let path = entry.path();
        if self.excluded.iter().any(|excluded| excluded == path) {
            return false;
        }

        if self.skip_hidden {
            let name = entry.file_name().to_string_lossy();
            if platform::is_hidden(path, &name) {
                return false;
            }
        }

        !self.ignore.iter().any(|pattern| pattern.matches_path(path))
    }
}

impl Indexer {
    pub fn new(options: IndexOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &IndexOptions {
        &self.options
    }

    /// Index everything under `root` into `db`.
    ///
    /// A walk error stops the run; batches flushed before it stay in the store.
    pub fn index(
        &self,
        db: &Database,
        root: &Path,
        reporter: &dyn ProgressReporter,
    ) -> Result<IndexStats> {
        if self.options.batch_size < 1 {
            return Err(Error::InvalidConfiguration(format!(
                "index batch size must be at least 1, got {}",
                self.options.batch_size
            )));
        }
        if self.options.workers < 1 {
            return Err(Error::InvalidConfiguration(
                "index workers must be at least 1".to_string(),
            ));
        }
        let worker_db_path = if self.options.workers > 1 {
            match db.path() {
                Some(path) => Some(path.to_path_buf()),
                None => {
                    return Err(Error::InvalidConfiguration(
                        "concurrent indexing needs a file-backed database".to_string(),
                    ))
                }
            }
        } else {
            None
        };

        let ignore = self
            .options
            .ignore_patterns
            .iter()
            .map(|glob| Pattern::new(glob))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let root = fs::canonicalize(root)?;
        let root_display = root.to_string_lossy().into_owned();
        let filter = EntryFilter {
            skip_hidden: self.options.skip_hidden,
            ignore,
            excluded: excluded_store_paths(db),
        };

        info!("Indexing {}", root_display);
        reporter.on_index_start(&root_display);
        let start = Instant::now();

        let records = walk_records(&root, &filter);
        let mut stats = match worker_db_path {
            Some(db_path) => super::concurrent::flush_with_workers(
                records,
                &db_path,
                self.options.batch_size,
                self.options.workers,
                reporter,
            )?,
            None => flush_inline(records, db, self.options.batch_size, reporter)?,
        };
        stats.duration = start.elapsed();

        info!(
            "Finished indexing {}: {} entries in {} batches",
            root_display, stats.entries, stats.batches
        );
        reporter.on_index_complete(stats.entries, stats.duration.as_secs_f64());
        Ok(stats)
    }
}

/// Lazy depth-first sequence of records under `root`.
fn walk_records<'a>(
    root: &Path,
    filter: &'a EntryFilter,
) -> impl Iterator<Item = Result<FileRecord>> + 'a {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(move |entry| filter.keep(entry))
        .filter_map(|entry| match entry {
            Ok(entry) => to_record(&entry).transpose(),
            Err(err) => Some(Err(Error::Filesystem(err))),
        })
}

/// `Ok(None)` for entries that are not stored at all (sockets, FIFOs, devices).
fn to_record(entry: &DirEntry) -> Result<Option<FileRecord>> {
    if is_special(&entry.file_type()) {
        debug!("Skipping special file {}", entry.path().display());
        return Ok(None);
    }

    let metadata = entry.metadata()?;
    let modified_at = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);

    Ok(Some(FileRecord::new(
        entry.path().to_string_lossy().into_owned(),
        metadata.len() as i64,
        modified_at,
        entry.file_type().is_dir(),
    )))
}

#[cfg(unix)]
fn is_special(file_type: &fs::FileType) -> bool {
    use std::os::unix::fs::FileTypeExt;
    file_type.is_socket()
        || file_type.is_fifo()
        || file_type.is_block_device()
        || file_type.is_char_device()
}

#[cfg(not(unix))]
fn is_special(_file_type: &fs::FileType) -> bool {
    false
}

/// The database file and its sidecars, so a walk over the database's own
/// directory never records them.
fn excluded_store_paths(db: &Database) -> Vec<PathBuf> {
    let Some(path) = db.path() else {
        return Vec::new();
    };
    let path = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let mut excluded = Database::sidecar_paths(&path);
    excluded.push(path);
    excluded
}

fn flush_inline<I>(
    records: I,
    db: &Database,
    batch_size: usize,
    reporter: &dyn ProgressReporter,
) -> Result<IndexStats>
where
    I: Iterator<Item = Result<FileRecord>>,
{
    let mut stats = IndexStats::default();
    let mut pending: Vec<FileRecord> = Vec::with_capacity(batch_size);

    for record in records {
        pending.push(record?);
        if pending.len() == batch_size {
            flush_batch(db, &mut pending, &mut stats, reporter)?;
        }
    }

    if !pending.is_empty() {
        flush_batch(db, &mut pending, &mut stats, reporter)?;
    }

    Ok(stats)
}

fn flush_batch(
    db: &Database,
    pending: &mut Vec<FileRecord>,
    stats: &mut IndexStats,
    reporter: &dyn ProgressReporter,
) -> Result<()> {
    let written = db.insert_files(pending)?;
    pending.clear();
    stats.entries += written;
    stats.batches += 1;
    debug!("Processed {} files/folders", stats.entries);
    reporter.on_index_progress(stats.entries);
    Ok(())
}
