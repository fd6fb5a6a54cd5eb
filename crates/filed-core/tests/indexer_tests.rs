use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::UNIX_EPOCH;

use filed_core::scanner::{IndexOptions, Indexer};
use filed_core::storage::Database;
use filed_core::{Error, ProgressReporter, SilentReporter};
use tempfile::tempdir;

#[derive(Debug, PartialEq)]
struct StoredEntry {
    path: String,
    size: i64,
    modified_at: i64,
    is_directory: bool,
}

fn stored_entries(db: &Database) -> Vec<StoredEntry> {
    db.connection()
        .prepare("SELECT path, size, modified_at, is_directory FROM files ORDER BY path")
        .unwrap()
        .query_map([], |row| {
            Ok(StoredEntry {
                path: row.get(0)?,
                size: row.get(1)?,
                modified_at: row.get(2)?,
                is_directory: row.get(3)?,
            })
        })
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

fn stored_paths(db: &Database) -> Vec<String> {
    stored_entries(db).into_iter().map(|e| e.path).collect()
}

fn expected_entry(path: &Path) -> StoredEntry {
    let metadata = fs::symlink_metadata(path).unwrap();
    StoredEntry {
        path: path.to_string_lossy().into_owned(),
        size: metadata.len() as i64,
        modified_at: metadata
            .modified()
            .unwrap()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64,
        is_directory: metadata.is_dir(),
    }
}

fn indexer(batch_size: usize, skip_hidden: bool) -> Indexer {
    Indexer::new(IndexOptions {
        batch_size,
        skip_hidden,
        ..IndexOptions::default()
    })
}

/// Layout:
///   root/
///     top.txt          ("top")
///     docs/
///       a.md           ("alpha")
///       nested/
///         b.md         ("bravo!")
///     .hidden_file     ("secret")
///     .git/
///       config         ("[core]")
///       objects/
///         blob         ("blob")
fn create_tree(base: &Path) -> PathBuf {
    let root = base.join("root");
    fs::create_dir_all(root.join("docs/nested")).unwrap();
    fs::create_dir_all(root.join(".git/objects")).unwrap();
    fs::write(root.join("top.txt"), "top").unwrap();
    fs::write(root.join("docs/a.md"), "alpha").unwrap();
    fs::write(root.join("docs/nested/b.md"), "bravo!").unwrap();
    fs::write(root.join(".hidden_file"), "secret").unwrap();
    fs::write(root.join(".git/config"), "[core]").unwrap();
    fs::write(root.join(".git/objects/blob"), "blob").unwrap();
    fs::canonicalize(root).unwrap()
}

fn create_flat_tree(base: &Path, files: usize) -> PathBuf {
    let root = base.join("flat");
    fs::create_dir_all(&root).unwrap();
    for i in 0..files {
        fs::write(root.join(format!("file_{i:03}.dat")), format!("content {i}")).unwrap();
    }
    fs::canonicalize(root).unwrap()
}

/// Remembers the last flushed-entries count.
#[derive(Default)]
struct FlushCounter {
    flushed: AtomicUsize,
}

impl ProgressReporter for FlushCounter {
    fn on_index_progress(&self, entries_flushed: usize) {
        self.flushed.store(entries_flushed, Ordering::SeqCst);
    }
}

/// A flat tree plus `locked/inner.txt` with `locked/` set to mode 000.
/// `None` when the process can still list the directory (running as root).
#[cfg(unix)]
fn create_locked_tree(base: &Path) -> Option<(PathBuf, PathBuf)> {
    use std::os::unix::fs::PermissionsExt;

    let root = create_flat_tree(base, 6);
    let locked = root.join("locked");
    fs::create_dir_all(&locked).unwrap();
    fs::write(locked.join("inner.txt"), "inner").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    if fs::read_dir(&locked).is_ok() {
        unlock(&locked);
        return None;
    }
    Some((root, locked))
}

#[cfg(unix)]
fn unlock(dir: &Path) {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(dir, fs::Permissions::from_mode(0o755)).unwrap();
}

#[test]
fn test_every_entry_is_recorded_once_with_metadata() {
    let tmp = tempdir().unwrap();
    let root = create_tree(tmp.path());
    let db = Database::open_in_memory().unwrap();

    let stats = indexer(3, false).index(&db, &root, &SilentReporter).unwrap();

    let mut expected: Vec<StoredEntry> = [
        "",
        "top.txt",
        "docs",
        "docs/a.md",
        "docs/nested",
        "docs/nested/b.md",
        ".hidden_file",
        ".git",
        ".git/config",
        ".git/objects",
        ".git/objects/blob",
    ]
    .iter()
    .map(|rel| {
        if rel.is_empty() {
            expected_entry(&root)
        } else {
            expected_entry(&root.join(rel))
        }
    })
    .collect();
    expected.sort_by(|a, b| a.path.cmp(&b.path));

    assert_eq!(stored_entries(&db), expected);
    assert_eq!(stats.entries, 11);
    assert_eq!(stats.batches, 4);
}

#[test]
fn test_skip_hidden_prunes_hidden_subtrees() {
    let tmp = tempdir().unwrap();
    let root = create_tree(tmp.path());
    let db = Database::open_in_memory().unwrap();

    indexer(100, true).index(&db, &root, &SilentReporter).unwrap();

    let paths = stored_paths(&db);
    let git_dir = root.join(".git").to_string_lossy().into_owned();
    assert!(paths.iter().all(|p| !p.starts_with(&git_dir)));
    assert!(!paths.contains(&root.join(".hidden_file").to_string_lossy().into_owned()));
    assert_eq!(paths.len(), 6);
    assert!(paths.contains(&root.join("docs/nested/b.md").to_string_lossy().into_owned()));
}

#[test]
fn test_hidden_root_is_still_indexed() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join(".config");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("settings.toml"), "x = 1").unwrap();
    let db = Database::open_in_memory().unwrap();

    let stats = indexer(10, true).index(&db, &root, &SilentReporter).unwrap();
    assert_eq!(stats.entries, 2);
}

#[test]
fn test_ignore_patterns_prune_directories() {
    let tmp = tempdir().unwrap();
    let root = create_tree(tmp.path());
    let db = Database::open_in_memory().unwrap();

    let indexer = Indexer::new(IndexOptions {
        batch_size: 10,
        ignore_patterns: vec!["*nested".to_string(), "*.txt".to_string()],
        ..IndexOptions::default()
    });
    indexer.index(&db, &root, &SilentReporter).unwrap();

    let paths = stored_paths(&db);
    assert!(paths.iter().all(|p| !p.contains("nested")));
    assert!(paths.iter().all(|p| !p.ends_with(".txt")));
    assert!(paths.contains(&root.join("docs/a.md").to_string_lossy().into_owned()));
}

#[test]
fn test_exact_batch_size_flushes_once() {
    let tmp = tempdir().unwrap();
    // root directory + 4 files = 5 entries
    let root = create_flat_tree(tmp.path(), 4);
    let db = Database::open_in_memory().unwrap();

    let stats = indexer(5, false).index(&db, &root, &SilentReporter).unwrap();
    assert_eq!(stats.entries, 5);
    assert_eq!(stats.batches, 1);
    assert_eq!(db.count_files().unwrap(), 5);
}

#[test]
fn test_one_over_batch_size_flushes_a_single_row_batch() {
    let tmp = tempdir().unwrap();
    let root = create_flat_tree(tmp.path(), 5);
    let db = Database::open_in_memory().unwrap();

    let stats = indexer(5, false).index(&db, &root, &SilentReporter).unwrap();
    assert_eq!(stats.entries, 6);
    assert_eq!(stats.batches, 2);
    assert_eq!(db.count_files().unwrap(), 6);
}

#[test]
fn test_zero_batch_size_is_rejected() {
    let tmp = tempdir().unwrap();
    let root = create_flat_tree(tmp.path(), 1);
    let db = Database::open_in_memory().unwrap();

    let err = indexer(0, false).index(&db, &root, &SilentReporter).unwrap_err();
    assert!(matches!(err, Error::InvalidConfiguration(_)));
    assert_eq!(db.count_files().unwrap(), 0);
}

#[test]
fn test_missing_root_fails() {
    let tmp = tempdir().unwrap();
    let db = Database::open_in_memory().unwrap();
    let result = indexer(10, false).index(&db, &tmp.path().join("gone"), &SilentReporter);
    assert!(result.is_err());
    assert_eq!(db.count_files().unwrap(), 0);
}

#[test]
fn test_database_and_sidecars_are_not_indexed() {
    let tmp = tempdir().unwrap();
    let root = create_flat_tree(tmp.path(), 2);
    let db_path = root.join("catalog.db");
    let db = Database::open(&db_path).unwrap();
    // make sure the sidecars exist on disk while walking
    fs::write(root.join("catalog.db-journal"), "").unwrap();

    indexer(1, false).index(&db, &root, &SilentReporter).unwrap();

    let paths = stored_paths(&db);
    assert!(paths.iter().all(|p| !p.contains("catalog.db")));
    assert_eq!(paths.len(), 3);
}

#[test]
fn test_reindexing_duplicates_rows() {
    let tmp = tempdir().unwrap();
    let root = create_flat_tree(tmp.path(), 3);
    let db = Database::open_in_memory().unwrap();

    indexer(2, false).index(&db, &root, &SilentReporter).unwrap();
    indexer(2, false).index(&db, &root, &SilentReporter).unwrap();

    assert_eq!(db.count_files().unwrap(), 8);
    let first = root.join("file_000.dat").to_string_lossy().into_owned();
    assert_eq!(db.find_files_by_path(&first).unwrap().len(), 2);
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_recorded_but_not_followed() {
    let tmp = tempdir().unwrap();
    let outside = tmp.path().join("outside");
    fs::create_dir_all(&outside).unwrap();
    fs::write(outside.join("elsewhere.txt"), "far away").unwrap();

    let root = create_flat_tree(tmp.path(), 1);
    std::os::unix::fs::symlink(&outside, root.join("link")).unwrap();
    let db = Database::open_in_memory().unwrap();

    indexer(10, false).index(&db, &root, &SilentReporter).unwrap();

    let entries = stored_entries(&db);
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| !e.path.contains("elsewhere")));
    let link = entries.iter().find(|e| e.path.ends_with("/link")).unwrap();
    assert!(!link.is_directory);
}

#[cfg(unix)]
#[test]
fn test_sockets_are_skipped() {
    let tmp = tempdir().unwrap();
    let root = create_flat_tree(tmp.path(), 1);
    let _listener = std::os::unix::net::UnixListener::bind(root.join("agent.sock")).unwrap();
    let db = Database::open_in_memory().unwrap();

    indexer(10, false).index(&db, &root, &SilentReporter).unwrap();

    let paths = stored_paths(&db);
    assert_eq!(paths.len(), 2);
    assert!(paths.iter().all(|p| !p.ends_with("agent.sock")));
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_aborts_and_keeps_flushed_batches() {
    let tmp = tempdir().unwrap();
    let Some((root, locked)) = create_locked_tree(tmp.path()) else {
        return;
    };
    let db = Database::open_in_memory().unwrap();
    let reporter = FlushCounter::default();

    let result = indexer(1, false).index(&db, &root, &reporter);
    unlock(&locked);

    assert!(matches!(result, Err(Error::Filesystem(_))));
    let flushed = reporter.flushed.load(Ordering::SeqCst);
    assert!(flushed >= 2, "root and locked/ are flushed before the error");
    assert_eq!(db.count_files().unwrap() as usize, flushed);
    assert!(stored_paths(&db).iter().all(|p| !p.ends_with("inner.txt")));
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_aborts_concurrent_workers() {
    let tmp = tempdir().unwrap();
    let Some((root, locked)) = create_locked_tree(tmp.path()) else {
        return;
    };
    let db_dir = tempdir().unwrap();
    let db = Database::open(db_dir.path().join("catalog.db")).unwrap();
    let reporter = FlushCounter::default();

    let result = Indexer::new(IndexOptions {
        batch_size: 1,
        workers: 2,
        ..IndexOptions::default()
    })
    .index(&db, &root, &reporter);
    unlock(&locked);

    assert!(matches!(result, Err(Error::Filesystem(_))));
    let flushed = reporter.flushed.load(Ordering::SeqCst);
    assert!(flushed >= 2, "queued batches still reach the store");
    assert_eq!(db.count_files().unwrap() as usize, flushed);
    assert!(stored_paths(&db).iter().all(|p| !p.ends_with("inner.txt")));
}

#[test]
fn test_concurrent_workers_store_every_entry_once() {
    let tmp = tempdir().unwrap();
    let root = create_flat_tree(tmp.path(), 40);
    let db_dir = tempdir().unwrap();
    let db = Database::open(db_dir.path().join("catalog.db")).unwrap();

    let indexer = Indexer::new(IndexOptions {
        batch_size: 3,
        workers: 4,
        ..IndexOptions::default()
    });
    let stats = indexer.index(&db, &root, &SilentReporter).unwrap();

    assert_eq!(stats.entries, 41);
    assert_eq!(stats.batches, 14);
    let paths = stored_paths(&db);
    assert_eq!(paths.len(), 41);
    let mut unique = paths.clone();
    unique.dedup();
    assert_eq!(unique.len(), 41);
}
