//! Fan-out flushing for the indexer.
//!
//! ```text
//! walk thread ── Vec<FileRecord> ──► bounded channel ──► worker 0..N (own connection)
//!                                                             │
//!                                  progress aggregator ◄──────┘ rows flushed
//! ```
//!
//! Each batch is owned by exactly one worker once sent. The walk only blocks
//! when every worker is busy and the channel is full. Write serialization is
//! left to SQLite (WAL + busy timeout).

use super::walk::IndexStats;
use crate::error::{Error, Result};
use crate::progress::ProgressReporter;
use crate::storage::models::FileRecord;
use crate::storage::Database;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use tracing::{debug, error};

pub(crate) fn flush_with_workers<I>(
    records: I,
    db_path: &Path,
    batch_size: usize,
    workers: usize,
    reporter: &dyn ProgressReporter,
) -> Result<IndexStats>
where
    I: Iterator<Item = Result<FileRecord>>,
{
    let (batch_tx, batch_rx) = bounded::<Vec<FileRecord>>(workers);
    let (progress_tx, progress_rx) = unbounded::<usize>();
    let failed = AtomicBool::new(false);

    thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|worker_id| {
                let batch_rx = batch_rx.clone();
                let progress_tx = progress_tx.clone();
                let failed = &failed;
                scope.spawn(move || {
                    let result = run_worker(worker_id, db_path, &batch_rx, &progress_tx);
                    if let Err(ref err) = result {
                        error!("Index worker {} failed: {}", worker_id, err);
                        failed.store(true, Ordering::SeqCst);
                    }
                    result
                })
            })
            .collect();
        drop(batch_rx);
        drop(progress_tx);

        let aggregator = scope.spawn(move || {
            let mut stats = IndexStats::default();
            for written in progress_rx.iter() {
                stats.entries += written;
                stats.batches += 1;
                reporter.on_index_progress(stats.entries);
            }
            stats
        });

        let mut first_error = dispatch_batches(records, &batch_tx, batch_size, &failed).err();
        drop(batch_tx);

        for handle in handles {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    first_error.get_or_insert(err);
                }
                Err(_) => {
                    first_error.get_or_insert(Error::Worker("index worker panicked".to_string()));
                }
            }
        }

        let stats = aggregator
            .join()
            .map_err(|_| Error::Worker("progress aggregator panicked".to_string()))?;

        match first_error {
            Some(err) => Err(err),
            None => Ok(stats),
        }
    })
}

/// Accumulate records into owned batches and hand each one to the pool.
fn dispatch_batches<I>(
    records: I,
    batch_tx: &Sender<Vec<FileRecord>>,
    batch_size: usize,
    failed: &AtomicBool,
) -> Result<()>
where
    I: Iterator<Item = Result<FileRecord>>,
{
    let mut pending: Vec<FileRecord> = Vec::with_capacity(batch_size);

    for record in records {
        if failed.load(Ordering::SeqCst) {
            return Ok(());
        }
        pending.push(record?);
        if pending.len() == batch_size {
            let batch = std::mem::replace(&mut pending, Vec::with_capacity(batch_size));
            if batch_tx.send(batch).is_err() {
                // every worker is gone; the join reports why
                return Ok(());
            }
        }
    }

    if !pending.is_empty() && !failed.load(Ordering::SeqCst) {
        let _ = batch_tx.send(pending);
    }
    Ok(())
}

fn run_worker(
    worker_id: usize,
    db_path: &Path,
    batch_rx: &Receiver<Vec<FileRecord>>,
    progress_tx: &Sender<usize>,
) -> Result<()> {
    let db = Database::open(db_path)?;
    for batch in batch_rx.iter() {
        let written = db.insert_files(&batch)?;
        debug!("Worker {} flushed {} records", worker_id, written);
        let _ = progress_tx.send(written);
    }
    Ok(())
}
