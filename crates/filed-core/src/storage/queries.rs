use super::models::*;
use super::paginator::{DuplicateGroupPaginator, FilePaginator, Paginator};
use super::sqlite::Database;
use rusqlite::{params, Result, Row};
use tracing::debug;

const FILE_COLUMNS: &str = "id, path, size, modified_at, is_directory, hashed_at, hash";

fn map_file_record(row: &Row<'_>) -> Result<FileRecord> {
    Ok(FileRecord {
        id: row.get(0)?,
        path: row.get(1)?,
        size: row.get(2)?,
        modified_at: row.get(3)?,
        is_directory: row.get(4)?,
        hashed_at: row.get(5)?,
        hash: row.get(6)?,
    })
}

fn map_duplicate_group(row: &Row<'_>) -> Result<DuplicateGroup> {
    Ok(DuplicateGroup {
        hash: row.get(0)?,
        file_size: row.get(1)?,
        file_count: row.get(2)?,
        total_size: row.get(3)?,
    })
}

impl Database {
    // ── Files ────────────────────────────────────────────────────

    /// Insert every record in one transaction. Record ids are left untouched.
    pub fn insert_files(&self, files: &[FileRecord]) -> Result<usize> {
        let tx = self.connection().unchecked_transaction()?;
        let mut count = 0;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO files (path, size, modified_at, is_directory) \
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for file in files {
                count += stmt.execute(params![
                    file.path,
                    file.size,
                    file.modified_at,
                    file.is_directory,
                ])?;
            }
        }
        tx.commit()?;
        debug!("Inserted {} file records", count);
        Ok(count)
    }

    /// Write `hash` and `hashed_at` for each digest's file id in one transaction.
    pub fn update_file_hashes(&self, digests: &[HashDigest]) -> Result<usize> {
        let tx = self.connection().unchecked_transaction()?;
        let mut count = 0;
        {
            let mut stmt =
                tx.prepare_cached("UPDATE files SET hash = ?1, hashed_at = ?2 WHERE id = ?3")?;
            for digest in digests {
                count += stmt.execute(params![digest.hash, digest.hashed_at, digest.file_id])?;
            }
        }
        tx.commit()?;
        debug!("Updated hashes for {} files", count);
        Ok(count)
    }

    /// All non-directory records, ordered by id.
    pub fn file_cursor(&self, page_size: usize) -> FilePaginator<'_> {
        let query = format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE is_directory = 0 ORDER BY id ASC"
        );
        Paginator::new(self.connection(), &query, page_size, map_file_record)
    }

    pub fn find_files_by_path(&self, path: &str) -> Result<Vec<FileRecord>> {
        let mut stmt = self.connection().prepare(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE path = ?1 ORDER BY id ASC"
        ))?;
        let files = stmt
            .query_map(params![path], map_file_record)?
            .collect::<Result<Vec<_>>>()?;
        Ok(files)
    }

    pub fn count_files(&self) -> Result<i64> {
        self.connection()
            .query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))
    }

    pub fn count_unhashed_files(&self) -> Result<i64> {
        self.connection().query_row(
            "SELECT COUNT(*) FROM files WHERE is_directory = 0 AND hash IS NULL",
            [],
            |row| row.get(0),
        )
    }

    // ── Duplicate Statistics ─────────────────────────────────────

    /// Hash groups across hashed, non-directory files, aggregated by SQLite and ordered by hash.
    pub fn duplicate_group_cursor(&self, page_size: usize) -> DuplicateGroupPaginator<'_> {
        Paginator::new(
            self.connection(),
            "SELECT hash, MIN(size), COUNT(*), SUM(size) \
             FROM files \
             WHERE is_directory = 0 AND hash IS NOT NULL \
             GROUP BY hash \
             ORDER BY hash ASC",
            page_size,
            map_duplicate_group,
        )
    }

    pub fn insert_duplicate_stats(&self, stats: &[DuplicateStat]) -> Result<usize> {
        let tx = self.connection().unchecked_transaction()?;
        let mut count = 0;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO file_statistics (hash, file_count, file_size, total_file_size) \
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for stat in stats {
                count += stmt.execute(params![
                    stat.hash,
                    stat.file_count,
                    stat.file_size,
                    stat.total_file_size,
                ])?;
            }
        }
        tx.commit()?;
        debug!("Inserted {} duplicate statistics rows", count);
        Ok(count)
    }

    /// Stored statistics, largest total size first.
    pub fn list_duplicate_stats(&self, offset: i64, limit: i64) -> Result<Vec<DuplicateStat>> {
        let mut stmt = self.connection().prepare(
            "SELECT id, hash, file_count, file_size, total_file_size \
             FROM file_statistics \
             ORDER BY total_file_size DESC, id ASC LIMIT ?1 OFFSET ?2",
        )?;
        let stats = stmt
            .query_map(params![limit, offset], |row| {
                Ok(DuplicateStat {
                    id: row.get(0)?,
                    hash: row.get(1)?,
                    file_count: row.get(2)?,
                    file_size: row.get(3)?,
                    total_file_size: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(stats)
    }

    pub fn count_duplicate_stats(&self) -> Result<i64> {
        self.connection()
            .query_row("SELECT COUNT(*) FROM file_statistics", [], |row| row.get(0))
    }
}
