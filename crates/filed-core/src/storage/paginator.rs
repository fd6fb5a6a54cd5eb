use super::models::{DuplicateGroup, FileRecord};
use rusqlite::{params, Connection, Result, Row};

pub type FilePaginator<'db> = Paginator<'db, FileRecord>;
pub type DuplicateGroupPaginator<'db> = Paginator<'db, DuplicateGroup>;

/// Forward-only cursor over a fixed, totally ordered query.
///
/// Every call to [`Paginator::next_page`] re-runs the base query with
/// `LIMIT page_size OFFSET rows_returned_so_far`. An empty page means the
/// result set is exhausted. The base query must order by a key that the
/// caller never mutates while paging, otherwise rows can be skipped or repeated.
pub struct Paginator<'db, T> {
    conn: &'db Connection,
    query: String,
    page_size: usize,
    offset: usize,
    map_row: fn(&Row<'_>) -> Result<T>,
}

impl<'db, T> Paginator<'db, T> {
    /// A `page_size` of 0 is treated as 1.
    pub fn new(
        conn: &'db Connection,
        base_query: &str,
        page_size: usize,
        map_row: fn(&Row<'_>) -> Result<T>,
    ) -> Self {
        Self {
            conn,
            query: format!("{} LIMIT ?1 OFFSET ?2", base_query.trim_end()),
            page_size: page_size.max(1),
            offset: 0,
            map_row,
        }
    }

    /// Fetch the next page. On error the offset is untouched, so the call can be retried.
    pub fn next_page(&mut self) -> Result<Vec<T>> {
        let mut stmt = self.conn.prepare(&self.query)?;
        let rows = stmt
            .query_map(
                params![self.page_size as i64, self.offset as i64],
                self.map_row,
            )?
            .collect::<Result<Vec<_>>>()?;
        self.offset += rows.len();
        Ok(rows)
    }

    /// Number of rows returned so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }
}
