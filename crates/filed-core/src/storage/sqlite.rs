use rusqlite::{Connection, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct Database {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Database {
    /// Open (creating if needed) a database file and make sure the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        let db = Database {
            conn,
            path: Some(path.to_path_buf()),
        };
        db.configure_pragmas()?;
        db.ensure_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn, path: None };
        db.configure_pragmas()?;
        db.ensure_schema()?;
        Ok(db)
    }

    fn configure_pragmas(&self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA busy_timeout = 5000;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -64000;",
        )?;
        debug!("SQLite pragmas configured (5s busy timeout, WAL mode, 64MB cache)");
        Ok(())
    }

    /// Create the file and statistics tables if absent. Safe to call repeatedly.
    pub fn ensure_schema(&self) -> Result<()> {
        self.conn.execute_batch(include_str!("schema.sql"))?;
        debug!("SQLite schema ready");
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Location of the database file, `None` for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Files SQLite may create next to the database file.
    pub fn sidecar_paths(path: &Path) -> Vec<PathBuf> {
        ["-journal", "-wal", "-shm"]
            .iter()
            .map(|suffix| {
                let mut name = path.as_os_str().to_os_string();
                name.push(suffix);
                PathBuf::from(name)
            })
            .collect()
    }
}
