pub mod error;
pub mod filter;
pub mod messages;
pub mod migrations;
pub mod models;
pub mod timestamps;
pub mod users;

#[cfg(test)]
pub(crate) mod testing;

use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

pub use error::{DbError, DbResult};
pub use messages::{MessageDraft, MessageFilter, MessageStore};
pub use users::{NewUser, UserFilter, UserStore};

/// Store settings, built once at startup.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
    pub reader_pool_size: usize,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("courier.db"),
            reader_pool_size: 4,
        }
    }
}

/// Read/write capability for one entity table.
pub trait Repository {
    type Filter;
    type Record;
    type Draft;

    fn read(&self, filter: &Self::Filter) -> DbResult<Vec<Self::Record>>;
    fn write(&self, draft: &Self::Draft) -> DbResult<i64>;
}

/// SQLite handle with a reader/writer split: one writer connection and a
/// small round-robin pool of read-only connections.
pub struct Database {
    writer: Mutex<Connection>,
    readers: Vec<Mutex<Connection>>,
    reader_idx: AtomicUsize,
}

impl Database {
    pub fn open(config: &DbConfig) -> DbResult<Self> {
        if config.reader_pool_size == 0 {
            return Err(DbError::invalid("reader_pool_size", "must be at least 1"));
        }

        let writer = Connection::open(&config.path)?;

        // WAL mode for concurrent reads
        writer.pragma_update(None, "journal_mode", "WAL")?;
        writer.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run(&writer)?;

        let mut readers = Vec::with_capacity(config.reader_pool_size);
        for _ in 0..config.reader_pool_size {
            let conn = Connection::open_with_flags(
                &config.path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            conn.pragma_update(None, "journal_mode", "WAL")?;
            readers.push(Mutex::new(conn));
        }

        info!(
            "Database opened at {} (1 writer + {} readers)",
            config.path.display(),
            config.reader_pool_size
        );
        Ok(Self {
            writer: Mutex::new(writer),
            readers,
            reader_idx: AtomicUsize::new(0),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T>,
    {
        let idx = self.reader_idx.fetch_add(1, Ordering::Relaxed) % self.readers.len();
        let conn = self.readers[idx]
            .lock()
            .map_err(|e| DbError::Pool(format!("reader lock poisoned: {}", e)))?;
        f(&conn)
    }

    pub fn with_conn_mut<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T>,
    {
        let conn = self
            .writer
            .lock()
            .map_err(|e| DbError::Pool(format!("writer lock poisoned: {}", e)))?;
        f(&conn)
    }
}
