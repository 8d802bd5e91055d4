use std::path::PathBuf;
use std::sync::Arc;

use crate::{Database, DbConfig};

/// A database file under the OS temp dir, removed on drop.
pub struct TempDb {
    pub db: Arc<Database>,
    path: PathBuf,
}

impl TempDb {
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("courier-test-{}.db", uuid::Uuid::new_v4()));
        let config = DbConfig {
            path: path.clone(),
            reader_pool_size: 2,
        };
        let db = Arc::new(Database::open(&config).expect("open temp db"));
        Self { db, path }
    }

    pub fn count(&self, table: &str) -> i64 {
        self.db
            .with_conn(|conn| {
                Ok(conn.query_row(&format!("SELECT COUNT(*) FROM \"{}\"", table), [], |r| {
                    r.get(0)
                })?)
            })
            .expect("count rows")
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut p = self.path.clone().into_os_string();
            p.push(suffix);
            let _ = std::fs::remove_file(p);
        }
    }
}
