//! Round-robin pool of read connections to the catalogue.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags};

use crate::error::{StoreError, StoreResult};

const MAX_POOL_SIZE: usize = 8;

pub struct ReadPool {
    connections: Vec<Mutex<Connection>>,
    next: AtomicUsize,
}

impl ReadPool {
    /// Open read-only connections to a database file.
    pub fn open(path: &Path, pool_size: usize) -> StoreResult<Self> {
        if !path.exists() {
            return Err(StoreError::Pool {
                message: format!("database file not found: {}", path.display()),
            });
        }
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        Self::open_with(pool_size, || Connection::open_with_flags(path, flags))
    }

    /// Open connections to a shared-cache URI such as
    /// `file:movies?mode=memory&cache=shared`.
    ///
    /// Connections are read-write at the SQLite level; `query_only` keeps
    /// them from modifying the catalogue.
    pub fn open_uri(uri: &str, pool_size: usize) -> StoreResult<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        Self::open_with(pool_size, || Connection::open_with_flags(uri, flags))
    }

    fn open_with<F>(pool_size: usize, open: F) -> StoreResult<Self>
    where
        F: Fn() -> rusqlite::Result<Connection>,
    {
        let size = pool_size.clamp(1, MAX_POOL_SIZE);
        let mut connections = Vec::with_capacity(size);
        for _ in 0..size {
            let conn = open()?;
            apply_read_pragmas(&conn)?;
            connections.push(Mutex::new(conn));
        }
        Ok(Self {
            connections,
            next: AtomicUsize::new(0),
        })
    }

    /// Run `f` with the next connection in round-robin order.
    pub fn with_conn<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T>,
    {
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.connections.len();
        let guard = self.connections[idx].lock();
        f(&guard)
    }

    pub fn size(&self) -> usize {
        self.connections.len()
    }
}

fn apply_read_pragmas(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "
        PRAGMA query_only = ON;
        PRAGMA busy_timeout = 5000;
        PRAGMA cache_size = -16000;
        ",
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_pool_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ReadPool::open(&dir.path().join("absent.db"), 2).err().unwrap();
        assert!(matches!(err, StoreError::Pool { .. }));
    }

    #[test]
    fn test_pool_size_is_clamped() {
        let uri = format!("file:pool_{}?mode=memory&cache=shared", uuid::Uuid::new_v4().simple());
        assert_eq!(ReadPool::open_uri(&uri, 0).unwrap().size(), 1);
        assert_eq!(ReadPool::open_uri(&uri, 64).unwrap().size(), MAX_POOL_SIZE);
    }

    #[test]
    fn test_connections_are_query_only() {
        let uri = format!("file:pool_{}?mode=memory&cache=shared", uuid::Uuid::new_v4().simple());
        let pool = ReadPool::open_uri(&uri, 1).unwrap();
        let result = pool.with_conn(|conn| {
            conn.execute_batch("CREATE TABLE t (x INTEGER)")?;
            Ok(())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_round_robin_reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch("CREATE TABLE movies (id INTEGER PRIMARY KEY); INSERT INTO movies VALUES (1);")
                .unwrap();
        }

        let pool = ReadPool::open(&path, 3).unwrap();
        for _ in 0..6 {
            let count: i64 = pool
                .with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM movies", [], |r| r.get(0))?))
                .unwrap();
            assert_eq!(count, 1);
        }
    }
}
