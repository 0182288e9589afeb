//! SQLite implementation of the KvStore trait.
//!
//! Every entry lives in one `kv` table keyed by a BLOB primary key. SQLite
//! compares BLOBs with memcmp, so range scans come back in the same order the
//! in-memory store produces.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use crate::config::SqliteConfig;
use crate::error::Result;
use crate::migration;
use crate::traits::{BatchOp, KvStore, Order, RawEntry, RawIter, WriteBatch};

/// SQLite-based store implementation.
///
/// Thread-safe via an internal Mutex around a single connection.
pub struct SqliteKvStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteKvStore").finish_non_exhaustive()
    }
}

impl SqliteKvStore {
    /// Open a SQLite database at the given path with the default config.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, &SqliteConfig::default())
    }

    /// Open a SQLite database at the given path.
    pub fn open_with(path: impl AsRef<Path>, config: &SqliteConfig) -> Result<Self> {
        let path = path.as_ref();
        let mut conn = Connection::open(path)?;
        configure(&conn, config, true)?;
        migration::migrate(&mut conn)?;
        tracing::debug!(path = %path.display(), wal = config.wal, "opened sqlite kv store");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        configure(&conn, &SqliteConfig::default(), false)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock()?;
        f(&conn)
    }

    fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self.conn.lock()?;
        f(&mut conn)
    }
}

fn configure(conn: &Connection, config: &SqliteConfig, on_disk: bool) -> Result<()> {
    conn.busy_timeout(config.busy_timeout)?;
    if on_disk && config.wal {
        // journal_mode answers with the mode now in effect.
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
    }
    conn.pragma_update(None, "synchronous", config.synchronous.as_pragma())?;
    Ok(())
}

/// Build the range query for `[start, end)` in the given order.
fn range_query<'a>(start: Option<&'a [u8]>, end: Option<&'a [u8]>, order: Order) -> (String, Vec<&'a [u8]>) {
    let mut sql = String::from("SELECT key, value FROM kv");
    let mut clauses = Vec::new();
    let mut args = Vec::new();

    if let Some(s) = start {
        args.push(s);
        clauses.push(format!("key >= ?{}", args.len()));
    }
    if let Some(e) = end {
        args.push(e);
        clauses.push(format!("key < ?{}", args.len()));
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(match order {
        Order::Ascending => " ORDER BY key ASC",
        Order::Descending => " ORDER BY key DESC",
    });

    (sql, args)
}

impl KvStore for SqliteKvStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.with_conn(|conn| {
            let value = conn
                .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(value)
        })
    }

    fn has(&self, key: &[u8]) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row("SELECT 1 FROM kv WHERE key = ?1", params![key], |_| Ok(()))
                .optional()?;
            Ok(found.is_some())
        })
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
            Ok(())
        })
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
            Ok(())
        })
    }

    fn iterate(&self, start: Option<&[u8]>, end: Option<&[u8]>, order: Order) -> Result<RawIter<'_>> {
        if let (Some(s), Some(e)) = (start, end) {
            if s >= e {
                return Ok(Box::new(std::iter::empty()));
            }
        }

        let (sql, args) = range_query(start, end, order);
        // Rows are read eagerly so the cursor is a point-in-time snapshot and
        // the connection lock is not held while the caller iterates.
        let entries: Vec<RawEntry> = self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(args.iter()), |row| {
                    Ok((row.get(0)?, row.get(1)?))
                })?
                .collect::<rusqlite::Result<Vec<RawEntry>>>()?;
            Ok(rows)
        })?;

        Ok(Box::new(entries.into_iter().map(Ok)))
    }

    fn write_batch(&self, batch: WriteBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let count = batch.len();
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            for op in batch.into_ops() {
                match op {
                    BatchOp::Set { key, value } => {
                        tx.execute(
                            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                            params![key, value],
                        )?;
                    }
                    BatchOp::Delete { key } => {
                        tx.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
                    }
                }
            }
            tx.commit()?;
            Ok(())
        })?;
        tracing::trace!(ops = count, "committed write batch");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(iter: RawIter<'_>) -> Vec<Vec<u8>> {
        iter.map(|e| e.unwrap().0).collect()
    }

    #[test]
    fn test_sqlite_basic() {
        let store = SqliteKvStore::open_memory().unwrap();

        assert_eq!(store.get(b"missing").unwrap(), None);
        store.set(b"k1", b"v1").unwrap();
        assert_eq!(store.get(b"k1").unwrap(), Some(b"v1".to_vec()));
        assert!(store.has(b"k1").unwrap());

        store.set(b"k1", b"v2").unwrap();
        assert_eq!(store.get(b"k1").unwrap(), Some(b"v2".to_vec()));

        store.delete(b"k1").unwrap();
        store.delete(b"k1").unwrap();
        assert!(!store.has(b"k1").unwrap());
    }

    #[test]
    fn test_sqlite_empty_value_is_present() {
        let store = SqliteKvStore::open_memory().unwrap();
        store.set(b"k", b"").unwrap();
        assert_eq!(store.get(b"k").unwrap(), Some(Vec::new()));
    }

    #[test]
    fn test_sqlite_byte_order() {
        let store = SqliteKvStore::open_memory().unwrap();
        let inserted: [&[u8]; 5] = [&[0xff], &[0x00, 0x01], &[0x00], &[0x7f, 0x00], &[0x80]];
        for k in inserted {
            store.set(k, b"x").unwrap();
        }

        let asc = keys(store.iterate(None, None, Order::Ascending).unwrap());
        assert_eq!(
            asc,
            vec![vec![0x00], vec![0x00, 0x01], vec![0x7f, 0x00], vec![0x80], vec![0xff]]
        );

        let desc = keys(
            store
                .iterate(Some(&[0x00, 0x01][..]), Some(&[0xff][..]), Order::Descending)
                .unwrap(),
        );
        assert_eq!(desc, vec![vec![0x80], vec![0x7f, 0x00], vec![0x00, 0x01]]);
    }

    #[test]
    fn test_sqlite_write_batch() {
        let store = SqliteKvStore::open_memory().unwrap();
        store.set(b"old", b"1").unwrap();

        let mut batch = WriteBatch::new();
        batch.set(b"new".to_vec(), b"2".to_vec());
        batch.delete(b"old".to_vec());
        store.write_batch(batch).unwrap();

        assert_eq!(store.get(b"new").unwrap(), Some(b"2".to_vec()));
        assert_eq!(store.get(b"old").unwrap(), None);
    }

    #[test]
    fn test_sqlite_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv.db");

        {
            let store = SqliteKvStore::open(&path).unwrap();
            store.set(b"durable", b"yes").unwrap();
        }

        let store = SqliteKvStore::open(&path).unwrap();
        assert_eq!(store.get(b"durable").unwrap(), Some(b"yes".to_vec()));
    }

    proptest::proptest! {
        #[test]
        fn test_sqlite_iterates_like_memory(
            stored in proptest::collection::btree_set(proptest::collection::vec(proptest::prelude::any::<u8>(), 0..4), 0..24),
            start in proptest::option::of(proptest::collection::vec(proptest::prelude::any::<u8>(), 0..3)),
            end in proptest::option::of(proptest::collection::vec(proptest::prelude::any::<u8>(), 0..3)),
        ) {
            let sqlite = SqliteKvStore::open_memory().unwrap();
            let memory = crate::MemoryKvStore::new();
            for k in &stored {
                sqlite.set(k, k).unwrap();
                memory.set(k, k).unwrap();
            }

            for order in [Order::Ascending, Order::Descending] {
                let a = keys(sqlite.iterate(start.as_deref(), end.as_deref(), order).unwrap());
                let b = keys(memory.iterate(start.as_deref(), end.as_deref(), order).unwrap());
                proptest::prop_assert_eq!(a, b);
            }
        }
    }
}
