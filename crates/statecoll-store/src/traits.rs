//! KvStore trait: the host byte-store interface.
//!
//! The collection layer only ever talks to storage through this trait.
//! Implementations include an in-memory ordered map and SQLite.

use crate::error::Result;

/// Iteration direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Order {
    /// Smallest key first.
    #[default]
    Ascending,
    /// Greatest key first.
    Descending,
}

/// A raw `(key, value)` pair as stored.
pub type RawEntry = (Vec<u8>, Vec<u8>);

/// Cursor over raw entries, in byte order.
pub type RawIter<'a> = Box<dyn Iterator<Item = Result<RawEntry>> + 'a>;

/// One staged write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Set { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

/// An ordered list of writes applied as one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.ops.push(BatchOp::Set {
            key: key.into(),
            value: value.into(),
        });
    }

    pub fn delete(&mut self, key: impl Into<Vec<u8>>) {
        self.ops.push(BatchOp::Delete { key: key.into() });
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }
}

/// The KvStore trait: synchronous ordered byte store.
///
/// Keys compare byte-lexicographically. Methods take `&self`; implementations
/// provide their own interior locking.
///
/// # Design Notes
///
/// - **Idempotent deletes**: deleting an absent key is `Ok(())`.
/// - **Half-open ranges**: `iterate` covers `[start, end)`; `None` leaves that
///   side unbounded.
/// - **Point-in-time cursors**: a cursor returned by `iterate` does not
///   observe writes made after it was created.
pub trait KvStore: Send + Sync {
    /// Get the value stored under `key`.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Check if `key` is present.
    fn has(&self, key: &[u8]) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Store `value` under `key`, overwriting any previous value.
    fn set(&self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Remove `key` if present.
    fn delete(&self, key: &[u8]) -> Result<()>;

    /// Iterate entries in `[start, end)`.
    fn iterate(&self, start: Option<&[u8]>, end: Option<&[u8]>, order: Order) -> Result<RawIter<'_>>;

    /// Apply every operation of `batch` in order.
    ///
    /// The default applies them one by one; stores that can do better apply
    /// the batch atomically.
    fn write_batch(&self, batch: WriteBatch) -> Result<()> {
        for op in batch.into_ops() {
            match op {
                BatchOp::Set { key, value } => self.set(&key, &value)?,
                BatchOp::Delete { key } => self.delete(&key)?,
            }
        }
        Ok(())
    }
}

/// True if `key` lies in `[start, end)`.
pub fn in_range(key: &[u8], start: Option<&[u8]>, end: Option<&[u8]>) -> bool {
    start.map_or(true, |s| key >= s) && end.map_or(true, |e| key < e)
}
