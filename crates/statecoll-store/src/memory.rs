//! In-memory implementation of the KvStore trait.
//!
//! Backed by a `BTreeMap`, whose `Vec<u8>` ordering is exactly the
//! byte-lexicographic order the trait promises. Nothing is persisted.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::RwLock;

use crate::error::Result;
use crate::traits::{BatchOp, KvStore, Order, RawEntry, RawIter, WriteBatch};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    inner: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryKvStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> Result<usize> {
        Ok(self.inner.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.inner.read()?.is_empty())
    }
}

/// Collect the entries of `map` in `[start, end)` in the requested order.
pub(crate) fn collect_range(
    map: &BTreeMap<Vec<u8>, Vec<u8>>,
    start: Option<&[u8]>,
    end: Option<&[u8]>,
    order: Order,
) -> Vec<RawEntry> {
    if let (Some(s), Some(e)) = (start, end) {
        if s >= e {
            return Vec::new();
        }
    }
    let lower = start.map_or(Bound::Unbounded, Bound::Included);
    let upper = end.map_or(Bound::Unbounded, Bound::Excluded);
    let range = map.range::<[u8], _>((lower, upper));
    let cloned = |(k, v): (&Vec<u8>, &Vec<u8>)| (k.clone(), v.clone());
    match order {
        Order::Ascending => range.map(cloned).collect(),
        Order::Descending => range.rev().map(cloned).collect(),
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let inner = self.inner.read()?;
        Ok(inner.get(key).cloned())
    }

    fn has(&self, key: &[u8]) -> Result<bool> {
        let inner = self.inner.read()?;
        Ok(inner.contains_key(key))
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let mut inner = self.inner.write()?;
        inner.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        let mut inner = self.inner.write()?;
        inner.remove(key);
        Ok(())
    }

    fn iterate(&self, start: Option<&[u8]>, end: Option<&[u8]>, order: Order) -> Result<RawIter<'_>> {
        // Snapshot under the read lock; the cursor never sees later writes.
        let inner = self.inner.read()?;
        let entries = collect_range(&inner, start, end, order);
        Ok(Box::new(entries.into_iter().map(Ok)))
    }

    fn write_batch(&self, batch: WriteBatch) -> Result<()> {
        let mut inner = self.inner.write()?;
        for op in batch.into_ops() {
            match op {
                BatchOp::Set { key, value } => {
                    inner.insert(key, value);
                }
                BatchOp::Delete { key } => {
                    inner.remove(&key);
                }
            }
        }
        Ok(())
    }
}
