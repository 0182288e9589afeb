//! Write-staging overlay over another store.
//!
//! [`CacheKvStore`] buffers writes in memory and serves reads from the
//! buffer first, falling through to the parent. Nothing reaches the parent
//! until [`CacheKvStore::commit`], which hands every staged write to the
//! parent's `write_batch` as one unit. Dropping the cache discards the
//! staged writes.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::Result;
use crate::memory::collect_range;
use crate::traits::{in_range, BatchOp, KvStore, Order, RawIter, WriteBatch};

/// Staged writes: `Some` is a pending set, `None` a pending delete.
type Overlay = BTreeMap<Vec<u8>, Option<Vec<u8>>>;

/// A buffering overlay on top of a parent store.
pub struct CacheKvStore<'a, S: KvStore + ?Sized> {
    parent: &'a S,
    overlay: RwLock<Overlay>,
}

impl<'a, S: KvStore + ?Sized> CacheKvStore<'a, S> {
    pub fn new(parent: &'a S) -> Self {
        Self {
            parent,
            overlay: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of keys with a staged write.
    pub fn pending(&self) -> Result<usize> {
        Ok(self.overlay.read()?.len())
    }

    /// Drain the staged writes into a batch, in key order.
    pub fn into_batch(self) -> Result<WriteBatch> {
        let overlay = self.overlay.into_inner()?;
        let mut batch = WriteBatch::new();
        for (key, value) in overlay {
            match value {
                Some(value) => batch.set(key, value),
                None => batch.delete(key),
            }
        }
        Ok(batch)
    }

    /// Apply every staged write to the parent as one batch.
    pub fn commit(self) -> Result<()> {
        let parent = self.parent;
        let batch = self.into_batch()?;
        if batch.is_empty() {
            return Ok(());
        }
        parent.write_batch(batch)
    }
}

impl<'a, S: KvStore + ?Sized> KvStore for CacheKvStore<'a, S> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        if let Some(staged) = self.overlay.read()?.get(key) {
            return Ok(staged.clone());
        }
        self.parent.get(key)
    }

    fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.overlay
            .write()?
            .insert(key.to_vec(), Some(value.to_vec()));
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.overlay.write()?.insert(key.to_vec(), None);
        Ok(())
    }

    fn iterate(&self, start: Option<&[u8]>, end: Option<&[u8]>, order: Order) -> Result<RawIter<'_>> {
        let mut merged = BTreeMap::new();
        for entry in self.parent.iterate(start, end, Order::Ascending)? {
            let (key, value) = entry?;
            merged.insert(key, value);
        }

        let overlay = self.overlay.read()?;
        for (key, staged) in overlay.iter() {
            if !in_range(key, start, end) {
                continue;
            }
            match staged {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }
        drop(overlay);

        let entries = collect_range(&merged, start, end, order);
        Ok(Box::new(entries.into_iter().map(Ok)))
    }

    fn write_batch(&self, batch: WriteBatch) -> Result<()> {
        let mut overlay = self.overlay.write()?;
        for op in batch.into_ops() {
            match op {
                BatchOp::Set { key, value } => {
                    overlay.insert(key, Some(value));
                }
                BatchOp::Delete { key } => {
                    overlay.insert(key, None);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryKvStore;

    #[test]
    fn test_cache_reads_through_and_shadows() {
        let parent = MemoryKvStore::new();
        parent.set(b"a", b"1").unwrap();
        parent.set(b"b", b"2").unwrap();

        let cache = CacheKvStore::new(&parent);
        assert_eq!(cache.get(b"a").unwrap(), Some(b"1".to_vec()));

        cache.set(b"a", b"10").unwrap();
        cache.delete(b"b").unwrap();
        assert_eq!(cache.get(b"a").unwrap(), Some(b"10".to_vec()));
        assert_eq!(cache.get(b"b").unwrap(), None);

        // Parent untouched until commit.
        assert_eq!(parent.get(b"a").unwrap(), Some(b"1".to_vec()));
        assert!(parent.has(b"b").unwrap());
    }

    #[test]
    fn test_cache_iterate_merges() {
        let parent = MemoryKvStore::new();
        parent.set(b"a", b"p").unwrap();
        parent.set(b"c", b"p").unwrap();

        let cache = CacheKvStore::new(&parent);
        cache.set(b"b", b"c").unwrap();
        cache.delete(b"c").unwrap();
        cache.set(b"z", b"c").unwrap();

        let asc: Vec<_> = cache
            .iterate(None, Some(&b"y"[..]), Order::Ascending)
            .unwrap()
            .map(|e| e.unwrap())
            .collect();
        assert_eq!(
            asc,
            vec![(b"a".to_vec(), b"p".to_vec()), (b"b".to_vec(), b"c".to_vec())]
        );

        let desc: Vec<_> = cache
            .iterate(None, None, Order::Descending)
            .unwrap()
            .map(|e| e.unwrap().0)
            .collect();
        assert_eq!(desc, vec![b"z".to_vec(), b"b".to_vec(), b"a".to_vec()]);
    }

    #[test]
    fn test_cache_commit_applies_everything() {
        let parent = MemoryKvStore::new();
        parent.set(b"gone", b"x").unwrap();

        let cache = CacheKvStore::new(&parent);
        cache.set(b"k", b"v").unwrap();
        cache.delete(b"gone").unwrap();
        assert_eq!(cache.pending().unwrap(), 2);
        cache.commit().unwrap();

        assert_eq!(parent.get(b"k").unwrap(), Some(b"v".to_vec()));
        assert!(!parent.has(b"gone").unwrap());
    }

    #[test]
    fn test_cache_dropped_without_commit_discards() {
        let parent = MemoryKvStore::new();
        {
            let cache = CacheKvStore::new(&parent);
            cache.set(b"k", b"v").unwrap();
        }
        assert!(parent.is_empty().unwrap());
    }

    #[test]
    fn test_cache_last_write_wins() {
        let parent = MemoryKvStore::new();
        let cache = CacheKvStore::new(&parent);
        cache.set(b"k", b"v").unwrap();
        cache.delete(b"k").unwrap();

        let batch = cache.into_batch().unwrap();
        assert_eq!(batch.len(), 1);
        assert!(matches!(batch.ops()[0], BatchOp::Delete { .. }));
    }
}
