//! Monotonic `u64` counter.

use statecoll_core::{Namespace, Uint64Value, UINT64_VALUE};
use statecoll_store::KvStore;

use crate::error::{CollectionError, Result};
use crate::item::Item;
use crate::schema::{CollectionKind, SchemaBuilder};

/// A counter stored as an 8-byte big-endian item. Starts at zero.
#[derive(Debug)]
pub struct Sequence {
    item: Item<u64, Uint64Value>,
}

impl Sequence {
    pub fn new(
        schema: &mut SchemaBuilder,
        namespace: impl Into<Namespace>,
        name: impl Into<String>,
    ) -> Result<Self> {
        let item = Item::register(
            schema,
            namespace.into(),
            name.into(),
            CollectionKind::Sequence,
            UINT64_VALUE,
        )?;
        Ok(Self { item })
    }

    pub fn name(&self) -> &str {
        self.item.name()
    }

    /// The value the next call to [`Sequence::next`] returns.
    pub fn peek<S: KvStore + ?Sized>(&self, store: &S) -> Result<u64> {
        self.item.get_or(store, 0)
    }

    /// Return the current value and advance the counter.
    pub fn next<S: KvStore + ?Sized>(&self, store: &S) -> Result<u64> {
        let current = self.peek(store)?;
        let advanced = current
            .checked_add(1)
            .ok_or_else(|| CollectionError::SequenceExhausted {
                collection: self.item.name().to_string(),
            })?;
        self.item.set(store, &advanced)?;
        Ok(current)
    }

    pub fn set<S: KvStore + ?Sized>(&self, store: &S, value: u64) -> Result<()> {
        self.item.set(store, &value)
    }
}
