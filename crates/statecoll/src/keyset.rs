//! A set of typed keys.
//!
//! Members are stored as `namespace ++ encode(key) -> []`.

use std::marker::PhantomData;

use statecoll_core::{KeyEncoder, Namespace};
use statecoll_store::KvStore;

use crate::error::Result;
use crate::iter::KeySetIter;
use crate::range::Ranger;
use crate::schema::{CollectionInfo, CollectionKind, SchemaBuilder};

/// Typed set of `K`.
pub struct KeySet<K, KC> {
    name: String,
    namespace: Namespace,
    kc: KC,
    _marker: PhantomData<fn() -> K>,
}

impl<K, KC> std::fmt::Debug for KeySet<K, KC> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySet")
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl<K, KC: KeyEncoder<K>> KeySet<K, KC> {
    pub fn new(
        schema: &mut SchemaBuilder,
        namespace: impl Into<Namespace>,
        name: impl Into<String>,
        kc: KC,
    ) -> Result<Self> {
        Self::register(schema, namespace.into(), name.into(), CollectionKind::KeySet, kc)
    }

    pub(crate) fn register(
        schema: &mut SchemaBuilder,
        namespace: Namespace,
        name: String,
        kind: CollectionKind,
        kc: KC,
    ) -> Result<Self> {
        schema.register(CollectionInfo {
            name: name.clone(),
            namespace: namespace.clone(),
            kind,
            key_encoder: Some(kc.name()),
            value_encoder: None,
        })?;
        Ok(Self {
            name,
            namespace,
            kc,
            _marker: PhantomData,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn key_encoder(&self) -> &KC {
        &self.kc
    }

    pub fn store_key(&self, key: &K) -> Vec<u8> {
        self.namespace.key(&self.kc.encode(key))
    }

    /// Add `key` to the set. Adding a present key is a no-op.
    pub fn set<S: KvStore + ?Sized>(&self, store: &S, key: &K) -> Result<()> {
        self.set_encoded(store, &self.kc.encode(key))
    }

    pub fn has<S: KvStore + ?Sized>(&self, store: &S, key: &K) -> Result<bool> {
        Ok(store.has(&self.store_key(key))?)
    }

    /// Remove `key` from the set. Removing an absent key succeeds.
    pub fn delete<S: KvStore + ?Sized>(&self, store: &S, key: &K) -> Result<()> {
        self.delete_encoded(store, &self.kc.encode(key))
    }

    /// Add a member by its already-encoded key.
    pub(crate) fn set_encoded<S: KvStore + ?Sized>(&self, store: &S, encoded: &[u8]) -> Result<()> {
        store.set(&self.namespace.key(encoded), &[])?;
        Ok(())
    }

    pub(crate) fn delete_encoded<S: KvStore + ?Sized>(&self, store: &S, encoded: &[u8]) -> Result<()> {
        store.delete(&self.namespace.key(encoded))?;
        Ok(())
    }

    pub fn iterate<'a, S, R>(&'a self, store: &'a S, range: R) -> Result<KeySetIter<'a, K, KC>>
    where
        S: KvStore + ?Sized,
        R: Ranger<K, KC>,
    {
        let raw = range.raw_range(&self.kc, &self.namespace)?;
        let cursor = store.iterate(Some(raw.start.as_slice()), raw.end.as_deref(), raw.order)?;
        Ok(KeySetIter::new(cursor, &self.name, &self.namespace, &self.kc))
    }
}
