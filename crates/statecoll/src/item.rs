//! A single typed value stored at its namespace.

use std::marker::PhantomData;

use statecoll_core::{Namespace, ValueEncoder};
use statecoll_store::KvStore;

use crate::error::{CollectionError, Result};
use crate::iter::decode_value;
use crate::schema::{CollectionInfo, CollectionKind, SchemaBuilder};

/// Singleton value; the store key is the namespace itself.
pub struct Item<V, VC> {
    name: String,
    namespace: Namespace,
    vc: VC,
    _marker: PhantomData<fn() -> V>,
}

impl<V, VC> std::fmt::Debug for Item<V, VC> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Item")
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl<V, VC: ValueEncoder<V>> Item<V, VC> {
    pub fn new(
        schema: &mut SchemaBuilder,
        namespace: impl Into<Namespace>,
        name: impl Into<String>,
        vc: VC,
    ) -> Result<Self> {
        Self::register(schema, namespace.into(), name.into(), CollectionKind::Item, vc)
    }

    pub(crate) fn register(
        schema: &mut SchemaBuilder,
        namespace: Namespace,
        name: String,
        kind: CollectionKind,
        vc: VC,
    ) -> Result<Self> {
        schema.register(CollectionInfo {
            name: name.clone(),
            namespace: namespace.clone(),
            kind,
            key_encoder: None,
            value_encoder: Some(vc.name()),
        })?;
        Ok(Self {
            name,
            namespace,
            vc,
            _marker: PhantomData,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// The stored value, or [`CollectionError::NotFound`] if never set.
    pub fn get<S: KvStore + ?Sized>(&self, store: &S) -> Result<V> {
        self.try_get(store)?.ok_or_else(|| CollectionError::NotFound {
            collection: self.name.clone(),
            key: "<item>".to_string(),
        })
    }

    pub fn try_get<S: KvStore + ?Sized>(&self, store: &S) -> Result<Option<V>> {
        match store.get(self.namespace.as_bytes())? {
            Some(raw) => decode_value(&self.name, &self.vc, &raw).map(Some),
            None => Ok(None),
        }
    }

    pub fn get_or<S: KvStore + ?Sized>(&self, store: &S, default: V) -> Result<V> {
        Ok(self.try_get(store)?.unwrap_or(default))
    }

    pub fn set<S: KvStore + ?Sized>(&self, store: &S, value: &V) -> Result<()> {
        let raw = self.vc.encode(value).map_err(|source| CollectionError::Encode {
            collection: self.name.clone(),
            source,
        })?;
        store.set(self.namespace.as_bytes(), &raw)?;
        Ok(())
    }

    pub fn has<S: KvStore + ?Sized>(&self, store: &S) -> Result<bool> {
        Ok(store.has(self.namespace.as_bytes())?)
    }

    pub fn delete<S: KvStore + ?Sized>(&self, store: &S) -> Result<()> {
        store.delete(self.namespace.as_bytes())?;
        Ok(())
    }
}
