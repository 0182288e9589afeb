//! The primary typed collection.
//!
//! A [`Map`] stores `namespace ++ encode(key) -> encode(value)`. It holds no
//! state besides its namespace and encoders; every operation takes the store
//! it acts on.

use std::marker::PhantomData;

use statecoll_core::{KeyEncoder, Namespace, ValueEncoder};
use statecoll_store::KvStore;

use crate::error::{CollectionError, Result};
use crate::iter::{decode_value, Iter};
use crate::range::Ranger;
use crate::schema::{CollectionInfo, CollectionKind, SchemaBuilder};

/// Typed `K -> V` collection.
pub struct Map<K, V, KC, VC> {
    name: String,
    namespace: Namespace,
    kc: KC,
    vc: VC,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V, KC, VC> std::fmt::Debug for Map<K, V, KC, VC> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Map")
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl<K, V, KC, VC> Map<K, V, KC, VC>
where
    KC: KeyEncoder<K>,
    VC: ValueEncoder<V>,
{
    pub fn new(
        schema: &mut SchemaBuilder,
        namespace: impl Into<Namespace>,
        name: impl Into<String>,
        kc: KC,
        vc: VC,
    ) -> Result<Self> {
        Self::register(schema, namespace.into(), name.into(), CollectionKind::Map, kc, vc)
    }

    pub(crate) fn register(
        schema: &mut SchemaBuilder,
        namespace: Namespace,
        name: String,
        kind: CollectionKind,
        kc: KC,
        vc: VC,
    ) -> Result<Self> {
        schema.register(CollectionInfo {
            name: name.clone(),
            namespace: namespace.clone(),
            kind,
            key_encoder: Some(kc.name()),
            value_encoder: Some(vc.name()),
        })?;
        Ok(Self {
            name,
            namespace,
            kc,
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

    pub fn key_encoder(&self) -> &KC {
        &self.kc
    }

    pub fn value_encoder(&self) -> &VC {
        &self.vc
    }

    /// The full store key for `key`.
    pub fn store_key(&self, key: &K) -> Vec<u8> {
        self.namespace.key(&self.kc.encode(key))
    }

    pub fn get<S: KvStore + ?Sized>(&self, store: &S, key: &K) -> Result<Option<V>> {
        match store.get(&self.store_key(key))? {
            Some(raw) => decode_value(&self.name, &self.vc, &raw).map(Some),
            None => Ok(None),
        }
    }

    /// Like [`Map::get`], but an absent key yields `default`.
    pub fn get_or<S: KvStore + ?Sized>(&self, store: &S, key: &K, default: V) -> Result<V> {
        Ok(self.get(store, key)?.unwrap_or(default))
    }

    /// Like [`Map::get`], but an absent key is [`CollectionError::NotFound`].
    pub fn require<S: KvStore + ?Sized>(&self, store: &S, key: &K) -> Result<V> {
        self.get(store, key)?.ok_or_else(|| CollectionError::NotFound {
            collection: self.name.clone(),
            key: self.kc.stringify(key),
        })
    }

    pub fn has<S: KvStore + ?Sized>(&self, store: &S, key: &K) -> Result<bool> {
        Ok(store.has(&self.store_key(key))?)
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn set<S: KvStore + ?Sized>(&self, store: &S, key: &K, value: &V) -> Result<()> {
        let raw = self.vc.encode(value).map_err(|source| CollectionError::Encode {
            collection: self.name.clone(),
            source,
        })?;
        store.set(&self.store_key(key), &raw)?;
        tracing::trace!(collection = %self.name, key = %self.kc.stringify(key), "set");
        Ok(())
    }

    /// Remove `key`. Removing an absent key succeeds.
    pub fn delete<S: KvStore + ?Sized>(&self, store: &S, key: &K) -> Result<()> {
        store.delete(&self.store_key(key))?;
        tracing::trace!(collection = %self.name, key = %self.kc.stringify(key), "delete");
        Ok(())
    }

    /// Iterate the records within `range`.
    pub fn iterate<'a, S, R>(&'a self, store: &'a S, range: R) -> Result<Iter<'a, K, V, KC, VC>>
    where
        S: KvStore + ?Sized,
        R: Ranger<K, KC>,
    {
        let raw = range.raw_range(&self.kc, &self.namespace)?;
        let cursor = store.iterate(Some(raw.start.as_slice()), raw.end.as_deref(), raw.order)?;
        Ok(Iter::new(cursor, &self.name, &self.namespace, &self.kc, &self.vc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::Range;
    use statecoll_core::{EncodingError, StringKey, StringValue, Uint64Key, Uint64Value};
    use statecoll_core::{STRING_KEY, STRING_VALUE, UINT64_KEY, UINT64_VALUE};
    use statecoll_store::MemoryKvStore;

    fn names() -> Map<String, String, StringKey, StringValue> {
        Map::new(&mut SchemaBuilder::new(), 0x01u8, "names", STRING_KEY, STRING_VALUE).unwrap()
    }

    #[test]
    fn test_get_set_delete_has() {
        let store = MemoryKvStore::new();
        let map = names();
        let key = "alice".to_string();

        assert_eq!(map.get(&store, &key).unwrap(), None);
        assert!(!map.has(&store, &key).unwrap());

        map.set(&store, &key, &"a".to_string()).unwrap();
        assert_eq!(map.get(&store, &key).unwrap(), Some("a".to_string()));
        assert!(map.has(&store, &key).unwrap());
        assert_eq!(store.get(b"\x01alice").unwrap(), Some(b"a".to_vec()));

        map.set(&store, &key, &"b".to_string()).unwrap();
        assert_eq!(map.get(&store, &key).unwrap(), Some("b".to_string()));

        map.delete(&store, &key).unwrap();
        assert_eq!(map.get(&store, &key).unwrap(), None);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let store = MemoryKvStore::new();
        let map = names();
        let key = "ghost".to_string();
        map.delete(&store, &key).unwrap();
        map.delete(&store, &key).unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_get_or_and_require() {
        let store = MemoryKvStore::new();
        let map = names();
        let key = "missing".to_string();

        assert_eq!(map.get_or(&store, &key, "dflt".into()).unwrap(), "dflt");
        let err = map.require(&store, &key).unwrap_err();
        assert!(matches!(err, CollectionError::NotFound { ref key, .. } if key == "missing"));
    }

    #[test]
    fn test_iteration_is_byte_ordered() {
        let store = MemoryKvStore::new();
        let map = names();
        for k in ["b", "a", "c"] {
            map.set(&store, &k.to_string(), &k.to_uppercase()).unwrap();
        }

        let keys = map.iterate(&store, Range::new()).unwrap().keys().unwrap();
        assert_eq!(keys, vec!["a", "b", "c"]);

        let values = map
            .iterate(&store, Range::new().descending())
            .unwrap()
            .values()
            .unwrap();
        assert_eq!(values, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_iteration_stays_in_namespace() {
        let store = MemoryKvStore::new();
        let mut schema = SchemaBuilder::new();
        let left: Map<u64, u64, Uint64Key, Uint64Value> =
            Map::new(&mut schema, 0x01u8, "left", UINT64_KEY, UINT64_VALUE).unwrap();
        let right: Map<u64, u64, Uint64Key, Uint64Value> =
            Map::new(&mut schema, 0x02u8, "right", UINT64_KEY, UINT64_VALUE).unwrap();

        left.set(&store, &1, &10).unwrap();
        right.set(&store, &1, &20).unwrap();
        right.set(&store, &2, &30).unwrap();

        let kvs = left.iterate(&store, Range::new()).unwrap().key_values().unwrap();
        assert_eq!(kvs, vec![(1, 10)]);
    }

    #[test]
    fn test_bounded_iteration() {
        let store = MemoryKvStore::new();
        let map: Map<u64, u64, Uint64Key, Uint64Value> =
            Map::new(&mut SchemaBuilder::new(), 0x01u8, "nums", UINT64_KEY, UINT64_VALUE).unwrap();
        for k in 0..10u64 {
            map.set(&store, &k, &(k * k)).unwrap();
        }

        let keys = map
            .iterate(&store, Range::new().start_exclusive(2).end_inclusive(5))
            .unwrap()
            .keys()
            .unwrap();
        assert_eq!(keys, vec![3, 4, 5]);

        let keys = map
            .iterate(&store, Range::new().start_inclusive(7).descending())
            .unwrap()
            .keys()
            .unwrap();
        assert_eq!(keys, vec![9, 8, 7]);
    }

    #[test]
    fn test_corrupt_value_is_decode_error() {
        let store = MemoryKvStore::new();
        let map: Map<u64, u64, Uint64Key, Uint64Value> =
            Map::new(&mut SchemaBuilder::new(), 0x01u8, "nums", UINT64_KEY, UINT64_VALUE).unwrap();
        store.set(&map.store_key(&1), b"short").unwrap();

        let err = map.get(&store, &1).unwrap_err();
        assert!(matches!(
            err,
            CollectionError::Decode {
                source: EncodingError::LengthMismatch { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_overlong_key_is_invariant_violation() {
        let store = MemoryKvStore::new();
        let map: Map<u64, u64, Uint64Key, Uint64Value> =
            Map::new(&mut SchemaBuilder::new(), 0x01u8, "nums", UINT64_KEY, UINT64_VALUE).unwrap();
        // Nine key bytes; the fixed-width decoder only consumes eight.
        store
            .set(&[0x01, 0, 0, 0, 0, 0, 0, 0, 1, 0xaa], &5u64.to_be_bytes())
            .unwrap();

        let first = map.iterate(&store, Range::new()).unwrap().next().unwrap();
        assert!(matches!(
            first,
            Err(CollectionError::EncodeInvariantViolation { consumed: 8, len: 9, .. })
        ));
    }
}
