//! A map that keeps a set of secondary indexes in step with its records.
//!
//! ## Mutation algorithm
//!
//! `set(pk, new)`:
//! 1. read the previous record `old`, if any
//! 2. for each indexer whose entries differ between `old` and `new`, remove
//!    the entries of `old`
//! 3. write `new`
//! 4. insert the entries of `new` for every indexer that was stale or when
//!    there was no `old`
//!
//! `delete(pk)` reads `old` (absent means nothing to do), removes its index
//! entries, then the record.
//!
//! All writes of one mutation are staged in a [`CacheKvStore`] and handed to
//! the store as a single batch, so readers never see a record without its
//! index entries or the reverse.

use statecoll_core::{KeyEncoder, Namespace, ValueEncoder};
use statecoll_store::{CacheKvStore, KvStore};

use crate::error::{CollectionError, Result};
use crate::indexes::IndexSet;
use crate::iter::{IndexIter, Iter};
use crate::map::Map;
use crate::range::Ranger;
use crate::schema::{CollectionKind, SchemaBuilder};

/// A [`Map`] plus the indexes in `I`.
pub struct IndexedMap<PK, V, KC, VC, I> {
    map: Map<PK, V, KC, VC>,
    indexes: I,
}

impl<PK, V, KC, VC, I: std::fmt::Debug> std::fmt::Debug for IndexedMap<PK, V, KC, VC, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexedMap")
            .field("map", &self.map)
            .field("indexes", &self.indexes)
            .finish()
    }
}

impl<PK, V, KC, VC, I> IndexedMap<PK, V, KC, VC, I>
where
    KC: KeyEncoder<PK>,
    VC: ValueEncoder<V>,
    I: IndexSet<PK, V>,
{
    /// Every index in `indexes` must already be registered with `schema`;
    /// an index built against another builder is rejected.
    pub fn new(
        schema: &mut SchemaBuilder,
        namespace: impl Into<Namespace>,
        name: impl Into<String>,
        kc: KC,
        vc: VC,
        indexes: I,
    ) -> Result<Self> {
        let name = name.into();
        for index in indexes.indexers() {
            if !schema.contains(index.name(), index.namespace(), CollectionKind::MultiIndex) {
                return Err(CollectionError::UnregisteredIndex {
                    collection: name,
                    index: index.name().to_string(),
                });
            }
        }
        let map = Map::register(
            schema,
            namespace.into(),
            name,
            CollectionKind::IndexedMap,
            kc,
            vc,
        )?;
        Ok(Self { map, indexes })
    }

    pub fn name(&self) -> &str {
        self.map.name()
    }

    pub fn indexes(&self) -> &I {
        &self.indexes
    }

    /// The underlying primary map. Writing through it bypasses the indexes.
    pub fn primary(&self) -> &Map<PK, V, KC, VC> {
        &self.map
    }

    pub fn get<S: KvStore + ?Sized>(&self, store: &S, pk: &PK) -> Result<Option<V>> {
        self.map.get(store, pk)
    }

    pub fn get_or<S: KvStore + ?Sized>(&self, store: &S, pk: &PK, default: V) -> Result<V> {
        self.map.get_or(store, pk, default)
    }

    pub fn require<S: KvStore + ?Sized>(&self, store: &S, pk: &PK) -> Result<V> {
        self.map.require(store, pk)
    }

    pub fn has<S: KvStore + ?Sized>(&self, store: &S, pk: &PK) -> Result<bool> {
        self.map.has(store, pk)
    }

    pub fn iterate<'a, S, R>(&'a self, store: &'a S, range: R) -> Result<Iter<'a, PK, V, KC, VC>>
    where
        S: KvStore + ?Sized,
        R: Ranger<PK, KC>,
    {
        self.map.iterate(store, range)
    }

    /// Insert or replace the record under `pk`, reconciling every index.
    pub fn set<S: KvStore + ?Sized>(&self, store: &S, pk: &PK, value: &V) -> Result<()> {
        let old = self.map.get(store, pk)?;
        let indexers = self.indexes.indexers();
        let cache = CacheKvStore::new(store);

        let mut refresh = Vec::with_capacity(indexers.len());
        for indexer in &indexers {
            let stale = match &old {
                Some(old) if indexer.is_stale(old, value) => {
                    indexer.remove(&cache, pk, old)?;
                    true
                }
                Some(_) => false,
                None => true,
            };
            refresh.push(stale);
        }

        self.map.set(&cache, pk, value)?;

        for (indexer, stale) in indexers.iter().zip(refresh) {
            if stale {
                indexer.insert(&cache, pk, value)?;
            }
        }

        cache.commit()?;
        tracing::debug!(
            collection = %self.map.name(),
            key = %self.map.key_encoder().stringify(pk),
            replaced = old.is_some(),
            "set record"
        );
        Ok(())
    }

    /// Remove the record under `pk` and its index entries. Removing an absent
    /// record succeeds.
    pub fn delete<S: KvStore + ?Sized>(&self, store: &S, pk: &PK) -> Result<()> {
        let Some(old) = self.map.get(store, pk)? else {
            return Ok(());
        };
        let cache = CacheKvStore::new(store);

        for indexer in self.indexes.indexers() {
            indexer.remove(&cache, pk, &old)?;
        }
        self.map.delete(&cache, pk)?;

        cache.commit()?;
        tracing::debug!(
            collection = %self.map.name(),
            key = %self.map.key_encoder().stringify(pk),
            "deleted record"
        );
        Ok(())
    }

    /// Fetch the records behind the primary keys an index iterator yields.
    ///
    /// An entry naming a missing record is reported as
    /// [`CollectionError::DanglingIndexEntry`].
    pub fn resolve<S, IK, IKC, PKC>(
        &self,
        store: &S,
        index: IndexIter<'_, IK, PK, IKC, PKC>,
    ) -> Result<Vec<(PK, V)>>
    where
        S: KvStore + ?Sized,
        IKC: KeyEncoder<IK>,
        PKC: KeyEncoder<PK>,
    {
        let index_name = index.index_name();
        let mut records = Vec::new();
        for pk in index {
            let pk = pk?;
            match self.map.get(store, &pk)? {
                Some(value) => records.push((pk, value)),
                None => {
                    let key = self.map.key_encoder().stringify(&pk);
                    tracing::warn!(index = index_name, %key, "index entry without record");
                    return Err(CollectionError::DanglingIndexEntry {
                        index: index_name.to_string(),
                        key,
                    });
                }
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexes::{Indexer, MultiIndex};
    use crate::range::Range;
    use statecoll_core::{CborValue, StringKey, Uint64Key, STRING_KEY, UINT64_KEY};
    use statecoll_store::MemoryKvStore;

    #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Account {
        owner: String,
        tier: u64,
    }

    struct AccountIndexes {
        by_owner: MultiIndex<String, u64, Account, StringKey, Uint64Key>,
        by_tier: MultiIndex<u64, u64, Account, Uint64Key, Uint64Key>,
    }

    impl IndexSet<u64, Account> for AccountIndexes {
        fn indexers(&self) -> Vec<&dyn Indexer<u64, Account>> {
            vec![&self.by_owner, &self.by_tier]
        }
    }

    type Accounts = IndexedMap<u64, Account, Uint64Key, CborValue<Account>, AccountIndexes>;

    fn accounts() -> Accounts {
        let mut schema = SchemaBuilder::new();
        let indexes = AccountIndexes {
            by_owner: MultiIndex::new(&mut schema, 0x21u8, "by_owner", STRING_KEY, UINT64_KEY, |a: &Account| {
                a.owner.clone()
            })
            .unwrap(),
            by_tier: MultiIndex::new(&mut schema, 0x22u8, "by_tier", UINT64_KEY, UINT64_KEY, |a: &Account| a.tier)
                .unwrap(),
        };
        IndexedMap::new(&mut schema, 0x20u8, "accounts", UINT64_KEY, CborValue::new(), indexes).unwrap()
    }

    fn account(owner: &str, tier: u64) -> Account {
        Account {
            owner: owner.to_string(),
            tier,
        }
    }

    fn owned_by(map: &Accounts, store: &MemoryKvStore, owner: &str) -> Vec<u64> {
        map.indexes()
            .by_owner
            .exact_match(store, owner.to_string())
            .unwrap()
            .primary_keys()
            .unwrap()
    }

    #[test]
    fn test_set_indexes_new_record() {
        let store = MemoryKvStore::new();
        let map = accounts();
        map.set(&store, &1, &account("ann", 2)).unwrap();
        map.set(&store, &2, &account("ann", 3)).unwrap();

        assert_eq!(owned_by(&map, &store, "ann"), vec![1, 2]);
        let tier3 = map.indexes().by_tier.exact_match(&store, 3).unwrap().primary_keys().unwrap();
        assert_eq!(tier3, vec![2]);
    }

    #[test]
    fn test_update_moves_only_changed_index() {
        let store = MemoryKvStore::new();
        let map = accounts();
        map.set(&store, &1, &account("ann", 2)).unwrap();
        map.set(&store, &1, &account("bob", 2)).unwrap();

        assert!(owned_by(&map, &store, "ann").is_empty());
        assert_eq!(owned_by(&map, &store, "bob"), vec![1]);
        let tier2 = map.indexes().by_tier.exact_match(&store, 2).unwrap().primary_keys().unwrap();
        assert_eq!(tier2, vec![1]);
        assert_eq!(map.require(&store, &1).unwrap(), account("bob", 2));
    }

    #[test]
    fn test_delete_clears_indexes() {
        let store = MemoryKvStore::new();
        let map = accounts();
        map.set(&store, &7, &account("cat", 1)).unwrap();
        map.delete(&store, &7).unwrap();

        assert!(store.is_empty().unwrap());
        assert_eq!(map.get(&store, &7).unwrap(), None);

        // Absent record: nothing to do, twice.
        map.delete(&store, &7).unwrap();
        map.delete(&store, &7).unwrap();
    }

    #[test]
    fn test_resolve_reads_records() {
        let store = MemoryKvStore::new();
        let map = accounts();
        map.set(&store, &1, &account("dee", 5)).unwrap();
        map.set(&store, &2, &account("eve", 5)).unwrap();

        let hits = map
            .resolve(&store, map.indexes().by_tier.exact_match(&store, 5).unwrap())
            .unwrap();
        assert_eq!(hits, vec![(1, account("dee", 5)), (2, account("eve", 5))]);
    }

    #[test]
    fn test_resolve_reports_dangling_entry() {
        let store = MemoryKvStore::new();
        let map = accounts();
        map.indexes().by_tier.insert_key(&store, &9, &42).unwrap();

        let err = map
            .resolve(&store, map.indexes().by_tier.exact_match(&store, 9).unwrap())
            .unwrap_err();
        assert!(matches!(
            err,
            CollectionError::DanglingIndexEntry { ref index, ref key } if index == "by_tier" && key == "42"
        ));
    }

    #[test]
    fn test_indexes_from_another_schema_rejected() {
        let mut other = SchemaBuilder::new();
        let indexes = AccountIndexes {
            by_owner: MultiIndex::new(&mut other, 0x21u8, "by_owner", STRING_KEY, UINT64_KEY, |a: &Account| {
                a.owner.clone()
            })
            .unwrap(),
            by_tier: MultiIndex::new(&mut other, 0x22u8, "by_tier", UINT64_KEY, UINT64_KEY, |a: &Account| a.tier)
                .unwrap(),
        };

        let mut schema = SchemaBuilder::new();
        let err = Accounts::new(&mut schema, 0x20u8, "accounts", UINT64_KEY, CborValue::new(), indexes)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            CollectionError::UnregisteredIndex { ref collection, ref index } if collection == "accounts" && index == "by_owner"
        ));
        assert!(schema.build().is_empty());
    }

    #[test]
    fn test_no_indexes() {
        let store = MemoryKvStore::new();
        let map: IndexedMap<String, u64, StringKey, statecoll_core::Uint64Value, ()> = IndexedMap::new(
            &mut SchemaBuilder::new(),
            0x30u8,
            "plain",
            STRING_KEY,
            statecoll_core::UINT64_VALUE,
            (),
        )
        .unwrap();

        map.set(&store, &"k".to_string(), &1).unwrap();
        assert_eq!(map.iterate(&store, Range::new()).unwrap().key_values().unwrap(), vec![("k".to_string(), 1)]);
    }
}
