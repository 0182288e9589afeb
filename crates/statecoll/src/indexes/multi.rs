//! Non-unique secondary index.

use statecoll_core::{KeyEncoder, Namespace, PairKeyEncoder};
use statecoll_store::KvStore;

use crate::error::Result;
use crate::indexes::Indexer;
use crate::iter::IndexIter;
use crate::keyset::KeySet;
use crate::range::{PairRange, Ranger};
use crate::schema::{CollectionKind, SchemaBuilder};

/// Maps an index key extracted from each record to the primary keys of the
/// records producing it.
///
/// Many records may share an index key. Each `(ik, pk)` relation is one
/// entry `namespace ++ encode_non_terminal(ik) ++ encode(pk) -> []`, so all
/// primary keys under one index key form a contiguous range ordered by
/// primary key.
pub struct MultiIndex<IK, PK, V, IKC, PKC> {
    entries: KeySet<(IK, PK), PairKeyEncoder<IKC, PKC>>,
    extract: fn(&V) -> IK,
}

impl<IK, PK, V, IKC, PKC> std::fmt::Debug for MultiIndex<IK, PK, V, IKC, PKC>
where
    IKC: KeyEncoder<IK>,
    PKC: KeyEncoder<PK>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiIndex")
            .field("name", &self.entries.name())
            .field("namespace", self.entries.namespace())
            .finish_non_exhaustive()
    }
}

impl<IK, PK, V, IKC, PKC> MultiIndex<IK, PK, V, IKC, PKC>
where
    IKC: KeyEncoder<IK>,
    PKC: KeyEncoder<PK>,
{
    /// `extract` must be deterministic: the same record always yields the
    /// same index key.
    pub fn new(
        schema: &mut SchemaBuilder,
        namespace: impl Into<Namespace>,
        name: impl Into<String>,
        ikc: IKC,
        pkc: PKC,
        extract: fn(&V) -> IK,
    ) -> Result<Self> {
        let entries = KeySet::register(
            schema,
            namespace.into(),
            name.into(),
            CollectionKind::MultiIndex,
            PairKeyEncoder::new(ikc, pkc),
        )?;
        Ok(Self { entries, extract })
    }

    pub fn name(&self) -> &str {
        self.entries.name()
    }

    pub fn namespace(&self) -> &Namespace {
        self.entries.namespace()
    }

    /// The index key `value` is filed under.
    pub fn extract(&self, value: &V) -> IK {
        (self.extract)(value)
    }

    fn encode_entry(&self, ik: &IK, pk: &PK) -> Vec<u8> {
        let kc = self.entries.key_encoder();
        let mut buf = kc.kc1.encode_non_terminal(ik);
        buf.extend_from_slice(&kc.kc2.encode(pk));
        buf
    }

    /// Record that `pk` is filed under `ik`.
    pub fn insert_key<S: KvStore + ?Sized>(&self, store: &S, ik: &IK, pk: &PK) -> Result<()> {
        self.entries.set_encoded(store, &self.encode_entry(ik, pk))
    }

    /// Forget that `pk` is filed under `ik`. A missing entry is a no-op.
    pub fn remove_key<S: KvStore + ?Sized>(&self, store: &S, ik: &IK, pk: &PK) -> Result<()> {
        self.entries.delete_encoded(store, &self.encode_entry(ik, pk))
    }

    pub fn contains<S: KvStore + ?Sized>(&self, store: &S, ik: &IK, pk: &PK) -> Result<bool> {
        Ok(store.has(&self.entries.namespace().key(&self.encode_entry(ik, pk)))?)
    }

    /// Iterate index entries within `range`.
    pub fn iterate<'a, S, R>(&'a self, store: &'a S, range: R) -> Result<IndexIter<'a, IK, PK, IKC, PKC>>
    where
        S: KvStore + ?Sized,
        R: Ranger<(IK, PK), PairKeyEncoder<IKC, PKC>>,
    {
        Ok(IndexIter::new(self.entries.iterate(store, range)?))
    }

    /// Primary keys filed under `ik`, ascending.
    pub fn exact_match<'a, S: KvStore + ?Sized>(
        &'a self,
        store: &'a S,
        ik: IK,
    ) -> Result<IndexIter<'a, IK, PK, IKC, PKC>> {
        self.iterate(store, PairRange::prefixed(ik))
    }

    /// Primary keys filed under `ik`, descending.
    pub fn reverse_exact_match<'a, S: KvStore + ?Sized>(
        &'a self,
        store: &'a S,
        ik: IK,
    ) -> Result<IndexIter<'a, IK, PK, IKC, PKC>> {
        self.iterate(store, PairRange::prefixed(ik).descending())
    }
}

impl<IK, PK, V, IKC, PKC> Indexer<PK, V> for MultiIndex<IK, PK, V, IKC, PKC>
where
    IK: PartialEq,
    IKC: KeyEncoder<IK>,
    PKC: KeyEncoder<PK>,
{
    fn name(&self) -> &str {
        self.entries.name()
    }

    fn namespace(&self) -> &Namespace {
        self.entries.namespace()
    }

    fn insert(&self, store: &dyn KvStore, pk: &PK, value: &V) -> Result<()> {
        self.insert_key(store, &self.extract(value), pk)
    }

    fn remove(&self, store: &dyn KvStore, pk: &PK, value: &V) -> Result<()> {
        self.remove_key(store, &self.extract(value), pk)
    }

    fn is_stale(&self, old: &V, new: &V) -> bool {
        self.extract(old) != self.extract(new)
    }
}
