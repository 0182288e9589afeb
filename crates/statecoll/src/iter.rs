//! Typed iterators over collection ranges.
//!
//! Each iterator wraps a raw store cursor and decodes entries lazily. Every
//! stored key must be consumed exactly by the collection's key decoder; a
//! decoder that stops short or overruns is reported as
//! [`CollectionError::EncodeInvariantViolation`] rather than silently
//! producing a wrong key.

use std::marker::PhantomData;

use statecoll_core::{KeyEncoder, Namespace, PairKeyEncoder, ValueEncoder};
use statecoll_store::RawIter;

use crate::error::{CollectionError, Result};

/// Decode a full store key, requiring the decoder to consume all of it.
pub(crate) fn decode_full_key<K, KC: KeyEncoder<K>>(
    collection: &str,
    namespace: &Namespace,
    kc: &KC,
    raw_key: &[u8],
) -> Result<K> {
    let violation = |consumed: usize, len: usize| CollectionError::EncodeInvariantViolation {
        collection: collection.to_string(),
        key: hex::encode(raw_key),
        consumed,
        len,
    };

    let suffix = namespace
        .strip(raw_key)
        .ok_or_else(|| violation(0, raw_key.len()))?;
    let (consumed, key) = kc.decode(suffix).map_err(|source| {
        tracing::warn!(collection, key = %hex::encode(raw_key), error = %source, "undecodable stored key");
        CollectionError::Decode {
            collection: collection.to_string(),
            source,
        }
    })?;
    if consumed != suffix.len() {
        return Err(violation(consumed, suffix.len()));
    }
    Ok(key)
}

pub(crate) fn decode_value<V, VC: ValueEncoder<V>>(collection: &str, vc: &VC, raw: &[u8]) -> Result<V> {
    vc.decode(raw).map_err(|source| {
        tracing::warn!(collection, error = %source, "undecodable stored value");
        CollectionError::Decode {
            collection: collection.to_string(),
            source,
        }
    })
}

/// Iterator over the `(key, value)` records of a map.
pub struct Iter<'a, K, V, KC, VC> {
    raw: RawIter<'a>,
    collection: &'a str,
    namespace: &'a Namespace,
    kc: &'a KC,
    vc: &'a VC,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<'a, K, V, KC, VC> Iter<'a, K, V, KC, VC>
where
    KC: KeyEncoder<K>,
    VC: ValueEncoder<V>,
{
    pub(crate) fn new(
        raw: RawIter<'a>,
        collection: &'a str,
        namespace: &'a Namespace,
        kc: &'a KC,
        vc: &'a VC,
    ) -> Self {
        Self {
            raw,
            collection,
            namespace,
            kc,
            vc,
            _marker: PhantomData,
        }
    }

    /// Consume the iterator, decoding only keys.
    pub fn keys(self) -> Result<Vec<K>> {
        let Self {
            raw,
            collection,
            namespace,
            kc,
            ..
        } = self;
        raw.map(|entry| {
            let (key, _) = entry?;
            decode_full_key(collection, namespace, kc, &key)
        })
        .collect()
    }

    /// Consume the iterator, decoding only values.
    pub fn values(self) -> Result<Vec<V>> {
        let Self {
            raw, collection, vc, ..
        } = self;
        raw.map(|entry| {
            let (_, value) = entry?;
            decode_value(collection, vc, &value)
        })
        .collect()
    }

    /// Consume the iterator into `(key, value)` pairs.
    pub fn key_values(self) -> Result<Vec<(K, V)>> {
        self.collect()
    }
}

impl<'a, K, V, KC, VC> Iterator for Iter<'a, K, V, KC, VC>
where
    KC: KeyEncoder<K>,
    VC: ValueEncoder<V>,
{
    type Item = Result<(K, V)>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.raw.next()?;
        Some(entry.map_err(CollectionError::from).and_then(|(key, value)| {
            let key = decode_full_key(self.collection, self.namespace, self.kc, &key)?;
            let value = decode_value(self.collection, self.vc, &value)?;
            Ok((key, value))
        }))
    }
}

/// Iterator over the members of a key set.
pub struct KeySetIter<'a, K, KC> {
    raw: RawIter<'a>,
    collection: &'a str,
    namespace: &'a Namespace,
    kc: &'a KC,
    _marker: PhantomData<fn() -> K>,
}

impl<'a, K, KC: KeyEncoder<K>> KeySetIter<'a, K, KC> {
    pub(crate) fn new(raw: RawIter<'a>, collection: &'a str, namespace: &'a Namespace, kc: &'a KC) -> Self {
        Self {
            raw,
            collection,
            namespace,
            kc,
            _marker: PhantomData,
        }
    }

    pub(crate) fn collection(&self) -> &'a str {
        self.collection
    }

    pub fn keys(self) -> Result<Vec<K>> {
        self.collect()
    }
}

impl<'a, K, KC: KeyEncoder<K>> Iterator for KeySetIter<'a, K, KC> {
    type Item = Result<K>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.raw.next()?;
        Some(
            entry
                .map_err(CollectionError::from)
                .and_then(|(key, _)| decode_full_key(self.collection, self.namespace, self.kc, &key)),
        )
    }
}

/// Iterator over the entries of a secondary index.
///
/// Yields primary keys. [`IndexIter::full_keys`] keeps the index key too.
pub struct IndexIter<'a, IK, PK, IKC, PKC> {
    inner: KeySetIter<'a, (IK, PK), PairKeyEncoder<IKC, PKC>>,
}

impl<'a, IK, PK, IKC, PKC> IndexIter<'a, IK, PK, IKC, PKC>
where
    IKC: KeyEncoder<IK>,
    PKC: KeyEncoder<PK>,
{
    pub(crate) fn new(inner: KeySetIter<'a, (IK, PK), PairKeyEncoder<IKC, PKC>>) -> Self {
        Self { inner }
    }

    /// Name of the index being iterated.
    pub fn index_name(&self) -> &'a str {
        self.inner.collection()
    }

    /// Next `(index key, primary key)` entry.
    pub fn next_full(&mut self) -> Option<Result<(IK, PK)>> {
        self.inner.next()
    }

    /// Consume the iterator into `(index key, primary key)` pairs.
    pub fn full_keys(self) -> Result<Vec<(IK, PK)>> {
        self.inner.collect()
    }

    /// Consume the iterator into primary keys.
    pub fn primary_keys(self) -> Result<Vec<PK>> {
        self.collect()
    }
}

impl<'a, IK, PK, IKC, PKC> Iterator for IndexIter<'a, IK, PK, IKC, PKC>
where
    IKC: KeyEncoder<IK>,
    PKC: KeyEncoder<PK>,
{
    type Item = Result<PK>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_full().map(|entry| entry.map(|(_, pk)| pk))
    }
}
