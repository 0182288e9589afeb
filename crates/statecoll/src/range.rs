//! Typed key ranges.
//!
//! A [`Ranger`] turns typed bounds into the half-open `[start, end)` byte
//! range the store iterates, already scoped to a collection's namespace.
//!
//! The store's ranges are inclusive at the start and exclusive at the end.
//! An exclusive start or inclusive end is realised by appending `0x00` to the
//! encoded key, which yields its immediate successor in byte order.

use statecoll_core::{prefix_end, successor, KeyEncoder, Namespace, PairKeyEncoder};
use statecoll_store::Order;

use crate::error::{CollectionError, Result};

/// One end of a range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bound<K> {
    Inclusive(K),
    Exclusive(K),
}

/// Store-level bounds produced by a [`Ranger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRange {
    /// Inclusive lower bound.
    pub start: Vec<u8>,
    /// Exclusive upper bound; `None` is unbounded.
    pub end: Option<Vec<u8>>,
    pub order: Order,
}

impl RawRange {
    /// Every key under `namespace`.
    pub fn namespace(namespace: &Namespace) -> Self {
        Self::prefixed(namespace.as_bytes().to_vec())
    }

    fn prefixed(prefix: Vec<u8>) -> Self {
        let end = prefix_end(&prefix);
        Self {
            start: prefix,
            end,
            order: Order::Ascending,
        }
    }

    fn narrow_start(&mut self, start: Vec<u8>) {
        if start > self.start {
            self.start = start;
        }
    }

    fn narrow_end(&mut self, end: Vec<u8>) {
        let tighter = self.end.as_ref().map_or(true, |current| end < *current);
        if tighter {
            self.end = Some(end);
        }
    }

    /// True if no key can fall inside the range.
    pub fn is_empty(&self) -> bool {
        matches!(&self.end, Some(end) if *end <= self.start)
    }
}

/// Anything that can describe a range over keys of type `K` encoded by `KC`.
pub trait Ranger<K, KC> {
    fn raw_range(&self, kc: &KC, namespace: &Namespace) -> Result<RawRange>;
}

fn lower_bound<K, KC: KeyEncoder<K>>(prefix: &[u8], kc: &KC, bound: &Bound<K>) -> Vec<u8> {
    match bound {
        Bound::Inclusive(k) => [prefix, kc.encode(k).as_slice()].concat(),
        Bound::Exclusive(k) => successor(&[prefix, kc.encode(k).as_slice()].concat()),
    }
}

fn upper_bound<K, KC: KeyEncoder<K>>(prefix: &[u8], kc: &KC, bound: &Bound<K>) -> Vec<u8> {
    match bound {
        Bound::Inclusive(k) => successor(&[prefix, kc.encode(k).as_slice()].concat()),
        Bound::Exclusive(k) => [prefix, kc.encode(k).as_slice()].concat(),
    }
}

/// A range over whole keys.
///
/// The prefix matches on the encoded key's leading bytes; the bounds are
/// intersected with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range<K> {
    prefix: Option<K>,
    start: Option<Bound<K>>,
    end: Option<Bound<K>>,
    order: Order,
}

impl<K> Default for Range<K> {
    fn default() -> Self {
        Self {
            prefix: None,
            start: None,
            end: None,
            order: Order::Ascending,
        }
    }
}

impl<K> Range<K> {
    /// An unbounded ascending range.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(mut self, key: K) -> Self {
        self.prefix = Some(key);
        self
    }

    pub fn start_inclusive(mut self, key: K) -> Self {
        self.start = Some(Bound::Inclusive(key));
        self
    }

    pub fn start_exclusive(mut self, key: K) -> Self {
        self.start = Some(Bound::Exclusive(key));
        self
    }

    pub fn end_inclusive(mut self, key: K) -> Self {
        self.end = Some(Bound::Inclusive(key));
        self
    }

    pub fn end_exclusive(mut self, key: K) -> Self {
        self.end = Some(Bound::Exclusive(key));
        self
    }

    pub fn descending(mut self) -> Self {
        self.order = Order::Descending;
        self
    }
}

impl<K, KC: KeyEncoder<K>> Ranger<K, KC> for Range<K> {
    fn raw_range(&self, kc: &KC, namespace: &Namespace) -> Result<RawRange> {
        let ns = namespace.as_bytes();
        let mut raw = match &self.prefix {
            Some(prefix) => RawRange::prefixed(namespace.key(&kc.encode(prefix))),
            None => RawRange::namespace(namespace),
        };
        if let Some(start) = &self.start {
            raw.narrow_start(lower_bound(ns, kc, start));
        }
        if let Some(end) = &self.end {
            raw.narrow_end(upper_bound(ns, kc, end));
        }
        raw.order = self.order;
        Ok(raw)
    }
}

/// A range over `(K1, K2)` keys: fixes `K1` and bounds `K2`.
///
/// Bounds on `K2` are only meaningful once `K1` is fixed, so setting a bound
/// without a prefix is rejected when the range is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairRange<K1, K2> {
    prefix: Option<K1>,
    start: Option<Bound<K2>>,
    end: Option<Bound<K2>>,
    order: Order,
}

impl<K1, K2> Default for PairRange<K1, K2> {
    fn default() -> Self {
        Self {
            prefix: None,
            start: None,
            end: None,
            order: Order::Ascending,
        }
    }
}

impl<K1, K2> PairRange<K1, K2> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every key whose first component is `k1`.
    pub fn prefixed(k1: K1) -> Self {
        Self::new().prefix(k1)
    }

    pub fn prefix(mut self, k1: K1) -> Self {
        self.prefix = Some(k1);
        self
    }

    pub fn start_inclusive(mut self, k2: K2) -> Self {
        self.start = Some(Bound::Inclusive(k2));
        self
    }

    pub fn start_exclusive(mut self, k2: K2) -> Self {
        self.start = Some(Bound::Exclusive(k2));
        self
    }

    pub fn end_inclusive(mut self, k2: K2) -> Self {
        self.end = Some(Bound::Inclusive(k2));
        self
    }

    pub fn end_exclusive(mut self, k2: K2) -> Self {
        self.end = Some(Bound::Exclusive(k2));
        self
    }

    pub fn descending(mut self) -> Self {
        self.order = Order::Descending;
        self
    }
}

impl<K1, K2, KC1, KC2> Ranger<(K1, K2), PairKeyEncoder<KC1, KC2>> for PairRange<K1, K2>
where
    KC1: KeyEncoder<K1>,
    KC2: KeyEncoder<K2>,
{
    fn raw_range(&self, kc: &PairKeyEncoder<KC1, KC2>, namespace: &Namespace) -> Result<RawRange> {
        let Some(k1) = &self.prefix else {
            if self.start.is_some() || self.end.is_some() {
                return Err(CollectionError::InvalidRange(
                    "pair range bounds require a prefix".to_string(),
                ));
            }
            let mut raw = RawRange::namespace(namespace);
            raw.order = self.order;
            return Ok(raw);
        };

        let prefix = namespace.key(&kc.kc1.encode_non_terminal(k1));
        let mut raw = RawRange::prefixed(prefix.clone());
        if let Some(start) = &self.start {
            raw.narrow_start(lower_bound(&prefix, &kc.kc2, start));
        }
        if let Some(end) = &self.end {
            raw.narrow_end(upper_bound(&prefix, &kc.kc2, end));
        }
        raw.order = self.order;
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statecoll_core::{StringKey, Uint64Key, STRING_KEY, UINT64_KEY};

    fn ns() -> Namespace {
        Namespace::from(0x07u8)
    }

    #[test]
    fn test_unbounded_range_covers_namespace() {
        let raw = Ranger::<u64, Uint64Key>::raw_range(&Range::new(), &UINT64_KEY, &ns()).unwrap();
        assert_eq!(raw.start, vec![0x07]);
        assert_eq!(raw.end, Some(vec![0x08]));
        assert_eq!(raw.order, Order::Ascending);
    }

    #[test]
    fn test_bounds_append_zero_byte() {
        let range = Range::new().start_exclusive(1u64).end_inclusive(3u64).descending();
        let raw = range.raw_range(&UINT64_KEY, &ns()).unwrap();
        assert_eq!(raw.start, vec![0x07, 0, 0, 0, 0, 0, 0, 0, 1, 0x00]);
        assert_eq!(raw.end, Some(vec![0x07, 0, 0, 0, 0, 0, 0, 0, 3, 0x00]));
        assert_eq!(raw.order, Order::Descending);

        let raw = Range::new()
            .start_inclusive(1u64)
            .end_exclusive(3u64)
            .raw_range(&UINT64_KEY, &ns())
            .unwrap();
        assert_eq!(raw.start, vec![0x07, 0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(raw.end, Some(vec![0x07, 0, 0, 0, 0, 0, 0, 0, 3]));
    }

    #[test]
    fn test_prefix_intersects_bounds() {
        let range = Range::new()
            .prefix("ab".to_string())
            .start_inclusive("a".to_string())
            .end_exclusive("zz".to_string());
        let raw = Ranger::<String, StringKey>::raw_range(&range, &STRING_KEY, &ns()).unwrap();
        // The prefix is tighter on both sides.
        assert_eq!(raw.start, b"\x07ab".to_vec());
        assert_eq!(raw.end, Some(b"\x07ac".to_vec()));

        let range = Range::new()
            .prefix("ab".to_string())
            .start_exclusive("abc".to_string());
        let raw = Ranger::<String, StringKey>::raw_range(&range, &STRING_KEY, &ns()).unwrap();
        assert_eq!(raw.start, b"\x07abc\x00".to_vec());
        assert_eq!(raw.end, Some(b"\x07ac".to_vec()));
    }

    #[test]
    fn test_disjoint_bounds_are_empty() {
        let raw = Range::new()
            .start_inclusive(9u64)
            .end_exclusive(2u64)
            .raw_range(&UINT64_KEY, &ns())
            .unwrap();
        assert!(raw.is_empty());
    }

    #[test]
    fn test_pair_range_layout() {
        let kc = PairKeyEncoder::new(STRING_KEY, UINT64_KEY);
        let range = PairRange::new().prefix("milan".to_string()).start_inclusive(2u64);
        let raw = range.raw_range(&kc, &ns()).unwrap();

        let mut prefix = vec![0x07];
        prefix.extend_from_slice(b"milan\x00\x00");
        let mut start = prefix.clone();
        start.extend_from_slice(&2u64.to_be_bytes());

        assert_eq!(raw.start, start);
        assert_eq!(raw.end, prefix_end(&prefix));
    }

    #[test]
    fn test_prefixed_pair_range_matches_builder() {
        let kc = PairKeyEncoder::new(STRING_KEY, UINT64_KEY);
        let built = PairRange::new().prefix("milan".to_string()).end_exclusive(9u64);
        let prefixed = PairRange::prefixed("milan".to_string()).end_exclusive(9u64);
        assert_eq!(prefixed, built);

        let raw = PairRange::<String, u64>::prefixed("milan".to_string())
            .raw_range(&kc, &ns())
            .unwrap();
        assert_eq!(raw.start, b"\x07milan\x00\x00".to_vec());
        assert_eq!(raw.end, prefix_end(&raw.start));
    }

    #[test]
    fn test_pair_range_bounds_without_prefix_rejected() {
        let kc = PairKeyEncoder::new(STRING_KEY, UINT64_KEY);
        let range: PairRange<String, u64> = PairRange::new().end_exclusive(5);
        assert!(matches!(
            range.raw_range(&kc, &ns()),
            Err(CollectionError::InvalidRange(_))
        ));

        let all: PairRange<String, u64> = PairRange::new().descending();
        let raw = all.raw_range(&kc, &ns()).unwrap();
        assert_eq!(raw.start, vec![0x07]);
        assert_eq!(raw.order, Order::Descending);
    }
}
