//! Namespaces and byte-prefix utilities.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The byte prefix that isolates one collection inside a shared store.
///
/// Two collections on the same store must never have overlapping
/// namespaces (equal, or one a prefix of the other).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Namespace(Bytes);

impl Namespace {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if a range scan over either namespace could observe keys of the
    /// other.
    pub fn overlaps(&self, other: &Namespace) -> bool {
        self.0.starts_with(&other.0) || other.0.starts_with(&self.0)
    }

    /// `namespace ++ suffix`.
    pub fn key(&self, suffix: &[u8]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.0.len() + suffix.len());
        buf.extend_from_slice(&self.0);
        buf.extend_from_slice(suffix);
        buf
    }

    /// Strip the namespace from a full store key.
    pub fn strip<'k>(&self, key: &'k [u8]) -> Option<&'k [u8]> {
        key.strip_prefix(&self.0[..])
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Namespace(0x{})", self.to_hex())
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl AsRef<[u8]> for Namespace {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<u8> for Namespace {
    fn from(id: u8) -> Self {
        Self(Bytes::copy_from_slice(&[id]))
    }
}

impl From<&[u8]> for Namespace {
    fn from(bytes: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(bytes))
    }
}

impl<const N: usize> From<[u8; N]> for Namespace {
    fn from(bytes: [u8; N]) -> Self {
        Self(Bytes::copy_from_slice(&bytes))
    }
}

impl From<Vec<u8>> for Namespace {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes::from(bytes))
    }
}

impl From<&str> for Namespace {
    fn from(s: &str) -> Self {
        Self(Bytes::copy_from_slice(s.as_bytes()))
    }
}

/// Smallest byte string greater than every string starting with `prefix`.
///
/// `None` means the range is unbounded above (the prefix is empty or all
/// `0xFF`).
pub fn prefix_end(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < 0xff {
            end.push(last + 1);
            return Some(end);
        }
    }
    None
}

/// The immediate successor of `key` in byte order.
///
/// Turns an inclusive bound into an exclusive one and vice versa.
pub fn successor(key: &[u8]) -> Vec<u8> {
    let mut next = Vec::with_capacity(key.len() + 1);
    next.extend_from_slice(key);
    next.push(0x00);
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlaps() {
        let a = Namespace::from(0x01u8);
        let ab = Namespace::from([0x01, 0x02]);
        let b = Namespace::from(0x02u8);
        assert!(a.overlaps(&ab));
        assert!(ab.overlaps(&a));
        assert!(a.overlaps(&a.clone()));
        assert!(!a.overlaps(&b));
        assert!(!ab.overlaps(&b));
    }

    #[test]
    fn test_key_and_strip() {
        let ns = Namespace::from("fs/");
        let key = ns.key(b"ctr1");
        assert_eq!(key, b"fs/ctr1");
        assert_eq!(ns.strip(&key), Some(&b"ctr1"[..]));
        assert_eq!(ns.strip(b"other"), None);
    }

    #[test]
    fn test_prefix_end() {
        assert_eq!(prefix_end(b"ab"), Some(b"ac".to_vec()));
        assert_eq!(prefix_end(&[0x01, 0xff]), Some(vec![0x02]));
        assert_eq!(prefix_end(&[0xff, 0xff]), None);
        assert_eq!(prefix_end(&[]), None);
    }

    #[test]
    fn test_successor() {
        assert_eq!(successor(b"a"), b"a\x00");
        assert!(successor(b"a").as_slice() > b"a".as_slice());
        assert!(successor(b"a").as_slice() < b"a\x01".as_slice());
    }

    #[test]
    fn test_display() {
        assert_eq!(Namespace::from(0x0au8).to_string(), "0x0a");
        assert_eq!(format!("{:?}", Namespace::from(0x0au8)), "Namespace(0x0a)");
    }
}
