//! Encoder traits.
//!
//! A [`KeyEncoder`] turns a typed key into bytes whose lexicographic order is
//! the iteration order of the collection. A [`ValueEncoder`] turns a typed
//! value into the bytes stored under that key.
//!
//! Key encoders must be bijective over the keys actually stored and their
//! `decode` must report exactly how many bytes it consumed, so composite
//! keys can be parsed front to back without length prefixes.

use crate::error::Result;

/// Bijective, order-defining codec for keys of type `K`.
pub trait KeyEncoder<K> {
    /// Encode `key` as the final component of a store key.
    fn encode(&self, key: &K) -> Vec<u8>;

    /// Decode a key from the front of `bytes`.
    ///
    /// Returns the number of bytes consumed alongside the key. Surplus bytes
    /// after the key are left untouched.
    fn decode(&self, bytes: &[u8]) -> Result<(usize, K)>;

    /// Encode `key` when more key components follow it.
    ///
    /// The result must be self-delimiting. Fixed-width encoders can rely on
    /// the default.
    fn encode_non_terminal(&self, key: &K) -> Vec<u8> {
        self.encode(key)
    }

    /// Inverse of [`KeyEncoder::encode_non_terminal`].
    fn decode_non_terminal(&self, bytes: &[u8]) -> Result<(usize, K)> {
        self.decode(bytes)
    }

    /// Human-readable rendering of `key`.
    fn stringify(&self, key: &K) -> String;

    /// Stable type tag, used for schema introspection.
    fn name(&self) -> String;
}

/// Codec for stored values of type `V`.
///
/// Values always occupy the whole stored byte string, so `decode` consumes
/// its entire input.
pub trait ValueEncoder<V> {
    fn encode(&self, value: &V) -> Result<Vec<u8>>;

    fn decode(&self, bytes: &[u8]) -> Result<V>;

    fn stringify(&self, value: &V) -> String;

    /// Stable, non-empty type tag.
    fn name(&self) -> String;
}
