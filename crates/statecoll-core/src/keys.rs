//! Key encoders.
//!
//! Byte order of encoded keys equals the natural order of the keys for every
//! encoder here. Fixed-width encoders are self-delimiting as-is. Variable
//! width encoders (strings, raw bytes) are written verbatim when they are the
//! last key component and escaped + terminated otherwise:
//!
//! ```text
//! 0x00         -> 0x00 0xFF
//! end of key   -> 0x00 0x00
//! ```
//!
//! The escaped form preserves ordering and never appears as a prefix of a
//! different key's escaped form, so `(ik, pk)` composites stay unambiguous.

use crate::codec::KeyEncoder;
use crate::error::{EncodingError, Result};
use crate::types::{Address, Hash32};

const ESCAPE: u8 = 0x00;
const ESCAPED_NUL: u8 = 0xff;
const TERMINATOR: u8 = 0x00;

/// Escape `raw` and append the terminator.
pub fn escape_terminated(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len() + 2);
    for &b in raw {
        out.push(b);
        if b == ESCAPE {
            out.push(ESCAPED_NUL);
        }
    }
    out.push(ESCAPE);
    out.push(TERMINATOR);
    out
}

/// Inverse of [`escape_terminated`]. Returns `(bytes consumed, raw)`.
pub fn unescape_terminated(encoder: &'static str, bytes: &[u8]) -> Result<(usize, Vec<u8>)> {
    let mut raw = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b != ESCAPE {
            raw.push(b);
            i += 1;
            continue;
        }
        match bytes.get(i + 1) {
            Some(&ESCAPED_NUL) => {
                raw.push(ESCAPE);
                i += 2;
            }
            Some(&TERMINATOR) => return Ok((i + 2, raw)),
            Some(&byte) => {
                return Err(EncodingError::InvalidEscape {
                    encoder,
                    byte,
                    offset: i + 1,
                })
            }
            None => break,
        }
    }
    Err(EncodingError::Unterminated { encoder })
}

fn fixed<const N: usize>(encoder: &'static str, bytes: &[u8]) -> Result<[u8; N]> {
    let head = bytes.get(..N).ok_or(EncodingError::Truncated {
        encoder,
        expected: N,
        actual: bytes.len(),
    })?;
    let mut arr = [0u8; N];
    arr.copy_from_slice(head);
    Ok(arr)
}

/// The bytes after the first `read`, failing if a component claims more
/// than it was given.
fn tail<'a>(encoder: &'static str, bytes: &'a [u8], read: usize) -> Result<&'a [u8]> {
    bytes.get(read..).ok_or(EncodingError::Truncated {
        encoder,
        expected: read,
        actual: bytes.len(),
    })
}

fn utf8(encoder: &'static str, raw: Vec<u8>) -> Result<String> {
    String::from_utf8(raw).map_err(|e| EncodingError::InvalidUtf8 {
        encoder,
        valid_up_to: e.utf8_error().valid_up_to(),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Variable width
// ─────────────────────────────────────────────────────────────────────────────

/// UTF-8 string keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringKey;

pub const STRING_KEY: StringKey = StringKey;

impl KeyEncoder<String> for StringKey {
    fn encode(&self, key: &String) -> Vec<u8> {
        key.as_bytes().to_vec()
    }

    /// Consumes the whole input: a terminal string has no delimiter.
    fn decode(&self, bytes: &[u8]) -> Result<(usize, String)> {
        Ok((bytes.len(), utf8("string", bytes.to_vec())?))
    }

    fn encode_non_terminal(&self, key: &String) -> Vec<u8> {
        escape_terminated(key.as_bytes())
    }

    fn decode_non_terminal(&self, bytes: &[u8]) -> Result<(usize, String)> {
        let (read, raw) = unescape_terminated("string", bytes)?;
        Ok((read, utf8("string", raw)?))
    }

    fn stringify(&self, key: &String) -> String {
        key.clone()
    }

    fn name(&self) -> String {
        "string".into()
    }
}

/// Raw byte-string keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BytesKey;

pub const BYTES_KEY: BytesKey = BytesKey;

impl KeyEncoder<Vec<u8>> for BytesKey {
    fn encode(&self, key: &Vec<u8>) -> Vec<u8> {
        key.clone()
    }

    fn decode(&self, bytes: &[u8]) -> Result<(usize, Vec<u8>)> {
        Ok((bytes.len(), bytes.to_vec()))
    }

    fn encode_non_terminal(&self, key: &Vec<u8>) -> Vec<u8> {
        escape_terminated(key)
    }

    fn decode_non_terminal(&self, bytes: &[u8]) -> Result<(usize, Vec<u8>)> {
        unescape_terminated("bytes", bytes)
    }

    fn stringify(&self, key: &Vec<u8>) -> String {
        hex::encode(key)
    }

    fn name(&self) -> String {
        "bytes".into()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Fixed width
// ─────────────────────────────────────────────────────────────────────────────

/// Big-endian `u64` keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Uint64Key;

pub const UINT64_KEY: Uint64Key = Uint64Key;

impl KeyEncoder<u64> for Uint64Key {
    fn encode(&self, key: &u64) -> Vec<u8> {
        key.to_be_bytes().to_vec()
    }

    fn decode(&self, bytes: &[u8]) -> Result<(usize, u64)> {
        Ok((8, u64::from_be_bytes(fixed::<8>("uint64", bytes)?)))
    }

    fn stringify(&self, key: &u64) -> String {
        key.to_string()
    }

    fn name(&self) -> String {
        "uint64".into()
    }
}

/// `i64` keys, big-endian with the sign bit flipped so that negative
/// numbers sort before positive ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Int64Key;

pub const INT64_KEY: Int64Key = Int64Key;

const SIGN_BIT: u64 = 1 << 63;

impl KeyEncoder<i64> for Int64Key {
    fn encode(&self, key: &i64) -> Vec<u8> {
        ((*key as u64) ^ SIGN_BIT).to_be_bytes().to_vec()
    }

    fn decode(&self, bytes: &[u8]) -> Result<(usize, i64)> {
        let raw = u64::from_be_bytes(fixed::<8>("int64", bytes)?);
        Ok((8, (raw ^ SIGN_BIT) as i64))
    }

    fn stringify(&self, key: &i64) -> String {
        key.to_string()
    }

    fn name(&self) -> String {
        "int64".into()
    }
}

/// 20-byte [`Address`] keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddressKey;

pub const ADDRESS_KEY: AddressKey = AddressKey;

impl KeyEncoder<Address> for AddressKey {
    fn encode(&self, key: &Address) -> Vec<u8> {
        key.0.to_vec()
    }

    fn decode(&self, bytes: &[u8]) -> Result<(usize, Address)> {
        Ok((Address::LEN, Address(fixed("address", bytes)?)))
    }

    fn stringify(&self, key: &Address) -> String {
        key.to_hex()
    }

    fn name(&self) -> String {
        "address".into()
    }
}

/// 32-byte [`Hash32`] keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HashKey;

pub const HASH_KEY: HashKey = HashKey;

impl KeyEncoder<Hash32> for HashKey {
    fn encode(&self, key: &Hash32) -> Vec<u8> {
        key.0.to_vec()
    }

    fn decode(&self, bytes: &[u8]) -> Result<(usize, Hash32)> {
        Ok((Hash32::LEN, Hash32(fixed("hash32", bytes)?)))
    }

    fn stringify(&self, key: &Hash32) -> String {
        key.to_hex()
    }

    fn name(&self) -> String {
        "hash32".into()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Composite
// ─────────────────────────────────────────────────────────────────────────────

/// Encoder for `(K1, K2)` keys.
///
/// Layout: `kc1.encode_non_terminal(k1) ++ kc2.encode(k2)`. All keys sharing
/// `k1` form one contiguous range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairKeyEncoder<KC1, KC2> {
    pub kc1: KC1,
    pub kc2: KC2,
}

impl<KC1, KC2> PairKeyEncoder<KC1, KC2> {
    pub const fn new(kc1: KC1, kc2: KC2) -> Self {
        Self { kc1, kc2 }
    }
}

impl<K1, K2, KC1, KC2> KeyEncoder<(K1, K2)> for PairKeyEncoder<KC1, KC2>
where
    KC1: KeyEncoder<K1>,
    KC2: KeyEncoder<K2>,
{
    fn encode(&self, key: &(K1, K2)) -> Vec<u8> {
        let mut buf = self.kc1.encode_non_terminal(&key.0);
        buf.extend_from_slice(&self.kc2.encode(&key.1));
        buf
    }

    fn decode(&self, bytes: &[u8]) -> Result<(usize, (K1, K2))> {
        let (read1, k1) = self.kc1.decode_non_terminal(bytes)?;
        let (read2, k2) = self.kc2.decode(tail("pair", bytes, read1)?)?;
        Ok((read1 + read2, (k1, k2)))
    }

    fn encode_non_terminal(&self, key: &(K1, K2)) -> Vec<u8> {
        let mut buf = self.kc1.encode_non_terminal(&key.0);
        buf.extend_from_slice(&self.kc2.encode_non_terminal(&key.1));
        buf
    }

    fn decode_non_terminal(&self, bytes: &[u8]) -> Result<(usize, (K1, K2))> {
        let (read1, k1) = self.kc1.decode_non_terminal(bytes)?;
        let (read2, k2) = self.kc2.decode_non_terminal(tail("pair", bytes, read1)?)?;
        Ok((read1 + read2, (k1, k2)))
    }

    fn stringify(&self, key: &(K1, K2)) -> String {
        format!(
            "(\"{}\", \"{}\")",
            self.kc1.stringify(&key.0),
            self.kc2.stringify(&key.1)
        )
    }

    fn name(&self) -> String {
        format!("pair[{},{}]", self.kc1.name(), self.kc2.name())
    }
}
