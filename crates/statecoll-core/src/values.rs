//! Value encoders.

use std::any::type_name;
use std::fmt::Debug;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::ValueEncoder;
use crate::error::{EncodingError, Result};

/// Raw bytes, stored verbatim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BytesValue;

pub const BYTES_VALUE: BytesValue = BytesValue;

impl ValueEncoder<Vec<u8>> for BytesValue {
    fn encode(&self, value: &Vec<u8>) -> Result<Vec<u8>> {
        Ok(value.clone())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        Ok(bytes.to_vec())
    }

    fn stringify(&self, value: &Vec<u8>) -> String {
        hex::encode(value)
    }

    fn name(&self) -> String {
        "bytes".into()
    }
}

/// UTF-8 strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringValue;

pub const STRING_VALUE: StringValue = StringValue;

impl ValueEncoder<String> for StringValue {
    fn encode(&self, value: &String) -> Result<Vec<u8>> {
        Ok(value.as_bytes().to_vec())
    }

    fn decode(&self, bytes: &[u8]) -> Result<String> {
        String::from_utf8(bytes.to_vec()).map_err(|e| EncodingError::InvalidUtf8 {
            encoder: "string",
            valid_up_to: e.utf8_error().valid_up_to(),
        })
    }

    fn stringify(&self, value: &String) -> String {
        value.clone()
    }

    fn name(&self) -> String {
        "string".into()
    }
}

/// Big-endian `u64`, exactly 8 bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Uint64Value;

pub const UINT64_VALUE: Uint64Value = Uint64Value;

impl ValueEncoder<u64> for Uint64Value {
    fn encode(&self, value: &u64) -> Result<Vec<u8>> {
        Ok(value.to_be_bytes().to_vec())
    }

    fn decode(&self, bytes: &[u8]) -> Result<u64> {
        let arr: [u8; 8] = bytes.try_into().map_err(|_| EncodingError::LengthMismatch {
            encoder: "uint64",
            expected: 8,
            actual: bytes.len(),
        })?;
        Ok(u64::from_be_bytes(arr))
    }

    fn stringify(&self, value: &u64) -> String {
        value.to_string()
    }

    fn name(&self) -> String {
        "uint64".into()
    }
}

/// Any serde type, stored as CBOR.
///
/// Structs serialize as maps in field declaration order, so a given value
/// always produces the same bytes.
pub struct CborValue<T>(PhantomData<fn() -> T>);

impl<T> CborValue<T> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for CborValue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for CborValue<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for CborValue<T> {}

impl<T> Debug for CborValue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CborValue<{}>", type_name::<T>())
    }
}

impl<T> ValueEncoder<T> for CborValue<T>
where
    T: Serialize + DeserializeOwned + Debug,
{
    fn encode(&self, value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf).map_err(|e| EncodingError::Cbor(e.to_string()))?;
        Ok(buf)
    }

    fn decode(&self, bytes: &[u8]) -> Result<T> {
        let mut rest = bytes;
        let value = ciborium::from_reader(&mut rest).map_err(|e| EncodingError::Cbor(e.to_string()))?;
        if !rest.is_empty() {
            return Err(EncodingError::TrailingBytes {
                encoder: "cbor",
                extra: rest.len(),
            });
        }
        Ok(value)
    }

    fn stringify(&self, value: &T) -> String {
        format!("{:?}", value)
    }

    fn name(&self) -> String {
        format!("cbor:{}", type_name::<T>())
    }
}
