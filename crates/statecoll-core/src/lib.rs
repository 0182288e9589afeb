//! # statecoll core
//!
//! Pure encoding primitives for statecoll: key and value encoders, fixed-width
//! key types, and namespaces.
//!
//! This crate performs no I/O. Everything here is a deterministic function
//! from typed values to bytes and back.
//!
//! ## Key Types
//!
//! - [`KeyEncoder`] - bijective, order-defining key codec
//! - [`ValueEncoder`] - value codec with a stable type tag
//! - [`PairKeyEncoder`] - composite `(K1, K2)` keys
//! - [`Namespace`] - per-collection byte prefix
//! - [`Address`], [`Hash32`] - fixed-width key types
//!
//! ## Composite keys
//!
//! Variable-width keys (strings, bytes) are escaped and terminated whenever
//! another key component follows them. See [`keys`] for the exact layout.

pub mod codec;
pub mod error;
pub mod keys;
pub mod namespace;
pub mod types;
pub mod values;

pub use codec::{KeyEncoder, ValueEncoder};
pub use error::{EncodingError, Result};
pub use keys::{
    AddressKey, BytesKey, HashKey, Int64Key, PairKeyEncoder, StringKey, Uint64Key, ADDRESS_KEY,
    BYTES_KEY, HASH_KEY, INT64_KEY, STRING_KEY, UINT64_KEY,
};
pub use namespace::{prefix_end, successor, Namespace};
pub use types::{Address, Hash32};
pub use values::{
    BytesValue, CborValue, StringValue, Uint64Value, BYTES_VALUE, STRING_VALUE, UINT64_VALUE,
};
