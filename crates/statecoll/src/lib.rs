//! # Statecoll
//!
//! Typed, secondary-indexed collections over a deterministic, byte-ordered
//! key-value store.
//!
//! ## Overview
//!
//! Every collection owns a namespace (a byte prefix) inside one shared
//! store and translates typed keys and values to bytes through encoders:
//!
//! - **Map**: `K -> V` records with ordered range iteration
//! - **KeySet**: a set of `K`
//! - **Item**: one value at a fixed key
//! - **Sequence**: a monotonic `u64` counter
//! - **MultiIndex**: index key -> primary keys sharing it
//! - **IndexedMap**: a map whose indexes are reconciled on every write
//!
//! Iteration order is the byte order of encoded keys, which every encoder
//! keeps equal to the natural order of its key type. Identical operations
//! therefore produce identical bytes and identical iteration on every node.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use statecoll::{Map, Range, SchemaBuilder};
//! use statecoll::encoding::{STRING_KEY, UINT64_VALUE};
//! use statecoll::store::MemoryKvStore;
//!
//! let mut schema = SchemaBuilder::new();
//! let balances = Map::new(&mut schema, 0x01u8, "balances", STRING_KEY, UINT64_VALUE).unwrap();
//! let store = MemoryKvStore::new();
//!
//! balances.set(&store, &"alice".to_string(), &100).unwrap();
//! for record in balances.iterate(&store, Range::new()).unwrap() {
//!     let (who, amount) = record.unwrap();
//!     println!("{who}: {amount}");
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `statecoll::encoding` - encoders, namespaces, key types
//! - `statecoll::store` - the byte-store trait and its implementations

pub mod error;
pub mod indexed_map;
pub mod indexes;
pub mod item;
pub mod iter;
pub mod keyset;
pub mod map;
pub mod range;
pub mod schema;
pub mod sequence;

// Re-export component crates
pub use statecoll_core as encoding;
pub use statecoll_store as store;

pub use error::{CollectionError, Result};
pub use indexed_map::IndexedMap;
pub use indexes::{IndexSet, Indexer, MultiIndex};
pub use item::Item;
pub use iter::{IndexIter, Iter, KeySetIter};
pub use keyset::KeySet;
pub use map::Map;
pub use range::{Bound, PairRange, Range, RawRange, Ranger};
pub use schema::{CollectionInfo, CollectionKind, Schema, SchemaBuilder};
pub use sequence::Sequence;

// Re-export commonly used types
pub use statecoll_core::{KeyEncoder, Namespace, PairKeyEncoder, ValueEncoder};
pub use statecoll_store::{KvStore, MemoryKvStore, Order, SqliteKvStore};
