//! # Statecoll Store
//!
//! The ordered byte store that typed collections sit on top of. Provides a
//! trait-based interface with SQLite and in-memory implementations, plus a
//! write-staging overlay.
//!
//! ## Overview
//!
//! Collections never touch storage directly; they go through the
//! [`KvStore`] trait. The persistent implementation is [`SqliteKvStore`],
//! with [`MemoryKvStore`] for tests and ephemeral state.
//!
//! ## Key Types
//!
//! - [`KvStore`] - Synchronous ordered byte store
//! - [`SqliteKvStore`] - SQLite-backed persistent storage
//! - [`MemoryKvStore`] - `BTreeMap`-backed storage
//! - [`CacheKvStore`] - Buffers writes and commits them as one batch
//! - [`WriteBatch`] - Ordered list of sets and deletes
//!
//! ## Usage
//!
//! ```rust,no_run
//! use statecoll_store::{KvStore, Order, SqliteKvStore};
//!
//! let store = SqliteKvStore::open("state.db").unwrap();
//! store.set(b"k", b"v").unwrap();
//! for entry in store.iterate(None, None, Order::Ascending).unwrap() {
//!     let (key, value) = entry.unwrap();
//!     println!("{:?} = {:?}", key, value);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Byte order**: keys compare as unsigned byte strings in every backend
//! - **Idempotent deletes**: removing an absent key succeeds
//! - **Snapshot cursors**: iteration reflects the store when `iterate` was called

pub mod cache;
pub mod config;
pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use cache::CacheKvStore;
pub use config::{SqliteConfig, Synchronous};
pub use error::{Result, StoreError};
pub use memory::MemoryKvStore;
pub use sqlite::SqliteKvStore;
pub use traits::{in_range, BatchOp, KvStore, Order, RawEntry, RawIter, WriteBatch};
