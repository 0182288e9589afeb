//! Secondary indexes.
//!
//! An [`Indexer`] derives index entries from a record. An [`IndexedMap`]
//! drives every indexer of its [`IndexSet`] on each mutation, so the entries
//! always mirror the records.
//!
//! [`IndexedMap`]: crate::IndexedMap

mod multi;

pub use multi::MultiIndex;

use statecoll_core::Namespace;
use statecoll_store::KvStore;

use crate::error::Result;

/// Maintains derived entries for records `(PK, V)`.
///
/// Object safe; an index set hands its indexers out as `&dyn Indexer`.
pub trait Indexer<PK, V> {
    fn name(&self) -> &str;

    /// The namespace the entries live under.
    fn namespace(&self) -> &Namespace;

    /// Write the entries `value` produces for `pk`.
    fn insert(&self, store: &dyn KvStore, pk: &PK, value: &V) -> Result<()>;

    /// Remove the entries `value` produces for `pk`.
    fn remove(&self, store: &dyn KvStore, pk: &PK, value: &V) -> Result<()>;

    /// True if replacing `old` with `new` changes this index's entries.
    fn is_stale(&self, old: &V, new: &V) -> bool;
}

/// The fixed set of indexes attached to one collection type.
///
/// Implemented per collection by listing its index fields:
///
/// ```rust,ignore
/// impl IndexSet<String, FeeShare> for FeeShareIndexes {
///     fn indexers(&self) -> Vec<&dyn Indexer<String, FeeShare>> {
///         vec![&self.by_deployer, &self.by_withdrawer]
///     }
/// }
/// ```
pub trait IndexSet<PK, V> {
    fn indexers(&self) -> Vec<&dyn Indexer<PK, V>>;
}

/// No secondary indexes.
impl<PK, V> IndexSet<PK, V> for () {
    fn indexers(&self) -> Vec<&dyn Indexer<PK, V>> {
        Vec::new()
    }
}
