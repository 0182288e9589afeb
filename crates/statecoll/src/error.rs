//! Error types for typed collections.

use statecoll_core::{EncodingError, Namespace};
use statecoll_store::StoreError;
use thiserror::Error;

/// Errors that can occur during collection operations.
#[derive(Debug, Error)]
pub enum CollectionError {
    /// The requested key holds no value.
    #[error("{collection}: no value for key {key}")]
    NotFound { collection: String, key: String },

    /// Stored bytes did not parse under the collection's encoder.
    ///
    /// The store only ever holds bytes this layer wrote, so this means the
    /// state is corrupted.
    #[error("{collection}: stored bytes failed to decode: {source}")]
    Decode {
        collection: String,
        source: EncodingError,
    },

    /// A value could not be serialized.
    #[error("{collection}: value failed to encode: {source}")]
    Encode {
        collection: String,
        source: EncodingError,
    },

    /// A key decoder consumed a different number of bytes than the stored
    /// key holds.
    #[error("{collection}: key decoder consumed {consumed} of {len} bytes of {key}")]
    EncodeInvariantViolation {
        collection: String,
        key: String,
        consumed: usize,
        len: usize,
    },

    /// Two collections on one store were given overlapping namespaces.
    #[error("namespace {namespace} of {name} overlaps namespace {existing_namespace} of {existing}")]
    NamespaceCollision {
        name: String,
        namespace: Namespace,
        existing: String,
        existing_namespace: Namespace,
    },

    /// A collection was given an empty namespace.
    #[error("{name}: namespace must not be empty")]
    InvalidNamespace { name: String },

    /// Collection names must start with a letter and contain only ASCII
    /// alphanumerics and underscores.
    #[error("invalid collection name {0:?}")]
    InvalidName(String),

    /// Two collections were registered under the same name.
    #[error("collection name {0} is already registered")]
    DuplicateName(String),

    /// An index handed to an indexed map was not registered on the same
    /// schema as the map.
    #[error("{collection}: index {index} is not registered on this schema")]
    UnregisteredIndex { collection: String, index: String },

    /// The range cannot be turned into store bounds.
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// An index entry names a primary key that has no record.
    #[error("{index}: index entry points to missing record {key}")]
    DanglingIndexEntry { index: String, key: String },

    /// A sequence reached `u64::MAX`.
    #[error("{collection}: sequence exhausted")]
    SequenceExhausted { collection: String },

    /// Error from the underlying byte store.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for collection operations.
pub type Result<T> = std::result::Result<T, CollectionError>;
