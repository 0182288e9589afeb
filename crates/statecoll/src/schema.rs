//! Collection registration and schema introspection.
//!
//! Every collection is constructed against a [`SchemaBuilder`]. Registration
//! is where configuration mistakes are caught: overlapping namespaces,
//! empty namespaces, malformed or duplicate names. A finished builder yields
//! a [`Schema`] describing every collection sharing the store.

use serde::{Serialize, Serializer};
use statecoll_core::Namespace;

use crate::error::{CollectionError, Result};

/// What kind of collection a namespace belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Map,
    KeySet,
    Item,
    Sequence,
    IndexedMap,
    MultiIndex,
}

/// One registered collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionInfo {
    pub name: String,
    #[serde(serialize_with = "namespace_hex")]
    pub namespace: Namespace,
    pub kind: CollectionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_encoder: Option<String>,
    pub value_encoder: Option<String>,
}

fn namespace_hex<S: Serializer>(namespace: &Namespace, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&namespace.to_hex())
}

/// Collects collection registrations for one store.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    collections: Vec<CollectionInfo>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collection, rejecting any conflict with those already
    /// registered.
    pub fn register(&mut self, info: CollectionInfo) -> Result<()> {
        validate_name(&info.name)?;
        if info.namespace.is_empty() {
            return Err(CollectionError::InvalidNamespace { name: info.name });
        }

        for existing in &self.collections {
            if existing.name == info.name {
                return Err(CollectionError::DuplicateName(info.name));
            }
            if existing.namespace.overlaps(&info.namespace) {
                return Err(CollectionError::NamespaceCollision {
                    name: info.name,
                    namespace: info.namespace,
                    existing: existing.name.clone(),
                    existing_namespace: existing.namespace.clone(),
                });
            }
        }

        tracing::trace!(name = %info.name, namespace = %info.namespace, kind = ?info.kind, "registered collection");
        self.collections.push(info);
        Ok(())
    }

    /// True if a collection called `name` of `kind` holds `namespace`.
    pub fn contains(&self, name: &str, namespace: &Namespace, kind: CollectionKind) -> bool {
        self.collections
            .iter()
            .any(|c| c.name == name && c.namespace == *namespace && c.kind == kind)
    }

    /// Finish registration.
    pub fn build(self) -> Schema {
        let mut collections = self.collections;
        collections.sort_by(|a, b| a.namespace.cmp(&b.namespace));
        Schema { collections }
    }
}

fn validate_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            first.is_ascii_alphabetic() && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(CollectionError::InvalidName(name.to_string()))
    }
}

/// The collections sharing one store, ordered by namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    collections: Vec<CollectionInfo>,
}

impl Schema {
    pub fn collections(&self) -> &[CollectionInfo] {
        &self.collections
    }

    pub fn get(&self, name: &str) -> Option<&CollectionInfo> {
        self.collections.iter().find(|c| c.name == name)
    }

    /// The collection whose namespace prefixes `key`, if any.
    pub fn owner_of(&self, key: &[u8]) -> Option<&CollectionInfo> {
        self.collections
            .iter()
            .find(|c| key.starts_with(c.namespace.as_bytes()))
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}
