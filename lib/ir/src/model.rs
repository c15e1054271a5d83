//! Resolved schema documents.
//!
//! These types are the output of the two-pass loader: every `enum_type`
//! points at a loaded [`Registry`], every `model_ref` at a loaded entity
//! document, and every key/index field at a declared attribute. Documents
//! are immutable for the rest of the generation run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::auth::AuthSpec;

/// Document kind, tagged. Behavior never dispatches on raw strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    /// Storage-backed entity with keys, indexes and operations.
    Table,
    /// Non-storage-backed nested value object.
    Entity,
    /// Enum-like value list with a mandatory `UNKNOWN` sentinel.
    Registry,
    /// Interface-only type, same shape as `Entity`.
    GraphqlType,
}

/// Abstract attribute type, translated per target by [`crate::types`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbstractType {
    String,
    Number,
    Boolean,
    Timestamp,
    Array,
    Map,
}

impl AbstractType {
    /// Whether the type may back a partition/sort/index key.
    /// Timestamps are key-capable because they store as ISO-8601 strings.
    pub fn is_key_capable(self) -> bool {
        matches!(self, Self::String | Self::Number | Self::Timestamp)
    }
}

/// One attribute of a schema document. `name` is the canonical,
/// case-neutral identifier; emitters derive lexical forms from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub abstract_type: AbstractType,
    pub required: bool,
    /// Resolved reference to a [`Registry`] by name.
    pub enum_type: Option<String>,
    /// Resolved reference to an entity/graphql-type document by name.
    pub model_ref: Option<String>,
    pub description: Option<String>,
}

/// A secondary index (GSI) on a table document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryIndex {
    pub name: String,
    pub partition_key: String,
    pub sort_key: Option<String>,
}

/// Enum-like value list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    pub name: String,
    pub values: Vec<String>,
    pub description: Option<String>,
}

impl Registry {
    /// Mandatory fallback value used on deserialization failure.
    pub const SENTINEL: &'static str = "UNKNOWN";

    pub fn has_sentinel(&self) -> bool {
        self.values.iter().any(|v| v == Self::SENTINEL)
    }
}

/// GraphQL root a generated field hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphqlKind {
    Query,
    Mutation,
}

/// Storage primitive an operation binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageOp {
    Put,
    Update,
    Delete,
    Get,
    Query,
}

/// An operation as declared in a schema document. Auth is merged with the
/// document's own auth when the effective operation set is computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDef {
    pub name: String,
    pub graphql_kind: GraphqlKind,
    /// Explicit field name; defaults to the camelCase operation name.
    pub field_name: Option<String>,
    pub storage_op: StorageOp,
    /// Name of a secondary index on the same document.
    pub index: Option<String>,
    pub auth: AuthSpec,
}

/// Binding of a Query-kind operation to a physical secondary index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexBinding {
    pub index_name: String,
    pub partition_key: String,
    pub sort_key: Option<String>,
}

/// An effective operation: declared or synthesized, auth fully merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    pub graphql_kind: GraphqlKind,
    pub field_name: String,
    pub storage_op: StorageOp,
    pub index: Option<IndexBinding>,
    pub auth: AuthSpec,
}

/// One resolved schema document (kind `table`, `entity` or `graphql-type`;
/// registries get their own type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub kind: DocumentKind,
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub partition_key: Option<String>,
    pub sort_key: Option<String>,
    pub indexes: Vec<SecondaryIndex>,
    /// Explicit operation list; `None` means the five CRUD defaults.
    pub operations: Option<Vec<OperationDef>>,
    pub auth: AuthSpec,
    pub description: Option<String>,
}

impl SchemaDocument {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Key attribute names: partition first, then sort if present.
    pub fn key_attributes(&self) -> Vec<&str> {
        let mut keys = Vec::new();
        if let Some(pk) = &self.partition_key {
            keys.push(pk.as_str());
        }
        if let Some(sk) = &self.sort_key {
            keys.push(sk.as_str());
        }
        keys
    }

    pub fn index(&self, name: &str) -> Option<&SecondaryIndex> {
        self.indexes.iter().find(|i| i.name == name)
    }
}

/// The fully resolved IR for one generation run.
///
/// Documents are keyed by name in sorted maps, so the IR (and everything
/// derived from it) is independent of load order. Names are globally
/// unique across all three maps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaIr {
    pub tables: BTreeMap<String, SchemaDocument>,
    pub entities: BTreeMap<String, SchemaDocument>,
    pub registries: BTreeMap<String, Registry>,
}

impl SchemaIr {
    pub fn registry(&self, name: &str) -> Option<&Registry> {
        self.registries.get(name)
    }

    pub fn entity(&self, name: &str) -> Option<&SchemaDocument> {
        self.entities.get(name)
    }

    /// Tables and entities, in name order.
    pub fn typed_documents(&self) -> impl Iterator<Item = &SchemaDocument> {
        self.tables.values().chain(self.entities.values())
    }

    /// Every document name, in sorted order.
    pub fn document_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .tables
            .keys()
            .chain(self.entities.keys())
            .chain(self.registries.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.entities.is_empty() && self.registries.is_empty()
    }
}
