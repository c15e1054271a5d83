//! Raw document shapes as authored in YAML.
//!
//! These mirror the input format field-for-field; validation and
//! reference resolution happen in [`crate::loader`], not here. Unknown
//! fields are rejected so a typo in a schema file fails loudly instead of
//! silently dropping a declaration.

use serde::Deserialize;

use dynagen_ir::model::{AbstractType, DocumentKind, GraphqlKind, StorageOp};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawDocument {
    pub kind: DocumentKind,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub attributes: Vec<RawAttribute>,
    #[serde(default)]
    pub partition_key: Option<String>,
    #[serde(default)]
    pub sort_key: Option<String>,
    #[serde(default)]
    pub indexes: Vec<RawIndex>,
    #[serde(default)]
    pub operations: Option<Vec<RawOperation>>,
    #[serde(default)]
    pub auth_config: Option<RawAuth>,
    /// Registry value list; only meaningful for `kind: registry`.
    #[serde(default)]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawAttribute {
    pub name: String,
    #[serde(rename = "type")]
    pub abstract_type: AbstractType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub enum_type: Option<String>,
    #[serde(default)]
    pub model_reference: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawIndex {
    pub name: String,
    pub partition_key: String,
    #[serde(default)]
    pub sort_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawOperation {
    pub name: String,
    #[serde(rename = "type")]
    pub graphql_kind: GraphqlKind,
    #[serde(default)]
    pub field: Option<String>,
    pub storage_op: StorageOp,
    #[serde(default)]
    pub index: Option<String>,
    #[serde(default)]
    pub auth_config: Option<RawAuth>,
}

/// Only the two known directive shapes exist; anything else in an
/// `authConfig` block is a deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawAuth {
    #[serde(default)]
    pub api_key: bool,
    #[serde(default)]
    pub groups: Vec<String>,
}
