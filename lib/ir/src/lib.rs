//! Intermediate representation for the dynagen schema compiler.
//!
//! The loader (`dynagen-parser`) produces a fully resolved [`SchemaIr`];
//! every emitter consumes it read-only. Nothing in this crate performs I/O.
//!
//! Modules:
//! - [`model`] — schema documents, attributes, registries, operations
//! - [`case`] — lexical case conversion (one tokenizer, four renderings)
//! - [`types`] — abstract type → target type tokens
//! - [`auth`] — authorization directive merging and rendering
//! - [`ops`] — effective operation set for a table document

pub mod auth;
pub mod case;
pub mod model;
pub mod ops;
pub mod types;

pub use auth::AuthSpec;
pub use model::{
    AbstractType, Attribute, DocumentKind, GraphqlKind, IndexBinding, Operation, OperationDef,
    Registry, SchemaDocument, SchemaIr, SecondaryIndex, StorageOp,
};
pub use ops::effective_operations;
pub use types::{target_type, Target, TypeMappingError};
