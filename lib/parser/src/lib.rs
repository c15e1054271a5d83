//! Schema loader: YAML documents in, resolved [`dynagen_ir::SchemaIr`] out.
//!
//! Loading is two-pass. Pass 1 reads every document in the input directory
//! and indexes it by name; pass 2 validates and resolves cross-document
//! references (registries, model references), because documents may refer
//! to others that load later. Load order never affects the result.
//!
//! The loader never writes output; it either produces a fully resolved IR
//! or a [`SchemaError`] naming the offending document and field.

pub mod error;
pub mod loader;
pub mod raw;

pub use error::SchemaError;
pub use loader::{load_dir, resolve};
