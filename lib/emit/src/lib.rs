//! Target emitters: one read-only IR in, text artifacts out.
//!
//! Each emitter implements [`Emitter`] and knows nothing about the
//! others; the pipeline joins their outputs, runs the cross-target
//! consistency checks, and writes the artifact tree all-or-nothing.

pub mod artifact;
pub mod backend;
pub mod consistency;
pub mod error;
pub mod frontend;
pub mod infra;
pub mod interface;
pub mod pipeline;
pub mod resolver;

pub use artifact::{Artifact, TargetKind};
pub use error::EmitError;
pub use pipeline::{generate, run, GenerateError};

use dynagen_ir::SchemaIr;

/// One code-generation target.
pub trait Emitter {
    fn target(&self) -> TargetKind;
    fn emit(&self, ir: &SchemaIr) -> Result<Vec<Artifact>, EmitError>;
}

/// All five emitters, in a fixed (but unobservable) order.
pub fn emitters_for(targets: &[TargetKind]) -> Vec<Box<dyn Emitter>> {
    let mut out: Vec<Box<dyn Emitter>> = Vec::new();
    for target in targets {
        match target {
            TargetKind::Infra => out.push(Box::new(infra::InfraEmitter)),
            TargetKind::Interface => out.push(Box::new(interface::InterfaceEmitter)),
            TargetKind::BackendModel => out.push(Box::new(backend::BackendModelEmitter)),
            TargetKind::FrontendModel => out.push(Box::new(frontend::FrontendModelEmitter)),
            TargetKind::ResolverTemplate => out.push(Box::new(resolver::ResolverEmitter)),
        }
    }
    out
}
