//! End-to-end generation: load, emit, check, write.
//!
//! Writes are all-or-nothing. Artifacts are staged into a sibling
//! directory and swapped into place only after every emitter and the
//! consistency checks have succeeded, so a failed run never leaves a
//! partially written or mixed-generation output tree.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use dynagen_ir::SchemaIr;
use dynagen_parser::{load_dir, SchemaError};

use crate::artifact::{Artifact, TargetKind};
use crate::consistency::check_field_parity;
use crate::emitters_for;
use crate::error::EmitError;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Emit(#[from] EmitError),

    #[error("cannot write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl GenerateError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Run the selected emitters over a resolved IR and return the combined
/// artifact set, with cross-target checks applied. Nothing touches the
/// filesystem here.
pub fn generate(ir: &SchemaIr, targets: &[TargetKind]) -> Result<Vec<Artifact>, EmitError> {
    let mut artifacts = Vec::new();
    for emitter in emitters_for(targets) {
        let emitted = emitter.emit(ir)?;
        debug!("{} emitter produced {} artifacts", emitter.target(), emitted.len());
        artifacts.extend(emitted);
    }
    check_field_parity(ir, &artifacts)?;
    Ok(artifacts)
}

/// Load schemas from `input`, generate the selected targets, and replace
/// `output` with the new artifact tree. Returns the number of files
/// written.
pub fn run(input: &Path, output: &Path, targets: &[TargetKind]) -> Result<usize, GenerateError> {
    let ir = load_dir(input)?;
    info!(
        "resolved {} tables, {} entities, {} registries from {}",
        ir.tables.len(),
        ir.entities.len(),
        ir.registries.len(),
        input.display()
    );

    let artifacts = generate(&ir, targets)?;
    let written = artifacts.len();
    swap_in(output, &artifacts)?;
    info!("wrote {written} artifacts to {}", output.display());
    Ok(written)
}

/// Stage `artifacts` next to `output`, then swap the staged tree into
/// place. The previous output survives any failure before the swap.
fn swap_in(output: &Path, artifacts: &[Artifact]) -> Result<(), GenerateError> {
    let staging = sibling(output, "staging");
    if staging.exists() {
        fs::remove_dir_all(&staging).map_err(|e| GenerateError::io(&staging, e))?;
    }
    if let Err(e) = write_tree(&staging, artifacts) {
        // Leave nothing half-written behind.
        let _ = fs::remove_dir_all(&staging);
        return Err(e);
    }

    let previous = sibling(output, "previous");
    // A crash between the renames can leave this behind under a reused pid.
    if previous.exists() {
        fs::remove_dir_all(&previous).map_err(|e| GenerateError::io(&previous, e))?;
    }
    if output.exists() {
        fs::rename(output, &previous).map_err(|e| GenerateError::io(output, e))?;
    }
    if let Err(e) = fs::rename(&staging, output) {
        let _ = fs::rename(&previous, output);
        return Err(GenerateError::io(output, e));
    }
    if previous.exists() {
        fs::remove_dir_all(&previous).map_err(|e| GenerateError::io(&previous, e))?;
    }
    Ok(())
}

fn sibling(output: &Path, role: &str) -> PathBuf {
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "out".to_string());
    output.with_file_name(format!(".{name}.{role}-{}", std::process::id()))
}

fn write_tree(root: &Path, artifacts: &[Artifact]) -> Result<(), GenerateError> {
    for artifact in artifacts {
        let path = root.join(&artifact.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| GenerateError::io(parent, e))?;
        }
        fs::write(&path, &artifact.content).map_err(|e| GenerateError::io(&path, e))?;
    }
    Ok(())
}
