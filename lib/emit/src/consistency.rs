//! Cross-target consistency checks.
//!
//! The backend and frontend models are emitted independently; this pass
//! re-reads the generated text and verifies both expose the same field
//! set as the resolved document. A mismatch aborts the run before
//! anything is written, so drift between the two model targets can never
//! reach an output tree.

use std::collections::BTreeSet;

use dynagen_ir::case::to_snake_case;
use dynagen_ir::SchemaIr;

use crate::artifact::{Artifact, TargetKind};
use crate::error::EmitError;

/// Verify backend/frontend field parity for every typed document that
/// has both model artifacts present.
pub fn check_field_parity(ir: &SchemaIr, artifacts: &[Artifact]) -> Result<(), EmitError> {
    for doc in ir.typed_documents() {
        let backend = artifact_for(artifacts, TargetKind::BackendModel, &doc.name);
        let frontend = artifact_for(artifacts, TargetKind::FrontendModel, &doc.name);
        let (Some(backend), Some(frontend)) = (backend, frontend) else {
            continue;
        };

        let expected: BTreeSet<String> = doc
            .attributes
            .iter()
            .map(|a| to_snake_case(&a.name))
            .collect();
        let backend_fields = python_fields(&backend.content);
        let frontend_fields = typescript_fields(&frontend.content);

        require_equal(&doc.name, "backend model", &expected, &backend_fields)?;
        require_equal(&doc.name, "frontend model", &expected, &frontend_fields)?;
    }
    Ok(())
}

fn artifact_for<'a>(
    artifacts: &'a [Artifact],
    target: TargetKind,
    source: &str,
) -> Option<&'a Artifact> {
    artifacts
        .iter()
        .find(|a| a.target == target && a.source == source)
}

fn require_equal(
    document: &str,
    side: &str,
    expected: &BTreeSet<String>,
    actual: &BTreeSet<String>,
) -> Result<(), EmitError> {
    if expected == actual {
        return Ok(());
    }
    let missing: Vec<&str> = expected.difference(actual).map(String::as_str).collect();
    let extra: Vec<&str> = actual.difference(expected).map(String::as_str).collect();
    Err(EmitError::Consistency {
        document: document.to_string(),
        message: format!(
            "{side} fields diverge from the document (missing: [{}], unexpected: [{}])",
            missing.join(", "),
            extra.join(", ")
        ),
    })
}

/// Field names of the dataclass body: four-space-indented `name: ...`
/// lines up to the first classmethod.
fn python_fields(module: &str) -> BTreeSet<String> {
    let mut fields = BTreeSet::new();
    for line in module.lines() {
        if line.starts_with("    @") {
            break;
        }
        let Some(body) = line.strip_prefix("    ") else {
            continue;
        };
        if body.starts_with(char::is_whitespace) {
            continue;
        }
        if let Some((name, _)) = body.split_once(':') {
            fields.insert(to_snake_case(name.trim()));
        }
    }
    fields
}

/// Field names of the interface body: `name: T;` / `name?: T;` lines
/// between `export interface` and the closing brace.
fn typescript_fields(module: &str) -> BTreeSet<String> {
    let mut fields = BTreeSet::new();
    let mut in_interface = false;
    for line in module.lines() {
        if line.starts_with("export interface ") {
            in_interface = true;
            continue;
        }
        if !in_interface {
            continue;
        }
        if line.starts_with('}') {
            break;
        }
        if let Some((name, _)) = line.split_once(':') {
            fields.insert(to_snake_case(name.trim().trim_end_matches('?')));
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynagen_ir::auth::AuthSpec;
    use dynagen_ir::model::{AbstractType, Attribute, DocumentKind, SchemaDocument};

    use crate::backend::BackendModelEmitter;
    use crate::frontend::FrontendModelEmitter;
    use crate::Emitter;

    fn attr(name: &str, required: bool) -> Attribute {
        Attribute {
            name: name.to_string(),
            abstract_type: AbstractType::String,
            required,
            enum_type: None,
            model_ref: None,
            description: None,
        }
    }

    fn widget_ir() -> SchemaIr {
        let doc = SchemaDocument {
            kind: DocumentKind::Table,
            name: "Widget".to_string(),
            attributes: vec![attr("widgetId", true), attr("ownerId", false)],
            partition_key: Some("widgetId".to_string()),
            sort_key: None,
            indexes: vec![],
            operations: None,
            auth: AuthSpec::default(),
            description: None,
        };
        let mut ir = SchemaIr::default();
        ir.tables.insert(doc.name.clone(), doc);
        ir
    }

    fn model_artifacts(ir: &SchemaIr) -> Vec<Artifact> {
        let mut artifacts = BackendModelEmitter.emit(ir).unwrap();
        artifacts.extend(FrontendModelEmitter.emit(ir).unwrap());
        artifacts
    }

    #[test]
    fn emitted_models_agree() {
        let ir = widget_ir();
        check_field_parity(&ir, &model_artifacts(&ir)).unwrap();
    }

    #[test]
    fn missing_frontend_field_is_rejected() {
        let ir = widget_ir();
        let mut artifacts = model_artifacts(&ir);
        let ts = artifacts
            .iter_mut()
            .find(|a| a.target == TargetKind::FrontendModel)
            .unwrap();
        ts.content = ts.content.replace("  ownerId?: string;\n", "");

        let err = check_field_parity(&ir, &artifacts).unwrap_err();
        assert!(err.to_string().contains("frontend model"));
        assert!(err.to_string().contains("owner_id"));
    }

    #[test]
    fn extra_backend_field_is_rejected() {
        let ir = widget_ir();
        let mut artifacts = model_artifacts(&ir);
        let py = artifacts
            .iter_mut()
            .find(|a| a.target == TargetKind::BackendModel && a.source == "Widget")
            .unwrap();
        py.content = py
            .content
            .replace("    widget_id: str\n", "    widget_id: str\n    stray: str\n");

        let err = check_field_parity(&ir, &artifacts).unwrap_err();
        assert!(err.to_string().contains("backend model"));
        assert!(err.to_string().contains("stray"));
    }

    #[test]
    fn single_target_runs_are_not_checked() {
        let ir = widget_ir();
        let artifacts = BackendModelEmitter.emit(&ir).unwrap();
        check_field_parity(&ir, &artifacts).unwrap();
    }
}
