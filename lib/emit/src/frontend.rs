//! Frontend-model emitter: one TypeScript module per document.
//!
//! Registries become string enums with a `parseX` helper defaulting to
//! `UNKNOWN`; tables and entities become interfaces with camelCase
//! fields. Field sets mirror the backend model exactly (the consistency
//! check enforces this).

use std::collections::BTreeSet;

use dynagen_ir::model::{Attribute, DocumentKind, SchemaDocument, SchemaIr};
use dynagen_ir::{case, target_type, Registry, Target};

use crate::artifact::{artifact_path, Artifact, TargetKind};
use crate::error::EmitError;
use crate::Emitter;

pub struct FrontendModelEmitter;

impl Emitter for FrontendModelEmitter {
    fn target(&self) -> TargetKind {
        TargetKind::FrontendModel
    }

    fn emit(&self, ir: &SchemaIr) -> Result<Vec<Artifact>, EmitError> {
        let mut artifacts = Vec::new();
        for registry in ir.registries.values() {
            artifacts.push(make(&registry.name, enum_module(registry)));
        }
        // Interface-only documents never reach the data layer.
        for doc in ir.typed_documents().filter(|d| d.kind != DocumentKind::GraphqlType) {
            artifacts.push(make(&doc.name, interface_module(doc)?));
        }
        Ok(artifacts)
    }
}

fn make(name: &str, content: String) -> Artifact {
    Artifact {
        target: TargetKind::FrontendModel,
        source: name.to_string(),
        path: artifact_path(TargetKind::FrontendModel, name),
        content,
    }
}

fn header(name: &str) -> String {
    format!("// Generated data model for {name}. Do not edit.\n\n")
}

fn enum_module(registry: &Registry) -> String {
    let pascal = case::to_pascal_case(&registry.name);
    let mut out = header(&registry.name);

    out.push_str(&format!("export enum {pascal} {{\n"));
    for value in &registry.values {
        out.push_str(&format!("  {value} = '{value}',\n"));
    }
    out.push_str("}\n\n");

    out.push_str(&format!(
        "export function parse{pascal}(value: string | null | undefined): {pascal} {{\n"
    ));
    out.push_str(&format!(
        "  if (value && (Object.values({pascal}) as string[]).includes(value)) {{\n"
    ));
    out.push_str(&format!("    return value as {pascal};\n"));
    out.push_str("  }\n");
    out.push_str(&format!("  return {pascal}.UNKNOWN;\n"));
    out.push_str("}\n");
    out
}

fn field_type(doc: &SchemaDocument, attr: &Attribute) -> Result<String, EmitError> {
    if let Some(registry) = &attr.enum_type {
        return Ok(case::to_pascal_case(registry));
    }
    if let Some(target) = &attr.model_ref {
        return Ok(case::to_pascal_case(target));
    }
    target_type(attr.abstract_type, Target::TypeScript)
        .map(str::to_string)
        .map_err(|e| EmitError::type_mapping(&doc.name, e))
}

fn interface_module(doc: &SchemaDocument) -> Result<String, EmitError> {
    let pascal = case::to_pascal_case(&doc.name);

    let mut referenced: BTreeSet<String> = BTreeSet::new();
    for attr in &doc.attributes {
        if let Some(name) = attr.enum_type.as_ref().or(attr.model_ref.as_ref()) {
            referenced.insert(case::to_pascal_case(name));
        }
    }

    let mut out = header(&doc.name);
    for name in &referenced {
        out.push_str(&format!("import {{ {name} }} from './{name}';\n"));
    }
    if !referenced.is_empty() {
        out.push('\n');
    }

    out.push_str(&format!("export interface {pascal} {{\n"));
    for attr in &doc.attributes {
        let optional = if attr.required { "" } else { "?" };
        out.push_str(&format!(
            "  {}{}: {};\n",
            case::to_camel_case(&attr.name),
            optional,
            field_type(doc, attr)?
        ));
    }
    out.push_str("}\n");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynagen_ir::auth::AuthSpec;
    use dynagen_ir::model::{AbstractType, DocumentKind};

    fn attr(name: &str, ty: AbstractType, required: bool) -> Attribute {
        Attribute {
            name: name.to_string(),
            abstract_type: ty,
            required,
            enum_type: None,
            model_ref: None,
            description: None,
        }
    }

    fn widget_ir() -> SchemaIr {
        let mut status = attr("status", AbstractType::String, false);
        status.enum_type = Some("WidgetStatus".to_string());

        let doc = SchemaDocument {
            kind: DocumentKind::Table,
            name: "Widget".to_string(),
            attributes: vec![
                attr("widgetId", AbstractType::String, true),
                status,
                attr("updatedAt", AbstractType::Timestamp, false),
            ],
            partition_key: Some("widgetId".to_string()),
            sort_key: None,
            indexes: vec![],
            operations: None,
            auth: AuthSpec::default(),
            description: None,
        };

        let mut ir = SchemaIr::default();
        ir.tables.insert(doc.name.clone(), doc);
        ir.registries.insert(
            "WidgetStatus".to_string(),
            Registry {
                name: "WidgetStatus".to_string(),
                values: vec!["UNKNOWN".into(), "ACTIVE".into(), "DELETED".into()],
                description: None,
            },
        );
        ir
    }

    fn module(ir: &SchemaIr, source: &str) -> String {
        FrontendModelEmitter
            .emit(ir)
            .unwrap()
            .into_iter()
            .find(|a| a.source == source)
            .unwrap()
            .content
    }

    #[test]
    fn enum_module_falls_back_to_unknown() {
        let ts = module(&widget_ir(), "WidgetStatus");
        assert!(ts.contains("export enum WidgetStatus {"));
        assert!(ts.contains("  UNKNOWN = 'UNKNOWN',\n"));
        assert!(ts.contains("return WidgetStatus.UNKNOWN;"));
    }

    #[test]
    fn interface_uses_enum_type_and_optionality() {
        let ts = module(&widget_ir(), "Widget");
        assert!(ts.contains("import { WidgetStatus } from './WidgetStatus';"));
        assert!(ts.contains("  widgetId: string;\n"));
        assert!(ts.contains("  status?: WidgetStatus;\n"));
        assert!(ts.contains("  updatedAt?: string;\n"));
    }

    #[test]
    fn file_name_is_pascal_module() {
        let artifacts = FrontendModelEmitter.emit(&widget_ir()).unwrap();
        let widget = artifacts.iter().find(|a| a.source == "Widget").unwrap();
        assert_eq!(widget.path, "frontend/Widget.ts");
    }
}
