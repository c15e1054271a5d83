//! Backend-model emitter: one Python module per document.
//!
//! Registries become `str`-valued `Enum` classes with a `parse`
//! classmethod that falls back to `UNKNOWN`; tables and entities become
//! dataclasses with a `from_item` constructor that applies the enum
//! fallback and timestamp parsing. Enum-typed fields are annotated `str`
//! and validated through the registry class, matching how items come out
//! of the store.

use std::collections::BTreeSet;

use dynagen_ir::model::{AbstractType, Attribute, DocumentKind, SchemaDocument, SchemaIr};
use dynagen_ir::{case, target_type, Registry, Target};

use crate::artifact::{artifact_path, Artifact, TargetKind};
use crate::error::EmitError;
use crate::Emitter;

pub struct BackendModelEmitter;

impl Emitter for BackendModelEmitter {
    fn target(&self) -> TargetKind {
        TargetKind::BackendModel
    }

    fn emit(&self, ir: &SchemaIr) -> Result<Vec<Artifact>, EmitError> {
        let mut artifacts = Vec::new();
        for registry in ir.registries.values() {
            artifacts.push(make(&registry.name, registry_module(registry)));
        }
        // Interface-only documents never reach the data layer.
        for doc in ir.typed_documents().filter(|d| d.kind != DocumentKind::GraphqlType) {
            artifacts.push(make(&doc.name, dataclass_module(doc)?));
        }
        Ok(artifacts)
    }
}

fn make(name: &str, content: String) -> Artifact {
    Artifact {
        target: TargetKind::BackendModel,
        source: name.to_string(),
        path: artifact_path(TargetKind::BackendModel, name),
        content,
    }
}

fn registry_module(registry: &Registry) -> String {
    let pascal = case::to_pascal_case(&registry.name);
    let mut out = String::new();
    out.push_str(&format!(
        "\"\"\"Generated data model for {}. Do not edit.\"\"\"\n",
        registry.name
    ));
    out.push_str("from __future__ import annotations\n\n");
    out.push_str("from enum import Enum\n\n\n");
    out.push_str(&format!("class {pascal}(str, Enum):\n"));
    for value in &registry.values {
        out.push_str(&format!("    {value} = \"{value}\"\n"));
    }
    out.push('\n');
    out.push_str("    @classmethod\n");
    out.push_str(&format!(
        "    def parse(cls, value: object) -> \"{pascal}\":\n"
    ));
    out.push_str(
        "        \"\"\"Return the matching value, or UNKNOWN when unparseable.\"\"\"\n",
    );
    out.push_str("        try:\n");
    out.push_str("            return cls(str(value))\n");
    out.push_str("        except ValueError:\n");
    out.push_str("            return cls.UNKNOWN\n");
    out
}

/// Python annotation for an attribute, before any `Optional[...]` wrapping.
fn annotation(doc: &SchemaDocument, attr: &Attribute) -> Result<String, EmitError> {
    if attr.enum_type.is_some() {
        // Enum fields are strings validated through the registry class.
        return Ok("str".to_string());
    }
    if let Some(target) = &attr.model_ref {
        return Ok(case::to_pascal_case(target));
    }
    target_type(attr.abstract_type, Target::Python)
        .map(str::to_string)
        .map_err(|e| EmitError::type_mapping(&doc.name, e))
}

/// A field is defaulted when it is optional or enum-typed; dataclasses
/// require defaulted fields to follow plain ones.
fn is_defaulted(attr: &Attribute) -> bool {
    !attr.required || attr.enum_type.is_some()
}

fn field_line(doc: &SchemaDocument, attr: &Attribute) -> Result<String, EmitError> {
    let snake = case::to_snake_case(&attr.name);
    let base = annotation(doc, attr)?;
    if let Some(registry) = &attr.enum_type {
        let pascal = case::to_pascal_case(registry);
        return Ok(format!("    {snake}: str = {pascal}.UNKNOWN.value\n"));
    }
    if attr.required {
        Ok(format!("    {snake}: {base}\n"))
    } else {
        Ok(format!("    {snake}: Optional[{base}] = None\n"))
    }
}

fn from_item_expr(attr: &Attribute) -> String {
    let key = case::to_camel_case(&attr.name);
    if let Some(registry) = &attr.enum_type {
        let pascal = case::to_pascal_case(registry);
        return format!("{pascal}.parse(item.get(\"{key}\")).value");
    }
    if let Some(target) = &attr.model_ref {
        let pascal = case::to_pascal_case(target);
        return if attr.required {
            format!("{pascal}.from_item(item[\"{key}\"])")
        } else {
            format!("{pascal}.from_item(item[\"{key}\"]) if item.get(\"{key}\") else None")
        };
    }
    match (attr.abstract_type, attr.required) {
        (AbstractType::Timestamp, true) => {
            format!("datetime.fromisoformat(item[\"{key}\"])")
        }
        (AbstractType::Timestamp, false) => format!(
            "datetime.fromisoformat(item[\"{key}\"]) if item.get(\"{key}\") else None"
        ),
        (_, true) => format!("item[\"{key}\"]"),
        (_, false) => format!("item.get(\"{key}\")"),
    }
}

fn dataclass_module(doc: &SchemaDocument) -> Result<String, EmitError> {
    let pascal = case::to_pascal_case(&doc.name);

    // Plain fields first, defaulted fields second; relative order kept.
    let mut ordered: Vec<&Attribute> = doc.attributes.iter().filter(|a| !is_defaulted(a)).collect();
    ordered.extend(doc.attributes.iter().filter(|a| is_defaulted(a)));

    let mut referenced: BTreeSet<String> = BTreeSet::new();
    for attr in &doc.attributes {
        if let Some(name) = attr.enum_type.as_ref().or(attr.model_ref.as_ref()) {
            referenced.insert(name.clone());
        }
    }
    let needs_datetime = doc
        .attributes
        .iter()
        .any(|a| a.abstract_type == AbstractType::Timestamp && a.enum_type.is_none());
    let needs_optional = doc
        .attributes
        .iter()
        .any(|a| !a.required && a.enum_type.is_none());

    let mut out = String::new();
    out.push_str(&format!(
        "\"\"\"Generated data model for {}. Do not edit.\"\"\"\n",
        doc.name
    ));
    out.push_str("from __future__ import annotations\n\n");
    out.push_str("from dataclasses import dataclass\n");
    if needs_datetime {
        out.push_str("from datetime import datetime\n");
    }
    if needs_optional {
        out.push_str("from typing import Optional\n");
    }
    for name in &referenced {
        out.push_str(&format!(
            "\nfrom .{}_model import {}\n",
            case::to_snake_case(name),
            case::to_pascal_case(name)
        ));
    }
    out.push_str("\n\n@dataclass\n");
    out.push_str(&format!("class {pascal}:\n"));
    for attr in &ordered {
        out.push_str(&field_line(doc, attr)?);
    }
    out.push('\n');
    out.push_str("    @classmethod\n");
    out.push_str(&format!(
        "    def from_item(cls, item: dict) -> \"{pascal}\":\n"
    ));
    out.push_str("        return cls(\n");
    for attr in &ordered {
        out.push_str(&format!(
            "            {}={},\n",
            case::to_snake_case(&attr.name),
            from_item_expr(attr)
        ));
    }
    out.push_str("        )\n");
    Ok(out)
}
