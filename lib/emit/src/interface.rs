//! Interface emitter: GraphQL SDL per document.
//!
//! Tables render as an object type plus input types and `extend type
//! Query`/`Mutation` blocks; entities as a plain object type; registries
//! as an enum. Auth directives are the merged, canonically ordered form
//! from [`dynagen_ir::auth`] — the type-level directives merge every
//! operation that returns the type with the document's own declaration,
//! so regeneration is byte-identical regardless of declaration order.

use dynagen_ir::model::{
    Attribute, GraphqlKind, Operation, SchemaDocument, SchemaIr, StorageOp,
};
use dynagen_ir::{case, effective_operations, target_type, AuthSpec, Registry, Target};

use crate::artifact::{artifact_path, Artifact, TargetKind};
use crate::error::EmitError;
use crate::Emitter;

pub struct InterfaceEmitter;

impl Emitter for InterfaceEmitter {
    fn target(&self) -> TargetKind {
        TargetKind::Interface
    }

    fn emit(&self, ir: &SchemaIr) -> Result<Vec<Artifact>, EmitError> {
        let mut artifacts = Vec::new();
        for registry in ir.registries.values() {
            artifacts.push(make(&registry.name, registry_sdl(registry)));
        }
        for doc in ir.entities.values() {
            artifacts.push(make(&doc.name, entity_sdl(doc)?));
        }
        for doc in ir.tables.values() {
            artifacts.push(make(&doc.name, table_sdl(doc)?));
        }
        Ok(artifacts)
    }
}

fn make(name: &str, content: String) -> Artifact {
    Artifact {
        target: TargetKind::Interface,
        source: name.to_string(),
        path: artifact_path(TargetKind::Interface, name),
        content,
    }
}

fn header(name: &str) -> String {
    format!("# Generated interface for {name}. Do not edit.\n\n")
}

fn registry_sdl(registry: &Registry) -> String {
    let mut out = header(&registry.name);
    out.push_str(&format!("enum {} {{\n", case::to_pascal_case(&registry.name)));
    for value in &registry.values {
        out.push_str(&format!("  {value}\n"));
    }
    out.push_str("}\n");
    out
}

/// GraphQL type token for an attribute, without the `!` suffix.
fn field_type(doc: &SchemaDocument, attr: &Attribute) -> Result<String, EmitError> {
    if let Some(registry) = &attr.enum_type {
        return Ok(case::to_pascal_case(registry));
    }
    if let Some(target) = &attr.model_ref {
        return Ok(case::to_pascal_case(target));
    }
    target_type(attr.abstract_type, Target::Graphql)
        .map(str::to_string)
        .map_err(|e| EmitError::type_mapping(&doc.name, e))
}

/// Same, but for positions inside `input` blocks, where object types are
/// not legal field types; model references use the entity's input form.
fn input_field_type(doc: &SchemaDocument, attr: &Attribute) -> Result<String, EmitError> {
    match &attr.model_ref {
        Some(target) => Ok(format!("{}Input", case::to_pascal_case(target))),
        None => field_type(doc, attr),
    }
}

fn type_block(doc: &SchemaDocument, auth: &AuthSpec) -> Result<String, EmitError> {
    let mut out = String::new();
    out.push_str(&format!(
        "type {}{} {{\n",
        case::to_pascal_case(&doc.name),
        auth.render_suffix()
    ));
    for attr in &doc.attributes {
        let bang = if attr.required { "!" } else { "" };
        out.push_str(&format!(
            "  {}: {}{}\n",
            case::to_camel_case(&attr.name),
            field_type(doc, attr)?,
            bang
        ));
    }
    out.push_str("}\n");
    Ok(out)
}

fn entity_sdl(doc: &SchemaDocument) -> Result<String, EmitError> {
    let mut out = header(&doc.name);
    out.push_str(&type_block(doc, &doc.auth)?);

    // The input form lives next to the type so mutation inputs on any
    // table can reference it without redefining it.
    out.push('\n');
    out.push_str(&format!("input {}Input {{\n", case::to_pascal_case(&doc.name)));
    for attr in &doc.attributes {
        let bang = if attr.required { "!" } else { "" };
        out.push_str(&format!(
            "  {}: {}{}\n",
            case::to_camel_case(&attr.name),
            input_field_type(doc, attr)?,
            bang
        ));
    }
    out.push_str("}\n");
    Ok(out)
}

fn input_name(doc: &SchemaDocument, op: &Operation) -> String {
    format!(
        "{}{}Input",
        case::to_pascal_case(&op.name),
        case::to_pascal_case(&doc.name)
    )
}

fn input_block(doc: &SchemaDocument, op: &Operation) -> Result<String, EmitError> {
    let keys = doc.key_attributes();
    let mut out = String::new();
    out.push_str(&format!("input {} {{\n", input_name(doc, op)));
    for attr in &doc.attributes {
        let is_key = keys.contains(&attr.name.as_str());
        // Update inputs require only the key attributes; everything else
        // is caller-optional so partial updates stay expressible.
        let required = match op.storage_op {
            StorageOp::Update => is_key,
            _ => attr.required || is_key,
        };
        let bang = if required { "!" } else { "" };
        out.push_str(&format!(
            "  {}: {}{}\n",
            case::to_camel_case(&attr.name),
            input_field_type(doc, attr)?,
            bang
        ));
    }
    out.push_str("}\n");
    Ok(out)
}

/// Argument list for a field, e.g. `(widgetId: String!)`.
fn field_args(doc: &SchemaDocument, op: &Operation) -> Result<String, EmitError> {
    let key_arg = |name: &str, required: bool| -> Result<String, EmitError> {
        let attr = doc.attribute(name).ok_or_else(|| {
            EmitError::render(
                TargetKind::Interface,
                &doc.name,
                format!("operation '{}' references unknown attribute '{name}'", op.name),
            )
        })?;
        let bang = if required { "!" } else { "" };
        Ok(format!(
            "{}: {}{bang}",
            case::to_camel_case(name),
            field_type(doc, attr)?
        ))
    };

    let args = match op.storage_op {
        StorageOp::Put | StorageOp::Update => {
            vec![format!("input: {}!", input_name(doc, op))]
        }
        StorageOp::Get | StorageOp::Delete => {
            let mut args = Vec::new();
            if let Some(pk) = &doc.partition_key {
                args.push(key_arg(pk, true)?);
            }
            if let Some(sk) = &doc.sort_key {
                args.push(key_arg(sk, true)?);
            }
            args
        }
        StorageOp::Query => match &op.index {
            Some(binding) => {
                let mut args = vec![key_arg(&binding.partition_key, true)?];
                if let Some(sk) = &binding.sort_key {
                    args.push(key_arg(sk, false)?);
                }
                args
            }
            None => Vec::new(),
        },
    };

    if args.is_empty() {
        Ok(String::new())
    } else {
        Ok(format!("({})", args.join(", ")))
    }
}

fn table_sdl(doc: &SchemaDocument) -> Result<String, EmitError> {
    let ops = effective_operations(doc);
    let pascal = case::to_pascal_case(&doc.name);

    // The type-level directives cover every operation returning the type.
    let type_auth = AuthSpec::merge_all(std::iter::once(&doc.auth).chain(ops.iter().map(|o| &o.auth)));

    let mut out = header(&doc.name);
    out.push_str(&type_block(doc, &type_auth)?);

    for op in &ops {
        if matches!(op.storage_op, StorageOp::Put | StorageOp::Update) {
            out.push('\n');
            out.push_str(&input_block(doc, op)?);
        }
    }

    for kind in [GraphqlKind::Query, GraphqlKind::Mutation] {
        let fields: Vec<&Operation> = ops.iter().filter(|o| o.graphql_kind == kind).collect();
        if fields.is_empty() {
            continue;
        }
        let root = match kind {
            GraphqlKind::Query => "Query",
            GraphqlKind::Mutation => "Mutation",
        };
        out.push('\n');
        out.push_str(&format!("extend type {root} {{\n"));
        for op in fields {
            let returns = match op.storage_op {
                StorageOp::Query => format!("[{pascal}]"),
                _ => pascal.clone(),
            };
            out.push_str(&format!(
                "  {}{}: {}{}\n",
                op.field_name,
                field_args(doc, op)?,
                returns,
                op.auth.render_suffix()
            ));
        }
        out.push_str("}\n");
    }

    Ok(out)
}
