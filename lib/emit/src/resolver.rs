//! Resolver-template emitter: one VTL request mapping template per
//! operation on a table document.
//!
//! Put/Get/Delete/Query templates are static key or index extraction.
//! The Update template is second-order: the text emitted here is itself a
//! template, evaluated per request, that builds the update expression
//! from whichever fields the caller actually supplied. Its runtime
//! contract has two load-bearing guarantees:
//!
//! 1. **Key exclusion** — the partition and sort key attributes never
//!    appear in the dynamically built update clause; rewriting key
//!    attributes in an update is undefined in the store.
//! 2. **Timestamp authority** — `updatedAt` is always assigned from the
//!    evaluation-time clock (`$util.time.nowISO8601()`); a caller-supplied
//!    value is filtered out before the clause is built.
//!
//! [`check_update_contract`] verifies both guarantees against the emitted
//! text, and the emitter refuses to produce a template that fails it.

use std::collections::BTreeSet;

use dynagen_ir::model::{Operation, SchemaDocument, SchemaIr, StorageOp};
use dynagen_ir::{case, effective_operations};

use crate::artifact::{resolver_path, Artifact, TargetKind};
use crate::error::EmitError;
use crate::Emitter;

/// Audit-timestamp attribute the Update template always overrides.
pub const UPDATED_AT: &str = "updatedAt";

pub struct ResolverEmitter;

impl Emitter for ResolverEmitter {
    fn target(&self) -> TargetKind {
        TargetKind::ResolverTemplate
    }

    fn emit(&self, ir: &SchemaIr) -> Result<Vec<Artifact>, EmitError> {
        let mut artifacts = Vec::new();
        for doc in ir.tables.values() {
            for op in effective_operations(doc) {
                let content = match op.storage_op {
                    StorageOp::Put => put_template(doc, &op),
                    StorageOp::Update => {
                        let template = update_template(doc, &op);
                        check_update_contract(doc, &template)?;
                        template
                    }
                    StorageOp::Delete => key_template(doc, &op, "DeleteItem"),
                    StorageOp::Get => key_template(doc, &op, "GetItem"),
                    StorageOp::Query => query_template(doc, &op),
                };
                artifacts.push(Artifact {
                    target: TargetKind::ResolverTemplate,
                    source: doc.name.clone(),
                    path: resolver_path(&doc.name, &op.field_name),
                    content,
                });
            }
        }
        Ok(artifacts)
    }
}

/// Verify the two Update-template guarantees on the emitted text.
///
/// This checks stage one (the text we generate) against the documented
/// contract for stage two (what the runtime evaluator will do with it),
/// without needing an actual VTL evaluator.
pub fn check_update_contract(doc: &SchemaDocument, template: &str) -> Result<(), EmitError> {
    let fail = |message: String| {
        Err(EmitError::render(
            TargetKind::ResolverTemplate,
            &doc.name,
            message,
        ))
    };

    for key in doc.key_attributes() {
        let camel = case::to_camel_case(key);
        if !template.contains(&format!("\"{camel}\"")) {
            return fail(format!("key attribute '{camel}' missing from key-exclusion guard"));
        }
        // Key attributes may only appear in the guard list and the key
        // clause, never as an update-expression name.
        if template.contains(&format!("\"#{camel}\"")) {
            return fail(format!("key attribute '{camel}' leaked into the update expression"));
        }
    }

    if !template.contains(&format!("$entry.key != \"{UPDATED_AT}\"")) {
        return fail(format!("caller-supplied {UPDATED_AT} is not filtered out"));
    }
    if !template.contains("$util.time.nowISO8601()") {
        return fail(format!("{UPDATED_AT} is not assigned from the evaluation-time clock"));
    }
    Ok(())
}

fn header(op: &Operation, operation: &str) -> String {
    format!("## {} — {operation} request template. Generated; do not edit.\n", op.field_name)
}

/// `"widgetId": $util.dynamodb.toDynamoDBJson($ctx.args.widgetId)` lines
/// for the key clause. `source` is the VTL expression holding the values.
fn key_clause(doc: &SchemaDocument, source: &str) -> String {
    let lines: Vec<String> = doc
        .key_attributes()
        .iter()
        .map(|key| {
            let camel = case::to_camel_case(key);
            format!("    \"{camel}\": $util.dynamodb.toDynamoDBJson({source}.{camel})")
        })
        .collect();
    lines.join(",\n")
}

fn key_template(doc: &SchemaDocument, op: &Operation, operation: &str) -> String {
    let mut out = header(op, operation);
    out.push_str("{\n");
    out.push_str("  \"version\": \"2018-05-29\",\n");
    out.push_str(&format!("  \"operation\": \"{operation}\",\n"));
    out.push_str("  \"key\": {\n");
    out.push_str(&key_clause(doc, "$ctx.args"));
    out.push_str("\n  }\n}\n");
    out
}

fn put_template(doc: &SchemaDocument, op: &Operation) -> String {
    let pk = case::to_camel_case(doc.partition_key.as_deref().unwrap_or_default());
    let mut out = header(op, "PutItem");
    out.push_str("{\n");
    out.push_str("  \"version\": \"2018-05-29\",\n");
    out.push_str("  \"operation\": \"PutItem\",\n");
    out.push_str("  \"key\": {\n");
    out.push_str(&key_clause(doc, "$ctx.args.input"));
    out.push_str("\n  },\n");
    out.push_str("  \"attributeValues\": $util.dynamodb.toMapValuesJson($ctx.args.input),\n");
    out.push_str("  \"condition\": {\n");
    out.push_str("    \"expression\": \"attribute_not_exists(#pk)\",\n");
    out.push_str(&format!("    \"expressionNames\": {{ \"#pk\": \"{pk}\" }}\n"));
    out.push_str("  }\n}\n");
    out
}

fn query_template(doc: &SchemaDocument, op: &Operation) -> String {
    let Some(binding) = &op.index else {
        // A table-wide list has no key condition to build.
        let mut out = header(op, "Scan");
        out.push_str("{\n");
        out.push_str("  \"version\": \"2018-05-29\",\n");
        out.push_str("  \"operation\": \"Scan\"\n}\n");
        return out;
    };

    let pk = case::to_camel_case(&binding.partition_key);
    let mut out = header(op, "Query");
    out.push_str("#set( $expression = \"#pk = :pk\" )\n");
    out.push_str(&format!("#set( $names = {{ \"#pk\": \"{pk}\" }} )\n"));
    out.push_str(&format!(
        "#set( $values = {{ \":pk\": $util.dynamodb.toDynamoDB($ctx.args.{pk}) }} )\n"
    ));
    if let Some(sk) = &binding.sort_key {
        let sk = case::to_camel_case(sk);
        out.push_str(&format!("#if( !$util.isNull($ctx.args.{sk}) )\n"));
        out.push_str("  #set( $expression = \"$expression AND #sk = :sk\" )\n");
        out.push_str(&format!("  $util.qr($names.put(\"#sk\", \"{sk}\"))\n"));
        out.push_str(&format!(
            "  $util.qr($values.put(\":sk\", $util.dynamodb.toDynamoDB($ctx.args.{sk})))\n"
        ));
        out.push_str("#end\n");
    }
    out.push_str("{\n");
    out.push_str("  \"version\": \"2018-05-29\",\n");
    out.push_str("  \"operation\": \"Query\",\n");
    out.push_str(&format!("  \"index\": \"{}\",\n", binding.index_name));
    out.push_str("  \"query\": {\n");
    out.push_str("    \"expression\": \"$expression\",\n");
    out.push_str("    \"expressionNames\": $util.toJson($names),\n");
    out.push_str("    \"expressionValues\": $util.toJson($values)\n");
    out.push_str("  }\n}\n");
    out
}

/// Expression-name placeholder for the pinned timestamp assignment. The
/// dynamic loop names its placeholders `#<field>` after the input fields,
/// so the pin must not share a name with any declared attribute.
fn timestamp_placeholder(doc: &SchemaDocument) -> String {
    let fields: BTreeSet<String> = doc
        .attributes
        .iter()
        .map(|a| case::to_camel_case(&a.name))
        .collect();
    let mut pin = format!("{UPDATED_AT}Attr");
    while fields.contains(&pin) {
        pin.push('_');
    }
    pin
}

fn update_template(doc: &SchemaDocument, op: &Operation) -> String {
    let key_list: Vec<String> = doc
        .key_attributes()
        .iter()
        .map(|k| format!("\"{}\"", case::to_camel_case(k)))
        .collect();
    let pin = timestamp_placeholder(doc);

    let mut out = header(op, "UpdateItem");
    out.push_str("##\n");
    out.push_str("## The update expression is built from the shape of the caller's\n");
    out.push_str("## input at evaluation time. Key attributes are excluded from it,\n");
    out.push_str(&format!(
        "## and {UPDATED_AT} is always taken from the evaluation-time clock.\n"
    ));
    out.push_str("#set( $input = $ctx.args.input )\n");
    out.push_str(&format!("#set( $keyAttributes = [{}] )\n", key_list.join(", ")));
    out.push_str("#set( $names = {} )\n");
    out.push_str("#set( $values = {} )\n");
    out.push_str("#set( $assignments = [] )\n");
    out.push_str("#foreach( $entry in $input.entrySet() )\n");
    out.push_str(&format!(
        "  #if( !$keyAttributes.contains($entry.key) && $entry.key != \"{UPDATED_AT}\" )\n"
    ));
    out.push_str("    $util.qr($assignments.add(\"#${entry.key} = :${entry.key}\"))\n");
    out.push_str("    $util.qr($names.put(\"#${entry.key}\", $entry.key))\n");
    out.push_str(
        "    $util.qr($values.put(\":${entry.key}\", $util.dynamodb.toDynamoDB($entry.value)))\n",
    );
    out.push_str("  #end\n");
    out.push_str("#end\n");
    out.push_str(&format!("$util.qr($assignments.add(\"#{pin} = :{pin}\"))\n"));
    out.push_str(&format!("$util.qr($names.put(\"#{pin}\", \"{UPDATED_AT}\"))\n"));
    out.push_str(&format!(
        "$util.qr($values.put(\":{pin}\", $util.dynamodb.toDynamoDB($util.time.nowISO8601())))\n"
    ));
    out.push_str("{\n");
    out.push_str("  \"version\": \"2018-05-29\",\n");
    out.push_str("  \"operation\": \"UpdateItem\",\n");
    out.push_str("  \"key\": {\n");
    out.push_str(&key_clause(doc, "$input"));
    out.push_str("\n  },\n");
    out.push_str("  \"update\": {\n");
    out.push_str(
        "    \"expression\": \"SET #foreach( $a in $assignments )$a#if( $foreach.hasNext ), #end#end\",\n",
    );
    out.push_str("    \"expressionNames\": $util.toJson($names),\n");
    out.push_str("    \"expressionValues\": $util.toJson($values)\n");
    out.push_str("  }\n}\n");
    out
}
