//! Infrastructure emitter: one CloudFormation-style template per table.
//!
//! Only key and index attributes get attribute definitions; DynamoDB
//! rejects definitions for non-key attributes. Secondary indexes carry
//! their declared names verbatim so the query operations bound to them
//! by the operation synthesizer resolve against the physical GSI.

use serde_json::{json, Value};

use dynagen_ir::model::{SchemaDocument, SchemaIr};
use dynagen_ir::{case, target_type, Target};

use crate::artifact::{artifact_path, Artifact, TargetKind};
use crate::error::EmitError;
use crate::Emitter;

pub struct InfraEmitter;

impl Emitter for InfraEmitter {
    fn target(&self) -> TargetKind {
        TargetKind::Infra
    }

    fn emit(&self, ir: &SchemaIr) -> Result<Vec<Artifact>, EmitError> {
        let mut artifacts = Vec::new();
        for doc in ir.tables.values() {
            let template = table_template(doc)?;
            let content = serde_json::to_string_pretty(&template).map_err(|e| {
                EmitError::render(TargetKind::Infra, &doc.name, e.to_string())
            })?;
            artifacts.push(Artifact {
                target: TargetKind::Infra,
                source: doc.name.clone(),
                path: artifact_path(TargetKind::Infra, &doc.name),
                content: content + "\n",
            });
        }
        Ok(artifacts)
    }
}

fn table_template(doc: &SchemaDocument) -> Result<Value, EmitError> {
    let pascal = case::to_pascal_case(&doc.name);

    let mut resources = serde_json::Map::new();
    resources.insert(format!("{pascal}Table"), table_resource(doc)?);
    resources.insert(format!("{pascal}DataSource"), data_source_resource(doc));

    Ok(json!({
        "AWSTemplateFormatVersion": "2010-09-09",
        "Resources": Value::Object(resources),
    }))
}

fn table_resource(doc: &SchemaDocument) -> Result<Value, EmitError> {
    // Key attributes first, then index keys, deduplicated in that order.
    let mut seen = Vec::new();
    let mut push_key = |name: &str| {
        if !seen.iter().any(|s| s == name) {
            seen.push(name.to_string());
        }
    };
    for key in doc.key_attributes() {
        push_key(key);
    }
    for idx in &doc.indexes {
        push_key(&idx.partition_key);
        if let Some(sk) = &idx.sort_key {
            push_key(sk);
        }
    }

    let mut definitions = Vec::new();
    for name in &seen {
        let attr = doc.attribute(name).ok_or_else(|| {
            EmitError::render(
                TargetKind::Infra,
                &doc.name,
                format!("key attribute '{name}' missing from resolved document"),
            )
        })?;
        let storage_type = target_type(attr.abstract_type, Target::Infra)
            .map_err(|e| EmitError::type_mapping(&doc.name, e))?;
        definitions.push(json!({
            "AttributeName": name,
            "AttributeType": storage_type,
        }));
    }

    let mut properties = serde_json::Map::new();
    properties.insert("TableName".into(), json!(doc.name));
    properties.insert("BillingMode".into(), json!("PAY_PER_REQUEST"));
    properties.insert("AttributeDefinitions".into(), json!(definitions));
    properties.insert("KeySchema".into(), key_schema(doc.key_attributes()));

    if !doc.indexes.is_empty() {
        let gsis: Vec<Value> = doc
            .indexes
            .iter()
            .map(|idx| {
                let mut keys = vec![idx.partition_key.as_str()];
                if let Some(sk) = &idx.sort_key {
                    keys.push(sk.as_str());
                }
                json!({
                    "IndexName": idx.name,
                    "KeySchema": key_schema(keys),
                    "Projection": { "ProjectionType": "ALL" },
                })
            })
            .collect();
        properties.insert("GlobalSecondaryIndexes".into(), json!(gsis));
    }

    Ok(json!({
        "Type": "AWS::DynamoDB::Table",
        "Properties": Value::Object(properties),
    }))
}

fn key_schema(keys: Vec<&str>) -> Value {
    let schema: Vec<Value> = keys
        .iter()
        .enumerate()
        .map(|(i, name)| {
            json!({
                "AttributeName": name,
                "KeyType": if i == 0 { "HASH" } else { "RANGE" },
            })
        })
        .collect();
    json!(schema)
}

fn data_source_resource(doc: &SchemaDocument) -> Value {
    let pascal = case::to_pascal_case(&doc.name);
    json!({
        "Type": "AWS::AppSync::DataSource",
        "Properties": {
            "Name": format!("{pascal}Table"),
            "Type": "AMAZON_DYNAMODB",
            "DynamoDBConfig": {
                "TableName": doc.name,
            },
        },
    })
}
