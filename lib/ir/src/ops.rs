//! Effective operation set for a table document.
//!
//! A document with an explicit `operations` list uses it verbatim (auth is
//! still merged with the document's own). Otherwise exactly five defaults
//! are synthesized, one per CRUD verb, plus one query operation per
//! secondary index so every "query by X" entry point carries its physical
//! index name to the infra emitter.

use crate::auth::AuthSpec;
use crate::case::{to_camel_case, to_pascal_case};
use crate::model::{
    GraphqlKind, IndexBinding, Operation, OperationDef, SchemaDocument, StorageOp,
};

/// Compute the effective operations of a table document.
///
/// Index names in explicit operations are assumed resolved; the loader
/// rejects operations naming an index the document does not declare.
pub fn effective_operations(doc: &SchemaDocument) -> Vec<Operation> {
    match &doc.operations {
        Some(defs) => defs.iter().map(|def| bind_explicit(doc, def)).collect(),
        None => default_operations(doc),
    }
}

fn bind_explicit(doc: &SchemaDocument, def: &OperationDef) -> Operation {
    let index = def
        .index
        .as_deref()
        .and_then(|name| doc.index(name))
        .map(|idx| IndexBinding {
            index_name: idx.name.clone(),
            partition_key: idx.partition_key.clone(),
            sort_key: idx.sort_key.clone(),
        });

    Operation {
        name: def.name.clone(),
        graphql_kind: def.graphql_kind,
        field_name: def
            .field_name
            .clone()
            .unwrap_or_else(|| to_camel_case(&def.name)),
        storage_op: def.storage_op,
        index,
        auth: def.auth.merge(&doc.auth),
    }
}

fn default_operations(doc: &SchemaDocument) -> Vec<Operation> {
    let pascal = to_pascal_case(&doc.name);
    let auth = doc.auth.clone();

    let simple = |name: &str, kind: GraphqlKind, storage: StorageOp, field: String| Operation {
        name: name.to_string(),
        graphql_kind: kind,
        field_name: field,
        storage_op: storage,
        index: None,
        auth: auth.clone(),
    };

    let mut ops = vec![
        simple(
            "Create",
            GraphqlKind::Mutation,
            StorageOp::Put,
            format!("create{pascal}"),
        ),
        simple(
            "Update",
            GraphqlKind::Mutation,
            StorageOp::Update,
            format!("update{pascal}"),
        ),
        simple(
            "Delete",
            GraphqlKind::Mutation,
            StorageOp::Delete,
            format!("delete{pascal}"),
        ),
        simple(
            "Get",
            GraphqlKind::Query,
            StorageOp::Get,
            format!("get{pascal}"),
        ),
        simple(
            "List",
            GraphqlKind::Query,
            StorageOp::Query,
            format!("list{pascal}s"),
        ),
    ];

    for idx in &doc.indexes {
        let index_pascal = to_pascal_case(&idx.name);
        ops.push(Operation {
            name: format!("List{index_pascal}"),
            graphql_kind: GraphqlKind::Query,
            field_name: format!("list{pascal}s{index_pascal}"),
            storage_op: StorageOp::Query,
            index: Some(IndexBinding {
                index_name: idx.name.clone(),
                partition_key: idx.partition_key.clone(),
                sort_key: idx.sort_key.clone(),
            }),
            auth: auth.clone(),
        });
    }

    ops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AbstractType, Attribute, DocumentKind, SecondaryIndex};

    fn attr(name: &str, ty: AbstractType) -> Attribute {
        Attribute {
            name: name.to_string(),
            abstract_type: ty,
            required: true,
            enum_type: None,
            model_ref: None,
            description: None,
        }
    }

    fn widget() -> SchemaDocument {
        SchemaDocument {
            kind: DocumentKind::Table,
            name: "Widget".to_string(),
            attributes: vec![
                attr("widgetId", AbstractType::String),
                attr("ownerId", AbstractType::String),
                attr("status", AbstractType::String),
            ],
            partition_key: Some("widgetId".to_string()),
            sort_key: None,
            indexes: vec![],
            operations: None,
            auth: AuthSpec::default(),
            description: None,
        }
    }

    #[test]
    fn default_crud_is_exactly_five() {
        let ops = effective_operations(&widget());
        assert_eq!(ops.len(), 5);

        let by_name: Vec<(&str, StorageOp, GraphqlKind)> = ops
            .iter()
            .map(|o| (o.name.as_str(), o.storage_op, o.graphql_kind))
            .collect();
        assert_eq!(
            by_name,
            vec![
                ("Create", StorageOp::Put, GraphqlKind::Mutation),
                ("Update", StorageOp::Update, GraphqlKind::Mutation),
                ("Delete", StorageOp::Delete, GraphqlKind::Mutation),
                ("Get", StorageOp::Get, GraphqlKind::Query),
                ("List", StorageOp::Query, GraphqlKind::Query),
            ]
        );
    }

    #[test]
    fn default_field_names() {
        let ops = effective_operations(&widget());
        let fields: Vec<&str> = ops.iter().map(|o| o.field_name.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "createWidget",
                "updateWidget",
                "deleteWidget",
                "getWidget",
                "listWidgets"
            ]
        );
    }

    #[test]
    fn one_query_operation_per_index() {
        let mut doc = widget();
        doc.indexes.push(SecondaryIndex {
            name: "byOwner".to_string(),
            partition_key: "ownerId".to_string(),
            sort_key: None,
        });

        let ops = effective_operations(&doc);
        assert_eq!(ops.len(), 6);

        let by_owner = &ops[5];
        assert_eq!(by_owner.field_name, "listWidgetsByOwner");
        assert_eq!(by_owner.storage_op, StorageOp::Query);
        let binding = by_owner.index.as_ref().unwrap();
        assert_eq!(binding.index_name, "byOwner");
        assert_eq!(binding.partition_key, "ownerId");
    }

    #[test]
    fn explicit_operations_pass_through() {
        let mut doc = widget();
        doc.operations = Some(vec![OperationDef {
            name: "Archive".to_string(),
            graphql_kind: GraphqlKind::Mutation,
            field_name: None,
            storage_op: StorageOp::Update,
            index: None,
            auth: AuthSpec::default(),
        }]);

        let ops = effective_operations(&doc);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].name, "Archive");
        assert_eq!(ops[0].field_name, "archive");
        assert_eq!(ops[0].storage_op, StorageOp::Update);
    }

    #[test]
    fn document_auth_merges_into_every_operation() {
        let mut doc = widget();
        doc.auth = AuthSpec::groups(["Admins"]);
        doc.operations = Some(vec![OperationDef {
            name: "Get".to_string(),
            graphql_kind: GraphqlKind::Query,
            field_name: Some("getWidget".to_string()),
            storage_op: StorageOp::Get,
            index: None,
            auth: AuthSpec::api_key_only(),
        }]);

        let ops = effective_operations(&doc);
        assert!(ops[0].auth.api_key);
        assert!(ops[0].auth.groups.contains("Admins"));

        doc.operations = None;
        for op in effective_operations(&doc) {
            assert!(op.auth.groups.contains("Admins"));
        }
    }

    #[test]
    fn explicit_index_binding_resolves_physical_name() {
        let mut doc = widget();
        doc.indexes.push(SecondaryIndex {
            name: "byOwner".to_string(),
            partition_key: "ownerId".to_string(),
            sort_key: Some("status".to_string()),
        });
        doc.operations = Some(vec![OperationDef {
            name: "ByOwner".to_string(),
            graphql_kind: GraphqlKind::Query,
            field_name: None,
            storage_op: StorageOp::Query,
            index: Some("byOwner".to_string()),
            auth: AuthSpec::default(),
        }]);

        let ops = effective_operations(&doc);
        let binding = ops[0].index.as_ref().unwrap();
        assert_eq!(binding.index_name, "byOwner");
        assert_eq!(binding.sort_key.as_deref(), Some("status"));
    }
}
