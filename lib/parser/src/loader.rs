//! Two-pass schema loading.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use dynagen_ir::auth::AuthSpec;
use dynagen_ir::model::{
    Attribute, DocumentKind, OperationDef, Registry, SchemaDocument, SchemaIr, SecondaryIndex,
};

use crate::error::SchemaError;
use crate::raw::{RawAuth, RawDocument, RawOperation};

/// Load every `*.yaml`/`*.yml` document under `dir` and resolve the set
/// into a [`SchemaIr`].
pub fn load_dir(dir: &Path) -> Result<SchemaIr, SchemaError> {
    let mut paths = Vec::new();
    let entries = fs::read_dir(dir).map_err(|e| SchemaError::Io {
        path: dir.display().to_string(),
        source: e,
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| SchemaError::Io {
            path: dir.display().to_string(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => paths.push(path),
            _ => continue,
        }
    }
    // Sorted so duplicate-name errors name the same pair regardless of
    // directory iteration order. The IR itself is keyed by document name
    // and does not depend on this.
    paths.sort();

    let mut docs = Vec::new();
    for path in &paths {
        let label = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|e| SchemaError::Io {
            path: label.clone(),
            source: e,
        })?;
        let raw: RawDocument =
            serde_yaml::from_str(&text).map_err(|e| SchemaError::Parse {
                path: label.clone(),
                message: e.to_string(),
            })?;
        debug!("loaded schema document '{}' from {}", raw.name, label);
        docs.push((label, raw));
    }

    debug!("loaded {} schema documents from {}", docs.len(), dir.display());
    resolve(docs)
}

/// Pass 2: index raw documents by name, validate each, and resolve all
/// cross-document references. `docs` pairs each raw document with a label
/// (usually its file path) used in error messages.
pub fn resolve(docs: Vec<(String, RawDocument)>) -> Result<SchemaIr, SchemaError> {
    // Index by name; the global namespace spans all document kinds.
    let mut by_name: BTreeMap<String, (String, RawDocument)> = BTreeMap::new();
    for (label, raw) in docs {
        if raw.name.is_empty() {
            return Err(SchemaError::MissingField {
                document: label,
                field: "name",
            });
        }
        if let Some((first_label, _)) = by_name.get(&raw.name) {
            return Err(SchemaError::DuplicateName {
                name: raw.name.clone(),
                first: first_label.clone(),
                second: label,
            });
        }
        by_name.insert(raw.name.clone(), (label, raw));
    }

    let mut ir = SchemaIr::default();

    // Build each document shallowly first, so reference resolution below
    // can see the full name/kind index regardless of declaration order.
    for (_, (_, raw)) in &by_name {
        match raw.kind {
            DocumentKind::Registry => {
                let registry = build_registry(raw)?;
                ir.registries.insert(registry.name.clone(), registry);
            }
            DocumentKind::Table => {
                let doc = build_table(raw)?;
                ir.tables.insert(doc.name.clone(), doc);
            }
            DocumentKind::Entity | DocumentKind::GraphqlType => {
                let doc = build_typed(raw)?;
                ir.entities.insert(doc.name.clone(), doc);
            }
        }
    }

    // Resolve attribute references against the loaded set.
    for doc in ir.tables.values().chain(ir.entities.values()) {
        for attr in &doc.attributes {
            if attr.enum_type.is_some() && attr.model_ref.is_some() {
                return Err(SchemaError::invalid(
                    &doc.name,
                    format!(
                        "attribute '{}' declares both enumType and modelReference",
                        attr.name
                    ),
                ));
            }
            if let Some(target) = &attr.enum_type {
                if !ir.registries.contains_key(target) {
                    return Err(SchemaError::DanglingReference {
                        document: doc.name.clone(),
                        attribute: attr.name.clone(),
                        kind: "enumType",
                        target: target.clone(),
                    });
                }
            }
            if let Some(target) = &attr.model_ref {
                if !ir.entities.contains_key(target) {
                    return Err(SchemaError::DanglingReference {
                        document: doc.name.clone(),
                        attribute: attr.name.clone(),
                        kind: "modelReference",
                        target: target.clone(),
                    });
                }
            }
        }
    }

    Ok(ir)
}

fn build_registry(raw: &RawDocument) -> Result<Registry, SchemaError> {
    if !raw.attributes.is_empty() || raw.partition_key.is_some() || raw.operations.is_some() {
        return Err(SchemaError::invalid(
            &raw.name,
            "a registry declares only 'values'",
        ));
    }
    if raw.values.is_empty() {
        return Err(SchemaError::MissingField {
            document: raw.name.clone(),
            field: "values",
        });
    }
    let mut seen = std::collections::BTreeSet::new();
    for value in &raw.values {
        if !seen.insert(value) {
            return Err(SchemaError::invalid(
                &raw.name,
                format!("duplicate registry value '{value}'"),
            ));
        }
    }
    let registry = Registry {
        name: raw.name.clone(),
        values: raw.values.clone(),
        description: raw.description.clone(),
    };
    if !registry.has_sentinel() {
        return Err(SchemaError::MissingSentinel {
            name: raw.name.clone(),
        });
    }
    Ok(registry)
}

fn build_attributes(raw: &RawDocument) -> Result<Vec<Attribute>, SchemaError> {
    if raw.attributes.is_empty() {
        return Err(SchemaError::MissingField {
            document: raw.name.clone(),
            field: "attributes",
        });
    }
    let mut seen = std::collections::BTreeSet::new();
    let mut attributes = Vec::with_capacity(raw.attributes.len());
    for a in &raw.attributes {
        if a.name.is_empty() {
            return Err(SchemaError::MissingField {
                document: raw.name.clone(),
                field: "attributes[].name",
            });
        }
        if !seen.insert(a.name.clone()) {
            return Err(SchemaError::invalid(
                &raw.name,
                format!("duplicate attribute '{}'", a.name),
            ));
        }
        attributes.push(Attribute {
            name: a.name.clone(),
            abstract_type: a.abstract_type,
            required: a.required,
            enum_type: a.enum_type.clone(),
            model_ref: a.model_reference.clone(),
            description: a.description.clone(),
        });
    }
    Ok(attributes)
}

fn build_typed(raw: &RawDocument) -> Result<SchemaDocument, SchemaError> {
    if raw.partition_key.is_some() || raw.sort_key.is_some() || !raw.indexes.is_empty() {
        return Err(SchemaError::invalid(
            &raw.name,
            "only table documents declare keys or indexes",
        ));
    }
    if raw.operations.is_some() {
        return Err(SchemaError::invalid(
            &raw.name,
            "only table documents declare operations",
        ));
    }
    Ok(SchemaDocument {
        kind: raw.kind,
        name: raw.name.clone(),
        attributes: build_attributes(raw)?,
        partition_key: None,
        sort_key: None,
        indexes: Vec::new(),
        operations: None,
        auth: auth_spec(&raw.name, raw.auth_config.as_ref())?,
        description: raw.description.clone(),
    })
}

fn build_table(raw: &RawDocument) -> Result<SchemaDocument, SchemaError> {
    let attributes = build_attributes(raw)?;

    let partition_key = raw.partition_key.clone().ok_or(SchemaError::MissingField {
        document: raw.name.clone(),
        field: "partitionKey",
    })?;

    let check_key = |field: &str, key: &str| -> Result<(), SchemaError> {
        let attr = attributes.iter().find(|a| a.name == key).ok_or_else(|| {
            SchemaError::invalid(
                &raw.name,
                format!("{field} '{key}' is not a declared attribute"),
            )
        })?;
        if !attr.abstract_type.is_key_capable() {
            return Err(SchemaError::invalid(
                &raw.name,
                format!("{field} '{key}' must be a string, number or timestamp attribute"),
            ));
        }
        Ok(())
    };

    check_key("partitionKey", &partition_key)?;
    if let Some(sk) = &raw.sort_key {
        check_key("sortKey", sk)?;
    }

    let mut index_names = std::collections::BTreeSet::new();
    let mut indexes = Vec::with_capacity(raw.indexes.len());
    for idx in &raw.indexes {
        if !index_names.insert(idx.name.clone()) {
            return Err(SchemaError::invalid(
                &raw.name,
                format!("duplicate index '{}'", idx.name),
            ));
        }
        check_key("index partitionKey", &idx.partition_key)?;
        if let Some(sk) = &idx.sort_key {
            check_key("index sortKey", sk)?;
        }
        indexes.push(SecondaryIndex {
            name: idx.name.clone(),
            partition_key: idx.partition_key.clone(),
            sort_key: idx.sort_key.clone(),
        });
    }

    let operations = match &raw.operations {
        None => None,
        Some(ops) if ops.is_empty() => {
            return Err(SchemaError::invalid(
                &raw.name,
                "'operations' must be non-empty when declared; omit it for the CRUD defaults",
            ));
        }
        Some(ops) => Some(build_operations(raw, ops, &index_names)?),
    };

    Ok(SchemaDocument {
        kind: DocumentKind::Table,
        name: raw.name.clone(),
        attributes,
        partition_key: Some(partition_key),
        sort_key: raw.sort_key.clone(),
        indexes,
        operations,
        auth: auth_spec(&raw.name, raw.auth_config.as_ref())?,
        description: raw.description.clone(),
    })
}

fn build_operations(
    raw: &RawDocument,
    ops: &[RawOperation],
    index_names: &std::collections::BTreeSet<String>,
) -> Result<Vec<OperationDef>, SchemaError> {
    let mut names = std::collections::BTreeSet::new();
    let mut fields = std::collections::BTreeSet::new();
    let mut defs = Vec::with_capacity(ops.len());
    for op in ops {
        if op.name.is_empty() {
            return Err(SchemaError::MissingField {
                document: raw.name.clone(),
                field: "operations[].name",
            });
        }
        if !names.insert(op.name.clone()) {
            return Err(SchemaError::invalid(
                &raw.name,
                format!("duplicate operation '{}'", op.name),
            ));
        }
        let field = op
            .field
            .clone()
            .unwrap_or_else(|| dynagen_ir::case::to_camel_case(&op.name));
        if !fields.insert(field) {
            return Err(SchemaError::invalid(
                &raw.name,
                format!("operation '{}' duplicates another operation's field name", op.name),
            ));
        }
        if let Some(index) = &op.index {
            if !index_names.contains(index) {
                return Err(SchemaError::invalid(
                    &raw.name,
                    format!("operation '{}' references unknown index '{index}'", op.name),
                ));
            }
        }
        defs.push(OperationDef {
            name: op.name.clone(),
            graphql_kind: op.graphql_kind,
            field_name: op.field.clone(),
            storage_op: op.storage_op,
            index: op.index.clone(),
            auth: auth_spec(&raw.name, op.auth_config.as_ref())?,
        });
    }
    Ok(defs)
}

fn auth_spec(document: &str, raw: Option<&RawAuth>) -> Result<AuthSpec, SchemaError> {
    let Some(raw) = raw else {
        return Ok(AuthSpec::default());
    };
    let spec = AuthSpec {
        api_key: raw.api_key,
        groups: raw.groups.iter().cloned().collect(),
    };
    if let Some(group) = spec.invalid_group() {
        return Err(SchemaError::MalformedAuthGroup {
            document: document.to_string(),
            group: group.to_string(),
        });
    }
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn raw(yaml: &str) -> RawDocument {
        serde_yaml::from_str(yaml).expect("fixture should parse")
    }

    fn widget_table() -> RawDocument {
        raw(r#"
kind: table
name: Widget
partitionKey: widgetId
attributes:
  - name: widgetId
    type: string
    required: true
  - name: status
    type: string
    enumType: WidgetStatus
  - name: updatedAt
    type: timestamp
"#)
    }

    fn status_registry() -> RawDocument {
        raw(r#"
kind: registry
name: WidgetStatus
values: [UNKNOWN, ACTIVE, DELETED]
"#)
    }

    fn docs(raws: Vec<RawDocument>) -> Vec<(String, RawDocument)> {
        raws.into_iter()
            .enumerate()
            .map(|(i, d)| (format!("doc{i}.yaml"), d))
            .collect()
    }

    #[test]
    fn resolves_forward_and_backward_references() {
        // Table before registry and registry before table must both work.
        let a = resolve(docs(vec![widget_table(), status_registry()])).unwrap();
        let b = resolve(docs(vec![status_registry(), widget_table()])).unwrap();
        assert_eq!(a, b);
        assert!(a.tables.contains_key("Widget"));
        assert!(a.registries.contains_key("WidgetStatus"));
    }

    #[test]
    fn dangling_enum_reference_is_fatal() {
        let err = resolve(docs(vec![widget_table()])).unwrap_err();
        match err {
            SchemaError::DanglingReference {
                document,
                attribute,
                kind,
                target,
            } => {
                assert_eq!(document, "Widget");
                assert_eq!(attribute, "status");
                assert_eq!(kind, "enumType");
                assert_eq!(target, "WidgetStatus");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_names_are_fatal() {
        let err = resolve(docs(vec![status_registry(), status_registry()])).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateName { .. }));
    }

    #[test]
    fn registry_requires_unknown_sentinel() {
        let bad = raw(r#"
kind: registry
name: Color
values: [RED, GREEN]
"#);
        let err = resolve(docs(vec![bad])).unwrap_err();
        assert!(matches!(err, SchemaError::MissingSentinel { name } if name == "Color"));
    }

    #[test]
    fn table_requires_partition_key() {
        let bad = raw(r#"
kind: table
name: Keyless
attributes:
  - name: something
    type: string
"#);
        let err = resolve(docs(vec![bad])).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::MissingField { field: "partitionKey", .. }
        ));
    }

    #[test]
    fn key_must_be_declared_and_key_capable() {
        let undeclared = raw(r#"
kind: table
name: Widget
partitionKey: nope
attributes:
  - name: widgetId
    type: string
"#);
        assert!(matches!(
            resolve(docs(vec![undeclared])).unwrap_err(),
            SchemaError::Invalid { .. }
        ));

        let boolean_key = raw(r#"
kind: table
name: Widget
partitionKey: active
attributes:
  - name: active
    type: boolean
"#);
        assert!(matches!(
            resolve(docs(vec![boolean_key])).unwrap_err(),
            SchemaError::Invalid { .. }
        ));
    }

    #[test]
    fn explicit_empty_operations_rejected() {
        let bad = raw(r#"
kind: table
name: Widget
partitionKey: widgetId
attributes:
  - name: widgetId
    type: string
operations: []
"#);
        assert!(matches!(
            resolve(docs(vec![bad])).unwrap_err(),
            SchemaError::Invalid { .. }
        ));
    }

    #[test]
    fn operation_index_must_resolve() {
        let bad = raw(r#"
kind: table
name: Widget
partitionKey: widgetId
attributes:
  - name: widgetId
    type: string
operations:
  - name: ByOwner
    type: Query
    storageOp: Query
    index: byOwner
"#);
        assert!(matches!(
            resolve(docs(vec![bad])).unwrap_err(),
            SchemaError::Invalid { .. }
        ));
    }

    #[test]
    fn malformed_auth_group_is_fatal() {
        let bad = raw(r#"
kind: table
name: Widget
partitionKey: widgetId
attributes:
  - name: widgetId
    type: string
authConfig:
  groups: ["bad group"]
"#);
        let err = resolve(docs(vec![bad])).unwrap_err();
        assert!(matches!(err, SchemaError::MalformedAuthGroup { group, .. } if group == "bad group"));
    }

    #[test]
    fn entity_with_keys_rejected() {
        let bad = raw(r#"
kind: entity
name: Nested
partitionKey: id
attributes:
  - name: id
    type: string
"#);
        assert!(matches!(
            resolve(docs(vec![bad])).unwrap_err(),
            SchemaError::Invalid { .. }
        ));
    }

    #[test]
    fn model_reference_resolves_against_entities() {
        let entity = raw(r#"
kind: entity
name: Dimensions
attributes:
  - name: height
    type: number
"#);
        let table = raw(r#"
kind: table
name: Widget
partitionKey: widgetId
attributes:
  - name: widgetId
    type: string
  - name: dimensions
    type: map
    modelReference: Dimensions
"#);
        let ir = resolve(docs(vec![table, entity])).unwrap();
        assert!(ir.entities.contains_key("Dimensions"));
    }

    #[test]
    fn load_dir_is_order_independent() {
        // Identical document sets under different file names (and hence
        // different read order) must produce identical IRs.
        let dir_a = tempfile::tempdir().unwrap();
        let dir_b = tempfile::tempdir().unwrap();

        let table = r#"
kind: table
name: Widget
partitionKey: widgetId
attributes:
  - name: widgetId
    type: string
  - name: status
    type: string
    enumType: WidgetStatus
"#;
        let registry = r#"
kind: registry
name: WidgetStatus
values: [UNKNOWN, ACTIVE]
"#;

        fs::write(dir_a.path().join("a_table.yaml"), table).unwrap();
        fs::write(dir_a.path().join("z_registry.yaml"), registry).unwrap();
        fs::write(dir_b.path().join("a_registry.yaml"), registry).unwrap();
        fs::write(dir_b.path().join("z_table.yaml"), table).unwrap();

        let ir_a = load_dir(dir_a.path()).unwrap();
        let ir_b = load_dir(dir_b.path()).unwrap();
        assert_eq!(ir_a, ir_b);
    }

    #[test]
    fn non_yaml_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("readme.md"), "not a schema").unwrap();
        fs::write(
            dir.path().join("registry.yaml"),
            "kind: registry\nname: Status\nvalues: [UNKNOWN]\n",
        )
        .unwrap();

        let ir = load_dir(dir.path()).unwrap();
        assert_eq!(ir.registries.len(), 1);
        assert!(ir.tables.is_empty());
    }

    #[test]
    fn unknown_fields_fail_parse() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("bad.yaml"),
            "kind: registry\nname: Status\nvalues: [UNKNOWN]\ncolour: blue\n",
        )
        .unwrap();
        assert!(matches!(
            load_dir(dir.path()).unwrap_err(),
            SchemaError::Parse { .. }
        ));
    }
}
