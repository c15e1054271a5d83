//! Generated artifacts and their deterministic file naming.

use std::fmt;
use std::str::FromStr;

use dynagen_ir::case::{to_kebab_case, to_pascal_case, to_snake_case};

/// The five artifact families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TargetKind {
    Infra,
    Interface,
    BackendModel,
    FrontendModel,
    ResolverTemplate,
}

impl TargetKind {
    pub const ALL: [TargetKind; 5] = [
        TargetKind::Infra,
        TargetKind::Interface,
        TargetKind::BackendModel,
        TargetKind::FrontendModel,
        TargetKind::ResolverTemplate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Infra => "infra",
            Self::Interface => "interface",
            Self::BackendModel => "backend-model",
            Self::FrontendModel => "frontend-model",
            Self::ResolverTemplate => "resolver-template",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "infra" => Ok(Self::Infra),
            "interface" => Ok(Self::Interface),
            "backend-model" => Ok(Self::BackendModel),
            "frontend-model" => Ok(Self::FrontendModel),
            "resolver-template" => Ok(Self::ResolverTemplate),
            other => Err(format!("unknown target '{other}'")),
        }
    }
}

/// One generated file. `path` is relative to the output root and is a
/// pure function of the source document (and, for resolver templates,
/// the operation), so downstream tools can locate artifacts without
/// consulting generator internals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub target: TargetKind,
    /// Name of the schema document this artifact was generated from.
    pub source: String,
    pub path: String,
    pub content: String,
}

/// Relative artifact path for a (document, target) pair.
pub fn artifact_path(target: TargetKind, document: &str) -> String {
    match target {
        TargetKind::Infra => format!("infra/{}.template.json", to_kebab_case(document)),
        TargetKind::Interface => format!("graphql/{}.graphql", to_kebab_case(document)),
        TargetKind::BackendModel => format!("backend/{}_model.py", to_snake_case(document)),
        TargetKind::FrontendModel => format!("frontend/{}.ts", to_pascal_case(document)),
        // Resolver templates are per-operation; see resolver_path.
        TargetKind::ResolverTemplate => format!("resolvers/{}", to_kebab_case(document)),
    }
}

/// Relative path of one operation's request mapping template.
pub fn resolver_path(document: &str, field_name: &str) -> String {
    format!(
        "{}/{}.req.vtl",
        artifact_path(TargetKind::ResolverTemplate, document),
        field_name
    )
}
