//! Abstract type → target type tokens.
//!
//! Every mapping is explicit; an abstract type with no token for the
//! requested target is a hard [`TypeMappingError`], never a silent
//! default. The infra target only maps key-capable types because storage
//! attribute definitions exist only for key and index attributes.

use std::fmt;

use thiserror::Error;

use crate::model::AbstractType;

/// Emission target requesting a type token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Storage attribute types (`S`, `N`).
    Infra,
    /// GraphQL scalar names.
    Graphql,
    /// Backend model (Python) annotations.
    Python,
    /// Frontend model (TypeScript) annotations.
    TypeScript,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Infra => "infra",
            Self::Graphql => "graphql",
            Self::Python => "python",
            Self::TypeScript => "typescript",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("abstract type '{abstract_type}' has no mapping for target '{target}'")]
pub struct TypeMappingError {
    pub abstract_type: &'static str,
    pub target: Target,
}

fn abstract_name(ty: AbstractType) -> &'static str {
    match ty {
        AbstractType::String => "string",
        AbstractType::Number => "number",
        AbstractType::Boolean => "boolean",
        AbstractType::Timestamp => "timestamp",
        AbstractType::Array => "array",
        AbstractType::Map => "map",
    }
}

/// The target-specific type token for an abstract type.
pub fn target_type(ty: AbstractType, target: Target) -> Result<&'static str, TypeMappingError> {
    let token = match target {
        Target::Infra => match ty {
            AbstractType::String | AbstractType::Timestamp => Some("S"),
            AbstractType::Number => Some("N"),
            AbstractType::Boolean | AbstractType::Array | AbstractType::Map => None,
        },
        Target::Graphql => match ty {
            AbstractType::String => Some("String"),
            AbstractType::Number => Some("Int"),
            AbstractType::Boolean => Some("Boolean"),
            AbstractType::Timestamp => Some("AWSDateTime"),
            AbstractType::Array => Some("[String]"),
            AbstractType::Map => Some("AWSJSON"),
        },
        Target::Python => match ty {
            AbstractType::String => Some("str"),
            AbstractType::Number => Some("int"),
            AbstractType::Boolean => Some("bool"),
            AbstractType::Timestamp => Some("datetime"),
            AbstractType::Array => Some("list"),
            AbstractType::Map => Some("dict"),
        },
        Target::TypeScript => match ty {
            AbstractType::String => Some("string"),
            AbstractType::Number => Some("number"),
            AbstractType::Boolean => Some("boolean"),
            AbstractType::Timestamp => Some("string"),
            AbstractType::Array => Some("string[]"),
            AbstractType::Map => Some("Record<string, unknown>"),
        },
    };

    token.ok_or(TypeMappingError {
        abstract_type: abstract_name(ty),
        target,
    })
}
