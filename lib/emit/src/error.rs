use thiserror::Error;

use dynagen_ir::TypeMappingError;

use crate::artifact::TargetKind;

/// Fatal emission failures. Like schema errors these abort the whole run;
/// unlike them they indicate a generator bug or an unmappable type rather
/// than bad input structure.
#[derive(Error, Debug)]
pub enum EmitError {
    #[error("document '{document}': {source}")]
    TypeMapping {
        document: String,
        #[source]
        source: TypeMappingError,
    },

    #[error("{target} emitter, document '{document}': {message}")]
    Render {
        target: TargetKind,
        document: String,
        message: String,
    },

    #[error("cross-target parity violation for '{document}': {message}")]
    Consistency { document: String, message: String },
}

impl EmitError {
    pub(crate) fn type_mapping(document: &str, source: TypeMappingError) -> Self {
        Self::TypeMapping {
            document: document.to_string(),
            source,
        }
    }

    pub(crate) fn render(target: TargetKind, document: &str, message: impl Into<String>) -> Self {
        Self::Render {
            target,
            document: document.to_string(),
            message: message.into(),
        }
    }
}
