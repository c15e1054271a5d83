use thiserror::Error;

/// Fatal schema-validation failures. Any one of these aborts the whole
/// run before a single artifact is written.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: not a valid schema document: {message}")]
    Parse { path: String, message: String },

    #[error("duplicate document name '{name}' (declared in {first} and {second})")]
    DuplicateName {
        name: String,
        first: String,
        second: String,
    },

    #[error("document '{document}': missing required field '{field}'")]
    MissingField {
        document: String,
        field: &'static str,
    },

    #[error(
        "document '{document}', attribute '{attribute}': {kind} reference '{target}' does not resolve"
    )]
    DanglingReference {
        document: String,
        attribute: String,
        kind: &'static str,
        target: String,
    },

    #[error("registry '{name}' must contain the 'UNKNOWN' sentinel value")]
    MissingSentinel { name: String },

    #[error("document '{document}': malformed auth group '{group}'")]
    MalformedAuthGroup { document: String, group: String },

    #[error("document '{document}': {message}")]
    Invalid { document: String, message: String },
}

impl SchemaError {
    pub(crate) fn invalid(document: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            document: document.to_string(),
            message: message.into(),
        }
    }
}
