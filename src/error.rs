use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum IsaTabError {
    #[error("duplicate {kind} '{key}' in {entity}")]
    #[diagnostic(code(isatab::duplicate_key))]
    DuplicateKey {
        kind: &'static str,
        key: String,
        entity: String,
    },

    #[error("{entity}.{field} references unknown ontology source '{source_name}'")]
    #[diagnostic(
        code(isatab::unresolved_reference),
        help("add the source to the investigation's ontology source references")
    )]
    UnresolvedReference {
        source_name: String,
        entity: String,
        field: String,
    },

    #[error("malformed value in {entity}.{field}: {reason}")]
    #[diagnostic(code(isatab::malformed_value))]
    MalformedValue {
        entity: String,
        field: String,
        reason: String,
    },

    #[error("failed to encode tab-delimited text: {0}")]
    Encode(String),

    #[error("missing config file kira-isa.json in current directory")]
    MissingConfig,

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("failed to read investigation file at {0}")]
    InputRead(PathBuf),

    #[error("failed to parse investigation JSON: {0}")]
    InputParse(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("output file already exists: {0} (use --force to overwrite)")]
    OutputExists(String),
}

impl IsaTabError {
    pub(crate) fn malformed(
        entity: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        IsaTabError::MalformedValue {
            entity: entity.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for failures caused by the input graph rather than the environment.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            IsaTabError::DuplicateKey { .. }
                | IsaTabError::UnresolvedReference { .. }
                | IsaTabError::MalformedValue { .. }
        )
    }
}
