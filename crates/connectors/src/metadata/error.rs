use model::error::{IdentifierError, UnknownTypeError};
use std::fmt;
use thiserror::Error;

/// Which caller-supplied metadata array a problem refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintKind {
    Names,
    Types,
    Descriptions,
}

impl fmt::Display for HintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HintKind::Names => "names",
            HintKind::Types => "types",
            HintKind::Descriptions => "descriptions",
        })
    }
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Column {kind} count {actual} does not match header column count {expected}")]
    CountMismatch {
        kind: HintKind,
        expected: usize,
        actual: usize,
    },

    #[error("Duplicate header column: {0}")]
    DuplicateColumn(String),

    #[error("Invalid column name: {0}")]
    Identifier(#[from] IdentifierError),

    #[error(transparent)]
    UnknownType(#[from] UnknownTypeError),

    #[error("Invalid dictionary: {0}")]
    Dictionary(#[from] serde_json::Error),

    #[error("Failed to read dictionary {path}: {source}")]
    DictionaryIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
