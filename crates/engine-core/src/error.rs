use connectors::{
    file::csv::error::FileError,
    metadata::error::MetadataError,
    sql::base::error::{ConnectorError, DbError},
};
use model::{core::identifiers::JobId, error::ValidationError};
use std::fmt;
use thiserror::Error;

/// Broad category of an [`IngestError`], for callers that map errors to
/// responses (e.g. an HTTP status).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Syntax,
    Validation,
    Consistency,
    Resource,
    Transport,
    Database,
    Lifecycle,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Syntax => "syntax",
            ErrorKind::Validation => "validation",
            ErrorKind::Consistency => "consistency",
            ErrorKind::Resource => "resource",
            ErrorKind::Transport => "transport",
            ErrorKind::Database => "database",
            ErrorKind::Lifecycle => "lifecycle",
        }
    }

    /// Whether the input, not the system, is at fault.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::Syntax | ErrorKind::Validation | ErrorKind::Consistency | ErrorKind::Resource
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ConsistencyError {
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error("Line {line} has {actual} cells but the header has {expected} columns")]
    TooManyCells {
        line: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Table {table} has no grand total row (all dimension columns NULL)")]
    MissingTotal { table: String },

    #[error("Table {table} has more than one grand total row")]
    AmbiguousTotal { table: String },

    #[error("Grand total row of {table} has no count")]
    MissingTotalCount { table: String },
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Import job {0} not found")]
    JobNotFound(JobId),

    #[error("Import job {id} is {state}")]
    JobNotActive { id: JobId, state: String },

    #[error("Import was cancelled")]
    Cancelled,

    #[error("Table sink cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: &'static str,
    },
}

/// Every failure an import can surface. Messages and offending values are
/// carried unmodified from where they were raised.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Syntax error: {0}")]
    Syntax(FileError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Consistency error: {0}")]
    Consistency(#[from] ConsistencyError),

    #[error("Resource error: {0}")]
    Resource(FileError),

    #[error("Transport error: {0}")]
    Transport(#[source] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Connection error: {0}")]
    Connector(#[from] ConnectorError),

    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),
}

impl IngestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IngestError::Syntax(_) => ErrorKind::Syntax,
            IngestError::Validation(_) => ErrorKind::Validation,
            IngestError::Consistency(_) => ErrorKind::Consistency,
            IngestError::Resource(_) => ErrorKind::Resource,
            IngestError::Transport(_) => ErrorKind::Transport,
            IngestError::Database(_) | IngestError::Connector(_) => ErrorKind::Database,
            IngestError::Lifecycle(_) => ErrorKind::Lifecycle,
        }
    }
}

impl From<FileError> for IngestError {
    fn from(err: FileError) -> Self {
        match err {
            FileError::LineTooLong { .. } => IngestError::Resource(err),
            FileError::UnterminatedQuote { .. } | FileError::InvalidUtf8 { .. } => {
                IngestError::Syntax(err)
            }
            FileError::IoError(io) => IngestError::Transport(io),
        }
    }
}

impl From<MetadataError> for IngestError {
    fn from(err: MetadataError) -> Self {
        IngestError::Consistency(ConsistencyError::Metadata(err))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{core::data_type::DataType, error::ValidationReason};

    #[test]
    fn classifies_file_errors() {
        let overflow: IngestError = FileError::LineTooLong { max: 10, line: 3 }.into();
        assert_eq!(overflow.kind(), ErrorKind::Resource);

        let quote: IngestError = FileError::UnterminatedQuote {
            expected: '"',
            line: 2,
            text: "\"abc".into(),
        }
        .into();
        assert_eq!(quote.kind(), ErrorKind::Syntax);

        let io: IngestError = FileError::IoError(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset",
        ))
        .into();
        assert_eq!(io.kind(), ErrorKind::Transport);
        assert!(io.to_string().contains("connection reset"));
    }

    #[test]
    fn transport_errors_keep_their_io_source() {
        let err: IngestError = FileError::IoError(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "peer went away",
        ))
        .into();

        let source = std::error::Error::source(&err)
            .and_then(|e| e.downcast_ref::<std::io::Error>())
            .map(std::io::Error::kind);
        assert_eq!(source, Some(std::io::ErrorKind::ConnectionReset));
    }

    #[test]
    fn keeps_offending_value_in_message() {
        let err: IngestError =
            ValidationError::new(DataType::Integer, "abc", ValidationReason::NotParseable).into();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("'abc'"));
        assert!(err.kind().is_input_error());
    }
}
