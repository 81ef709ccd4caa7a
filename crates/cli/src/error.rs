use connectors::{metadata::error::MetadataError, sql::base::error::ConnectorError};
use engine_core::error::{ConfigError, IngestError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid configuration: {0}")]
    ConfigValue(#[from] ConfigError),

    #[error("Failed to resolve columns: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Import failed ({kind}): {0}", kind = .0.kind())]
    Ingest(#[from] IngestError),

    #[error("Connection failed: {0}")]
    Connector(#[from] ConnectorError),

    /// PostgreSQL driver error.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Missing {0}")]
    MissingArgument(&'static str),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}
