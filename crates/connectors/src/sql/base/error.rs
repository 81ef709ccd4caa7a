use thiserror::Error;

/// All errors coming from the database/query layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// Any SQL driver error. Server-side errors keep their SQLSTATE and detail.
    #[error("SQL error: {}", describe_pg_error(.0))]
    Postgres(#[from] tokio_postgres::Error),

    /// A value read back from the database had an unexpected shape.
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// Writing rows to the database failed at the application level.
    #[error("Write error: {0}")]
    Write(String),

    /// A transaction operation was issued in the wrong state.
    #[error("Transaction error: {0}")]
    Transaction(String),
}

/// Errors happening during adapter or connection setup.
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Invalid connection string: {0}")]
    InvalidUrl(String),

    #[error("Postgres connection failed: {}", describe_pg_error(.0))]
    Postgres(#[from] tokio_postgres::Error),

    #[error("TLS setup failed: {0}")]
    Tls(#[from] native_tls::Error),
}

fn describe_pg_error(err: &tokio_postgres::Error) -> String {
    match err.as_db_error() {
        Some(db) => {
            let mut message = format!("{} ({})", db.message(), db.code().code());
            if let Some(detail) = db.detail() {
                message.push_str(": ");
                message.push_str(detail);
            }
            message
        }
        None => err.to_string(),
    }
}
