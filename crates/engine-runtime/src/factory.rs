use async_trait::async_trait;
use connectors::sql::{base::adapter::SqlAdapter, postgres::adapter::PgAdapter};
use engine_core::error::IngestError;

/// Opens the dedicated session each import job owns.
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn SqlAdapter>, IngestError>;
}

pub struct PgConnectionFactory {
    url: String,
}

impl PgConnectionFactory {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl ConnectionFactory for PgConnectionFactory {
    async fn connect(&self) -> Result<Box<dyn SqlAdapter>, IngestError> {
        let adapter = PgAdapter::connect(&self.url).await?;
        Ok(Box::new(adapter))
    }
}
