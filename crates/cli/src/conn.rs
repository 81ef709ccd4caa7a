use crate::error::CliError;
use async_trait::async_trait;
use connectors::sql::postgres::utils::connect_client;
use tracing::info;

#[async_trait]
pub trait ConnectionPinger {
    async fn ping(&self) -> Result<(), CliError>;
}

pub struct PostgresConnectionPinger {
    pub conn_str: String,
}

#[async_trait]
impl ConnectionPinger for PostgresConnectionPinger {
    /// Opens a session and round-trips `SELECT 1`.
    async fn ping(&self) -> Result<(), CliError> {
        let client = connect_client(&self.conn_str).await?;
        let one: i32 = client.query_one("SELECT 1", &[]).await?.try_get(0)?;
        if one != 1 {
            return Err(CliError::Unexpected(format!("SELECT 1 returned {one}")));
        }
        info!("Postgres is reachable");
        Ok(())
    }
}
