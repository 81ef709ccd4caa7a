use crate::sql::base::error::ConnectorError;
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use tokio_postgres::{
    Client, Config, NoTls, Socket,
    config::SslMode,
    tls::{MakeTlsConnect, TlsConnect},
};
use tracing::{error, warn};

/// Opens a session honoring the `sslmode` of the connection string.
/// `prefer` falls back to plaintext when the TLS handshake fails.
pub async fn connect_client(url: &str) -> Result<Client, ConnectorError> {
    let config = url
        .parse::<Config>()
        .map_err(|e| ConnectorError::InvalidUrl(e.to_string()))?;

    match config.get_ssl_mode() {
        SslMode::Disable => open(&config, NoTls).await,
        SslMode::Prefer => match open(&config, native_tls()?).await {
            Ok(client) => Ok(client),
            Err(error) => {
                warn!(%error, "Postgres TLS handshake failed, retrying without TLS");
                open(&config, NoTls).await
            }
        },
        _ => open(&config, native_tls()?).await,
    }
}

fn native_tls() -> Result<MakeTlsConnector, ConnectorError> {
    Ok(MakeTlsConnector::new(TlsConnector::builder().build()?))
}

/// Connects and drives the connection on its own task until the client
/// is dropped.
async fn open<T>(config: &Config, tls: T) -> Result<Client, ConnectorError>
where
    T: MakeTlsConnect<Socket> + Send + 'static,
    T::Stream: Send + 'static,
    T::TlsConnect: Send,
    <T::TlsConnect as TlsConnect<Socket>>::Future: Send,
{
    let (client, connection) = config.connect(tls).await?;
    tokio::spawn(async move {
        if let Err(err) = connection.await {
            error!(%err, "Postgres connection error");
        }
    });
    Ok(client)
}
