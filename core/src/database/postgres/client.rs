use std::{env, time::Duration};

use async_trait::async_trait;
use dotenv::dotenv;
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use tokio::time::timeout;
use tokio_postgres::{config::SslMode, Client, Config, Error as PgError};
use tracing::{debug, error};

pub fn connection_string() -> Result<String, env::VarError> {
    dotenv().ok();
    let connection = env::var("DATABASE_URL")?;
    Ok(connection)
}

#[derive(thiserror::Error, Debug)]
pub enum PostgresConnectionError {
    #[error("The database connection string is wrong please check your environment: {0}")]
    DatabaseConnectionConfigWrong(#[from] env::VarError),

    #[error("Can not connect to the database please make sure your connection string is correct")]
    CanNotConnectToDatabase,

    #[error("Could not parse connection string make sure it is correctly formatted")]
    CouldNotParseConnectionString,

    #[error("Could not create tls connector")]
    CouldNotCreateTlsConnector,
}

#[derive(thiserror::Error, Debug)]
pub enum PostgresError {
    #[error("PgError {0}")]
    PgError(#[from] PgError),

    #[error("The database connection has been closed")]
    ConnectionClosed,
}

/// Runs generated statement text against the RIB store.
///
/// Transaction boundaries and retry policy belong to the implementor.
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    async fn execute_statement(&self, sql: &str) -> Result<(), PostgresError>;
}

/// A single `tokio-postgres` connection used to apply generated statements.
pub struct PostgresClient {
    client: Client,
}

impl PostgresClient {
    /// Connects using `DATABASE_URL` from the environment (or a `.env` file).
    pub async fn new() -> Result<Self, PostgresConnectionError> {
        let connection_str = connection_string()?;
        Self::connect(&connection_str).await
    }

    pub async fn connect(connection_str: &str) -> Result<Self, PostgresConnectionError> {
        async fn _connect(
            connection_str: &str,
            disable_ssl: bool,
        ) -> Result<PostgresClient, PostgresConnectionError> {
            let mut config: Config = connection_str
                .parse()
                .map_err(|_| PostgresConnectionError::CouldNotParseConnectionString)?;

            if disable_ssl {
                config.ssl_mode(SslMode::Disable);
            }

            let connector = TlsConnector::builder()
                .build()
                .map_err(|_| PostgresConnectionError::CouldNotCreateTlsConnector)?;
            let tls_connector = MakeTlsConnector::new(connector);

            let (client, connection) =
                match timeout(Duration::from_millis(5000), config.connect(tls_connector)).await {
                    Ok(Ok((client, connection))) => (client, connection),
                    Ok(Err(e)) => {
                        // retry without ssl if ssl has been attempted and failed
                        if !disable_ssl &&
                            config.get_ssl_mode() != SslMode::Disable &&
                            !connection_str.contains("sslmode=require")
                        {
                            return Box::pin(_connect(connection_str, true)).await;
                        }
                        error!("Error connecting to database: {}", e);
                        return Err(PostgresConnectionError::CanNotConnectToDatabase);
                    }
                    Err(e) => {
                        error!("Timeout connecting to database: {}", e);
                        return Err(PostgresConnectionError::CanNotConnectToDatabase);
                    }
                };

            tokio::spawn(async move {
                if let Err(e) = connection.await {
                    error!("Database connection closed with error: {}", e);
                }
            });

            if client.simple_query("SELECT 1").await.is_err() {
                return Err(PostgresConnectionError::CanNotConnectToDatabase);
            }

            Ok(PostgresClient { client })
        }

        _connect(connection_str, false).await
    }

    pub async fn batch_execute(&self, sql: &str) -> Result<(), PostgresError> {
        if self.client.is_closed() {
            return Err(PostgresError::ConnectionClosed);
        }
        debug!("Executing statement of {} bytes", sql.len());
        self.client.batch_execute(sql).await.map_err(PostgresError::PgError)
    }
}

#[async_trait]
impl StatementExecutor for PostgresClient {
    async fn execute_statement(&self, sql: &str) -> Result<(), PostgresError> {
        self.batch_execute(sql).await
    }
}
