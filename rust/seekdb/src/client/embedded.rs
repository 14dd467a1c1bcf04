use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::ConnectOptions;

use crate::client::lazy::LazyConnection;
use crate::client::options::EmbeddedConfig;
use crate::errors::{BackendError, ConnectionError, SeekdbClientError};
use crate::types::{decode_sqlite_row, Row};

/// In-process engine over a local data directory.
///
/// Nothing touches the filesystem until the first [`execute`](Self::execute): the data
/// directory is created then and the database file is opened inside it.
pub struct EmbeddedClient {
    config: EmbeddedConfig,
    connection: LazyConnection<SqliteConnection>,
}

impl EmbeddedClient {
    pub fn new(config: EmbeddedConfig) -> Self {
        let target = config.database_file().display().to_string();
        EmbeddedClient {
            config,
            connection: LazyConnection::new(target),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    pub fn database(&self) -> &str {
        &self.config.database
    }

    pub fn config(&self) -> &EmbeddedConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Runs `query`, returning positional rows.
    pub async fn execute(&mut self, query: &str) -> Result<Vec<Row>, SeekdbClientError> {
        let config = &self.config;
        let conn = self
            .connection
            .ensure_connected(|| open(config))
            .await?;
        let rows = sqlx::raw_sql(query)
            .fetch_all(&mut *conn)
            .await
            .map_err(|source| BackendError {
                statement: query.to_string(),
                source,
            })?;
        let rows = rows
            .iter()
            .map(decode_sqlite_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| BackendError {
                statement: query.to_string(),
                source,
            })?;
        Ok(rows)
    }

    pub async fn close(&mut self) -> Result<(), SeekdbClientError> {
        self.connection.close().await.map_err(|source| {
            ConnectionError {
                target: self.connection.target().to_string(),
                source,
            }
            .into()
        })
    }
}

async fn open(config: &EmbeddedConfig) -> Result<SqliteConnection, sqlx::Error> {
    tokio::fs::create_dir_all(&config.path).await?;
    SqliteConnectOptions::new()
        .filename(config.database_file())
        .create_if_missing(true)
        .connect()
        .await
}

impl std::fmt::Debug for EmbeddedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddedClient")
            .field("config", &self.config)
            .field("connected", &self.is_connected())
            .finish()
    }
}
