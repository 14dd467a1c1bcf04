use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::ConnectOptions;

use crate::client::lazy::LazyConnection;
use crate::client::options::ServerConfig;
use crate::errors::{BackendError, ConnectionError, SeekdbClientError};
use crate::types::{decode_mysql_row, Row};

/// SeekDB server reached over the MySQL wire protocol.
pub struct ServerClient {
    config: ServerConfig,
    connection: LazyConnection<MySqlConnection>,
}

impl ServerClient {
    pub fn new(config: ServerConfig) -> Self {
        let target = format!("{}:{}", config.host, config.port);
        ServerClient {
            config,
            connection: LazyConnection::new(target),
        }
    }

    pub fn host(&self) -> &str {
        &self.config.host
    }

    pub fn port(&self) -> u16 {
        self.config.port
    }

    pub fn database(&self) -> &str {
        &self.config.database
    }

    pub fn user(&self) -> &str {
        &self.config.user
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Runs `query`, returning rows keyed by column label.
    pub async fn execute(&mut self, query: &str) -> Result<Vec<Row>, SeekdbClientError> {
        let options = mysql_options(
            &self.config.host,
            self.config.port,
            &self.config.user,
            &self.config.password,
            &self.config.database,
        );
        execute_mysql(&mut self.connection, options, query).await
    }

    pub async fn close(&mut self) -> Result<(), SeekdbClientError> {
        close_mysql(&mut self.connection).await
    }
}

impl std::fmt::Debug for ServerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerClient")
            .field("config", &self.config)
            .field("connected", &self.is_connected())
            .finish()
    }
}

//////////////////////// Shared MySQL protocol helpers ////////////////////////

pub(crate) fn mysql_options(
    host: &str,
    port: u16,
    user: &str,
    password: &str,
    database: &str,
) -> MySqlConnectOptions {
    let mut options = MySqlConnectOptions::new()
        .host(host)
        .port(port)
        .username(user);
    if !password.is_empty() {
        options = options.password(password);
    }
    if !database.is_empty() {
        options = options.database(database);
    }
    options
}

pub(crate) async fn execute_mysql(
    connection: &mut LazyConnection<MySqlConnection>,
    options: MySqlConnectOptions,
    query: &str,
) -> Result<Vec<Row>, SeekdbClientError> {
    let conn = connection.ensure_connected(|| options.connect()).await?;
    let to_backend_error = |source: sqlx::Error| BackendError {
        statement: query.to_string(),
        source,
    };
    let rows = sqlx::raw_sql(query)
        .fetch_all(&mut *conn)
        .await
        .map_err(to_backend_error)?;
    let rows = rows
        .iter()
        .map(decode_mysql_row)
        .collect::<Result<Vec<_>, _>>()
        .map_err(to_backend_error)?;
    Ok(rows)
}

pub(crate) async fn close_mysql(
    connection: &mut LazyConnection<MySqlConnection>,
) -> Result<(), SeekdbClientError> {
    if let Err(source) = connection.close().await {
        return Err(ConnectionError {
            target: connection.target().to_string(),
            source,
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_server() -> ServerClient {
        // Port 1 is reserved and refuses connections on loopback.
        ServerClient::new(ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            database: "test".to_string(),
            user: "root".to_string(),
            password: String::new(),
        })
    }

    #[test]
    fn test_identity_accessors() {
        let client = unreachable_server();
        assert_eq!(client.host(), "127.0.0.1");
        assert_eq!(client.port(), 1);
        assert_eq!(client.database(), "test");
        assert_eq!(client.user(), "root");
        assert!(!client.is_connected());
    }

    #[test_log::test(tokio::test)]
    async fn test_refused_connection_carries_target() {
        let mut client = unreachable_server();
        let err = client.execute("SELECT 1 as test").await.unwrap_err();
        let SeekdbClientError::Connection(err) = err else {
            panic!("expected a connection error, got {err:?}");
        };
        assert_eq!(err.target, "127.0.0.1:1");
        assert!(!client.is_connected());
        // Closing a never-opened client is a no-op.
        client.close().await.unwrap();
    }
}
