use sqlx::mysql::MySqlConnection;

use crate::client::lazy::LazyConnection;
use crate::client::options::OceanBaseConfig;
use crate::client::server::{close_mysql, execute_mysql, mysql_options};
use crate::errors::SeekdbClientError;
use crate::types::Row;

/// OceanBase cluster reached over the MySQL wire protocol.
///
/// Identical to [`ServerClient`](crate::client::ServerClient) on the wire, except that it
/// logs in as `user@tenant` so the OceanBase proxy can route to the tenant.
pub struct OceanBaseClient {
    config: OceanBaseConfig,
    connection: LazyConnection<MySqlConnection>,
}

impl OceanBaseClient {
    pub fn new(config: OceanBaseConfig) -> Self {
        let target = format!("{}:{}", config.host, config.port);
        OceanBaseClient {
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

    pub fn tenant(&self) -> &str {
        &self.config.tenant
    }

    pub fn database(&self) -> &str {
        &self.config.database
    }

    pub fn user(&self) -> &str {
        &self.config.user
    }

    pub fn full_user(&self) -> String {
        self.config.full_user()
    }

    pub fn config(&self) -> &OceanBaseConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    pub async fn execute(&mut self, query: &str) -> Result<Vec<Row>, SeekdbClientError> {
        let options = mysql_options(
            &self.config.host,
            self.config.port,
            &self.config.full_user(),
            &self.config.password,
            &self.config.database,
        );
        execute_mysql(&mut self.connection, options, query).await
    }

    pub async fn close(&mut self) -> Result<(), SeekdbClientError> {
        close_mysql(&mut self.connection).await
    }
}

impl std::fmt::Debug for OceanBaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OceanBaseClient")
            .field("config", &self.config)
            .field("connected", &self.is_connected())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(port: u16) -> OceanBaseClient {
        OceanBaseClient::new(OceanBaseConfig {
            host: "127.0.0.1".to_string(),
            port,
            tenant: "mysql".to_string(),
            database: "test".to_string(),
            user: "root".to_string(),
            password: String::new(),
        })
    }

    #[test]
    fn test_full_user_joins_tenant() {
        let client = test_client(11202);
        assert_eq!(client.full_user(), "root@mysql");
        assert_eq!(client.tenant(), "mysql");
        assert_eq!(client.user(), "root");
        assert!(!client.is_connected());
    }

    #[test_log::test(tokio::test)]
    async fn test_refused_connection() {
        let mut client = test_client(1);
        let err = client.execute("SELECT 1").await.unwrap_err();
        assert!(matches!(err, SeekdbClientError::Connection(_)));
        assert!(!client.is_connected());
    }
}
