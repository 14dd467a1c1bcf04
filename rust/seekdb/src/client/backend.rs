use std::path::Path;

use crate::client::embedded::EmbeddedClient;
use crate::client::oceanbase::OceanBaseClient;
use crate::client::options::ConnectionConfig;
use crate::client::server::ServerClient;
use crate::errors::SeekdbClientError;
use crate::types::Row;

/// Which backend a client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMode {
    Embedded,
    Server,
    OceanBase,
}

impl ClientMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientMode::Embedded => "SeekdbEmbeddedClient",
            ClientMode::Server => "SeekdbServerClient",
            ClientMode::OceanBase => "OceanBaseServerClient",
        }
    }
}

impl std::fmt::Display for ClientMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SQL dialect spoken by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    MySql,
    Sqlite,
}

/// The backend client wrapped by [`SeekdbClient`](crate::SeekdbClient).
#[derive(Debug)]
pub enum Backend {
    Embedded(EmbeddedClient),
    Server(ServerClient),
    OceanBase(OceanBaseClient),
}

impl Backend {
    /// Builds the backend for `config`. Performs no I/O.
    pub fn new(config: ConnectionConfig) -> Self {
        match config {
            ConnectionConfig::Embedded(config) => Backend::Embedded(EmbeddedClient::new(config)),
            ConnectionConfig::Server(config) => Backend::Server(ServerClient::new(config)),
            ConnectionConfig::OceanBase(config) => {
                Backend::OceanBase(OceanBaseClient::new(config))
            }
        }
    }

    pub fn mode(&self) -> ClientMode {
        match self {
            Backend::Embedded(_) => ClientMode::Embedded,
            Backend::Server(_) => ClientMode::Server,
            Backend::OceanBase(_) => ClientMode::OceanBase,
        }
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            Backend::Embedded(_) => Dialect::Sqlite,
            Backend::Server(_) | Backend::OceanBase(_) => Dialect::MySql,
        }
    }

    pub fn config(&self) -> ConnectionConfig {
        match self {
            Backend::Embedded(client) => ConnectionConfig::Embedded(client.config().clone()),
            Backend::Server(client) => ConnectionConfig::Server(client.config().clone()),
            Backend::OceanBase(client) => ConnectionConfig::OceanBase(client.config().clone()),
        }
    }

    pub fn is_connected(&self) -> bool {
        match self {
            Backend::Embedded(client) => client.is_connected(),
            Backend::Server(client) => client.is_connected(),
            Backend::OceanBase(client) => client.is_connected(),
        }
    }

    pub async fn execute(&mut self, query: &str) -> Result<Vec<Row>, SeekdbClientError> {
        match self {
            Backend::Embedded(client) => client.execute(query).await,
            Backend::Server(client) => client.execute(query).await,
            Backend::OceanBase(client) => client.execute(query).await,
        }
    }

    pub async fn close(&mut self) -> Result<(), SeekdbClientError> {
        match self {
            Backend::Embedded(client) => client.close().await,
            Backend::Server(client) => client.close().await,
            Backend::OceanBase(client) => client.close().await,
        }
    }

    pub fn host(&self) -> Option<&str> {
        match self {
            Backend::Embedded(_) => None,
            Backend::Server(client) => Some(client.host()),
            Backend::OceanBase(client) => Some(client.host()),
        }
    }

    pub fn port(&self) -> Option<u16> {
        match self {
            Backend::Embedded(_) => None,
            Backend::Server(client) => Some(client.port()),
            Backend::OceanBase(client) => Some(client.port()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Backend::Embedded(client) => Some(client.path()),
            _ => None,
        }
    }

    pub fn database(&self) -> &str {
        match self {
            Backend::Embedded(client) => client.database(),
            Backend::Server(client) => client.database(),
            Backend::OceanBase(client) => client.database(),
        }
    }

    pub fn user(&self) -> Option<&str> {
        match self {
            Backend::Embedded(_) => None,
            Backend::Server(client) => Some(client.user()),
            Backend::OceanBase(client) => Some(client.user()),
        }
    }

    pub fn tenant(&self) -> Option<&str> {
        match self {
            Backend::OceanBase(client) => Some(client.tenant()),
            _ => None,
        }
    }

    /// `user@tenant`, only defined for OceanBase.
    pub fn full_user(&self) -> Option<String> {
        match self {
            Backend::OceanBase(client) => Some(client.full_user()),
            _ => None,
        }
    }
}
