use std::fmt;
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::ConfigurationError;

pub const DEFAULT_PORT: u16 = 2881;
pub const DEFAULT_DATABASE: &str = "test";
pub const DEFAULT_USER: &str = "root";
const ENV_PREFIX: &str = "SEEKDB_";
// Keys read verbatim from the environment; figment would otherwise parse `007` as a number.
const TEXT_KEYS: [&str; 6] = ["path", "host", "tenant", "database", "user", "password"];

/// Keyword-style connection parameters.
///
/// Which backend they describe is inferred by [`ConnectionConfig::try_from`]:
/// `path` selects the embedded engine, `host` with `tenant` selects OceanBase,
/// `host` alone selects a SeekDB server. Empty strings count as unset.
#[derive(Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ClientOptions {
    pub path: Option<PathBuf>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub host: Option<String>,
    pub port: Option<u16>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub tenant: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub database: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub user: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub password: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

/// Accepts any scalar as text, so `password: 123456` in YAML reads as `"123456"`.
fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|scalar| match scalar {
        Scalar::Text(text) => text,
        Scalar::Int(n) => n.to_string(),
        Scalar::UInt(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
        Scalar::Bool(b) => b.to_string(),
    }))
}

/// `SEEKDB_` variables, with the text keys taken verbatim and the rest parsed.
fn env_figment() -> Figment {
    let text = Env::prefixed(ENV_PREFIX).only(&TEXT_KEYS);
    text.iter().fold(
        Figment::from(Env::prefixed(ENV_PREFIX).ignore(&TEXT_KEYS)),
        |f, (key, value)| f.merge(Serialized::default(key.as_str(), value)),
    )
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("path", &self.path)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("tenant", &self.tenant)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ClientOptions {
    /// Reads `SEEKDB_`-prefixed environment variables (`SEEKDB_HOST`, `SEEKDB_PORT`, ...).
    pub fn from_env() -> Result<Self, ConfigurationError> {
        env_figment()
            .extract()
            .map_err(|err| ConfigurationError::Load(Box::new(err)))
    }

    /// Reads a YAML file if it exists, with `SEEKDB_` environment variables taking precedence.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let mut f = env_figment();
        if path.exists() {
            f = Figment::from(Yaml::file(path)).merge(f);
        } else {
            tracing::debug!("No client config at {}, using environment only", path.display());
        }
        f.extract()
            .map_err(|err| ConfigurationError::Load(Box::new(err)))
    }

    pub fn embedded(path: impl Into<PathBuf>) -> Self {
        ClientOptions {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn server(host: impl Into<String>, port: u16) -> Self {
        ClientOptions {
            host: Some(host.into()),
            port: Some(port),
            ..Default::default()
        }
    }

    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    fn path(&self) -> Option<&Path> {
        self.path
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
    }

    fn host(&self) -> Option<&str> {
        non_empty(&self.host)
    }

    fn tenant(&self) -> Option<&str> {
        non_empty(&self.tenant)
    }

    fn database_or_default(&self) -> String {
        non_empty(&self.database)
            .unwrap_or(DEFAULT_DATABASE)
            .to_string()
    }

    fn user_or_default(&self) -> String {
        non_empty(&self.user).unwrap_or(DEFAULT_USER).to_string()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

/// Parameters for the in-process engine.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EmbeddedConfig {
    /// Data directory, created on first use.
    pub path: PathBuf,
    pub database: String,
}

impl EmbeddedConfig {
    /// The file holding `database` inside the data directory.
    pub fn database_file(&self) -> PathBuf {
        self.path.join(format!("{}.db", self.database))
    }
}

/// Parameters for a SeekDB server reached over the MySQL protocol.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    #[serde(default)]
    pub password: String,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

/// Parameters for a multi-tenant OceanBase cluster.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct OceanBaseConfig {
    pub host: String,
    pub port: u16,
    pub tenant: String,
    pub database: String,
    pub user: String,
    #[serde(default)]
    pub password: String,
}

impl OceanBaseConfig {
    /// The login name OceanBase routes on.
    pub fn full_user(&self) -> String {
        format!("{}@{}", self.user, self.tenant)
    }
}

impl fmt::Debug for OceanBaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OceanBaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("tenant", &self.tenant)
            .field("database", &self.database)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

/// Exactly one backend's connection parameters.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum ConnectionConfig {
    Embedded(EmbeddedConfig),
    Server(ServerConfig),
    OceanBase(OceanBaseConfig),
}

impl ConnectionConfig {
    /// Builds an OceanBase configuration; `host` and `tenant` are required.
    pub fn oceanbase(options: ClientOptions) -> Result<Self, ConfigurationError> {
        ConnectionConfig::oceanbase_from(&options)
    }

    fn oceanbase_from(options: &ClientOptions) -> Result<Self, ConfigurationError> {
        if options.path().is_some() {
            return Err(ConfigurationError::UnsupportedParameter("path", "OceanBase"));
        }
        let host = options
            .host()
            .ok_or(ConfigurationError::MissingParameter("host"))?;
        let tenant = options
            .tenant()
            .ok_or(ConfigurationError::MissingParameter("tenant"))?;
        Ok(ConnectionConfig::OceanBase(OceanBaseConfig {
            host: host.to_string(),
            port: options.port.unwrap_or(DEFAULT_PORT),
            tenant: tenant.to_string(),
            database: options.database_or_default(),
            user: options.user_or_default(),
            password: options.password.clone().unwrap_or_default(),
        }))
    }

    fn embedded(options: &ClientOptions, path: &Path) -> Result<Self, ConfigurationError> {
        let unsupported = [
            ("tenant", options.tenant().is_some()),
            ("port", options.port.is_some()),
            ("user", non_empty(&options.user).is_some()),
            ("password", non_empty(&options.password).is_some()),
        ];
        if let Some((name, _)) = unsupported.iter().find(|(_, set)| *set) {
            return Err(ConfigurationError::UnsupportedParameter(*name, "embedded"));
        }
        let database = options.database_or_default();
        // The database names a file inside the data directory and must not escape it.
        if database == "." || database == ".." || database.contains(['/', '\\']) {
            return Err(ConfigurationError::InvalidDatabaseName(database));
        }
        Ok(ConnectionConfig::Embedded(EmbeddedConfig {
            path: path.to_path_buf(),
            database,
        }))
    }
}

impl TryFrom<ClientOptions> for ConnectionConfig {
    type Error = ConfigurationError;

    fn try_from(options: ClientOptions) -> Result<Self, Self::Error> {
        match (options.path(), options.host(), options.tenant()) {
            (Some(_), Some(_), _) => Err(ConfigurationError::AmbiguousTarget),
            (Some(path), None, _) => ConnectionConfig::embedded(&options, path),
            (None, Some(_), Some(_)) => ConnectionConfig::oceanbase_from(&options),
            (None, Some(host), None) => Ok(ConnectionConfig::Server(ServerConfig {
                host: host.to_string(),
                port: options.port.unwrap_or(DEFAULT_PORT),
                database: options.database_or_default(),
                user: options.user_or_default(),
                password: options.password.clone().unwrap_or_default(),
            })),
            (None, None, _) => Err(ConfigurationError::MissingTarget),
        }
    }
}

impl fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionConfig::Embedded(config) => write!(f, "{}", config.database_file().display()),
            ConnectionConfig::Server(config) => write!(
                f,
                "{}@{}:{}/{}",
                config.user, config.host, config.port, config.database
            ),
            ConnectionConfig::OceanBase(config) => write!(
                f,
                "{}@{}:{}/{}",
                config.full_user(),
                config.host,
                config.port,
                config.database
            ),
        }
    }
}
