use std::path::PathBuf;

use clap::Args;
use seekdb::{ClientOptions, ConfigurationError, SeekdbClient};

#[derive(Args, Debug, Default, Clone)]
pub struct ConnectionArgs {
    #[arg(long = "config", help = "YAML file with client options")]
    pub config_path: Option<PathBuf>,
    #[arg(long, help = "Data directory of an embedded store")]
    pub path: Option<PathBuf>,
    #[arg(long)]
    pub host: Option<String>,
    #[arg(long)]
    pub port: Option<u16>,
    #[arg(long, help = "OceanBase tenant")]
    pub tenant: Option<String>,
    #[arg(long)]
    pub database: Option<String>,
    #[arg(long)]
    pub user: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
    #[arg(long, help = "Always connect as an OceanBase client")]
    pub oceanbase: bool,
}

impl ConnectionArgs {
    /// Flags win over the config file, which wins over `SEEKDB_` environment variables.
    ///
    /// A `--path` or `--host` flag replaces the whole target, so a configured host does not
    /// conflict with `--path` and vice versa.
    pub fn client_options(&self) -> Result<ClientOptions, ConfigurationError> {
        let base = match &self.config_path {
            Some(path) => ClientOptions::load_from_path(path)?,
            None => ClientOptions::from_env()?,
        };
        let (path, host) = if self.path.is_some() || self.host.is_some() {
            (self.path.clone(), self.host.clone())
        } else {
            (base.path, base.host)
        };
        Ok(ClientOptions {
            path,
            host,
            port: self.port.or(base.port),
            tenant: self.tenant.clone().or(base.tenant),
            database: self.database.clone().or(base.database),
            user: self.user.clone().or(base.user),
            password: self.password.clone().or(base.password),
        })
    }

    pub fn client(&self) -> Result<SeekdbClient, ConfigurationError> {
        let options = self.client_options()?;
        if self.oceanbase {
            seekdb::ob_client(options)
        } else {
            seekdb::client(options)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_path_flag_replaces_configured_host() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("seekdb.yaml");
        std::fs::write(&config, "host: \"db.local\"\ndatabase: \"docs\"\n").unwrap();

        let args = ConnectionArgs {
            config_path: Some(config.clone()),
            path: Some(dir.path().join("store")),
            ..Default::default()
        };
        let options = args.client_options().unwrap();
        assert_eq!(options.host, None);
        assert_eq!(options.path.as_deref(), Some(dir.path().join("store").as_path()));
        assert_eq!(options.database.as_deref(), Some("docs"));
        assert!(args.client().is_ok());

        let args = ConnectionArgs {
            config_path: Some(config),
            host: Some("other.local".to_string()),
            ..Default::default()
        };
        let options = args.client_options().unwrap();
        assert_eq!(options.host.as_deref(), Some("other.local"));
        assert_eq!(options.path.as_deref(), None::<&Path>);
    }

    #[test]
    fn test_configured_target_used_without_flags() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("seekdb.yaml");
        std::fs::write(&config, "host: \"db.local\"\nport: 2882\n").unwrap();
        let args = ConnectionArgs {
            config_path: Some(config),
            port: Some(2883),
            ..Default::default()
        };
        let options = args.client_options().unwrap();
        assert_eq!(options.host.as_deref(), Some("db.local"));
        assert_eq!(options.port, Some(2883));
    }
}
