use std::path::Path;

use crate::client::backend::{Backend, ClientMode, Dialect};
use crate::client::options::{ClientOptions, ConnectionConfig};
use crate::collection::{
    collection_name_from_table, create_table_sql, describe_table_sql, drop_table_sql,
    has_table_sql, list_tables_sql, validate_collection, validate_name, Collection,
};
use crate::errors::{ConfigurationError, SeekdbClientError};
use crate::types::{Row, Value};

/// Client handle for a SeekDB store, whether embedded, a SeekDB server, or OceanBase.
///
/// Construction never performs I/O. The wrapped [`Backend`] opens its single connection on the
/// first call that needs it and reuses it afterwards; [`close`](Self::close) releases it, and
/// dropping the client releases it as well.
///
/// A client runs one statement at a time. Share it across tasks behind a lock, or create one
/// client per task.
///
/// # Examples
///
/// ```no_run
/// use seekdb::{ClientOptions, SeekdbClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut client = SeekdbClient::new(
///     ClientOptions::server("localhost", 2881)
///         .with_database("test")
///         .with_user("root"),
/// )?;
/// assert!(!client.is_connected());
///
/// let rows = client.execute("SELECT 1 as test").await?;
/// assert_eq!(rows[0].get("test").and_then(|v| v.as_i64()), Some(1));
///
/// let collection = client.create_collection("docs", 128).await?;
/// assert_eq!(collection.table_name(), "c$v1docs");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SeekdbClient {
    server: Backend,
}

impl SeekdbClient {
    /// Infers the backend from which parameters are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if both or neither of `path` and `host` are set.
    pub fn new(options: ClientOptions) -> Result<Self, ConfigurationError> {
        Ok(Self::from_config(ConnectionConfig::try_from(options)?))
    }

    /// Always builds an OceanBase client; `host` and `tenant` are required.
    pub fn oceanbase(options: ClientOptions) -> Result<Self, ConfigurationError> {
        Ok(Self::from_config(ConnectionConfig::oceanbase(options)?))
    }

    pub fn from_config(config: ConnectionConfig) -> Self {
        tracing::debug!("Creating {} for {}", mode_of(&config), config);
        SeekdbClient {
            server: Backend::new(config),
        }
    }

    /// Builds a client from `SEEKDB_`-prefixed environment variables.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::new(ClientOptions::from_env()?)
    }

    /// Builds a client from a YAML file, with environment variables taking precedence.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        Self::new(ClientOptions::load_from_path(path)?)
    }

    pub fn server(&self) -> &Backend {
        &self.server
    }

    pub fn server_mut(&mut self) -> &mut Backend {
        &mut self.server
    }

    pub fn into_server(self) -> Backend {
        self.server
    }

    pub fn mode(&self) -> ClientMode {
        self.server.mode()
    }

    pub fn config(&self) -> ConnectionConfig {
        self.server.config()
    }

    pub fn is_connected(&self) -> bool {
        self.server.is_connected()
    }

    /// Runs `query` on the backend, connecting first if needed.
    ///
    /// Rows are [`Row::Named`] for server and OceanBase backends and [`Row::Positional`]
    /// for the embedded engine.
    pub async fn execute(&mut self, query: &str) -> Result<Vec<Row>, SeekdbClientError> {
        self.server.execute(query).await
    }

    /// Releases the connection. Safe to call more than once; a later call reconnects.
    pub async fn close(&mut self) -> Result<(), SeekdbClientError> {
        self.server.close().await
    }

    //////////////////////// Collections ////////////////////////

    /// Creates the table backing collection `name` with `dimension`-wide embeddings.
    ///
    /// Arguments are checked before any I/O. The statement is a plain `CREATE TABLE`, so
    /// creating a collection that already exists fails in a backend-defined way.
    pub async fn create_collection(
        &mut self,
        name: &str,
        dimension: u32,
    ) -> Result<Collection, SeekdbClientError> {
        validate_collection(name, dimension)?;
        let sql = create_table_sql(self.dialect(), name, dimension);
        self.execute(&sql).await?;
        tracing::info!("Created collection {} with dimension {}", name, dimension);
        Ok(Collection::new(name.to_string(), dimension))
    }

    pub async fn has_collection(&mut self, name: &str) -> Result<bool, SeekdbClientError> {
        validate_name(name)?;
        let rows = self.execute(&has_table_sql(self.dialect(), name)).await?;
        Ok(!rows.is_empty())
    }

    /// Names of all collections in the current database, sorted.
    pub async fn list_collections(&mut self) -> Result<Vec<String>, SeekdbClientError> {
        let rows = self.execute(&list_tables_sql(self.dialect())).await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get_index(0).and_then(value_text))
            .filter_map(|table| collection_name_from_table(&table).map(str::to_string))
            .collect())
    }

    /// Drops the table backing collection `name`. Dropping a missing collection is an error.
    pub async fn delete_collection(&mut self, name: &str) -> Result<(), SeekdbClientError> {
        validate_name(name)?;
        self.execute(&drop_table_sql(self.dialect(), name)).await?;
        tracing::info!("Deleted collection {}", name);
        Ok(())
    }

    /// Column names of the table backing collection `name`.
    pub async fn collection_columns(
        &mut self,
        name: &str,
    ) -> Result<Vec<String>, SeekdbClientError> {
        validate_name(name)?;
        let (sql, name_index) = describe_table_sql(self.dialect(), name);
        let rows = self.execute(&sql).await?;
        Ok(rows
            .iter()
            .filter_map(|row| column_name(row, name_index))
            .collect())
    }

    fn dialect(&self) -> Dialect {
        self.server.dialect()
    }
}

fn mode_of(config: &ConnectionConfig) -> ClientMode {
    match config {
        ConnectionConfig::Embedded(_) => ClientMode::Embedded,
        ConnectionConfig::Server(_) => ClientMode::Server,
        ConnectionConfig::OceanBase(_) => ClientMode::OceanBase,
    }
}

// DESCRIBE labels the column `Field` on MySQL and `field` on some OceanBase versions.
fn column_name(row: &Row, name_index: usize) -> Option<String> {
    let value = row
        .get("Field")
        .or_else(|| row.get("field"))
        .or_else(|| row.get_index(name_index))?;
    value_text(value)
}

// Some servers return catalog strings with a binary collation.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Text(text) => Some(text.clone()),
        Value::Bytes(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ValidationError;

    fn embedded_client(dir: &tempfile::TempDir) -> SeekdbClient {
        SeekdbClient::new(
            ClientOptions::embedded(dir.path().join("seekdb_store")).with_database("test"),
        )
        .unwrap()
    }

    #[test]
    fn test_mode_selection() {
        let client = SeekdbClient::new(ClientOptions::embedded("/tmp/seekdb_store")).unwrap();
        assert_eq!(client.mode(), ClientMode::Embedded);
        assert_eq!(client.mode().as_str(), "SeekdbEmbeddedClient");
        assert_eq!(client.server().database(), "test");
        assert_eq!(client.server().path(), Some(Path::new("/tmp/seekdb_store")));
        assert!(!client.is_connected());

        let client = SeekdbClient::new(
            ClientOptions::server("localhost", 2881)
                .with_database("test")
                .with_user("root")
                .with_password(""),
        )
        .unwrap();
        assert_eq!(client.mode().as_str(), "SeekdbServerClient");
        assert_eq!(client.server().host(), Some("localhost"));
        assert_eq!(client.server().port(), Some(2881));
        assert_eq!(client.server().user(), Some("root"));
        assert_eq!(client.server().tenant(), None);
        assert!(!client.is_connected());

        let client = SeekdbClient::oceanbase(
            ClientOptions::server("localhost", 11202)
                .with_tenant("mysql")
                .with_database("test")
                .with_user("root"),
        )
        .unwrap();
        assert_eq!(client.mode().as_str(), "OceanBaseServerClient");
        assert_eq!(client.server().tenant(), Some("mysql"));
        assert_eq!(client.server().full_user().as_deref(), Some("root@mysql"));
        assert!(!client.is_connected());
    }

    #[test]
    fn test_construction_errors() {
        let both = ClientOptions {
            host: Some("localhost".to_string()),
            ..ClientOptions::embedded("/tmp/seekdb_store")
        };
        assert!(matches!(
            SeekdbClient::new(both),
            Err(ConfigurationError::AmbiguousTarget)
        ));
        assert!(matches!(
            SeekdbClient::new(ClientOptions::default()),
            Err(ConfigurationError::MissingTarget)
        ));
        assert!(matches!(
            SeekdbClient::oceanbase(ClientOptions::server("localhost", 2881)),
            Err(ConfigurationError::MissingParameter("tenant"))
        ));
    }

    #[test_log::test(tokio::test)]
    async fn test_execute_connects_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut client = embedded_client(&dir);
        assert!(!client.is_connected());

        let rows = client.execute("SELECT 1").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_index(0), Some(&Value::Int(1)));
        assert!(client.is_connected());

        client.execute("SELECT 2").await.unwrap();
        assert!(client.is_connected());

        client.close().await.unwrap();
        client.close().await.unwrap();
        assert!(!client.is_connected());
    }

    #[test_log::test(tokio::test)]
    async fn test_create_collection_schema() {
        let dir = tempfile::tempdir().unwrap();
        let mut client = embedded_client(&dir);

        let collection = client.create_collection("foo", 128).await.unwrap();
        assert_eq!(collection.name(), "foo");
        assert_eq!(collection.dimension(), 128);
        assert_eq!(collection.table_name(), "c$v1foo");

        let mut columns = client.collection_columns("foo").await.unwrap();
        columns.sort();
        assert_eq!(columns, vec!["_id", "document", "embedding", "metadata"]);

        let tables = client
            .execute("SELECT name FROM sqlite_master WHERE type = 'table'")
            .await
            .unwrap();
        assert!(tables
            .iter()
            .any(|row| row.get_index(0).and_then(Value::as_str) == Some("c$v1foo")));
    }

    #[test_log::test(tokio::test)]
    async fn test_invalid_collection_does_no_io() {
        let dir = tempfile::tempdir().unwrap();
        let mut client = embedded_client(&dir);

        let err = client.create_collection("", 128).await.unwrap_err();
        assert!(matches!(
            err,
            SeekdbClientError::Validation(ValidationError::EmptyName)
        ));
        let err = client.create_collection("foo", 0).await.unwrap_err();
        assert!(matches!(
            err,
            SeekdbClientError::Validation(ValidationError::InvalidDimension(0))
        ));
        assert!(!client.is_connected());
        assert!(!dir.path().join("seekdb_store").exists());
    }

    #[test_log::test(tokio::test)]
    async fn test_duplicate_collection_is_backend_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut client = embedded_client(&dir);
        client.create_collection("foo", 4).await.unwrap();
        let err = client.create_collection("foo", 4).await.unwrap_err();
        assert!(matches!(err, SeekdbClientError::Backend(_)));
    }

    #[test_log::test(tokio::test)]
    async fn test_list_has_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let mut client = embedded_client(&dir);
        client
            .execute("CREATE TABLE unrelated (id INTEGER)")
            .await
            .unwrap();
        client.create_collection("beta", 8).await.unwrap();
        client.create_collection("alpha", 8).await.unwrap();

        assert_eq!(client.list_collections().await.unwrap(), vec!["alpha", "beta"]);
        assert!(client.has_collection("alpha").await.unwrap());
        assert!(!client.has_collection("gamma").await.unwrap());

        client.delete_collection("alpha").await.unwrap();
        assert!(!client.has_collection("alpha").await.unwrap());
        assert_eq!(client.list_collections().await.unwrap(), vec!["beta"]);

        let err = client.delete_collection("alpha").await.unwrap_err();
        assert!(matches!(err, SeekdbClientError::Backend(_)));
    }

    #[test_log::test(tokio::test)]
    async fn test_embedding_width_is_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let mut client = embedded_client(&dir);
        client.create_collection("vecs", 2).await.unwrap();

        // Two little-endian f32 values.
        client
            .execute(
                "INSERT INTO \"c$v1vecs\" (_id, document, embedding, metadata) \
                 VALUES (x'01', 'doc', x'0000803f00000040', '{\"k\": 1}')",
            )
            .await
            .unwrap();
        let err = client
            .execute("INSERT INTO \"c$v1vecs\" (_id, embedding) VALUES (x'02', x'00')")
            .await
            .unwrap_err();
        assert!(matches!(err, SeekdbClientError::Backend(_)));
    }

    #[test_log::test(tokio::test)]
    async fn test_collections_persist_across_clients() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut client = embedded_client(&dir);
            client.create_collection("kept", 16).await.unwrap();
            // Dropped while connected.
        }
        let mut client = embedded_client(&dir);
        assert!(client.has_collection("kept").await.unwrap());
    }
}
