//! Rust client library for SeekDB.
//!
//! One client type, [`SeekdbClient`], talks to three kinds of deployment:
//!
//! - **Embedded** - an in-process engine storing data under a local directory
//! - **Server** - a SeekDB server reached over the MySQL wire protocol
//! - **OceanBase** - an OceanBase cluster, which additionally routes on a tenant
//!
//! Creating a client never performs I/O. The connection is opened by the first
//! [`execute`](SeekdbClient::execute) or collection call and reused afterwards.
//!
//! # Quick Start
//!
//! ```no_run
//! use seekdb::ClientOptions;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = seekdb::client(ClientOptions::embedded("./seekdb_store"))?;
//! let rows = client.execute("SELECT 1").await?;
//! println!("{:?}", rows[0]);
//!
//! let collection = client.create_collection("docs", 384).await?;
//! println!("created {}", collection.table_name());
//! client.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## OceanBase
//!
//! ```no_run
//! use seekdb::ClientOptions;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = seekdb::ob_client(
//!     ClientOptions::server("localhost", 2881)
//!         .with_tenant("mysql")
//!         .with_user("root"),
//! )?;
//! assert_eq!(client.server().full_user().as_deref(), Some("root@mysql"));
//! client.execute("SELECT 1 as test").await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! Operations return [`SeekdbClientError`], which separates configuration, connection,
//! validation and backend failures. Nothing is retried automatically.

pub mod client;
pub mod collection;
mod errors;
pub mod types;

pub use client::{ClientOptions, ConnectionConfig, SeekdbClient};
pub use collection::Collection;
pub use errors::*;
pub use seekdb_error::{ErrorCodes, SeekdbError};
pub use types::{Row, Value};

/// Builds a client, choosing the backend from which parameters are set.
///
/// `path` selects the embedded engine, `host` with `tenant` selects OceanBase and
/// `host` alone selects a SeekDB server.
pub fn client(options: ClientOptions) -> Result<SeekdbClient, ConfigurationError> {
    SeekdbClient::new(options)
}

/// Builds an OceanBase client. `host` and `tenant` are required.
pub fn ob_client(options: ClientOptions) -> Result<SeekdbClient, ConfigurationError> {
    SeekdbClient::oceanbase(options)
}
