//! Client configuration, the backend clients, and the [`SeekdbClient`] handle.
//!
//! This module contains:
//! - [`SeekdbClient`] - The client handle, wrapping exactly one [`Backend`]
//! - [`ClientOptions`] - Keyword-style parameters, loadable from YAML and the environment
//! - [`ConnectionConfig`] - One backend's complete connection parameters
//! - [`EmbeddedClient`], [`ServerClient`], [`OceanBaseClient`] - The backend clients

mod backend;
mod embedded;
mod lazy;
mod oceanbase;
mod options;
mod seekdb_client;
mod server;

pub use backend::*;
pub use embedded::EmbeddedClient;
pub use oceanbase::OceanBaseClient;
pub use options::*;
pub use seekdb_client::*;
pub use server::ServerClient;
