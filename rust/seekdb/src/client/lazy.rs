use std::future::Future;

use sqlx::Connection;

use crate::errors::ConnectionError;

/// A single connection that is opened on first use and owned until close or drop.
///
/// `connection` is `None` until the first successful connect and again after close.
pub(crate) struct LazyConnection<C> {
    connection: Option<C>,
    // Printable target, never includes credentials.
    target: String,
}

impl<C: Connection> LazyConnection<C> {
    pub(crate) fn new(target: String) -> Self {
        LazyConnection {
            connection: None,
            target,
        }
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub(crate) fn target(&self) -> &str {
        &self.target
    }

    /// Returns the open connection, calling `connect` only when there is none.
    /// A failed attempt leaves the state unconnected.
    pub(crate) async fn ensure_connected<F, Fut>(
        &mut self,
        connect: F,
    ) -> Result<&mut C, ConnectionError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<C, sqlx::Error>>,
    {
        let conn = match self.connection.take() {
            Some(conn) => conn,
            None => {
                tracing::debug!("Opening connection to {}", self.target);
                connect().await.map_err(|source| ConnectionError {
                    target: self.target.clone(),
                    source,
                })?
            }
        };
        Ok(self.connection.insert(conn))
    }

    /// Gracefully closes the connection. Safe to call any number of times.
    pub(crate) async fn close(&mut self) -> Result<(), sqlx::Error> {
        if let Some(conn) = self.connection.take() {
            tracing::debug!("Closing connection to {}", self.target);
            conn.close().await?;
        }
        Ok(())
    }
}

impl<C> Drop for LazyConnection<C> {
    fn drop(&mut self) {
        if self.connection.is_some() {
            // The driver releases the socket or file handle when the connection drops.
            tracing::debug!("Releasing open connection to {} on drop", self.target);
        }
    }
}
