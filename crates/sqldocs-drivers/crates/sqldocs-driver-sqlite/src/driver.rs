//! SQLite schema provider

use async_trait::async_trait;
use sqldocs_core::{
    ConnectionConfig, DatabaseEngine, Result, SchemaDocument, SchemaProvider, SqlDocsError,
    check_cancelled,
};
use tokio_util::sync::CancellationToken;

use crate::connection::SqliteConnection;
use crate::schema::read_schema;

/// Introspects a SQLite database file
#[derive(Debug, Clone)]
pub struct SqliteProvider {
    path: String,
}

impl SqliteProvider {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &ConnectionConfig) -> Result<Self> {
        let path = config.path().ok_or_else(|| {
            SqlDocsError::Configuration(
                "SQLite connection string must name a database file".into(),
            )
        })?;
        Ok(Self::new(path))
    }
}

#[async_trait]
impl SchemaProvider for SqliteProvider {
    fn engine(&self) -> DatabaseEngine {
        DatabaseEngine::Sqlite
    }

    #[tracing::instrument(skip(self, cancel), fields(path = %self.path))]
    async fn introspect(&self, cancel: &CancellationToken) -> Result<SchemaDocument> {
        check_cancelled(cancel)?;

        let path = self.path.clone();
        let connection = tokio::task::spawn_blocking(move || SqliteConnection::open(&path))
            .await
            .map_err(|e| SqlDocsError::Connection(format!("SQLite open task failed: {}", e)))??;

        // rusqlite calls block, so cancellation interrupts the running statement
        let interrupt_handle = connection.interrupt_handle();
        let watcher = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                cancel.cancelled().await;
                tracing::debug!("Interrupting SQLite introspection");
                interrupt_handle.interrupt();
            }
        });

        let result = tokio::task::spawn_blocking(move || read_schema(&connection))
            .await
            .map_err(|e| SqlDocsError::Introspection(format!("SQLite task failed: {}", e)));
        watcher.abort();

        match result.and_then(|r| r) {
            Err(_) if cancel.is_cancelled() => Err(SqlDocsError::Cancelled),
            other => other,
        }
    }
}
