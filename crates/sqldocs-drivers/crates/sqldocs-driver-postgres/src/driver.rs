//! PostgreSQL schema provider

use async_trait::async_trait;
use sqldocs_core::{
    ConnectionConfig, DatabaseEngine, Result, SchemaDocument, SchemaProvider, SqlDocsError,
    check_cancelled,
};
use tokio_util::sync::CancellationToken;

use crate::connection::PostgresConnection;
use crate::schema::read_schema;

/// Introspects a PostgreSQL database over a single session
#[derive(Debug, Clone)]
pub struct PostgresProvider {
    config: ConnectionConfig,
}

impl PostgresProvider {
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }

    pub fn from_config(config: &ConnectionConfig) -> Result<Self> {
        if config.url().is_some_and(|url| {
            !(url.starts_with("postgres://") || url.starts_with("postgresql://"))
        }) {
            return Err(SqlDocsError::Configuration(format!(
                "'{}' is not a PostgreSQL connection URL",
                config.redacted()
            )));
        }
        Ok(Self::new(config.clone()))
    }
}

#[async_trait]
impl SchemaProvider for PostgresProvider {
    fn engine(&self) -> DatabaseEngine {
        DatabaseEngine::Postgres
    }

    #[tracing::instrument(skip(self, cancel), fields(descriptor = %self.config.redacted()))]
    async fn introspect(&self, cancel: &CancellationToken) -> Result<SchemaDocument> {
        check_cancelled(cancel)?;

        let connection = tokio::select! {
            connection = PostgresConnection::connect(&self.config) => connection?,
            _ = cancel.cancelled() => return Err(SqlDocsError::Cancelled),
        };

        tokio::select! {
            document = read_schema(&connection) => document,
            _ = cancel.cancelled() => {
                connection.cancel().await;
                Err(SqlDocsError::Cancelled)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_foreign_url_scheme() {
        let config = ConnectionConfig::parse("mysql://root@localhost/shop").expect("parse");
        let err = PostgresProvider::from_config(&config).err().expect("should fail");
        assert!(matches!(err, SqlDocsError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_introspect_honours_prior_cancellation() {
        let config = ConnectionConfig::parse("Host=localhost;Database=orders_db").expect("parse");
        let provider = PostgresProvider::from_config(&config).expect("provider");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = provider.introspect(&cancel).await.err().expect("should fail");
        assert!(err.is_cancelled());
        assert_eq!(provider.engine(), DatabaseEngine::Postgres);
    }
}
