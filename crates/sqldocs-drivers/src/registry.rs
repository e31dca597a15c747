//! Provider registry for the engines compiled into this build

use std::collections::HashMap;

use sqldocs_core::{ConnectionConfig, DatabaseEngine, Result, SchemaProvider, SqlDocsError};

/// Builds a provider from a parsed connection descriptor
pub type ProviderFactory = fn(&ConnectionConfig) -> Result<Box<dyn SchemaProvider>>;

/// Registry of available engine adapters
pub struct ProviderRegistry {
    factories: HashMap<DatabaseEngine, ProviderFactory>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry with every adapter enabled by cargo features
    pub fn with_defaults() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::new();

        #[cfg(feature = "postgres")]
        registry.register(DatabaseEngine::Postgres, postgres_provider);
        #[cfg(feature = "sqlite")]
        registry.register(DatabaseEngine::Sqlite, sqlite_provider);

        registry
    }

    /// Register an adapter factory
    pub fn register(&mut self, engine: DatabaseEngine, factory: ProviderFactory) {
        tracing::info!(engine = %engine, "registering schema provider");
        self.factories.insert(engine, factory);
    }

    /// Check if an engine is available
    pub fn has(&self, engine: DatabaseEngine) -> bool {
        self.factories.contains_key(&engine)
    }

    /// Engines available in this build, in declaration order
    pub fn engines(&self) -> Vec<DatabaseEngine> {
        DatabaseEngine::ALL
            .into_iter()
            .filter(|engine| self.has(*engine))
            .collect()
    }

    /// Create a provider for `engine` from a raw connection string
    pub fn create(
        &self,
        engine: DatabaseEngine,
        descriptor: &str,
    ) -> Result<Box<dyn SchemaProvider>> {
        let Some(factory) = self.factories.get(&engine) else {
            tracing::warn!(engine = %engine, "engine not compiled into this build");
            return Err(SqlDocsError::UnsupportedEngine(engine.to_string()));
        };

        let config = ConnectionConfig::parse(descriptor)?;
        tracing::debug!(engine = %engine, connection = ?config, "creating schema provider");
        factory(&config)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(feature = "postgres")]
fn postgres_provider(config: &ConnectionConfig) -> Result<Box<dyn SchemaProvider>> {
    let provider = crate::postgres::PostgresProvider::from_config(config)?;
    Ok(Box::new(provider))
}

#[cfg(feature = "sqlite")]
fn sqlite_provider(config: &ConnectionConfig) -> Result<Box<dyn SchemaProvider>> {
    let provider = crate::sqlite::SqliteProvider::from_config(config)?;
    Ok(Box::new(provider))
}

/// Create a provider using the default registry
pub fn create_provider(engine: DatabaseEngine, descriptor: &str) -> Result<Box<dyn SchemaProvider>> {
    ProviderRegistry::with_defaults().create(engine, descriptor)
}
