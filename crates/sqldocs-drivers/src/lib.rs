//! SqlDocs Drivers - engine adapters
//!
//! Each supported engine lives in its own crate behind a cargo feature. The
//! registry turns an engine and a connection string into a boxed
//! [`SchemaProvider`].

#[cfg(feature = "postgres")]
pub use sqldocs_driver_postgres as postgres;
#[cfg(feature = "sqlite")]
pub use sqldocs_driver_sqlite as sqlite;

mod registry;

pub use registry::{ProviderRegistry, create_provider};

/// Re-export commonly used types from sqldocs-core
pub use sqldocs_core::{
    ConnectionConfig, DatabaseEngine, Result, SchemaDocument, SchemaProvider, SqlDocsError,
};
