//! PostgreSQL schema provider

mod connection;
mod driver;
mod schema;
mod tls;

pub use connection::PostgresConnection;
pub use driver::PostgresProvider;
pub use tls::{TlsError, TlsMode, TlsSettings, build_tls_connector};
