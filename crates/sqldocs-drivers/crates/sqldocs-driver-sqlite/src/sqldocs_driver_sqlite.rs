//! SQLite schema provider

mod connection;
mod driver;
mod schema;

pub use connection::SqliteConnection;
pub use driver::SqliteProvider;
