//! SqlDocs Core - schema documents and the merge engine
//!
//! This crate provides the types every other SqlDocs crate depends on:
//!
//! - `SchemaDocument` and its entities - the persisted description of a database
//! - `merge` - reconciles a stored document with a freshly introspected one
//! - `document` - loading and saving documents as JSON
//! - `SchemaProvider` - trait implemented by the engine adapters
//! - `ConnectionConfig` / `DatabaseEngine` - how adapters are selected and configured

mod connection;
pub mod document;
mod engine;
mod error;
pub mod merge;
mod model;
mod provider;

pub use connection::*;
pub use engine::*;
pub use error::*;
pub use merge::{merge, merged};
pub use model::*;
pub use provider::*;
