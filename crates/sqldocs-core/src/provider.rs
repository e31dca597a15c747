//! Engine adapter interface

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::engine::DatabaseEngine;
use crate::error::{Result, SqlDocsError};
use crate::model::SchemaDocument;

/// Reads the structure of a live database into a [`SchemaDocument`].
///
/// Implementations must report names exactly as the engine stores them and
/// keep them unique within their parent; the merge relies on both. The
/// returned document carries structure only: descriptions and valid values
/// are left empty.
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    /// Engine this provider talks to
    fn engine(&self) -> DatabaseEngine;

    /// Introspect the database.
    ///
    /// Returns [`SqlDocsError::Cancelled`] once `cancel` fires; any
    /// connection opened for the call is closed before returning.
    async fn introspect(&self, cancel: &CancellationToken) -> Result<SchemaDocument>;
}

/// Fail fast when the pipeline has been cancelled
pub fn check_cancelled(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        Err(SqlDocsError::Cancelled)
    } else {
        Ok(())
    }
}
