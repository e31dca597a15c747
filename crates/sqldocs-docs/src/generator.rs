//! Documentation generator seam

use std::path::Path;

use sqldocs_core::{Result, SchemaDocument};

/// Turns a schema document into a documentation project on disk
pub trait DocsGenerator: Send + Sync {
    /// Create or refresh the project under `output`.
    ///
    /// Generated pages are replaced on every run. Files the operator owns
    /// (site configuration, landing page) are only written when missing.
    fn generate(&self, document: &SchemaDocument, output: &Path) -> Result<()>;
}
