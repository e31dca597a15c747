//! Loading and saving schema documents
//!
//! Documents are stored as indented UTF-8 JSON. Only quotes, backslashes and
//! control characters are escaped, so descriptions containing markup or
//! non-ASCII text stay readable on disk.

use std::io::Write;
use std::path::Path;

use crate::error::{Result, SqlDocsError};
use crate::merge::merge;
use crate::model::SchemaDocument;

/// Serialize a document into its persisted text form
pub fn to_json_string(document: &SchemaDocument) -> Result<String> {
    let mut text = serde_json::to_string_pretty(document)?;
    text.push('\n');
    Ok(text)
}

/// Parse a document from its persisted text form
pub fn from_json_str(text: &str) -> std::result::Result<SchemaDocument, serde_json::Error> {
    serde_json::from_str(text.strip_prefix('\u{feff}').unwrap_or(text))
}

/// Load a document, failing if the file does not exist
#[tracing::instrument]
pub fn load(path: &Path) -> Result<SchemaDocument> {
    load_if_exists(path)?.ok_or_else(|| SqlDocsError::DocumentNotFound(path.to_path_buf()))
}

/// Load a document, returning `None` if the file does not exist.
///
/// A file that exists but cannot be parsed is an error, never "new".
#[tracing::instrument]
pub fn load_if_exists(path: &Path) -> Result<Option<SchemaDocument>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("schema file does not exist yet");
            return Ok(None);
        }
        Err(e) => return Err(SqlDocsError::Io(e)),
    };

    let document = from_json_str(&text).map_err(|source| SqlDocsError::DocumentParse {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(
        schemata = document.schemata.len(),
        tables = document.tables.len(),
        views = document.views.len(),
        "schema file loaded"
    );
    Ok(Some(document))
}

/// Save a document.
///
/// The text is written to a temporary file next to `path` and renamed over
/// it, so an interrupted run leaves the previous document intact.
#[tracing::instrument(skip(document))]
pub fn save(document: &SchemaDocument, path: &Path) -> Result<()> {
    let text = to_json_string(document)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(text.as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| SqlDocsError::Io(e.error))?;

    tracing::debug!(bytes = text.len(), "schema file saved");
    Ok(())
}

/// Merge a freshly introspected document into the one stored at `path`.
///
/// When no file exists yet the introspected document is returned unchanged.
pub fn load_and_merge(path: &Path, source: SchemaDocument) -> Result<SchemaDocument> {
    match load_if_exists(path)? {
        Some(mut target) => {
            merge(&mut target, source);
            Ok(target)
        }
        None => Ok(source),
    }
}

#[cfg(test)]
mod tests;
