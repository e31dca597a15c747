//! SQLite connection handling

use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::{Connection as RusqliteConnection, InterruptHandle, OpenFlags};
use sqldocs_core::{Result, SqlDocsError};

/// Read-only connection to a SQLite database file
pub struct SqliteConnection {
    conn: RusqliteConnection,
    interrupt_handle: Arc<InterruptHandle>,
    path: PathBuf,
}

impl SqliteConnection {
    /// Open an existing database file read-only
    pub fn open(path: &str) -> Result<Self> {
        tracing::info!(path = %path, "opening SQLite database");
        let expanded_path = expand_path(path)?;

        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        if !expanded_path.starts_with("file:") && !PathBuf::from(&expanded_path).exists() {
            return Err(SqlDocsError::Connection(format!(
                "SQLite database '{}' does not exist",
                expanded_path
            )));
        }

        let conn = RusqliteConnection::open_with_flags(&expanded_path, flags).map_err(|e| {
            SqlDocsError::Connection(format!(
                "Failed to open SQLite database at '{}': {}",
                expanded_path, e
            ))
        })?;

        // Usable from any thread to abort a running statement
        let interrupt_handle = Arc::new(conn.get_interrupt_handle());

        tracing::info!(path = %expanded_path, "SQLite database connection established");
        Ok(Self {
            conn,
            interrupt_handle,
            path: PathBuf::from(expanded_path),
        })
    }

    pub fn interrupt_handle(&self) -> Arc<InterruptHandle> {
        self.interrupt_handle.clone()
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub(crate) fn inner(&self) -> &RusqliteConnection {
        &self.conn
    }

    pub fn server_version(&self) -> Result<String> {
        self.conn
            .query_row("SELECT sqlite_version()", [], |row| row.get(0))
            .map_err(introspection_error)
    }
}

/// Expand `~/` and make relative paths absolute
fn expand_path(path: &str) -> Result<String> {
    if path.starts_with("file:") {
        return Ok(path.to_string());
    }

    let expanded = if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .ok_or_else(|| {
                SqlDocsError::Configuration("Unable to determine HOME directory".into())
            })?
            .join(rest)
    } else if path.starts_with('~') {
        return Err(SqlDocsError::Configuration(
            "User-specific home directories (~user) are not supported".into(),
        ));
    } else {
        PathBuf::from(path)
    };

    let absolute = if expanded.is_relative() {
        std::env::current_dir()?.join(expanded)
    } else {
        expanded
    };

    Ok(absolute.to_string_lossy().to_string())
}

pub(crate) fn introspection_error(error: rusqlite::Error) -> SqlDocsError {
    SqlDocsError::Introspection(format!("SQLite: {}", error))
}
