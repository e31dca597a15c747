//! Supported database engines

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SqlDocsError;

/// Database engines SqlDocs can introspect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseEngine {
    Postgres,
    Sqlite,
}

impl DatabaseEngine {
    pub const ALL: [DatabaseEngine; 2] = [DatabaseEngine::Postgres, DatabaseEngine::Sqlite];

    /// Identifier used on the command line and in logs
    pub fn id(&self) -> &'static str {
        match self {
            DatabaseEngine::Postgres => "postgres",
            DatabaseEngine::Sqlite => "sqlite",
        }
    }

    /// Product name written into schema documents
    pub fn display_name(&self) -> &'static str {
        match self {
            DatabaseEngine::Postgres => "PostgreSQL",
            DatabaseEngine::Sqlite => "SQLite",
        }
    }

    /// Whether relations are grouped into schemas by this engine
    pub fn supports_schemata(&self) -> bool {
        matches!(self, DatabaseEngine::Postgres)
    }
}

impl fmt::Display for DatabaseEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for DatabaseEngine {
    type Err = SqlDocsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(DatabaseEngine::Postgres),
            "sqlite" | "sqlite3" => Ok(DatabaseEngine::Sqlite),
            other => Err(SqlDocsError::UnsupportedEngine(other.to_string())),
        }
    }
}
