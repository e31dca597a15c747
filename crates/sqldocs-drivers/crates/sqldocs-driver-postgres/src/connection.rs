//! PostgreSQL connection handling

use std::time::Duration;

use sqldocs_core::{ConnectionConfig, Result, SqlDocsError};
use tokio_postgres::types::ToSql;
use tokio_postgres::{CancelToken, Client, NoTls, Row};

use crate::tls::{TlsMode, TlsSettings, build_tls_connector};

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5432;
const APPLICATION_NAME: &str = "sqldocs";

/// Format a PostgreSQL error with the server's detail and hint
fn format_postgres_error(error: &tokio_postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut message = db_error.message().to_string();

    if let Some(detail) = db_error.detail().filter(|d| !d.trim().is_empty()) {
        message.push_str(&format!(" (detail: {})", detail));
    }

    if let Some(hint) = db_error.hint().filter(|h| !h.trim().is_empty()) {
        message.push_str(&format!(" (hint: {})", hint));
    }

    match db_error.code().code() {
        "28P01" | "28000" => format!("authentication failed: {}", message),
        "3D000" => format!("database does not exist: {}", message),
        "42501" => format!("permission denied: {}", message),
        "57014" => format!("query canceled: {}", message),
        code => format!("{} (code: {})", message, code),
    }
}

/// Open client session against a PostgreSQL server
pub struct PostgresConnection {
    client: Client,
    cancel_token: CancelToken,
}

impl PostgresConnection {
    /// Connect using a parsed connection descriptor
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let (pg_config, tls) = build_config(config)?;

        tracing::info!(
            hosts = ?pg_config.get_hosts(),
            database = ?pg_config.get_dbname(),
            ssl_mode = ?tls.mode,
            "connecting to PostgreSQL database"
        );

        let client = if tls.mode == TlsMode::Disable {
            let (client, connection) = pg_config.connect(NoTls).await.map_err(|e| {
                SqlDocsError::Connection(format!(
                    "Failed to connect to PostgreSQL: {}",
                    format_postgres_error(&e)
                ))
            })?;
            tokio::spawn(async move {
                if let Err(e) = connection.await {
                    tracing::error!(error = %e, "PostgreSQL connection error");
                }
            });
            client
        } else {
            let connector = build_tls_connector(&tls)
                .map_err(|e| SqlDocsError::Connection(e.to_string()))?;
            let (client, connection) = pg_config.connect(connector).await.map_err(|e| {
                SqlDocsError::Connection(format!(
                    "Failed to connect to PostgreSQL: {}",
                    format_postgres_error(&e)
                ))
            })?;
            tokio::spawn(async move {
                if let Err(e) = connection.await {
                    tracing::error!(error = %e, "PostgreSQL connection error");
                }
            });
            client
        };

        let cancel_token = client.cancel_token();
        tracing::info!("PostgreSQL connection established");

        Ok(Self {
            client,
            cancel_token,
        })
    }

    /// Run a catalog query
    pub(crate) async fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>> {
        self.client.query(sql, params).await.map_err(|e| {
            SqlDocsError::Introspection(format!("PostgreSQL: {}", format_postgres_error(&e)))
        })
    }

    pub(crate) async fn query_one(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Row> {
        self.client.query_one(sql, params).await.map_err(|e| {
            SqlDocsError::Introspection(format!("PostgreSQL: {}", format_postgres_error(&e)))
        })
    }

    /// Ask the server to abort whatever this session is running
    pub async fn cancel(&self) {
        tracing::debug!("Sending cancel request to PostgreSQL server");
        // Cancel requests go over a fresh socket; plain TCP is enough
        match self.cancel_token.cancel_query(NoTls).await {
            Ok(()) => tracing::debug!("PostgreSQL cancel request sent"),
            Err(e) => tracing::warn!(error = %e, "Failed to cancel PostgreSQL query"),
        }
    }
}

/// Translate a descriptor into a tokio-postgres config plus TLS settings
pub(crate) fn build_config(
    config: &ConnectionConfig,
) -> Result<(tokio_postgres::Config, TlsSettings)> {
    let tls_error = |e: crate::tls::TlsError| SqlDocsError::Configuration(e.to_string());

    if let Some(url) = config.url() {
        let mut pg_config: tokio_postgres::Config = url.parse().map_err(|e| {
            SqlDocsError::Configuration(format!("invalid PostgreSQL connection URL: {}", e))
        })?;
        if pg_config.get_application_name().is_none() {
            pg_config.application_name(APPLICATION_NAME);
        }

        let mode = match pg_config.get_ssl_mode() {
            tokio_postgres::config::SslMode::Disable => TlsMode::Disable,
            tokio_postgres::config::SslMode::Require => TlsMode::Require,
            _ => TlsMode::Prefer,
        };
        let tls = TlsSettings {
            mode,
            ca_cert: None,
            client_cert: None,
            client_key: None,
        };
        return Ok((pg_config, tls));
    }

    let tls = TlsSettings::from_config(config, TlsMode::Prefer).map_err(tls_error)?;

    let mut pg_config = tokio_postgres::Config::new();
    pg_config
        .host(config.host().unwrap_or(DEFAULT_HOST))
        .port(config.port()?.unwrap_or(DEFAULT_PORT))
        .application_name(APPLICATION_NAME)
        .ssl_mode(tls.mode.to_ssl_mode());

    if let Some(database) = config.database() {
        pg_config.dbname(database);
    }
    if let Some(user) = config.user() {
        pg_config.user(user);
    }
    if let Some(password) = config.password() {
        pg_config.password(password);
    }

    for (key, value) in config.extra_params() {
        match key {
            "application_name" => {
                pg_config.application_name(value);
            }
            "options" => {
                pg_config.options(value);
            }
            "connect_timeout" => {
                let seconds = value.parse::<u64>().map_err(|_| {
                    SqlDocsError::Configuration(format!("invalid connect_timeout '{}'", value))
                })?;
                pg_config.connect_timeout(Duration::from_secs(seconds));
            }
            "sslrootcert" | "sslcert" | "sslkey" => {}
            _ => tracing::debug!(parameter = key, "ignoring unsupported connection parameter"),
        }
    }

    Ok((pg_config, tls))
}
