//! PostgreSQL TLS support
//!
//! Maps libpq-style `sslmode` settings onto a native-tls connector for
//! tokio-postgres.

use std::fs;
use std::path::Path;

use native_tls::{Certificate, Identity, TlsConnector as NativeTlsConnector, TlsConnectorBuilder};
use postgres_native_tls::MakeTlsConnector;
use sqldocs_core::ConnectionConfig;
use tracing::debug;

/// Error types for TLS operations
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("Failed to load certificate from {path}: {source}")]
    CertLoadFailed {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid CA certificate format: {0}")]
    InvalidCaCert(String),

    #[error("Invalid client identity (cert + key): {0}")]
    InvalidClientIdentity(String),

    #[error("Unknown sslmode '{0}'")]
    UnknownMode(String),

    #[error("TLS configuration error: {0}")]
    ConfigurationError(String),
}

/// libpq `sslmode` values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    Disable,
    Prefer,
    Require,
    VerifyCa,
    VerifyFull,
}

impl TlsMode {
    pub fn parse(value: &str) -> Result<Self, TlsError> {
        match value.trim().to_lowercase().as_str() {
            "disable" => Ok(TlsMode::Disable),
            "allow" | "prefer" => Ok(TlsMode::Prefer),
            "require" => Ok(TlsMode::Require),
            "verify-ca" | "verify_ca" => Ok(TlsMode::VerifyCa),
            "verify-full" | "verify_full" => Ok(TlsMode::VerifyFull),
            other => Err(TlsError::UnknownMode(other.to_string())),
        }
    }

    pub fn to_ssl_mode(self) -> tokio_postgres::config::SslMode {
        match self {
            TlsMode::Disable => tokio_postgres::config::SslMode::Disable,
            TlsMode::Prefer => tokio_postgres::config::SslMode::Prefer,
            TlsMode::Require | TlsMode::VerifyCa | TlsMode::VerifyFull => {
                tokio_postgres::config::SslMode::Require
            }
        }
    }
}

/// TLS settings read from a connection descriptor
#[derive(Debug, Clone)]
pub struct TlsSettings {
    pub mode: TlsMode,
    pub ca_cert: Option<String>,
    pub client_cert: Option<String>,
    pub client_key: Option<String>,
}

impl TlsSettings {
    pub fn from_config(config: &ConnectionConfig, default_mode: TlsMode) -> Result<Self, TlsError> {
        let mode = match config.ssl_mode() {
            Some(mode) => TlsMode::parse(mode)?,
            None => default_mode,
        };

        Ok(Self {
            mode,
            ca_cert: config.get_string("sslrootcert").map(str::to_string),
            client_cert: config.get_string("sslcert").map(str::to_string),
            client_key: config.get_string("sslkey").map(str::to_string),
        })
    }
}

/// Build a TLS connector for any mode other than `disable`
pub fn build_tls_connector(settings: &TlsSettings) -> Result<MakeTlsConnector, TlsError> {
    debug!(mode = ?settings.mode, "Building PostgreSQL TLS connector");

    let mut builder = NativeTlsConnector::builder();

    match settings.mode {
        TlsMode::Disable | TlsMode::Prefer | TlsMode::Require => {
            // Encryption without verification unless a CA was supplied
            if settings.ca_cert.is_none() {
                builder.danger_accept_invalid_certs(true);
            }
            builder.danger_accept_invalid_hostnames(true);
        }
        TlsMode::VerifyCa => {
            builder.danger_accept_invalid_hostnames(true);
        }
        TlsMode::VerifyFull => {}
    }

    if let Some(path) = &settings.ca_cert {
        apply_ca_cert(&mut builder, Path::new(path))?;
    }

    if let (Some(cert), Some(key)) = (&settings.client_cert, &settings.client_key) {
        apply_client_cert(&mut builder, Path::new(cert), Path::new(key))?;
    }

    let connector = builder
        .build()
        .map_err(|e| TlsError::ConfigurationError(e.to_string()))?;

    Ok(MakeTlsConnector::new(connector))
}

fn read_file(path: &Path) -> Result<Vec<u8>, TlsError> {
    fs::read(path).map_err(|e| TlsError::CertLoadFailed {
        path: path.display().to_string(),
        source: e,
    })
}

fn apply_ca_cert(builder: &mut TlsConnectorBuilder, path: &Path) -> Result<(), TlsError> {
    debug!(path = %path.display(), "Loading CA certificate");
    let cert = Certificate::from_pem(&read_file(path)?)
        .map_err(|e| TlsError::InvalidCaCert(e.to_string()))?;
    builder.add_root_certificate(cert);
    Ok(())
}

fn apply_client_cert(
    builder: &mut TlsConnectorBuilder,
    cert_path: &Path,
    key_path: &Path,
) -> Result<(), TlsError> {
    debug!(
        cert_path = %cert_path.display(),
        key_path = %key_path.display(),
        "Loading client certificate and key"
    );
    let identity = Identity::from_pkcs8(&read_file(cert_path)?, &read_file(key_path)?)
        .map_err(|e| TlsError::InvalidClientIdentity(e.to_string()))?;
    builder.identity(identity);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tls_modes() {
        assert_eq!(TlsMode::parse("disable").ok(), Some(TlsMode::Disable));
        assert_eq!(TlsMode::parse("allow").ok(), Some(TlsMode::Prefer));
        assert_eq!(TlsMode::parse("REQUIRE").ok(), Some(TlsMode::Require));
        assert_eq!(TlsMode::parse("verify_full").ok(), Some(TlsMode::VerifyFull));
        assert!(TlsMode::parse("sometimes").is_err());
    }

    #[test]
    fn test_settings_from_descriptor() {
        let config = ConnectionConfig::parse(
            "Host=localhost;SslMode=verify-ca;sslrootcert=/etc/ssl/root.crt",
        )
        .expect("parse");

        let settings = TlsSettings::from_config(&config, TlsMode::Prefer).expect("settings");

        assert_eq!(settings.mode, TlsMode::VerifyCa);
        assert_eq!(settings.ca_cert.as_deref(), Some("/etc/ssl/root.crt"));
        assert_eq!(settings.client_cert, None);
    }

    #[test]
    fn test_missing_ca_file_is_reported() {
        let settings = TlsSettings {
            mode: TlsMode::VerifyFull,
            ca_cert: Some("/nonexistent/root.crt".to_string()),
            client_cert: None,
            client_key: None,
        };

        let err = build_tls_connector(&settings).err().expect("should fail");
        assert!(matches!(err, TlsError::CertLoadFailed { .. }));
    }
}
