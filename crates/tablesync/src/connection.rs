//! Driver resolution and connection management.

use std::str::FromStr;

use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::Connection;
use tracing::debug;

use crate::config::{redact_url, DatabaseConfig};
use crate::error::{Result, SyncError};
use crate::executor::BatchExecutor;
use crate::introspect::SchemaIntrospector;

/// Database drivers this crate can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    /// MySQL and MariaDB.
    MySql,
}

impl Driver {
    /// Resolves a driver identifier. JDBC class names of the MySQL and
    /// MariaDB drivers are accepted alongside the short names.
    pub fn load(identifier: &str) -> Result<Self> {
        match identifier.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" | "com.mysql.cj.jdbc.driver" | "com.mysql.jdbc.driver"
            | "org.mariadb.jdbc.driver" => Ok(Self::MySql),
            _ => Err(SyncError::DriverLoad(identifier.to_string())),
        }
    }

    /// Returns the driver name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::MySql => "mysql",
        }
    }
}

/// Strips a JDBC prefix and maps `mariadb://` onto `mysql://`.
#[must_use]
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    let url = url.strip_prefix("jdbc:").unwrap_or(url);
    match url.strip_prefix("mariadb://") {
        Some(rest) => format!("mysql://{rest}"),
        None => url.to_string(),
    }
}

/// Opens connections for the synchronizer.
///
/// Each call to [`Connector::connect`] yields an independent connection;
/// nothing is pooled or reused.
#[allow(async_fn_in_trait)]
pub trait Connector {
    /// Connection type produced by this connector.
    type Connection: SchemaIntrospector + BatchExecutor;

    /// Opens a new connection.
    async fn connect(&self, config: &DatabaseConfig) -> Result<Self::Connection>;

    /// Closes a connection.
    async fn close(&self, connection: Self::Connection) -> Result<()>;
}

/// Connector for MySQL-compatible servers.
#[derive(Debug, Clone, Default)]
pub struct MySqlConnector;

impl MySqlConnector {
    /// Creates a new MySQL connector.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Builds connect options from the config. Explicit credentials take
    /// precedence over those embedded in the URL.
    pub fn connect_options(config: &DatabaseConfig) -> Result<MySqlConnectOptions> {
        let url = normalize_url(&config.url);
        let mut options =
            MySqlConnectOptions::from_str(&url).map_err(|e| SyncError::InvalidUrl {
                url: redact_url(&url),
                message: e.to_string(),
            })?;

        if let Some(username) = &config.username {
            options = options.username(username);
        }
        if let Some(password) = &config.password {
            options = options.password(password);
        }
        Ok(options)
    }
}

impl Connector for MySqlConnector {
    type Connection = MySqlConnection;

    async fn connect(&self, config: &DatabaseConfig) -> Result<MySqlConnection> {
        let options = Self::connect_options(config)?;
        debug!(url = %redact_url(&config.url), "Opening connection");
        Ok(MySqlConnection::connect_with(&options).await?)
    }

    async fn close(&self, connection: MySqlConnection) -> Result<()> {
        connection.close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_load() {
        assert_eq!(Driver::load("mysql").unwrap(), Driver::MySql);
        assert_eq!(
            Driver::load("com.mysql.cj.jdbc.Driver").unwrap(),
            Driver::MySql
        );
        assert_eq!(Driver::load("org.mariadb.jdbc.Driver").unwrap(), Driver::MySql);
    }

    #[test]
    fn test_driver_load_unknown() {
        let err = Driver::load("org.postgresql.Driver").unwrap_err();
        assert!(matches!(err, SyncError::DriverLoad(ref d) if d == "org.postgresql.Driver"));
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url("jdbc:mysql://localhost:3306/app?useSSL=false"),
            "mysql://localhost:3306/app?useSSL=false"
        );
        assert_eq!(
            normalize_url("jdbc:mariadb://db:3306/app"),
            "mysql://db:3306/app"
        );
        assert_eq!(normalize_url("mysql://db/app"), "mysql://db/app");
    }

    #[test]
    fn test_connect_options_invalid_url() {
        let config = DatabaseConfig::new("mysql", "not a url");
        let err = MySqlConnector::connect_options(&config).unwrap_err();
        assert!(matches!(err, SyncError::InvalidUrl { .. }));
    }
}
