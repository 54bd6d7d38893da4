//! Configuration loading and validation.
//!
//! The desired schema, the type mapping and the optional database settings
//! are read from one TOML file.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, SyncError};
use crate::schema::TableSpec;
use crate::typemap::TypeMapper;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "tablesync.toml";

/// Default directory (relative to the project) for the generated script.
pub const DEFAULT_SCRIPT_DIR: &str = "sql";

/// Connection settings for the target database.
#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Driver identifier (`mysql`, `com.mysql.cj.jdbc.Driver`, ...).
    pub driver: String,
    /// Connection URL. A leading `jdbc:` is accepted.
    pub url: String,
    /// User name; overrides any user in the URL.
    #[serde(default)]
    pub username: Option<String>,
    /// Password; overrides any password in the URL.
    #[serde(default)]
    pub password: Option<String>,
}

impl DatabaseConfig {
    /// Creates a new database config without credentials.
    #[must_use]
    pub fn new(driver: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            url: url.into(),
            username: None,
            password: None,
        }
    }

    /// Sets the credentials.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("driver", &self.driver)
            .field("url", &redact_url(&self.url))
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Hides the user-info part of a URL (`mysql://user:pw@host` becomes
/// `mysql://***@host`).
#[must_use]
pub fn redact_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://").map(|i| i + 3) else {
        return url.to_string();
    };
    match url[scheme_end..].find('@') {
        Some(at) => format!("{}***{}", &url[..scheme_end], &url[scheme_end + at..]),
        None => url.to_string(),
    }
}

/// Complete synchronizer configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncConfig {
    /// Script directory relative to the project directory.
    #[serde(default, alias = "scriptDir")]
    pub script_dir: Option<PathBuf>,
    /// Database settings. Absent means synchronization is skipped.
    #[serde(default, alias = "jdbcConfig")]
    pub database: Option<DatabaseConfig>,
    /// Logical type to database type overrides.
    #[serde(default, alias = "typeMapping")]
    pub type_mapping: BTreeMap<String, String>,
    /// Desired tables, in processing order.
    #[serde(default)]
    pub tables: Vec<TableSpec>,
}

impl SyncConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SyncError::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for table in &self.tables {
            if table.table_name.trim().is_empty() {
                return Err(SyncError::InvalidConfig(
                    "table_name must not be empty".to_string(),
                ));
            }
            if !seen.insert(table.table_name.as_str()) {
                return Err(SyncError::InvalidConfig(format!(
                    "table '{}' is defined more than once",
                    table.table_name
                )));
            }
            if let Some(column) = table.columns.iter().find(|c| c.name.trim().is_empty()) {
                return Err(SyncError::InvalidConfig(format!(
                    "table '{}' has a column with an empty name (type '{}')",
                    table.table_name, column.logical_type
                )));
            }
        }

        if let Some(db) = &self.database {
            if db.driver.trim().is_empty() || db.url.trim().is_empty() {
                return Err(SyncError::InvalidConfig(
                    "database.driver and database.url are required".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Builds the type mapper: built-in defaults overridden by
    /// `type_mapping`.
    #[must_use]
    pub fn type_mapper(&self) -> TypeMapper {
        TypeMapper::with_defaults().extend(self.type_mapping.clone())
    }

    /// Script directory, falling back to [`DEFAULT_SCRIPT_DIR`].
    #[must_use]
    pub fn script_dir(&self) -> &Path {
        self.script_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_SCRIPT_DIR))
    }
}
