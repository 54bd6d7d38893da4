//! Error types for the synchronizer.

use std::path::PathBuf;

/// Errors that can occur while planning or applying a schema sync.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The configured driver identifier is not one this crate can load.
    #[error("Unsupported database driver '{0}'")]
    DriverLoad(String),

    /// The connection URL could not be turned into connect options.
    #[error("Invalid database URL '{url}': {message}")]
    InvalidUrl {
        /// The URL as configured (without credentials).
        url: String,
        /// Error message.
        message: String,
    },

    /// Two desired columns map to the same physical column name.
    #[error("Table '{table}' defines column '{column}' more than once")]
    DuplicateColumn {
        /// The table being synchronized.
        table: String,
        /// The colliding physical column name.
        column: String,
    },

    /// The configuration file is well-formed but semantically invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file not found.
    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    /// Database error during introspection or execution.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error (reading config, writing the script).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
