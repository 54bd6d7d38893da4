//! Declarative table synchronization for MySQL.
//!
//! `tablesync` keeps a live database schema in line with a declared list of
//! tables:
//! - Missing tables are created with a surrogate key and, optionally, the
//!   audit/soft-delete/version columns
//! - Existing tables are diffed column by column and altered
//! - Every generated statement is written to a reviewable script before
//!   anything is executed
//!
//! # Architecture
//!
//! - **Schema** - Desired tables and columns, plus columns observed live
//! - **TypeMapper** - Resolves logical types to database column types
//! - **Introspector** - Reads table existence and columns from the catalog
//! - **DiffEngine** - Computes added, dropped and modified columns
//! - **Dialect** - Renders `CREATE TABLE` and `ALTER TABLE` statements
//! - **ScriptWriter** - Saves the statement list to `schema.sql`
//! - **Executor** - Applies the statements as one batch
//! - **Synchronizer** - Runs the whole pipeline for a set of tables
//!
//! # Example
//!
//! ```rust,ignore
//! use tablesync::prelude::*;
//!
//! let config = SyncConfig::load("tablesync.toml")?;
//! let synchronizer = Synchronizer::new(MySqlConnector::new(), MySqlDialect::new())
//!     .database(config.database.clone())
//!     .type_mapper(config.type_mapper())
//!     .script_writer(ScriptWriter::new(".", config.script_dir()));
//!
//! match synchronizer.synchronize(&config.tables, false).await? {
//!     SyncOutcome::Written { script, .. } => println!("review {}", script.display()),
//!     outcome => println!("{outcome:?}"),
//! }
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Generate sql/schema.sql from tablesync.toml
//! tablesync sync
//!
//! # Generate and execute
//! tablesync sync --apply
//!
//! # Print the pending statements as JSON
//! tablesync plan --json
//! ```

pub mod config;
pub mod connection;
pub mod dialect;
pub mod diff;
pub mod error;
pub mod executor;
pub mod introspect;
pub mod schema;
pub mod script;
pub mod statement;
pub mod sync;
pub mod typemap;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::{DatabaseConfig, SyncConfig};
    pub use crate::connection::{Connector, Driver, MySqlConnector};
    pub use crate::dialect::{MySqlDialect, SchemaDialect};
    pub use crate::diff::{ColumnDiff, DiffEngine, DuplicatePolicy};
    pub use crate::error::{Result, SyncError};
    pub use crate::executor::BatchExecutor;
    pub use crate::introspect::SchemaIntrospector;
    pub use crate::schema::{to_snake_case, ColumnSpec, ObservedColumn, TableSpec};
    pub use crate::script::ScriptWriter;
    pub use crate::statement::{Statement, StatementKind};
    pub use crate::sync::{SyncOutcome, Synchronizer};
    pub use crate::typemap::TypeMapper;
}
