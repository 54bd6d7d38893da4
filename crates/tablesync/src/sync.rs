//! Schema synchronizer.
//!
//! Drives one run: introspect each desired table, diff, generate DDL,
//! write the script and optionally apply it.
//!
//! Planning and applying use two separate connections opened at different
//! times. Nothing prevents the live schema from changing in between.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::{redact_url, DatabaseConfig, DEFAULT_SCRIPT_DIR};
use crate::connection::{Connector, Driver};
use crate::dialect::{MySqlDialect, SchemaDialect};
use crate::diff::{ColumnDiff, DiffEngine, DuplicatePolicy};
use crate::error::Result;
use crate::executor::BatchExecutor;
use crate::introspect::SchemaIntrospector;
use crate::schema::TableSpec;
use crate::script::ScriptWriter;
use crate::statement::Statement;
use crate::typemap::TypeMapper;

/// How a synchronization run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No database configuration was supplied; nothing was done.
    Skipped,
    /// The database already matches the desired schema. No script written.
    NoChanges,
    /// The script was written but not applied.
    Written {
        /// Path of the script.
        script: PathBuf,
        /// Statements in the script.
        statements: Vec<Statement>,
    },
    /// The script was written and applied.
    Applied {
        /// Path of the script.
        script: PathBuf,
        /// Statements in the script.
        statements: Vec<Statement>,
    },
}

impl SyncOutcome {
    /// Returns the generated statements, if any.
    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        match self {
            Self::Written { statements, .. } | Self::Applied { statements, .. } => statements,
            Self::Skipped | Self::NoChanges => &[],
        }
    }

    /// Returns the script path, if one was written.
    #[must_use]
    pub fn script(&self) -> Option<&Path> {
        match self {
            Self::Written { script, .. } | Self::Applied { script, .. } => Some(script),
            Self::Skipped | Self::NoChanges => None,
        }
    }
}

/// Reconciles desired tables with a live database.
pub struct Synchronizer<C: Connector, D: SchemaDialect = MySqlDialect> {
    connector: C,
    dialect: D,
    database: Option<DatabaseConfig>,
    mapper: TypeMapper,
    diff: DiffEngine,
    script: ScriptWriter,
}

impl<C: Connector, D: SchemaDialect> Synchronizer<C, D> {
    /// Creates a synchronizer with no database configuration, the built-in
    /// type mapping and the script at `./sql/schema.sql`.
    pub fn new(connector: C, dialect: D) -> Self {
        Self {
            connector,
            dialect,
            database: None,
            mapper: TypeMapper::with_defaults(),
            diff: DiffEngine::new(),
            script: ScriptWriter::new(".", DEFAULT_SCRIPT_DIR),
        }
    }

    /// Sets the database configuration. `None` makes every run a no-op.
    #[must_use]
    pub fn database(mut self, database: Option<DatabaseConfig>) -> Self {
        self.database = database;
        self
    }

    /// Sets the type mapper.
    #[must_use]
    pub fn type_mapper(mut self, mapper: TypeMapper) -> Self {
        self.mapper = mapper;
        self
    }

    /// Sets where the script is written.
    #[must_use]
    pub fn script_writer(mut self, script: ScriptWriter) -> Self {
        self.script = script;
        self
    }

    /// Sets how duplicate physical column names are handled.
    #[must_use]
    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.diff = DiffEngine::with_policy(policy);
        self
    }

    /// Returns the script writer.
    #[must_use]
    pub fn script(&self) -> &ScriptWriter {
        &self.script
    }

    /// Runs a full synchronization: plan, write the script, and apply it
    /// when `apply` is set.
    ///
    /// Failures before the script is written leave no script behind. An
    /// apply failure is returned after the script has been written.
    pub async fn synchronize(&self, tables: &[TableSpec], apply: bool) -> Result<SyncOutcome> {
        let Some(database) = &self.database else {
            warn!("Database configuration not found, skipping schema synchronization");
            return Ok(SyncOutcome::Skipped);
        };

        let statements = self.plan_with(database, tables).await?;
        if statements.is_empty() {
            info!("No database schema changes detected");
            return Ok(SyncOutcome::NoChanges);
        }

        let script = self.script.write(&statements)?.to_path_buf();

        if !apply {
            info!(
                statements = statements.len(),
                "SQL script generated; rerun with --apply to execute it"
            );
            return Ok(SyncOutcome::Written { script, statements });
        }

        info!(statements = statements.len(), "Executing schema updates");
        let mut connection = self.connector.connect(database).await?;
        let executed = connection.execute_batch(&statements).await;
        let closed = self.connector.close(connection).await;
        executed?;
        closed?;
        info!("Database schema updated successfully");

        Ok(SyncOutcome::Applied { script, statements })
    }

    /// Computes the statements a run would generate without writing or
    /// applying them. Returns `None` when no database is configured.
    pub async fn plan(&self, tables: &[TableSpec]) -> Result<Option<Vec<Statement>>> {
        match &self.database {
            Some(database) => Ok(Some(self.plan_with(database, tables).await?)),
            None => Ok(None),
        }
    }

    async fn plan_with(
        &self,
        database: &DatabaseConfig,
        tables: &[TableSpec],
    ) -> Result<Vec<Statement>> {
        let driver = Driver::load(&database.driver)?;
        info!(
            driver = driver.name(),
            dialect = self.dialect.name(),
            url = %redact_url(&database.url),
            username = database.username.as_deref().unwrap_or(""),
            "Starting database schema synchronization"
        );

        let mut connection = self.connector.connect(database).await?;
        let planned = self.plan_tables(&mut connection, tables).await;
        let closed = self.connector.close(connection).await;
        let statements = planned?;
        closed?;
        Ok(statements)
    }

    async fn plan_tables(
        &self,
        connection: &mut C::Connection,
        tables: &[TableSpec],
    ) -> Result<Vec<Statement>> {
        let mut statements = Vec::new();

        for table in tables {
            let name = table.table_name.as_str();
            if connection.table_exists(name).await? {
                info!(table = %name, "Table exists, generating ALTER TABLE statements");
                let existing = connection.columns(name).await?;
                let diff = self.diff.diff(name, &table.columns, &existing, &self.mapper)?;
                statements.extend(self.alter_statements(name, &diff));
            } else {
                info!(table = %name, "Table does not exist, generating CREATE TABLE statement");
                statements.push(self.create_statement(table)?);
            }
        }

        for stmt in &statements {
            debug!(kind = %stmt.kind, table = %stmt.table, sql = %stmt.sql, "Planned statement");
        }
        Ok(statements)
    }

    fn create_statement(&self, table: &TableSpec) -> Result<Statement> {
        let columns = self
            .diff
            .desired_columns(&table.table_name, &table.columns)?
            .into_iter()
            .map(|(_, column)| column.clone())
            .collect();
        let table = TableSpec {
            columns,
            ..table.clone()
        };
        Ok(self.dialect.create_table(&table, &self.mapper))
    }

    fn alter_statements(&self, table: &str, diff: &ColumnDiff) -> Vec<Statement> {
        let mut statements = Vec::with_capacity(diff.len());

        for column in &diff.to_add {
            info!(table = %table, column = %column.db_name(), "Generated ADD COLUMN");
            statements.push(self.dialect.add_column(table, column, &self.mapper));
        }

        for column in &diff.to_drop {
            warn!(
                table = %table,
                column = %column.db_name,
                "Column exists in the database but not in config, generating DROP COLUMN"
            );
            statements.push(self.dialect.drop_column(table, &column.db_name));
        }

        for (desired, existing) in &diff.to_modify {
            info!(
                table = %table,
                column = %existing.db_name,
                old_type = %existing.db_type,
                new_type = %self.mapper.resolve(&desired.logical_type),
                old_comment = %existing.comment,
                new_comment = %desired.comment,
                "Generated MODIFY COLUMN"
            );
            statements.push(
                self.dialect
                    .modify_column(table, desired, existing, &self.mapper),
            );
        }

        statements
    }
}
