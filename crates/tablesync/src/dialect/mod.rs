//! Database dialect implementations.
//!
//! Each dialect knows how to render the statements the synchronizer emits
//! for that database system.

mod mysql;

pub use mysql::MySqlDialect;

use crate::schema::{ColumnSpec, ObservedColumn, TableSpec};
use crate::statement::Statement;
use crate::typemap::TypeMapper;

/// Trait for database-specific DDL generation.
pub trait SchemaDialect: Send + Sync {
    /// Returns the dialect name.
    fn name(&self) -> &'static str;

    /// Generates the `CREATE TABLE` statement for a table that does not exist.
    fn create_table(&self, table: &TableSpec, mapper: &TypeMapper) -> Statement;

    /// Generates an `ADD COLUMN` statement.
    fn add_column(&self, table: &str, column: &ColumnSpec, mapper: &TypeMapper) -> Statement;

    /// Generates a `DROP COLUMN` statement, preceded by a danger comment.
    fn drop_column(&self, table: &str, column_name: &str) -> Statement;

    /// Generates a `MODIFY COLUMN` statement. The existing column's
    /// physical name is the target.
    fn modify_column(
        &self,
        table: &str,
        desired: &ColumnSpec,
        existing: &ObservedColumn,
        mapper: &TypeMapper,
    ) -> Statement;

    /// Generates column definition SQL.
    fn column_definition(&self, name: &str, db_type: &str, comment: &str) -> String {
        format!(
            "{} {} COMMENT {}",
            self.quote_identifier(name),
            db_type,
            self.quote_literal(comment)
        )
    }

    /// Quote an identifier (table name, column name, etc.).
    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Quote a string literal.
    fn quote_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }
}
