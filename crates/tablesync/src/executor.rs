//! Statement executor.
//!
//! Applies a planned statement list against a database as a single batch.

use sqlx::mysql::MySqlConnection;
use tracing::{debug, info};

use crate::error::Result;
use crate::statement::Statement;

/// Executes a list of statements in one round trip.
#[allow(async_fn_in_trait)]
pub trait BatchExecutor {
    /// Executes every statement, in order, as one batch. A failure part way
    /// through leaves earlier statements applied.
    async fn execute_batch(&mut self, statements: &[Statement]) -> Result<()>;
}

/// Joins statements into one multi-statement script.
#[must_use]
pub fn batch_sql(statements: &[Statement]) -> String {
    statements
        .iter()
        .map(|stmt| stmt.sql.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

impl BatchExecutor for MySqlConnection {
    async fn execute_batch(&mut self, statements: &[Statement]) -> Result<()> {
        for stmt in statements {
            debug!(kind = %stmt.kind, table = %stmt.table, sql = %stmt.sql, "Executing SQL");
        }

        let script = batch_sql(statements);
        let result = sqlx::raw_sql(&script).execute(&mut *self).await?;

        info!(
            statements = statements.len(),
            rows_affected = result.rows_affected(),
            "Batch executed"
        );
        Ok(())
    }
}
