//! Live schema introspection.
//!
//! [`SchemaIntrospector`] answers the two questions the synchronizer asks of
//! a live database: does a table exist, and what columns does it have.

use std::collections::BTreeMap;

use sqlx::mysql::MySqlConnection;
use tracing::debug;

use crate::error::Result;
use crate::schema::ObservedColumn;

const TABLE_EXISTS_SQL: &str = r"
SELECT COUNT(*)
FROM information_schema.TABLES
WHERE TABLE_SCHEMA = DATABASE()
  AND TABLE_NAME = ?
  AND TABLE_TYPE = 'BASE TABLE'
";

// CAST to CHAR: some servers report information_schema text columns with a
// binary collation, which would otherwise decode as bytes.
const TABLE_COLUMNS_SQL: &str = r"
SELECT
    CAST(COLUMN_NAME AS CHAR) AS column_name,
    CAST(COLUMN_TYPE AS CHAR) AS column_type,
    CAST(COLUMN_COMMENT AS CHAR) AS column_comment
FROM information_schema.COLUMNS
WHERE TABLE_SCHEMA = DATABASE()
  AND TABLE_NAME = ?
ORDER BY ORDINAL_POSITION
";

/// Reads table metadata from a live connection.
#[allow(async_fn_in_trait)]
pub trait SchemaIntrospector {
    /// Returns true iff a base table named `table` exists in the current
    /// schema.
    async fn table_exists(&mut self, table: &str) -> Result<bool>;

    /// Returns the columns of `table`, keyed by lower-cased name. A missing
    /// table yields an empty map.
    async fn columns(&mut self, table: &str) -> Result<BTreeMap<String, ObservedColumn>>;
}

impl SchemaIntrospector for MySqlConnection {
    async fn table_exists(&mut self, table: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(TABLE_EXISTS_SQL)
            .bind(table)
            .fetch_one(&mut *self)
            .await?;
        Ok(count > 0)
    }

    async fn columns(&mut self, table: &str) -> Result<BTreeMap<String, ObservedColumn>> {
        let rows: Vec<(String, String, Option<String>)> = sqlx::query_as(TABLE_COLUMNS_SQL)
            .bind(table)
            .fetch_all(&mut *self)
            .await?;

        debug!(table = %table, count = rows.len(), "Introspected columns");

        Ok(rows
            .into_iter()
            .map(|(name, db_type, comment)| {
                (
                    name.to_lowercase(),
                    ObservedColumn::new(name, db_type, comment.unwrap_or_default()),
                )
            })
            .collect())
    }
}
