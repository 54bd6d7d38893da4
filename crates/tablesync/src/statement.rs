//! Generated DDL statements.

use std::fmt;

use serde::Serialize;

/// Classification of a generated statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    /// `CREATE TABLE`.
    Create,
    /// `ALTER TABLE ... ADD COLUMN`.
    Add,
    /// `ALTER TABLE ... DROP COLUMN`, annotated with a danger comment.
    Drop,
    /// `ALTER TABLE ... MODIFY COLUMN`.
    Modify,
}

impl StatementKind {
    /// Returns the upper-case tag used in logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Add => "ADD",
            Self::Drop => "DROP",
            Self::Modify => "MODIFY",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One literal DDL statement, terminated and ready to execute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    /// Statement classification.
    pub kind: StatementKind,
    /// Target table.
    pub table: String,
    /// Target column for `ALTER` statements.
    pub column: Option<String>,
    /// SQL text, including any leading comment lines.
    pub sql: String,
}

impl Statement {
    /// Creates a statement targeting a whole table.
    #[must_use]
    pub fn table(kind: StatementKind, table: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            kind,
            table: table.into(),
            column: None,
            sql: sql.into(),
        }
    }

    /// Creates a statement targeting one column of a table.
    #[must_use]
    pub fn column(
        kind: StatementKind,
        table: impl Into<String>,
        column: impl Into<String>,
        sql: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            table: table.into(),
            column: Some(column.into()),
            sql: sql.into(),
        }
    }

    /// Returns whether this statement destroys data.
    #[must_use]
    pub fn is_destructive(&self) -> bool {
        self.kind == StatementKind::Drop
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}
