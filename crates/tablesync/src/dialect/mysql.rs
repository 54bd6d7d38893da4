//! MySQL dialect.
//!
//! Tables are created as InnoDB/utf8mb4 with a `BIGINT` auto-increment
//! surrogate key named `id`.

use tracing::warn;

use crate::schema::{ColumnSpec, ObservedColumn, TableSpec};
use crate::statement::{Statement, StatementKind};
use crate::typemap::TypeMapper;

use super::SchemaDialect;

/// Base-entity columns appended after the desired columns, in this order:
/// `(name, type and default, comment)`.
const BASE_ENTITY_COLUMNS: [(&str, &str, &str); 8] = [
    ("created_by", "BIGINT", "creator id"),
    ("created_by_name", "VARCHAR(255)", "creator name"),
    ("create_time", "DATETIME", "create time"),
    ("updated_by", "BIGINT", "updater id"),
    ("updated_by_name", "VARCHAR(255)", "updater name"),
    ("updated_time", "DATETIME", "update time"),
    ("deleted", "TINYINT(1) DEFAULT 0", "logical delete flag"),
    ("version", "INT DEFAULT 1", "optimistic lock version"),
];

const PRIMARY_KEY_COLUMN: &str = "id";

/// MySQL DDL dialect.
#[derive(Debug, Clone, Default)]
pub struct MySqlDialect;

impl MySqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns true if a desired column would collide with a column the
    /// `CREATE TABLE` emits on its own.
    fn collides_with_fixed(table: &TableSpec, db_name: &str) -> bool {
        db_name.eq_ignore_ascii_case(PRIMARY_KEY_COLUMN)
            || (table.use_base_entity
                && BASE_ENTITY_COLUMNS
                    .iter()
                    .any(|(name, _, _)| name.eq_ignore_ascii_case(db_name)))
    }
}

/// Escapes control characters so `name` cannot end a `--` line comment.
fn comment_text(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_control() {
            out.extend(c.escape_default());
        } else {
            out.push(c);
        }
    }
    out
}

impl SchemaDialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn create_table(&self, table: &TableSpec, mapper: &TypeMapper) -> Statement {
        let mut lines = vec![format!(
            "{} BIGINT NOT NULL AUTO_INCREMENT COMMENT {}",
            self.quote_identifier(PRIMARY_KEY_COLUMN),
            self.quote_literal("primary key")
        )];

        for column in &table.columns {
            let db_name = column.db_name();
            if Self::collides_with_fixed(table, &db_name) {
                warn!(
                    table = %table.table_name,
                    column = %db_name,
                    "Column is managed by the table template, skipping"
                );
                continue;
            }
            lines.push(self.column_definition(
                &db_name,
                mapper.resolve(&column.logical_type),
                &column.comment,
            ));
        }

        if table.use_base_entity {
            for (name, db_type, comment) in BASE_ENTITY_COLUMNS {
                lines.push(self.column_definition(name, db_type, comment));
            }
        }

        lines.push(format!(
            "PRIMARY KEY ({})",
            self.quote_identifier(PRIMARY_KEY_COLUMN)
        ));

        let mut sql = String::from("CREATE TABLE IF NOT EXISTS ");
        sql.push_str(&self.quote_identifier(&table.table_name));
        sql.push_str(" (\n  ");
        sql.push_str(&lines.join(",\n  "));
        sql.push_str("\n) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COMMENT=");
        sql.push_str(&self.quote_literal(&table.entity_name));
        sql.push(';');

        Statement::table(StatementKind::Create, &table.table_name, sql)
    }

    fn add_column(&self, table: &str, column: &ColumnSpec, mapper: &TypeMapper) -> Statement {
        let db_name = column.db_name();
        let sql = format!(
            "ALTER TABLE {} ADD COLUMN {};",
            self.quote_identifier(table),
            self.column_definition(
                &db_name,
                mapper.resolve(&column.logical_type),
                &column.comment
            )
        );
        Statement::column(StatementKind::Add, table, db_name, sql)
    }

    fn drop_column(&self, table: &str, column_name: &str) -> Statement {
        let sql = format!(
            "-- DANGER: Column '{}' was removed from config and will be dropped from table '{}'.\n\
             ALTER TABLE {} DROP COLUMN {};",
            comment_text(column_name),
            comment_text(table),
            self.quote_identifier(table),
            self.quote_identifier(column_name)
        );
        Statement::column(StatementKind::Drop, table, column_name, sql)
    }

    fn modify_column(
        &self,
        table: &str,
        desired: &ColumnSpec,
        existing: &ObservedColumn,
        mapper: &TypeMapper,
    ) -> Statement {
        let sql = format!(
            "ALTER TABLE {} MODIFY COLUMN {};",
            self.quote_identifier(table),
            self.column_definition(
                &existing.db_name,
                mapper.resolve(&desired.logical_type),
                &desired.comment
            )
        );
        Statement::column(StatementKind::Modify, table, &existing.db_name, sql)
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    fn quote_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dialect() -> MySqlDialect {
        MySqlDialect::new()
    }

    fn users_table() -> TableSpec {
        TableSpec::new("sys_user", "User").column(ColumnSpec::new("userName", "String", "name"))
    }

    #[test]
    fn test_create_table_minimal() {
        let stmt = dialect().create_table(&users_table(), &TypeMapper::new());

        assert_eq!(stmt.kind, StatementKind::Create);
        assert_eq!(
            stmt.sql,
            "CREATE TABLE IF NOT EXISTS `sys_user` (\n  \
             `id` BIGINT NOT NULL AUTO_INCREMENT COMMENT 'primary key',\n  \
             `user_name` VARCHAR(255) COMMENT 'name',\n  \
             PRIMARY KEY (`id`)\n\
             ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COMMENT='User';"
        );
    }

    #[test]
    fn test_create_table_base_entity_order() {
        let table = users_table().with_base_entity();
        let stmt = dialect().create_table(&table, &TypeMapper::new());

        let positions: Vec<usize> = [
            "`id`",
            "`user_name`",
            "`created_by`",
            "`created_by_name`",
            "`create_time`",
            "`updated_by`",
            "`updated_by_name`",
            "`updated_time`",
            "`deleted` TINYINT(1) DEFAULT 0",
            "`version` INT DEFAULT 1",
            "PRIMARY KEY",
        ]
        .iter()
        .map(|needle| stmt.sql.find(needle).unwrap())
        .collect();

        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn test_create_table_without_base_entity() {
        let stmt = dialect().create_table(&users_table(), &TypeMapper::new());
        assert!(!stmt.sql.contains("created_by"));
        assert!(!stmt.sql.contains("`version`"));
    }

    #[test]
    fn test_create_table_skips_colliding_columns() {
        let table = users_table()
            .with_base_entity()
            .column(ColumnSpec::new("id", "Long", "dup"))
            .column(ColumnSpec::new("version", "Integer", "dup"));
        let stmt = dialect().create_table(&table, &TypeMapper::new());

        assert_eq!(stmt.sql.matches("`id`").count(), 2); // column + primary key
        assert_eq!(stmt.sql.matches("`version`").count(), 1);
        assert!(!stmt.sql.contains("'dup'"));
    }

    #[test]
    fn test_add_column() {
        let mapper = TypeMapper::new().map("Long", "BIGINT");
        let stmt = dialect().add_column("orders", &ColumnSpec::new("totalCents", "Long", "total"), &mapper);

        assert_eq!(stmt.kind, StatementKind::Add);
        assert_eq!(stmt.column.as_deref(), Some("total_cents"));
        assert_eq!(
            stmt.sql,
            "ALTER TABLE `orders` ADD COLUMN `total_cents` BIGINT COMMENT 'total';"
        );
    }

    #[test]
    fn test_drop_column() {
        let stmt = dialect().drop_column("orders", "legacy_flag");

        assert!(stmt.is_destructive());
        assert_eq!(
            stmt.sql,
            "-- DANGER: Column 'legacy_flag' was removed from config and will be dropped from table 'orders'.\n\
             ALTER TABLE `orders` DROP COLUMN `legacy_flag`;"
        );
    }

    #[test]
    fn test_drop_column_comment_stays_on_one_line() {
        let stmt = dialect().drop_column("orders", "x'\nDROP TABLE users; -- ");
        let (comment, alter) = stmt.sql.split_once('\n').unwrap();
        assert_eq!(
            comment,
            "-- DANGER: Column 'x'\\nDROP TABLE users; -- ' was removed from config and will be dropped from table 'orders'."
        );
        assert_eq!(alter, "ALTER TABLE `orders` DROP COLUMN `x'\nDROP TABLE users; -- `;");
        assert_eq!(stmt.column.as_deref(), Some("x'\nDROP TABLE users; -- "));

        let stmt = dialect().drop_column("orders\r\nTRUNCATE TABLE orders;", "flag");
        let (comment, alter) = stmt.sql.split_once('\n').unwrap();
        assert!(comment.ends_with("table 'orders\\r\\nTRUNCATE TABLE orders;'."));
        assert!(!comment.contains('\r'));
        assert!(alter.starts_with("ALTER TABLE `orders\r\nTRUNCATE TABLE orders;`"));
    }

    #[test]
    fn test_modify_column_uses_existing_name() {
        let stmt = dialect().modify_column(
            "orders",
            &ColumnSpec::new("status", "String", "order status"),
            &ObservedColumn::new("Status", "int", ""),
            &TypeMapper::new(),
        );

        assert_eq!(stmt.kind, StatementKind::Modify);
        assert_eq!(
            stmt.sql,
            "ALTER TABLE `orders` MODIFY COLUMN `Status` VARCHAR(255) COMMENT 'order status';"
        );
    }

    #[test]
    fn test_quoting() {
        let d = dialect();
        assert_eq!(d.quote_identifier("we`ird"), "`we``ird`");
        assert_eq!(d.quote_literal("it's"), "'it''s'");
        assert_eq!(d.quote_literal(r"a\b"), r"'a\\b'");
    }
}
