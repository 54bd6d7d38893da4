//! Schema representation types.
//!
//! [`TableSpec`] and [`ColumnSpec`] describe what the configuration wants;
//! [`ObservedColumn`] describes what the catalog reported for a live table.

use serde::Deserialize;

/// Framework-managed columns that are never added, dropped or modified by
/// a diff. Compared case-insensitively.
pub const BASE_COLUMN_NAMES: [&str; 9] = [
    "id",
    "created_by",
    "created_by_name",
    "create_time",
    "updated_by",
    "updated_by_name",
    "updated_time",
    "deleted",
    "version",
];

/// Returns true if `name` is one of [`BASE_COLUMN_NAMES`].
#[must_use]
pub fn is_base_column(name: &str) -> bool {
    BASE_COLUMN_NAMES
        .iter()
        .any(|base| base.eq_ignore_ascii_case(name))
}

/// Converts a camelCase identifier to its snake_case column name.
///
/// An underscore is inserted between a lowercase ASCII letter and the
/// uppercase run that follows it, then the whole name is lowercased.
/// Uppercase runs are kept together, so `userID` becomes `user_id` and
/// `HTTPServer` becomes `httpserver`.
#[must_use]
pub fn to_snake_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() && prev_lower {
            result.push('_');
        }
        prev_lower = c.is_ascii_lowercase();
        result.extend(c.to_lowercase());
    }
    result
}

/// Desired definition of one column.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnSpec {
    /// Logical (camelCase) name.
    #[serde(alias = "javaName")]
    pub name: String,
    /// Abstract type token resolved through the type mapping.
    #[serde(rename = "type", alias = "javaType")]
    pub logical_type: String,
    /// Column comment.
    #[serde(default)]
    pub comment: String,
}

impl ColumnSpec {
    /// Creates a new column spec.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        logical_type: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            logical_type: logical_type.into(),
            comment: comment.into(),
        }
    }

    /// Physical column name derived from the logical name.
    #[must_use]
    pub fn db_name(&self) -> String {
        to_snake_case(&self.name)
    }
}

/// Desired definition of one table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableSpec {
    /// Physical table name.
    #[serde(alias = "tableName")]
    pub table_name: String,
    /// Display name, stored as the table comment.
    #[serde(default, alias = "entityName")]
    pub entity_name: String,
    /// Whether the audit/soft-delete/version columns are part of the table.
    #[serde(default, alias = "useBaseEntity")]
    pub use_base_entity: bool,
    /// Desired columns, in order.
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
}

impl TableSpec {
    /// Creates a new table spec with no columns.
    #[must_use]
    pub fn new(table_name: impl Into<String>, entity_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            entity_name: entity_name.into(),
            use_base_entity: false,
            columns: Vec::new(),
        }
    }

    /// Enables the base-entity columns.
    #[must_use]
    pub fn with_base_entity(mut self) -> Self {
        self.use_base_entity = true;
        self
    }

    /// Adds a column.
    #[must_use]
    pub fn column(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }
}

/// A column as reported by the database catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedColumn {
    /// Physical name, as the catalog spells it.
    pub db_name: String,
    /// Native type (e.g. `varchar(255)`).
    pub db_type: String,
    /// Column comment; an absent comment is the empty string.
    pub comment: String,
}

impl ObservedColumn {
    /// Creates a new observed column.
    #[must_use]
    pub fn new(
        db_name: impl Into<String>,
        db_type: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            db_name: db_name.into(),
            db_type: db_type.into(),
            comment: comment.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(to_snake_case("userName"), "user_name");
        assert_eq!(to_snake_case("id"), "id");
        assert_eq!(to_snake_case("userID"), "user_id");
        assert_eq!(to_snake_case("HTTPServer"), "httpserver");
        assert_eq!(to_snake_case("legacyFlag"), "legacy_flag");
        assert_eq!(to_snake_case("address2Line"), "address2line");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
    }

    #[test]
    fn test_base_column_case_insensitive() {
        assert!(is_base_column("id"));
        assert!(is_base_column("CREATE_TIME"));
        assert!(is_base_column("Version"));
        assert!(!is_base_column("user_name"));
        assert!(!is_base_column("ids"));
    }

    #[test]
    fn test_table_spec_builder() {
        let table = TableSpec::new("sys_user", "User")
            .with_base_entity()
            .column(ColumnSpec::new("userName", "String", "name"));

        assert_eq!(table.table_name, "sys_user");
        assert!(table.use_base_entity);
        assert_eq!(table.columns.len(), 1);
        assert_eq!(table.columns[0].db_name(), "user_name");
    }
}
