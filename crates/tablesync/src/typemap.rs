//! Logical type to database type resolution.

use std::collections::BTreeMap;

/// Database type used when a logical type has no mapping.
pub const DEFAULT_DB_TYPE: &str = "VARCHAR(255)";

/// Built-in mappings for common logical type names. User mappings are
/// merged over these.
const BUILTIN_MAPPINGS: &[(&str, &str)] = &[
    ("String", "VARCHAR(255)"),
    ("Integer", "INT"),
    ("int", "INT"),
    ("Long", "BIGINT"),
    ("long", "BIGINT"),
    ("Short", "SMALLINT"),
    ("Boolean", "TINYINT(1)"),
    ("boolean", "TINYINT(1)"),
    ("Float", "FLOAT"),
    ("Double", "DOUBLE"),
    ("BigDecimal", "DECIMAL(19,2)"),
    ("LocalDate", "DATE"),
    ("LocalTime", "TIME"),
    ("LocalDateTime", "DATETIME"),
    ("Date", "DATETIME"),
    ("byte[]", "BLOB"),
];

/// Resolves logical column types to concrete database column types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeMapper {
    mapping: BTreeMap<String, String>,
}

impl TypeMapper {
    /// Creates a mapper with no mappings; every type resolves to
    /// [`DEFAULT_DB_TYPE`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mapper preloaded with the built-in mappings.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new().extend(
            BUILTIN_MAPPINGS
                .iter()
                .map(|(logical, db)| ((*logical).to_string(), (*db).to_string())),
        )
    }

    /// Merges `overrides` into this mapper. Later entries win.
    #[must_use]
    pub fn extend(mut self, overrides: impl IntoIterator<Item = (String, String)>) -> Self {
        self.mapping.extend(overrides);
        self
    }

    /// Adds or replaces one mapping.
    #[must_use]
    pub fn map(mut self, logical: impl Into<String>, db_type: impl Into<String>) -> Self {
        self.mapping.insert(logical.into(), db_type.into());
        self
    }

    /// Returns the database type for `logical_type`, or [`DEFAULT_DB_TYPE`].
    #[must_use]
    pub fn resolve(&self, logical_type: &str) -> &str {
        self.mapping
            .get(logical_type)
            .map_or(DEFAULT_DB_TYPE, String::as_str)
    }

    /// Iterates over the configured mappings in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.mapping.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Integer types whose `(N)` suffix is a display width, not a size.
const DISPLAY_WIDTH_TYPES: [&str; 4] = ["int", "bigint", "smallint", "mediumint"];

/// Compares a resolved type against a catalog-reported type, ignoring case
/// and whitespace (`DECIMAL(19, 2)` matches `decimal(19,2)`).
///
/// Older MySQL and MariaDB servers report integer display widths
/// (`int(11)`, `bigint(20)`). These are ignored when the desired type
/// carries no width. `tinyint` is compared exactly.
#[must_use]
pub fn types_match(desired: &str, observed: &str) -> bool {
    let desired = normalize_type(desired);
    let observed = normalize_type(observed);
    desired == observed || (!desired.contains('(') && without_display_width(&observed) == desired)
}

fn normalize_type(ty: &str) -> String {
    ty.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Strips the display width from a normalized integer type, keeping any
/// suffix (`int(10)unsigned` becomes `intunsigned`).
fn without_display_width(ty: &str) -> String {
    let Some((base, rest)) = ty.split_once('(') else {
        return ty.to_string();
    };
    let Some((width, suffix)) = rest.split_once(')') else {
        return ty.to_string();
    };
    if DISPLAY_WIDTH_TYPES.contains(&base)
        && !width.is_empty()
        && width.bytes().all(|b| b.is_ascii_digit())
    {
        format!("{base}{suffix}")
    } else {
        ty.to_string()
    }
}
