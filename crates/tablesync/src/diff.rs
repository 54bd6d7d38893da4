//! Column diffing between a desired table and its live counterpart.
//!
//! Base columns are filtered out of both sides before comparison, so they
//! never produce an add, drop or modify.

use std::collections::{BTreeMap, HashMap};

use crate::error::{Result, SyncError};
use crate::schema::{is_base_column, ColumnSpec, ObservedColumn};
use crate::typemap::{types_match, TypeMapper};

/// What to do when two desired columns collapse to the same physical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Fail with [`SyncError::DuplicateColumn`].
    #[default]
    Reject,
    /// Keep the later definition, at the position of the first one.
    LastWins,
}

/// Column-level changes for one existing table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnDiff {
    /// Desired columns missing from the table, in desired order.
    pub to_add: Vec<ColumnSpec>,
    /// Live columns missing from the desired set, by name.
    pub to_drop: Vec<ObservedColumn>,
    /// Columns whose type or comment differ: `(desired, existing)`.
    pub to_modify: Vec<(ColumnSpec, ObservedColumn)>,
}

impl ColumnDiff {
    /// Returns `true` if there is nothing to change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_drop.is_empty() && self.to_modify.is_empty()
    }

    /// Number of statements this diff will produce.
    #[must_use]
    pub fn len(&self) -> usize {
        self.to_add.len() + self.to_drop.len() + self.to_modify.len()
    }
}

/// Computes [`ColumnDiff`]s.
#[derive(Debug, Clone, Default)]
pub struct DiffEngine {
    policy: DuplicatePolicy,
}

impl DiffEngine {
    /// Creates a diff engine that rejects duplicate column names.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a diff engine with the given duplicate policy.
    #[must_use]
    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self { policy }
    }

    /// Keys the desired columns by physical name, preserving input order
    /// and applying the duplicate policy.
    pub fn desired_columns<'a>(
        &self,
        table: &str,
        columns: &'a [ColumnSpec],
    ) -> Result<Vec<(String, &'a ColumnSpec)>> {
        let mut keyed: Vec<(String, &ColumnSpec)> = Vec::with_capacity(columns.len());
        let mut positions: HashMap<String, usize> = HashMap::new();

        for column in columns {
            let db_name = column.db_name();
            if let Some(&pos) = positions.get(&db_name) {
                match self.policy {
                    DuplicatePolicy::Reject => {
                        return Err(SyncError::DuplicateColumn {
                            table: table.to_string(),
                            column: db_name,
                        });
                    }
                    DuplicatePolicy::LastWins => keyed[pos].1 = column,
                }
            } else {
                positions.insert(db_name.clone(), keyed.len());
                keyed.push((db_name, column));
            }
        }

        Ok(keyed)
    }

    /// Compares the desired columns of `table` against the columns the
    /// catalog reported. `existing` is keyed by lower-cased name; its
    /// ordering determines the ordering of `to_drop`.
    pub fn diff(
        &self,
        table: &str,
        desired: &[ColumnSpec],
        existing: &BTreeMap<String, ObservedColumn>,
        mapper: &TypeMapper,
    ) -> Result<ColumnDiff> {
        let desired: Vec<(String, &ColumnSpec)> = self
            .desired_columns(table, desired)?
            .into_iter()
            .filter(|(name, _)| !is_base_column(name))
            .collect();
        let existing: Vec<(&String, &ObservedColumn)> = existing
            .iter()
            .filter(|(name, _)| !is_base_column(name))
            .collect();

        let mut diff = ColumnDiff::default();

        for (name, column) in &desired {
            if !existing.iter().any(|(key, _)| *key == name) {
                diff.to_add.push((*column).clone());
            }
        }

        for (key, observed) in &existing {
            if !desired.iter().any(|(name, _)| name == *key) {
                diff.to_drop.push((*observed).clone());
            }
        }

        for (name, column) in &desired {
            let Some((_, observed)) = existing.iter().find(|(key, _)| *key == name) else {
                continue;
            };
            let desired_type = mapper.resolve(&column.logical_type);
            if !types_match(desired_type, &observed.db_type) || column.comment != observed.comment
            {
                diff.to_modify.push(((*column).clone(), (*observed).clone()));
            }
        }

        Ok(diff)
    }
}
