use crate::prelude::*;
use std::collections::BTreeSet;

///
/// Table
///
/// One introspected table or view. Immutable once the owning [`Schema`] has
/// been finalized; the derived flags are computed there, never on the wire.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<PrimaryKey>,

    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,

    #[serde(default)]
    pub unique_constraints: Vec<UniqueConstraint>,

    #[serde(default)]
    pub is_view: bool,

    /// Derived during finalize; anything a driver sends here is discarded.
    #[serde(skip)]
    pub is_join_table: bool,
}

impl Table {
    #[must_use]
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn get_foreign_key(&self, column: &str) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|fk| fk.column == column)
    }

    /// Columns belonging to the primary key, in key order.
    #[must_use]
    pub fn pk_columns(&self) -> Vec<&Column> {
        self.primary_key
            .as_ref()
            .map(|pk| {
                pk.columns
                    .iter()
                    .filter_map(|name| self.get_column(name))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_pk_column(&self, name: &str) -> bool {
        self.primary_key
            .as_ref()
            .is_some_and(|pk| pk.columns.iter().any(|c| c == name))
    }

    /// Columns that are neither part of the primary key nor a foreign key.
    #[must_use]
    pub fn non_key_columns(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|c| !self.is_pk_column(&c.name) && self.get_foreign_key(&c.name).is_none())
            .collect()
    }

    /// Structural join-table detection: exactly two foreign keys on distinct
    /// columns, a composite primary key covering exactly those columns, and
    /// nothing else in the table.
    #[must_use]
    pub(crate) fn detect_join_table(&self) -> bool {
        if self.is_view || self.foreign_keys.len() != 2 || self.columns.len() != 2 {
            return false;
        }

        let fk_columns: BTreeSet<&str> = self
            .foreign_keys
            .iter()
            .map(|fk| fk.column.as_str())
            .collect();
        if fk_columns.len() != 2 {
            return false;
        }

        let Some(pk) = &self.primary_key else {
            return false;
        };
        let pk_columns: BTreeSet<&str> = pk.columns.iter().map(String::as_str).collect();

        pk_columns == fk_columns
    }
}
