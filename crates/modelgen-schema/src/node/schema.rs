use crate::{Error, prelude::*, validate::validate_schema};
use std::collections::BTreeSet;

///
/// Schema
///
/// The full introspected model. Tables keep the driver-reported order so the
/// output tree is stable for a given database; every derived lookup uses
/// ordered collections, never hash iteration.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Schema {
    pub tables: Vec<Table>,
}

impl Schema {
    #[must_use]
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }

    /// Tables that generate first-class entities (everything but join tables).
    pub fn entity_tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter().filter(|t| !t.is_join_table)
    }

    /// Every semantic type used by at least one column in the schema.
    /// Drives type-conditional import aggregation.
    #[must_use]
    pub fn semantics_in_use(&self) -> Vec<Semantic> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for table in &self.tables {
            for column in &table.columns {
                // Enum payloads differ per column; key on the debug form.
                if seen.insert(format!("{:?}", column.semantic)) {
                    out.push(column.semantic.clone());
                }
            }
        }

        out
    }

    /// Validate referential consistency and compute the derived flags.
    /// A schema that does not pass is unusable for generation.
    pub fn finalize(mut self) -> Result<Self, Error> {
        validate_schema(&self).map_err(Error::Consistency)?;

        for table in &mut self.tables {
            table.is_join_table = table.detect_join_table();
        }

        Ok(self)
    }
}
