use crate::{Error, inflect};
use convert_case::{Case, Casing};
use modelgen_schema::node::{Schema, Table};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Identifiers that cannot appear bare in generated code.
const RESERVED: &[&str] = &[
    "as", "async", "await", "box", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "static", "struct", "super", "trait", "true", "type",
    "union", "unsafe", "use", "where", "while",
];

///
/// TableAlias
///
/// The four derived naming forms for one table, plus per-column aliases.
/// Built once per run and read-only afterwards.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TableAlias {
    pub exported_singular: String,
    pub exported_plural: String,
    pub internal_singular: String,
    pub internal_plural: String,
    pub columns: BTreeMap<String, ColumnAlias>,
}

impl TableAlias {
    /// Stem used for generated file names; the internal singular already is
    /// the snake form.
    #[must_use]
    pub fn file_stem(&self) -> &str {
        self.internal_singular.trim_end_matches('_')
    }
}

///
/// ColumnAlias
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ColumnAlias {
    pub exported: String,
    pub internal: String,
}

///
/// AliasOverrides
///
/// User-supplied naming, keyed by raw table name. Any subset of the four
/// forms may be given; missing forms derive from the supplied one rather
/// than from the raw name.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct AliasOverrides {
    #[serde(default)]
    pub tables: BTreeMap<String, TableOverride>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TableOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_singular: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_plural: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_singular: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_plural: Option<String>,

    /// Column name → exported form; internal derives from exported.
    #[serde(default)]
    pub columns: BTreeMap<String, String>,
}

///
/// AliasSet
///
/// Aliases for every table in the run, keyed by raw table name. Resolution
/// walks tables in schema order and uses only ordered collections, so equal
/// input always produces byte-identical output.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct AliasSet {
    tables: BTreeMap<String, TableAlias>,
}

impl AliasSet {
    /// Resolve aliases for the whole schema, honoring overrides, and fail on
    /// any exported-singular collision before a single artifact is rendered.
    pub fn resolve(schema: &Schema, overrides: &AliasOverrides) -> Result<Self, Error> {
        let mut tables = BTreeMap::new();
        // exported-singular form → first table that claimed it
        let mut claimed: BTreeMap<String, String> = BTreeMap::new();

        for table in &schema.tables {
            let alias = resolve_table(table, overrides.tables.get(&table.name));

            if let Some(first) = claimed.get(&alias.exported_singular) {
                return Err(Error::AliasCollision {
                    alias: alias.exported_singular,
                    first: first.clone(),
                    second: table.name.clone(),
                });
            }
            claimed.insert(alias.exported_singular.clone(), table.name.clone());

            debug!(table = %table.name, entity = %alias.exported_singular, "resolved alias");
            tables.insert(table.name.clone(), alias);
        }

        Ok(Self { tables })
    }

    #[must_use]
    pub fn get(&self, table: &str) -> Option<&TableAlias> {
        self.tables.get(table)
    }

    /// Alias for a table the schema guarantees to exist.
    #[must_use]
    pub fn expect(&self, table: &str) -> &TableAlias {
        self.tables
            .get(table)
            .unwrap_or_else(|| panic!("alias missing for table '{table}' after resolution"))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TableAlias)> {
        self.tables.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn resolve_table(table: &Table, user: Option<&TableOverride>) -> TableAlias {
    // The seed: an explicit override wins, otherwise the raw name. Partial
    // overrides re-derive the missing forms from the supplied form, never
    // from the raw name. Inflection runs on the normalized snake form so a
    // Pascal-cased override still singularizes.
    let (seed, seed_is_plural) = user
        .and_then(|o| {
            o.exported_singular
                .clone()
                .map(|s| (s, false))
                .or_else(|| o.exported_plural.clone().map(|s| (s, true)))
                .or_else(|| o.internal_singular.clone().map(|s| (s, false)))
                .or_else(|| o.internal_plural.clone().map(|s| (s, true)))
        })
        .unwrap_or_else(|| (table.name.clone(), true));

    let snake = sanitize(&seed).to_case(Case::Snake);
    let singular = if seed_is_plural {
        inflect::singularize(&snake)
    } else {
        snake
    };
    let plural = inflect::pluralize(&singular);

    let exported_singular = user
        .and_then(|o| o.exported_singular.clone())
        .unwrap_or_else(|| singular.to_case(Case::Pascal));
    let exported_plural = user
        .and_then(|o| o.exported_plural.clone())
        .unwrap_or_else(|| plural.to_case(Case::Pascal));
    let internal_singular = user
        .and_then(|o| o.internal_singular.clone())
        .unwrap_or_else(|| internal_form(&singular));
    let internal_plural = user
        .and_then(|o| o.internal_plural.clone())
        .unwrap_or_else(|| internal_form(&plural));

    let columns = table
        .columns
        .iter()
        .map(|column| {
            let exported = user
                .and_then(|o| o.columns.get(&column.name))
                .cloned()
                .unwrap_or_else(|| sanitize(&column.name).to_case(Case::Pascal));

            let internal = internal_form(&exported);

            (column.name.clone(), ColumnAlias { exported, internal })
        })
        .collect();

    TableAlias {
        exported_singular,
        exported_plural,
        internal_singular,
        internal_plural,
        columns,
    }
}

/// Internal (snake) form with the reserved-word guard. Internal forms land
/// in field, function, and module position in generated code.
fn internal_form(raw: &str) -> String {
    let snake = raw.to_case(Case::Snake);
    if RESERVED.contains(&snake.as_str()) {
        format!("{snake}_")
    } else {
        snake
    }
}

/// Strip characters that cannot appear in an identifier and guard against a
/// leading digit. Catalog names allow far more than identifiers do.
fn sanitize(raw: &str) -> String {
    let mut out: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }

    out
}
