use modelgen_schema::node::Table;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

///
/// ImportSet
///
/// One file's worth of `use` entries, split standard/third-party. Ordered
/// sets keep rendering lexicographic and collapse duplicates silently, so a
/// user override repeating an automatic entry is never an error.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ImportSet {
    pub standard: BTreeSet<String>,
    pub third_party: BTreeSet<String>,
}

impl ImportSet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.standard.is_empty() && self.third_party.is_empty()
    }

    pub fn add_standard(&mut self, entry: impl Into<String>) {
        self.standard.insert(entry.into());
    }

    pub fn add_third_party(&mut self, entry: impl Into<String>) {
        self.third_party.insert(entry.into());
    }

    pub fn merge(&mut self, other: &Self) {
        self.standard.extend(other.standard.iter().cloned());
        self.third_party.extend(other.third_party.iter().cloned());
    }

    /// Render the import block: standard group first, then third-party,
    /// groups separated by a blank line. Empty set renders nothing.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();

        for entry in &self.standard {
            let _ = writeln!(out, "use {entry};");
        }
        if !self.standard.is_empty() && !self.third_party.is_empty() {
            out.push('\n');
        }
        for entry in &self.third_party {
            let _ = writeln!(out, "use {entry};");
        }

        out
    }
}

///
/// ImportCollection
///
/// The run-level union, accumulated from every rendered artifact and
/// finalized before any output is written. Singleton artifacts that mention
/// every codec in use (the helpers file) render from this, which is why the
/// collection must be complete before they run.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ImportCollection {
    pub main: ImportSet,
    pub test: ImportSet,
}

impl ImportCollection {
    pub fn merge_main(&mut self, set: &ImportSet) {
        self.main.merge(set);
    }

    pub fn merge_test(&mut self, set: &ImportSet) {
        self.test.merge(set);
    }
}

///
/// ImportOverrides
///
/// User-supplied additions. Merged after automatic derivation; nothing a
/// user asked for is ever dropped, and explicit duplicates collapse to one
/// entry without error.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ImportOverrides {
    /// Added to every main artifact.
    #[serde(default)]
    pub all: OverrideSet,

    /// Added to every test artifact.
    #[serde(default)]
    pub test: OverrideSet,

    /// Semantic type key → third-party entries, added wherever a column of
    /// that type appears.
    #[serde(default)]
    pub based_on_type: BTreeMap<String, Vec<String>>,

    /// Added to the singleton test harness.
    #[serde(default)]
    pub test_main: Vec<String>,

    /// Added to the singleton test harness.
    #[serde(default)]
    pub test_singleton: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct OverrideSet {
    #[serde(default)]
    pub standard: Vec<String>,

    #[serde(default)]
    pub third_party: Vec<String>,
}

impl ImportOverrides {
    /// Entries for the singleton test harness. Several configuration keys
    /// historically fed this one bucket; the merge order here is fixed and
    /// additive: `based_on_type` never participates (it is strictly
    /// per-type), `test_main` merges before `test_singleton`, and no key
    /// ever replaces another's entries.
    #[must_use]
    pub fn test_singleton_entries(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        out.extend(self.test_main.iter().cloned());
        out.extend(self.test_singleton.iter().cloned());
        out
    }

    pub(crate) fn apply_main(&self, set: &mut ImportSet) {
        set.standard.extend(self.all.standard.iter().cloned());
        set.third_party.extend(self.all.third_party.iter().cloned());
    }

    pub(crate) fn apply_test(&self, set: &mut ImportSet) {
        set.standard.extend(self.test.standard.iter().cloned());
        set.third_party.extend(self.test.third_party.iter().cloned());
    }

    pub(crate) fn apply_type_overrides(&self, table: &Table, set: &mut ImportSet) {
        for column in &table.columns {
            if let Some(extra) = self.based_on_type.get(column.semantic.key()) {
                set.third_party.extend(extra.iter().cloned());
            }
        }
    }
}

/// Third-party entries triggered by the column types actually present on a
/// table. Anything unused by every table never enters any set.
#[must_use]
pub fn type_imports(table: &Table) -> ImportSet {
    let mut set = ImportSet::default();
    for column in &table.columns {
        if let Some(entry) = column.semantic.third_party_import() {
            set.add_third_party(entry);
        }
    }

    set
}
