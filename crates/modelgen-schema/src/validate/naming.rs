use crate::{MAX_COLUMN_NAME_LEN, MAX_TABLE_NAME_LEN, node::Schema, prelude::*};
use std::collections::BTreeMap;

pub fn validate_naming(schema: &Schema, errs: &mut ErrorTree) {
    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();

    for table in &schema.tables {
        if table.name.is_empty() {
            err!(errs, "driver reported a table with an empty name");
            continue;
        }
        if table.name.len() > MAX_TABLE_NAME_LEN {
            err!(
                errs,
                "table '{}' exceeds the {MAX_TABLE_NAME_LEN} character name limit",
                table.name
            );
        }

        *seen.entry(table.name.as_str()).or_insert(0) += 1;

        validate_column_naming(table, errs);
    }

    for (name, count) in seen {
        if count > 1 {
            err!(errs, "table '{name}' reported {count} times by the driver");
        }
    }
}

fn validate_column_naming(table: &Table, errs: &mut ErrorTree) {
    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();

    if table.columns.is_empty() {
        err!(errs, "table '{}' has no columns", table.name);
    }

    for column in &table.columns {
        if column.name.is_empty() {
            err!(errs, "table '{}' has a column with an empty name", table.name);
            continue;
        }
        if column.name.len() > MAX_COLUMN_NAME_LEN {
            err!(
                errs,
                "column '{}.{}' exceeds the {MAX_COLUMN_NAME_LEN} character name limit",
                table.name,
                column.name
            );
        }

        *seen.entry(column.name.as_str()).or_insert(0) += 1;
    }

    for (name, count) in seen {
        if count > 1 {
            err!(
                errs,
                "column '{name}' reported {count} times on table '{}'",
                table.name
            );
        }
    }
}
