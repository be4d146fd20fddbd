use super::file_header;
use crate::render::SingletonContext;
use std::fmt::Write;

/// Module root: declares one module per entity table plus the shared
/// helpers, and re-exports the entity and query types.
pub(crate) fn render(ctx: &SingletonContext<'_>) -> Result<String, String> {
    let mut out = file_header("schema", ctx.pkg_name);
    out.push('\n');

    let _ = writeln!(out, "//! Data-access layer for module `{}`.", ctx.pkg_name);
    out.push('\n');

    // aliases iterate in table-name order; module order is stable
    let mut stems: Vec<(String, String)> = Vec::new();
    for (table, alias) in ctx.aliases.iter() {
        let Some(table) = ctx.schema.get_table(table) else {
            return Err(format!("alias resolved for unknown table '{table}'"));
        };
        if table.is_join_table {
            continue;
        }
        stems.push((alias.file_stem().to_string(), alias.exported_singular.clone()));
    }
    stems.sort();

    let _ = writeln!(out, "pub mod helpers;");
    for (stem, _) in &stems {
        let _ = writeln!(out, "pub mod {stem};");
    }
    out.push('\n');

    let mut helper_exports = vec!["Connection", "Direction", "Filter", "Ordering", "QueryError", "Select", "Value"];
    if ctx.features.context {
        helper_exports.push("Context");
    }
    if ctx.features.hooks {
        helper_exports.push("HookError");
    }
    helper_exports.sort_unstable();
    let _ = writeln!(
        out,
        "pub use self::helpers::{{{}}};",
        helper_exports.join(", ")
    );

    for (stem, entity) in &stems {
        let _ = writeln!(out, "pub use self::{stem}::{{{entity}, {entity}Query}};");
    }

    Ok(out)
}
