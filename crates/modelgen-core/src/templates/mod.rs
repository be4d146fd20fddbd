//! Built-in artifact templates.
//!
//! Each template is a pure function from a generation context to source
//! text. The rendering pipeline owns scheduling and file assembly; nothing
//! here touches the filesystem or any mutable state.

mod entity;
mod helpers;
mod hooks;
mod mod_root;
mod query;
mod relations;

use crate::config::TagCasing;
use crate::imports::{ImportSet, type_imports};
use crate::render::{Artifact, GenerationContext, SingletonContext};
use convert_case::{Case, Casing};
use modelgen_schema::node::Column;
use modelgen_schema::types::Semantic;

pub(crate) fn render_table_artifact(
    artifact: Artifact,
    ctx: &GenerationContext<'_>,
) -> Result<String, String> {
    match artifact {
        Artifact::Entity => entity::render(ctx),
        Artifact::Query => query::render(ctx),
        Artifact::Relations => relations::render(ctx),
        Artifact::Hooks => hooks::render(ctx),
        Artifact::TableTests => table_tests::render(ctx),
        Artifact::ModRoot | Artifact::Helpers => {
            Err(format!("'{}' is a singleton artifact", artifact.name()))
        }
    }
}

pub(crate) fn render_singleton(
    artifact: Artifact,
    ctx: &SingletonContext<'_>,
) -> Result<String, String> {
    match artifact {
        Artifact::ModRoot => mod_root::render(ctx),
        Artifact::Helpers => helpers::render(ctx),
        other => Err(format!("'{}' is a per-table artifact", other.name())),
    }
}

pub(crate) fn singleton_file_name(artifact: Artifact) -> &'static str {
    match artifact {
        Artifact::ModRoot => "mod.rs",
        Artifact::Helpers => "helpers.rs",
        _ => unreachable!("per-table artifacts derive file names from aliases"),
    }
}

/// Header stamped at the top of every generated file.
pub(crate) fn file_header(source: &str, pkg_name: &str) -> String {
    format!(
        "// Code generated for module `{pkg_name}` from `{source}`. DO NOT EDIT.\n\
         // Changes will be overwritten on the next generation run.\n"
    )
}

/// The main import block for one table's file: static requirements of the
/// enabled sections plus entries triggered by the column types actually
/// present, plus user additions.
pub(crate) fn main_import_set(ctx: &GenerationContext<'_>) -> ImportSet {
    let mut set = type_imports(ctx.table);

    // entity section
    set.add_standard("std::fmt");
    set.add_third_party("serde::{Deserialize, Serialize}");

    // query section decodes rows through serde documents
    set.add_third_party("serde_json");

    if ctx.features.hooks && !ctx.table.is_view {
        set.add_standard("std::sync::{Mutex, OnceLock}");
    }

    ctx.imports.apply_main(&mut set);
    ctx.imports.apply_type_overrides(ctx.table, &mut set);

    set
}

/// The import block rendered inside one table's test module.
pub(crate) fn test_import_set(ctx: &GenerationContext<'_>) -> ImportSet {
    let mut set = ImportSet::default();
    set.add_third_party("serde_json::json");

    ctx.imports.apply_test(&mut set);

    set
}

/// Crate-internal `use` line binding one table file to the shared helpers.
/// These are module paths inside the generated tree, so they sit outside
/// the standard/third-party import buckets.
pub(crate) fn internal_imports(ctx: &GenerationContext<'_>) -> String {
    let mut names = vec!["Connection", "Filter", "QueryError", "Select"];

    if ctx.table.columns.iter().any(|c| c.semantic.supports_ord()) {
        names.push("Direction");
        names.push("Ordering");
    }
    if ctx.features.context {
        names.push("Context");
    }
    if ctx.features.hooks && !ctx.table.is_view {
        names.push("HookError");
    }
    names.sort_unstable();

    format!("use super::helpers::{{{}}};\n", names.join(", "))
}

/// The Rust type of a column as written in generated code. Enum columns use
/// their generated declaration name rather than the catalog name.
pub(crate) fn column_type(column: &Column) -> String {
    let base = match &column.semantic {
        Semantic::Enum { name, .. } => enum_type_name(name),
        other => other.base_rust_type(),
    };

    if column.nullable {
        format!("Option<{base}>")
    } else {
        base
    }
}

pub(crate) fn enum_type_name(raw: &str) -> String {
    raw.to_case(Case::Pascal)
}

pub(crate) fn enum_variant_name(raw: &str) -> String {
    raw.to_case(Case::Pascal)
}

/// Annotation key for a column under the configured casing policy.
pub(crate) fn annotation_key(internal: &str, casing: TagCasing) -> String {
    match casing {
        TagCasing::Snake => internal.to_string(),
        TagCasing::Camel => internal.to_case(Case::Camel),
    }
}

/// Whether the query template emits an equality filter for this column.
pub(crate) fn is_filterable(column: &Column) -> bool {
    column.semantic.supports_eq()
        && !matches!(column.semantic, Semantic::Enum { .. } | Semantic::Opaque(_))
}

/// First parameter of generated data-access functions when context-passing
/// is enabled.
pub(crate) fn context_param(ctx: &GenerationContext<'_>) -> &'static str {
    if ctx.features.context { "ctx: &Context, " } else { "" }
}

/// Matching argument forwarded to connection calls.
pub(crate) fn context_arg(ctx: &GenerationContext<'_>) -> &'static str {
    if ctx.features.context { "ctx, " } else { "" }
}

/// The automatic timestamp columns present on this table, if the feature
/// applies: `(created_at, updated_at)` as they appear in the schema.
pub(crate) fn timestamp_columns<'a>(
    ctx: &GenerationContext<'a>,
) -> (Option<&'a Column>, Option<&'a Column>) {
    if !ctx.features.timestamps || ctx.table.is_view {
        return (None, None);
    }

    let stamp = |name: &str| {
        ctx.table
            .get_column(name)
            .filter(|c| matches!(c.semantic, Semantic::Timestamp))
    };

    (stamp("created_at"), stamp("updated_at"))
}
