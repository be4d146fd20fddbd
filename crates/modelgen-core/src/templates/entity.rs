use super::{column_type, enum_type_name, enum_variant_name};
use crate::config::TagCasing;
use crate::render::GenerationContext;
use modelgen_schema::types::Semantic;
use std::fmt::Write;

/// Entity declaration: enum types used by the table, the struct itself, the
/// column-name constants, and a Display impl over the primary key.
pub(crate) fn render(ctx: &GenerationContext<'_>) -> Result<String, String> {
    let mut out = String::new();
    let table = ctx.table;
    let alias = ctx.alias;
    let entity = &alias.exported_singular;

    render_enums(ctx, &mut out);

    let _ = writeln!(out, "/// Entity for table `{}`.", table.name);
    if table.is_view {
        let _ = writeln!(out, "///");
        let _ = writeln!(out, "/// Backed by a view; mutation functions are not generated.");
    }

    let mut derives = vec!["Clone", "Debug", "Deserialize", "PartialEq", "Serialize"];
    for tag in ctx.tags {
        if !derives.contains(&tag.as_str()) {
            derives.push(tag.as_str());
        }
    }
    let _ = writeln!(out, "#[derive({})]", derives.join(", "));
    if ctx.tag_casing == TagCasing::Camel {
        let _ = writeln!(out, "#[serde(rename_all = \"camelCase\")]");
    }

    let _ = writeln!(out, "pub struct {entity} {{");
    for column in &table.columns {
        let field = &alias.columns[&column.name];
        if table.is_pk_column(&column.name) {
            let _ = writeln!(out, "    /// Primary key.");
        }
        // keep the annotation aligned with the catalog name when the field
        // needed a guard (reserved word, sanitized character)
        if ctx.tag_casing == TagCasing::Snake && field.internal != column.name {
            let _ = writeln!(out, "    #[serde(rename = \"{}\")]", column.name);
        }
        let _ = writeln!(out, "    pub {}: {},", field.internal, column_type(column));
    }
    let _ = writeln!(out, "}}");
    out.push('\n');

    let _ = writeln!(out, "impl {entity} {{");
    let _ = writeln!(out, "    pub const TABLE: &'static str = \"{}\";", table.name);
    let columns = table
        .columns
        .iter()
        .map(|c| format!("\"{}\"", c.name))
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(
        out,
        "    pub const COLUMNS: &'static [&'static str] = &[{columns}];"
    );
    let _ = writeln!(out, "}}");
    out.push('\n');

    render_display(ctx, &mut out);

    Ok(out)
}

fn render_enums(ctx: &GenerationContext<'_>, out: &mut String) {
    for column in &ctx.table.columns {
        let Semantic::Enum { name, variants } = &column.semantic else {
            continue;
        };

        let type_name = enum_type_name(name);
        let _ = writeln!(
            out,
            "/// Values of the `{name}` enum type (column `{}`).",
            column.name
        );
        let _ = writeln!(
            out,
            "#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]"
        );
        let _ = writeln!(out, "pub enum {type_name} {{");
        for variant in variants {
            let _ = writeln!(out, "    #[serde(rename = \"{variant}\")]");
            let _ = writeln!(out, "    {},", enum_variant_name(variant));
        }
        let _ = writeln!(out, "}}");
        out.push('\n');
    }
}

fn render_display(ctx: &GenerationContext<'_>, out: &mut String) {
    let entity = &ctx.alias.exported_singular;

    let _ = writeln!(out, "impl fmt::Display for {entity} {{");
    let _ = writeln!(
        out,
        "    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {{"
    );

    let pk_fields: Vec<&str> = ctx
        .table
        .pk_columns()
        .iter()
        .map(|c| ctx.alias.columns[&c.name].internal.as_str())
        .collect();

    if pk_fields.is_empty() {
        let _ = writeln!(out, "        write!(f, \"{entity}\")");
    } else {
        let spec = pk_fields
            .iter()
            .map(|f| format!("{f}={{}}"))
            .collect::<Vec<_>>()
            .join(", ");
        let args = pk_fields
            .iter()
            .map(|f| format!("self.{f}"))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "        write!(f, \"{entity}({spec})\", {args})");
    }

    let _ = writeln!(out, "    }}");
    let _ = writeln!(out, "}}");
}
