use super::{column_type, context_arg, context_param};
use crate::render::GenerationContext;
use modelgen_schema::relationship::{
    ToManyRelationship, to_many_relationships, to_one_relationships,
};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Relationship accessors: to-one from this table's own foreign keys,
/// to-many (and many-to-many through join tables) from keys elsewhere in
/// the schema referencing this table.
pub(crate) fn render(ctx: &GenerationContext<'_>) -> Result<String, String> {
    let to_one = to_one_relationships(ctx.table);
    let to_many = to_many_relationships(ctx.table, ctx.schema);
    if to_one.is_empty() && to_many.is_empty() {
        return Ok(String::new());
    }

    let mut out = String::new();
    let entity = &ctx.alias.exported_singular;
    let cparam = context_param(ctx);
    let carg = context_arg(ctx);

    let _ = writeln!(out, "impl {entity} {{");
    let mut first = true;
    let mut separate = |out: &mut String| {
        if !first {
            let _ = writeln!(out);
        }
        first = false;
    };

    for rel in &to_one {
        let target = ctx
            .aliases
            .get(&rel.foreign_table)
            .ok_or_else(|| format!("no alias resolved for table '{}'", rel.foreign_table))?;
        let local_field = &ctx.alias.columns[&rel.local_column].internal;
        let accessor = to_one_accessor(&rel.local_column, &target.internal_singular);
        let target_entity = &target.exported_singular;
        let filter = filter_name(ctx, &rel.foreign_table, &rel.foreign_column)?;

        separate(&mut out);
        let _ = writeln!(
            out,
            "    /// The `{}` row referenced by `{}`.",
            rel.foreign_table, rel.local_column
        );
        let _ = writeln!(
            out,
            "    pub fn {accessor}(&self, {cparam}conn: &mut dyn Connection) -> Result<Option<{target_entity}>, QueryError> {{"
        );
        if rel.nullable {
            let _ = writeln!(out, "        let Some(key) = self.{local_field}.clone() else {{");
            let _ = writeln!(out, "            return Ok(None);");
            let _ = writeln!(out, "        }};");
            let _ = writeln!(
                out,
                "        {target_entity}Query::new().filter_{filter}(key).one({carg}conn)"
            );
        } else {
            let _ = writeln!(
                out,
                "        {target_entity}Query::new().filter_{filter}(self.{local_field}.clone()).one({carg}conn)"
            );
        }
        let _ = writeln!(out, "    }}");
    }

    let accessors = to_many_accessors(ctx, &to_many)?;
    for (rel, accessor) in to_many.iter().zip(accessors) {
        separate(&mut out);
        if rel.through.is_some() {
            render_many_to_many(ctx, rel, &accessor, &mut out)?;
        } else {
            render_to_many(ctx, rel, &accessor, &mut out)?;
        }
    }

    let _ = writeln!(out, "}}");
    out.push('\n');

    Ok(out)
}

fn render_to_many(
    ctx: &GenerationContext<'_>,
    rel: &ToManyRelationship,
    accessor: &str,
    out: &mut String,
) -> Result<(), String> {
    let referencing = ctx
        .aliases
        .get(&rel.foreign_table)
        .ok_or_else(|| format!("no alias resolved for table '{}'", rel.foreign_table))?;
    let local_field = &ctx.alias.columns[&rel.local_column].internal;
    let target_entity = &referencing.exported_singular;
    let filter = filter_name(ctx, &rel.foreign_table, &rel.foreign_column)?;
    let cparam = context_param(ctx);
    let carg = context_arg(ctx);

    let _ = writeln!(
        out,
        "    /// `{}` rows referencing this row through `{}`.",
        rel.foreign_table, rel.foreign_column
    );
    let _ = writeln!(
        out,
        "    pub fn {accessor}(&self, {cparam}conn: &mut dyn Connection) -> Result<Vec<{target_entity}>, QueryError> {{"
    );
    let _ = writeln!(
        out,
        "        {target_entity}Query::new().filter_{filter}(self.{local_field}.clone()).all({carg}conn)"
    );
    let _ = writeln!(out, "    }}");

    Ok(())
}

/// Many-to-many goes through the join table with a raw select; join tables
/// have no generated entity to lean on.
fn render_many_to_many(
    ctx: &GenerationContext<'_>,
    rel: &ToManyRelationship,
    accessor: &str,
    out: &mut String,
) -> Result<(), String> {
    let through = rel.through.as_ref().expect("caller checked through");
    let target = ctx
        .aliases
        .get(&through.target_table)
        .ok_or_else(|| format!("no alias resolved for table '{}'", through.target_table))?;
    let join_table = ctx
        .schema
        .get_table(&through.join_table)
        .ok_or_else(|| format!("join table '{}' missing from schema", through.join_table))?;
    let link_column = join_table
        .get_column(&through.target_join_column)
        .ok_or_else(|| {
            format!(
                "join table '{}' lost column '{}'",
                through.join_table, through.target_join_column
            )
        })?;

    let local_field = &ctx.alias.columns[&rel.local_column].internal;
    let target_entity = &target.exported_singular;
    let target_filter = filter_name(ctx, &through.target_table, &through.target_column)?;
    let cparam = context_param(ctx);
    let carg = context_arg(ctx);

    let join_columns = join_table
        .columns
        .iter()
        .map(|c| format!("\"{}\"", c.name))
        .collect::<Vec<_>>()
        .join(", ");

    let _ = writeln!(
        out,
        "    /// `{}` rows associated through `{}`.",
        through.target_table, through.join_table
    );
    let _ = writeln!(
        out,
        "    pub fn {accessor}(&self, {cparam}conn: &mut dyn Connection) -> Result<Vec<{target_entity}>, QueryError> {{"
    );
    let _ = writeln!(out, "        #[derive(Deserialize)]");
    let _ = writeln!(out, "        struct Link {{");
    let _ = writeln!(
        out,
        "            {}: {},",
        through.target_join_column,
        column_type(link_column)
    );
    let _ = writeln!(out, "        }}");
    let _ = writeln!(out, "        let links = conn.select({carg}Select {{");
    let _ = writeln!(out, "            table: \"{}\",", through.join_table);
    let _ = writeln!(out, "            columns: &[{join_columns}],");
    let _ = writeln!(
        out,
        "            filters: &[Filter::eq(\"{}\", self.{local_field}.clone().into())],",
        through.source_join_column
    );
    let _ = writeln!(out, "            order: &[],");
    let _ = writeln!(out, "            limit: None,");
    let _ = writeln!(out, "            offset: None,");
    let _ = writeln!(out, "        }})?;");
    let _ = writeln!(out, "        let mut out = Vec::with_capacity(links.len());");
    let _ = writeln!(out, "        for link in links {{");
    let _ = writeln!(
        out,
        "            let link: Link = serde_json::from_value(link).map_err(QueryError::decode)?;"
    );
    let _ = writeln!(
        out,
        "            if let Some(found) = {target_entity}Query::new().filter_{target_filter}(link.{}.clone()).one({carg}conn)? {{",
        through.target_join_column
    );
    let _ = writeln!(out, "                out.push(found);");
    let _ = writeln!(out, "            }}");
    let _ = writeln!(out, "        }}");
    let _ = writeln!(out, "        Ok(out)");
    let _ = writeln!(out, "    }}");

    Ok(())
}

/// Internal field name for the `filter_*` method matching `column` in
/// `table`, mirroring the filter methods emitted by the query template.
fn filter_name(
    ctx: &GenerationContext<'_>,
    table: &str,
    column: &str,
) -> Result<String, String> {
    let alias = ctx
        .aliases
        .get(table)
        .ok_or_else(|| format!("no alias resolved for table '{table}'"))?;
    alias
        .columns
        .get(column)
        .map(|c| c.internal.clone())
        .ok_or_else(|| format!("no alias resolved for column '{column}' in table '{table}'"))
}

/// Accessor name for a to-one association: the key column with its `_id`
/// suffix dropped, falling back to the target's singular name.
fn to_one_accessor(local_column: &str, target_internal: &str) -> String {
    local_column
        .strip_suffix("_id")
        .filter(|stem| !stem.is_empty())
        .map_or_else(|| target_internal.to_string(), ToString::to_string)
}

/// Accessor names for the to-many side, disambiguated when two keys from
/// the same table (or two join tables to the same target) would otherwise
/// produce the same function name.
fn to_many_accessors(
    ctx: &GenerationContext<'_>,
    rels: &[ToManyRelationship],
) -> Result<Vec<String>, String> {
    let mut base_names = Vec::with_capacity(rels.len());
    for rel in rels {
        let alias = ctx
            .aliases
            .get(rel.target_table())
            .ok_or_else(|| format!("no alias resolved for table '{}'", rel.target_table()))?;
        base_names.push(alias.internal_plural.clone());
    }

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for name in &base_names {
        *counts.entry(name.as_str()).or_insert(0) += 1;
    }

    let names = rels
        .iter()
        .zip(&base_names)
        .map(|(rel, base)| {
            if counts[base.as_str()] == 1 {
                base.clone()
            } else if let Some(through) = &rel.through {
                format!("{base}_via_{}", through.join_table)
            } else {
                format!("{base}_by_{}", rel.foreign_column)
            }
        })
        .collect();

    Ok(names)
}
