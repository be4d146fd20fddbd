use super::{column_type, context_arg, context_param, is_filterable, timestamp_columns};
use crate::render::GenerationContext;
use std::fmt::Write;

/// Query builder plus finder and mutation functions for one table.
pub(crate) fn render(ctx: &GenerationContext<'_>) -> Result<String, String> {
    let mut out = String::new();

    render_builder(ctx, &mut out);
    render_finders(ctx, &mut out);
    if !ctx.table.is_view {
        render_mutations(ctx, &mut out);
    }

    Ok(out)
}

fn render_builder(ctx: &GenerationContext<'_>, out: &mut String) {
    let table = ctx.table;
    let alias = ctx.alias;
    let entity = &alias.exported_singular;
    let query = format!("{entity}Query");
    let cparam = context_param(ctx);
    let carg = context_arg(ctx);

    let _ = writeln!(out, "/// Query builder over `{}`.", table.name);
    let _ = writeln!(out, "#[derive(Clone, Debug, Default)]");
    let _ = writeln!(out, "pub struct {query} {{");
    let _ = writeln!(out, "    filters: Vec<Filter>,");
    let _ = writeln!(out, "    order: Vec<Ordering>,");
    let _ = writeln!(out, "    limit: Option<u64>,");
    let _ = writeln!(out, "    offset: Option<u64>,");
    let _ = writeln!(out, "}}");
    out.push('\n');

    let _ = writeln!(out, "impl {query} {{");
    let _ = writeln!(out, "    #[must_use]");
    let _ = writeln!(out, "    pub fn new() -> Self {{");
    let _ = writeln!(out, "        Self::default()");
    let _ = writeln!(out, "    }}");

    for column in &table.columns {
        if !is_filterable(column) {
            continue;
        }
        let field = &alias.columns[&column.name];
        let _ = writeln!(out);
        let _ = writeln!(out, "    #[must_use]");
        let _ = writeln!(
            out,
            "    pub fn filter_{}(mut self, value: {}) -> Self {{",
            field.internal,
            column_type(column)
        );
        let _ = writeln!(
            out,
            "        self.filters.push(Filter::eq(\"{}\", value.into()));",
            column.name
        );
        let _ = writeln!(out, "        self");
        let _ = writeln!(out, "    }}");
    }

    for column in &table.columns {
        if !column.semantic.supports_ord() {
            continue;
        }
        let field = &alias.columns[&column.name];
        let _ = writeln!(out);
        let _ = writeln!(out, "    #[must_use]");
        let _ = writeln!(
            out,
            "    pub fn order_by_{}(mut self, direction: Direction) -> Self {{",
            field.internal
        );
        let _ = writeln!(
            out,
            "        self.order.push(Ordering {{ column: \"{}\", direction }});",
            column.name
        );
        let _ = writeln!(out, "        self");
        let _ = writeln!(out, "    }}");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "    #[must_use]");
    let _ = writeln!(out, "    pub const fn limit(mut self, limit: u64) -> Self {{");
    let _ = writeln!(out, "        self.limit = Some(limit);");
    let _ = writeln!(out, "        self");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out);
    let _ = writeln!(out, "    #[must_use]");
    let _ = writeln!(out, "    pub const fn offset(mut self, offset: u64) -> Self {{");
    let _ = writeln!(out, "        self.offset = Some(offset);");
    let _ = writeln!(out, "        self");
    let _ = writeln!(out, "    }}");

    let _ = writeln!(out);
    let _ = writeln!(out, "    fn select(&self) -> Select<'_> {{");
    let _ = writeln!(out, "        Select {{");
    let _ = writeln!(out, "            table: {entity}::TABLE,");
    let _ = writeln!(out, "            columns: {entity}::COLUMNS,");
    let _ = writeln!(out, "            filters: &self.filters,");
    let _ = writeln!(out, "            order: &self.order,");
    let _ = writeln!(out, "            limit: self.limit,");
    let _ = writeln!(out, "            offset: self.offset,");
    let _ = writeln!(out, "        }}");
    let _ = writeln!(out, "    }}");

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "    pub fn all(&self, {cparam}conn: &mut dyn Connection) -> Result<Vec<{entity}>, QueryError> {{"
    );
    let _ = writeln!(out, "        let rows = conn.select({carg}self.select())?;");
    let _ = writeln!(out, "        rows.into_iter().map({entity}::from_row).collect()");
    let _ = writeln!(out, "    }}");

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "    pub fn one(mut self, {cparam}conn: &mut dyn Connection) -> Result<Option<{entity}>, QueryError> {{"
    );
    let _ = writeln!(out, "        self.limit = Some(1);");
    let _ = writeln!(out, "        Ok(self.all({carg}conn)?.into_iter().next())");
    let _ = writeln!(out, "    }}");

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "    pub fn count(&self, {cparam}conn: &mut dyn Connection) -> Result<u64, QueryError> {{"
    );
    let _ = writeln!(out, "        conn.count({carg}self.select())");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out, "}}");
    out.push('\n');
}

fn render_finders(ctx: &GenerationContext<'_>, out: &mut String) {
    let alias = ctx.alias;
    let entity = &alias.exported_singular;
    let query = format!("{entity}Query");
    let cparam = context_param(ctx);
    let carg = context_arg(ctx);

    let _ = writeln!(out, "impl {entity} {{");
    let _ = writeln!(out, "    #[must_use]");
    let _ = writeln!(out, "    pub fn query() -> {query} {{");
    let _ = writeln!(out, "        {query}::new()");
    let _ = writeln!(out, "    }}");

    // keyed lookup when every key column has an equality filter
    let pk_columns = ctx.table.pk_columns();
    if !pk_columns.is_empty() && pk_columns.iter().all(|&c| is_filterable(c)) {
        let params = pk_columns
            .iter()
            .map(|&c| format!("{}: {}", alias.columns[&c.name].internal, column_type(c)))
            .collect::<Vec<_>>()
            .join(", ");

        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "    pub fn find({cparam}conn: &mut dyn Connection, {params}) -> Result<Option<Self>, QueryError> {{"
        );
        let mut chain = format!("{query}::new()");
        for column in &pk_columns {
            let field = &alias.columns[&column.name].internal;
            chain.push_str(&format!(".filter_{field}({field})"));
        }
        let _ = writeln!(out, "        {chain}.one({carg}conn)");
        let _ = writeln!(out, "    }}");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "    fn from_row(row: serde_json::Value) -> Result<Self, QueryError> {{");
    let _ = writeln!(out, "        serde_json::from_value(row).map_err(QueryError::decode)");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out, "}}");
    out.push('\n');
}

fn render_mutations(ctx: &GenerationContext<'_>, out: &mut String) {
    let table = ctx.table;
    let alias = ctx.alias;
    let entity = &alias.exported_singular;
    let internal = &alias.internal_singular;
    let cparam = context_param(ctx);
    let carg = context_arg(ctx);
    let (created, updated) = timestamp_columns(ctx);
    let hooks = ctx.features.hooks;

    let pk_filter = |out: &mut String| {
        for column in table.pk_columns() {
            let field = &alias.columns[&column.name].internal;
            let _ = writeln!(
                out,
                "            Filter::eq(\"{}\", self.{field}.clone().into()),",
                column.name
            );
        }
    };

    let _ = writeln!(out, "impl {entity} {{");

    // insert
    let _ = writeln!(
        out,
        "    pub fn insert(&mut self, {cparam}conn: &mut dyn Connection) -> Result<(), QueryError> {{"
    );
    if hooks {
        let _ = writeln!(
            out,
            "        run_{internal}_hooks({entity}Hook::BeforeInsert, self)?;"
        );
    }
    if created.is_some() || updated.is_some() {
        let _ = writeln!(out, "        let now = Utc::now();");
        if let Some(column) = created {
            write_stamp(out, &alias.columns[&column.name].internal, column.nullable);
        }
        if let Some(column) = updated {
            write_stamp(out, &alias.columns[&column.name].internal, column.nullable);
        }
    }
    let _ = writeln!(
        out,
        "        let row = serde_json::to_value(&*self).map_err(QueryError::encode)?;"
    );
    let _ = writeln!(out, "        conn.insert({carg}Self::TABLE, row)?;");
    if hooks {
        let _ = writeln!(
            out,
            "        run_{internal}_hooks({entity}Hook::AfterInsert, self)?;"
        );
    }
    let _ = writeln!(out, "        Ok(())");
    let _ = writeln!(out, "    }}");

    // update and delete need a primary key to address the row
    if table.primary_key.is_some() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "    pub fn update(&mut self, {cparam}conn: &mut dyn Connection) -> Result<(), QueryError> {{"
        );
        if hooks {
            let _ = writeln!(
                out,
                "        run_{internal}_hooks({entity}Hook::BeforeUpdate, self)?;"
            );
        }
        if let Some(column) = updated {
            let _ = writeln!(out, "        let now = Utc::now();");
            write_stamp(out, &alias.columns[&column.name].internal, column.nullable);
        }
        let _ = writeln!(
            out,
            "        let row = serde_json::to_value(&*self).map_err(QueryError::encode)?;"
        );
        let _ = writeln!(out, "        let by = [");
        pk_filter(out);
        let _ = writeln!(out, "        ];");
        let _ = writeln!(out, "        conn.update({carg}Self::TABLE, &by, row)?;");
        if hooks {
            let _ = writeln!(
                out,
                "        run_{internal}_hooks({entity}Hook::AfterUpdate, self)?;"
            );
        }
        let _ = writeln!(out, "        Ok(())");
        let _ = writeln!(out, "    }}");

        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "    pub fn delete(mut self, {cparam}conn: &mut dyn Connection) -> Result<(), QueryError> {{"
        );
        if hooks {
            let _ = writeln!(
                out,
                "        run_{internal}_hooks({entity}Hook::BeforeDelete, &mut self)?;"
            );
        }
        let _ = writeln!(out, "        let by = [");
        pk_filter(out);
        let _ = writeln!(out, "        ];");
        let _ = writeln!(out, "        conn.delete({carg}Self::TABLE, &by)?;");
        if hooks {
            let _ = writeln!(
                out,
                "        run_{internal}_hooks({entity}Hook::AfterDelete, &mut self)?;"
            );
        }
        let _ = writeln!(out, "        Ok(())");
        let _ = writeln!(out, "    }}");
    }

    let _ = writeln!(out, "}}");
    out.push('\n');
}

fn write_stamp(out: &mut String, field: &str, nullable: bool) {
    if nullable {
        let _ = writeln!(out, "        self.{field} = Some(now);");
    } else {
        let _ = writeln!(out, "        self.{field} = now;");
    }
}
