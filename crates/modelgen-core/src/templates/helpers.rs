use super::file_header;
use crate::imports::ImportSet;
use crate::render::SingletonContext;
use modelgen_schema::types::Semantic;
use std::fmt::Write;

/// Shared runtime for the generated tree: the filter value model, the
/// connection trait every generated function drives, and the error types.
/// Renders after per-table aggregation so the value model covers exactly
/// the codec types the schema uses.
pub(crate) fn render(ctx: &SingletonContext<'_>) -> Result<String, String> {
    let semantics = ctx.schema.semantics_in_use();
    let variants = value_variants(&semantics);

    let mut out = file_header("schema", ctx.pkg_name);
    out.push('\n');

    out.push_str(&imports(ctx).render());
    out.push('\n');

    render_value(&variants, &mut out);
    render_filters(&mut out);
    render_connection(ctx, &mut out);
    render_errors(ctx, &mut out);
    if ctx.features.context {
        render_context(&mut out);
    }
    if ctx.features.tests {
        render_harness(ctx, &mut out);
    }

    Ok(out)
}

fn imports(ctx: &SingletonContext<'_>) -> ImportSet {
    let mut set = ImportSet::default();
    set.add_standard("std::fmt");
    if ctx.features.context {
        set.add_standard("std::collections::BTreeMap");
    }
    set.add_third_party("serde_json::Value as JsonValue");

    for semantic in ctx.schema.semantics_in_use() {
        // JsonValue is already in scope for row documents
        if matches!(semantic, Semantic::Json) {
            continue;
        }
        if let Some(entry) = semantic.third_party_import() {
            set.add_third_party(entry);
        }
    }

    set
}

/// `(variant, rust type)` pairs for the filter value enum, driven by the
/// semantic types the schema actually uses.
fn value_variants(semantics: &[Semantic]) -> Vec<(&'static str, String)> {
    let mut variants = vec![
        ("Bool", "bool".to_string()),
        ("Int", "i64".to_string()),
        ("Float", "f64".to_string()),
        ("Text", "String".to_string()),
    ];

    for semantic in semantics {
        let extra = match semantic {
            Semantic::Date => Some(("Date", "NaiveDate".to_string())),
            Semantic::Time => Some(("Time", "NaiveTime".to_string())),
            Semantic::Timestamp => Some(("Timestamp", "DateTime<Utc>".to_string())),
            Semantic::Decimal => Some(("Decimal", "Decimal".to_string())),
            Semantic::Uuid => Some(("Uuid", "Uuid".to_string())),
            Semantic::Json => Some(("Json", "JsonValue".to_string())),
            Semantic::Bytes => Some(("Bytes", "Vec<u8>".to_string())),
            _ => None,
        };
        if let Some(extra) = extra {
            if !variants.iter().any(|(name, _)| *name == extra.0) {
                variants.push(extra);
            }
        }
    }

    variants
}

fn render_value(variants: &[(&'static str, String)], out: &mut String) {
    let _ = writeln!(out, "/// A filter operand, covering every column type in the schema.");
    let _ = writeln!(out, "#[derive(Clone, Debug, PartialEq)]");
    let _ = writeln!(out, "pub enum Value {{");
    let _ = writeln!(out, "    Null,");
    for (name, ty) in variants {
        let _ = writeln!(out, "    {name}({ty}),");
    }
    let _ = writeln!(out, "}}");
    out.push('\n');

    for (name, ty) in variants {
        let _ = writeln!(out, "impl From<{ty}> for Value {{");
        let _ = writeln!(out, "    fn from(value: {ty}) -> Self {{");
        let _ = writeln!(out, "        Self::{name}(value)");
        let _ = writeln!(out, "    }}");
        let _ = writeln!(out, "}}");
        out.push('\n');
    }

    // narrower integers funnel through Int
    for ty in ["i16", "i32"] {
        let _ = writeln!(out, "impl From<{ty}> for Value {{");
        let _ = writeln!(out, "    fn from(value: {ty}) -> Self {{");
        let _ = writeln!(out, "        Self::Int(i64::from(value))");
        let _ = writeln!(out, "    }}");
        let _ = writeln!(out, "}}");
        out.push('\n');
    }

    let _ = writeln!(out, "impl From<f32> for Value {{");
    let _ = writeln!(out, "    fn from(value: f32) -> Self {{");
    let _ = writeln!(out, "        Self::Float(f64::from(value))");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out, "}}");
    out.push('\n');

    let _ = writeln!(out, "impl<T: Into<Value>> From<Option<T>> for Value {{");
    let _ = writeln!(out, "    fn from(value: Option<T>) -> Self {{");
    let _ = writeln!(out, "        value.map_or(Self::Null, Into::into)");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out, "}}");
    out.push('\n');
}

fn render_filters(out: &mut String) {
    let _ = writeln!(out, "/// Sort direction for an ordering clause.");
    let _ = writeln!(out, "#[derive(Clone, Copy, Debug, Eq, PartialEq)]");
    let _ = writeln!(out, "pub enum Direction {{");
    let _ = writeln!(out, "    Asc,");
    let _ = writeln!(out, "    Desc,");
    let _ = writeln!(out, "}}");
    out.push('\n');

    let _ = writeln!(out, "#[derive(Clone, Copy, Debug, Eq, PartialEq)]");
    let _ = writeln!(out, "pub struct Ordering {{");
    let _ = writeln!(out, "    pub column: &'static str,");
    let _ = writeln!(out, "    pub direction: Direction,");
    let _ = writeln!(out, "}}");
    out.push('\n');

    let _ = writeln!(out, "#[derive(Clone, Copy, Debug, Eq, PartialEq)]");
    let _ = writeln!(out, "pub enum Op {{");
    let _ = writeln!(out, "    Eq,");
    let _ = writeln!(out, "}}");
    out.push('\n');

    let _ = writeln!(out, "/// One predicate over a column.");
    let _ = writeln!(out, "#[derive(Clone, Debug, PartialEq)]");
    let _ = writeln!(out, "pub struct Filter {{");
    let _ = writeln!(out, "    pub column: &'static str,");
    let _ = writeln!(out, "    pub op: Op,");
    let _ = writeln!(out, "    pub value: Value,");
    let _ = writeln!(out, "}}");
    out.push('\n');

    let _ = writeln!(out, "impl Filter {{");
    let _ = writeln!(out, "    #[must_use]");
    let _ = writeln!(out, "    pub fn eq(column: &'static str, value: impl Into<Value>) -> Self {{");
    let _ = writeln!(out, "        Self {{ column, op: Op::Eq, value: value.into() }}");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out, "}}");
    out.push('\n');

    let _ = writeln!(out, "/// A fully described read against one table.");
    let _ = writeln!(out, "#[derive(Clone, Debug)]");
    let _ = writeln!(out, "pub struct Select<'a> {{");
    let _ = writeln!(out, "    pub table: &'static str,");
    let _ = writeln!(out, "    pub columns: &'static [&'static str],");
    let _ = writeln!(out, "    pub filters: &'a [Filter],");
    let _ = writeln!(out, "    pub order: &'a [Ordering],");
    let _ = writeln!(out, "    pub limit: Option<u64>,");
    let _ = writeln!(out, "    pub offset: Option<u64>,");
    let _ = writeln!(out, "}}");
    out.push('\n');
}

fn render_connection(ctx: &SingletonContext<'_>, out: &mut String) {
    let cparam = if ctx.features.context { "ctx: &Context, " } else { "" };

    let _ = writeln!(out, "/// Backend boundary: rows travel as self-describing documents so the");
    let _ = writeln!(out, "/// generated layer stays independent of any one database client.");
    let _ = writeln!(out, "pub trait Connection {{");
    let _ = writeln!(
        out,
        "    fn select(&mut self, {cparam}query: Select<'_>) -> Result<Vec<JsonValue>, QueryError>;"
    );
    let _ = writeln!(
        out,
        "    fn count(&mut self, {cparam}query: Select<'_>) -> Result<u64, QueryError>;"
    );
    let _ = writeln!(
        out,
        "    fn insert(&mut self, {cparam}table: &'static str, row: JsonValue) -> Result<(), QueryError>;"
    );
    let _ = writeln!(
        out,
        "    fn update(&mut self, {cparam}table: &'static str, by: &[Filter], row: JsonValue) -> Result<u64, QueryError>;"
    );
    let _ = writeln!(
        out,
        "    fn delete(&mut self, {cparam}table: &'static str, by: &[Filter]) -> Result<u64, QueryError>;"
    );
    let _ = writeln!(out, "}}");
    out.push('\n');
}

fn render_errors(ctx: &SingletonContext<'_>, out: &mut String) {
    let _ = writeln!(out, "/// Failure surfaced by any generated data-access function.");
    let _ = writeln!(out, "#[derive(Debug)]");
    let _ = writeln!(out, "pub struct QueryError {{");
    let _ = writeln!(out, "    message: String,");
    let _ = writeln!(out, "}}");
    out.push('\n');

    let _ = writeln!(out, "impl QueryError {{");
    let _ = writeln!(out, "    #[must_use]");
    let _ = writeln!(out, "    pub fn backend(message: impl Into<String>) -> Self {{");
    let _ = writeln!(out, "        Self {{ message: message.into() }}");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out);
    let _ = writeln!(out, "    pub(crate) fn encode(err: serde_json::Error) -> Self {{");
    let _ = writeln!(out, "        Self {{ message: format!(\"row encoding failed: {{err}}\") }}");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out);
    let _ = writeln!(out, "    pub(crate) fn decode(err: serde_json::Error) -> Self {{");
    let _ = writeln!(out, "        Self {{ message: format!(\"row decoding failed: {{err}}\") }}");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out, "}}");
    out.push('\n');

    let _ = writeln!(out, "impl fmt::Display for QueryError {{");
    let _ = writeln!(out, "    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {{");
    let _ = writeln!(out, "        f.write_str(&self.message)");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out, "}}");
    out.push('\n');

    let _ = writeln!(out, "impl std::error::Error for QueryError {{}}");
    out.push('\n');

    if ctx.features.hooks {
        let _ = writeln!(out, "/// Failure raised by a registered lifecycle hook.");
        let _ = writeln!(out, "#[derive(Debug)]");
        let _ = writeln!(out, "pub struct HookError {{");
        let _ = writeln!(out, "    pub message: String,");
        let _ = writeln!(out, "}}");
        out.push('\n');

        let _ = writeln!(out, "impl fmt::Display for HookError {{");
        let _ = writeln!(out, "    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {{");
        let _ = writeln!(out, "        f.write_str(&self.message)");
        let _ = writeln!(out, "    }}");
        let _ = writeln!(out, "}}");
        out.push('\n');

        let _ = writeln!(out, "impl std::error::Error for HookError {{}}");
        out.push('\n');

        let _ = writeln!(out, "impl From<HookError> for QueryError {{");
        let _ = writeln!(out, "    fn from(err: HookError) -> Self {{");
        let _ = writeln!(out, "        Self {{ message: format!(\"hook failed: {{err}}\") }}");
        let _ = writeln!(out, "    }}");
        let _ = writeln!(out, "}}");
        out.push('\n');
    }
}

fn render_context(out: &mut String) {
    let _ = writeln!(out, "/// Caller-supplied request context threaded through generated calls.");
    let _ = writeln!(out, "#[derive(Clone, Debug, Default)]");
    let _ = writeln!(out, "pub struct Context {{");
    let _ = writeln!(out, "    values: BTreeMap<String, String>,");
    let _ = writeln!(out, "}}");
    out.push('\n');

    let _ = writeln!(out, "impl Context {{");
    let _ = writeln!(out, "    #[must_use]");
    let _ = writeln!(out, "    pub fn new() -> Self {{");
    let _ = writeln!(out, "        Self::default()");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out);
    let _ = writeln!(out, "    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {{");
    let _ = writeln!(out, "        self.values.insert(key.into(), value.into());");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out);
    let _ = writeln!(out, "    #[must_use]");
    let _ = writeln!(out, "    pub fn get(&self, key: &str) -> Option<&str> {{");
    let _ = writeln!(out, "        self.values.get(key).map(String::as_str)");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out, "}}");
    out.push('\n');
}

fn render_harness(ctx: &SingletonContext<'_>, out: &mut String) {
    let _ = writeln!(out, "#[cfg(test)]");
    let _ = writeln!(out, "mod tests {{");
    let _ = writeln!(out, "    use super::*;");
    for entry in ctx.imports.test_singleton_entries() {
        let _ = writeln!(out, "    use {entry};");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "    #[test]");
    let _ = writeln!(out, "    fn filters_capture_column_and_value() {{");
    let _ = writeln!(out, "        let filter = Filter::eq(\"id\", 7_i64);");
    let _ = writeln!(out, "        assert_eq!(filter.column, \"id\");");
    let _ = writeln!(out, "        assert_eq!(filter.value, Value::Int(7));");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out);
    let _ = writeln!(out, "    #[test]");
    let _ = writeln!(out, "    fn missing_values_filter_as_null() {{");
    let _ = writeln!(out, "        let value: Value = Option::<i64>::None.into();");
    let _ = writeln!(out, "        assert_eq!(value, Value::Null);");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out, "}}");
}
