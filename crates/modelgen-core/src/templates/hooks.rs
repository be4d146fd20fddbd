use crate::render::GenerationContext;
use std::fmt::Write;

/// Lifecycle hook points and the per-entity registration surface. The
/// registry lives in the generated output, never in the generator.
pub(crate) fn render(ctx: &GenerationContext<'_>) -> Result<String, String> {
    // views have no mutations, so nothing to hook
    if ctx.table.is_view {
        return Ok(String::new());
    }

    let mut out = String::new();
    let entity = &ctx.alias.exported_singular;
    let internal = &ctx.alias.internal_singular;
    let registry = format!("{}_HOOKS", internal.to_uppercase());

    let _ = writeln!(out, "/// Lifecycle points around `{entity}` mutations.");
    let _ = writeln!(out, "#[derive(Clone, Copy, Debug, Eq, PartialEq)]");
    let _ = writeln!(out, "pub enum {entity}Hook {{");
    for point in [
        "BeforeInsert",
        "AfterInsert",
        "BeforeUpdate",
        "AfterUpdate",
        "BeforeDelete",
        "AfterDelete",
    ] {
        let _ = writeln!(out, "    {point},");
    }
    let _ = writeln!(out, "}}");
    out.push('\n');

    let _ = writeln!(
        out,
        "pub type {entity}HookFn = fn(&mut {entity}) -> Result<(), HookError>;"
    );
    out.push('\n');

    let _ = writeln!(
        out,
        "static {registry}: OnceLock<Mutex<Vec<({entity}Hook, {entity}HookFn)>>> = OnceLock::new();"
    );
    out.push('\n');

    let _ = writeln!(
        out,
        "fn {internal}_hook_registry() -> &'static Mutex<Vec<({entity}Hook, {entity}HookFn)>> {{"
    );
    let _ = writeln!(out, "    {registry}.get_or_init(|| Mutex::new(Vec::new()))");
    let _ = writeln!(out, "}}");
    out.push('\n');

    let _ = writeln!(out, "/// Register `hook` to run at `point`.");
    let _ = writeln!(
        out,
        "pub fn register_{internal}_hook(point: {entity}Hook, hook: {entity}HookFn) {{"
    );
    let _ = writeln!(
        out,
        "    {internal}_hook_registry()"
    );
    let _ = writeln!(
        out,
        "        .lock()"
    );
    let _ = writeln!(
        out,
        "        .expect(\"{internal} hook registry poisoned\")"
    );
    let _ = writeln!(out, "        .push((point, hook));");
    let _ = writeln!(out, "}}");
    out.push('\n');

    let _ = writeln!(
        out,
        "fn run_{internal}_hooks(point: {entity}Hook, entity: &mut {entity}) -> Result<(), HookError> {{"
    );
    let _ = writeln!(
        out,
        "    let hooks = {internal}_hook_registry()"
    );
    let _ = writeln!(
        out,
        "        .lock()"
    );
    let _ = writeln!(
        out,
        "        .expect(\"{internal} hook registry poisoned\")"
    );
    let _ = writeln!(out, "        .clone();");
    let _ = writeln!(out, "    for (registered, hook) in hooks {{");
    let _ = writeln!(out, "        if registered == point {{");
    let _ = writeln!(out, "            hook(entity)?;");
    let _ = writeln!(out, "        }}");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out, "    Ok(())");
    let _ = writeln!(out, "}}");
    out.push('\n');

    Ok(out)
}
