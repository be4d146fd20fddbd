use crate::{
    Error,
    alias::{AliasSet, TableAlias},
    config::{Config, Features, TagCasing},
    imports::{ImportCollection, ImportSet},
    templates,
};
use modelgen_schema::node::{Schema, Table};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

///
/// Artifact
///
/// Every named template in a run. Per-table artifacts render once per
/// entity table; singletons render once per run, after the import
/// collection has been finalized.
///

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[remain::sorted]
pub enum Artifact {
    Entity,
    Helpers,
    Hooks,
    ModRoot,
    Query,
    Relations,
    TableTests,
}

impl Artifact {
    pub const PER_TABLE: &'static [Self] = &[
        Self::Entity,
        Self::Query,
        Self::Relations,
        Self::Hooks,
        Self::TableTests,
    ];

    pub const SINGLETONS: &'static [Self] = &[Self::ModRoot, Self::Helpers];

    /// Stable name used by template replacement overrides.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::Helpers => "helpers",
            Self::Hooks => "hooks",
            Self::ModRoot => "mod",
            Self::Query => "query",
            Self::Relations => "relations",
            Self::TableTests => "tests",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        [Self::PER_TABLE, Self::SINGLETONS]
            .concat()
            .into_iter()
            .find(|a| a.name() == name)
    }

    /// Whether this artifact renders at all under the given flags. Views
    /// additionally drop their hook section at the template level.
    #[must_use]
    pub const fn enabled(self, features: Features) -> bool {
        match self {
            Self::Hooks => features.hooks,
            Self::TableTests => features.tests,
            _ => true,
        }
    }
}

///
/// GenerationContext
///
/// The immutable bundle handed to one per-table template invocation.
/// Created per table, discarded after rendering; templates never see
/// anything mutable.
///

#[derive(Clone, Copy, Debug)]
pub struct GenerationContext<'a> {
    pub table: &'a Table,
    pub alias: &'a TableAlias,
    pub aliases: &'a AliasSet,
    pub schema: &'a Schema,
    pub features: Features,
    pub pkg_name: &'a str,
    pub tag_casing: TagCasing,
    pub tags: &'a [String],
    pub imports: &'a crate::imports::ImportOverrides,
}

///
/// SingletonContext
///
/// Run-level counterpart for singleton artifacts. Carries the finalized
/// import collection so the helpers file can mention every codec in use.
///

#[derive(Clone, Copy, Debug)]
pub struct SingletonContext<'a> {
    pub schema: &'a Schema,
    pub aliases: &'a AliasSet,
    pub features: Features,
    pub pkg_name: &'a str,
    pub collection: &'a ImportCollection,
    pub imports: &'a crate::imports::ImportOverrides,
}

pub type TableTemplateFn = fn(&GenerationContext<'_>) -> Result<String, String>;
pub type SingletonTemplateFn = fn(&SingletonContext<'_>) -> Result<String, String>;

#[derive(Debug)]
enum Replacement {
    /// Static text standing in for the template, used verbatim.
    Verbatim(String),
    Table(TableTemplateFn),
    Singleton(SingletonTemplateFn),
}

///
/// Registry
///
/// Maps artifacts to template functions, with user replacements layered on
/// top of the built-ins.
///

#[derive(Debug, Default)]
pub struct Registry {
    replacements: BTreeMap<&'static str, Replacement>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a named artifact with fixed text (the CLI's `--replace`).
    pub fn replace_with_text(
        &mut self,
        artifact: &str,
        text: impl Into<String>,
    ) -> Result<(), Error> {
        let artifact = Self::known(artifact)?;
        self.replacements
            .insert(artifact.name(), Replacement::Verbatim(text.into()));
        Ok(())
    }

    /// Replace a per-table artifact with an alternate template function.
    pub fn replace_with_fn(&mut self, artifact: &str, f: TableTemplateFn) -> Result<(), Error> {
        let artifact = Self::known(artifact)?;
        self.replacements
            .insert(artifact.name(), Replacement::Table(f));
        Ok(())
    }

    /// Replace a singleton artifact with an alternate template function.
    pub fn replace_singleton_with_fn(
        &mut self,
        artifact: &str,
        f: SingletonTemplateFn,
    ) -> Result<(), Error> {
        let artifact = Self::known(artifact)?;
        self.replacements
            .insert(artifact.name(), Replacement::Singleton(f));
        Ok(())
    }

    fn known(name: &str) -> Result<Artifact, Error> {
        Artifact::from_name(name)
            .ok_or_else(|| Error::config(format!("unknown template artifact '{name}'")))
    }

    fn render_table_artifact(
        &self,
        artifact: Artifact,
        ctx: &GenerationContext<'_>,
    ) -> Result<String, Error> {
        let result = match self.replacements.get(artifact.name()) {
            Some(Replacement::Verbatim(text)) => Ok(text.clone()),
            Some(Replacement::Table(f)) => f(ctx),
            Some(Replacement::Singleton(_)) | None => templates::render_table_artifact(artifact, ctx),
        };

        result.map_err(|reason| Error::render(&ctx.table.name, artifact.name(), reason))
    }

    fn render_singleton(
        &self,
        artifact: Artifact,
        ctx: &SingletonContext<'_>,
    ) -> Result<String, Error> {
        let result = match self.replacements.get(artifact.name()) {
            Some(Replacement::Verbatim(text)) => Ok(text.clone()),
            Some(Replacement::Singleton(f)) => f(ctx),
            Some(Replacement::Table(_)) | None => templates::render_singleton(artifact, ctx),
        };

        result.map_err(|reason| Error::render("<singleton>", artifact.name(), reason))
    }
}

///
/// RenderedFile
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RenderedFile {
    /// Relative to the output directory.
    pub path: PathBuf,
    pub contents: String,
}

struct TableOutput {
    file: RenderedFile,
    main_imports: ImportSet,
    test_imports: ImportSet,
}

/// Render the full artifact set for a schema. Tables render independently
/// on the rayon pool and nothing is written here; the caller holds the
/// complete result before the output stage starts, so a failure in any
/// table leaves no partial tree behind.
pub fn render_schema(
    schema: &Schema,
    aliases: &AliasSet,
    config: &Config,
    registry: &Registry,
) -> Result<(Vec<RenderedFile>, ImportCollection), Error> {
    let tables: Vec<&Table> = schema.entity_tables().collect();

    let outputs: Result<Vec<TableOutput>, Error> = tables
        .par_iter()
        .map(|&table| render_table(table, schema, aliases, config, registry))
        .collect();
    let outputs = outputs?;

    // Single-writer merge after the parallel phase; no lost updates.
    let mut collection = ImportCollection::default();
    for output in &outputs {
        collection.merge_main(&output.main_imports);
        collection.merge_test(&output.test_imports);
    }

    let mut files: Vec<RenderedFile> = outputs.into_iter().map(|o| o.file).collect();

    let singleton_ctx = SingletonContext {
        schema,
        aliases,
        features: config.features,
        pkg_name: &config.pkg_name,
        collection: &collection,
        imports: &config.imports,
    };
    for artifact in Artifact::SINGLETONS {
        let contents = registry.render_singleton(*artifact, &singleton_ctx)?;
        files.push(RenderedFile {
            path: PathBuf::from(templates::singleton_file_name(*artifact)),
            contents,
        });
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    debug!(files = files.len(), "rendering complete");

    Ok((files, collection))
}

fn render_table(
    table: &Table,
    schema: &Schema,
    aliases: &AliasSet,
    config: &Config,
    registry: &Registry,
) -> Result<TableOutput, Error> {
    let alias = aliases
        .get(&table.name)
        .ok_or_else(|| Error::render(&table.name, "entity", "no alias resolved for table"))?;

    let ctx = GenerationContext {
        table,
        alias,
        aliases,
        schema,
        features: config.features,
        pkg_name: &config.pkg_name,
        tag_casing: config.tag_casing,
        tags: &config.tags,
        imports: &config.imports,
    };

    let main_imports = templates::main_import_set(&ctx);
    let test_imports = if config.features.tests {
        templates::test_import_set(&ctx)
    } else {
        ImportSet::default()
    };

    let mut sections = vec![templates::file_header(&table.name, &config.pkg_name)];
    let imports_block = main_imports.render();
    if !imports_block.is_empty() {
        sections.push(imports_block);
    }
    sections.push(templates::internal_imports(&ctx));

    for artifact in Artifact::PER_TABLE {
        if !artifact.enabled(config.features) {
            continue;
        }
        let section = registry.render_table_artifact(*artifact, &ctx)?;
        if !section.is_empty() {
            sections.push(section);
        }
    }

    let file = RenderedFile {
        path: PathBuf::from(format!("{}.rs", alias.file_stem())),
        contents: sections.join("\n"),
    };

    Ok(TableOutput {
        file,
        main_imports,
        test_imports,
    })
}
