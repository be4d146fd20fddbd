use crate::{
    Error,
    alias::AliasSet,
    config::Config,
    imports::ImportCollection,
    output::write_output,
    render::{Registry, RenderedFile, render_schema},
};
use modelgen_driver::{
    DriverClient, Engine, IntrospectRequest, PROTOCOL_VERSION, ResolvedDriver,
};
use modelgen_schema::node::Schema;
use std::fs;
use tracing::{debug, info};

///
/// State
///
/// One generation run. Construction performs everything that can fail
/// before rendering: driver resolution, introspection, schema validation,
/// alias resolution. A constructed state holds a frozen, consistent
/// model. `run` renders and writes.
///

#[derive(Debug)]
pub struct State {
    config: Config,
    schema: Schema,
    aliases: AliasSet,
    registry: Registry,
}

///
/// Report
///
/// What a completed run produced, for the caller's summary output.
///

#[derive(Debug)]
pub struct Report {
    pub tables: usize,
    pub files: usize,
    pub imports: ImportCollection,
}

impl State {
    /// Resolve and invoke the driver, then freeze the model for rendering.
    pub fn new(config: Config) -> Result<Self, Error> {
        let mut config = config;

        let driver = ResolvedDriver::resolve(&config.driver)?;
        let mut options = std::mem::take(&mut config.driver_options);
        if let Some(engine) = Engine::known(&driver.name) {
            config.connection.prepare(engine, &mut options)?;
        } else {
            debug!(driver = %driver.name, "custom driver; options passed through");
        }

        let request = IntrospectRequest {
            version: PROTOCOL_VERSION,
            connection: config.connection.clone(),
            whitelist: config.whitelist.clone(),
            blacklist: config.blacklist.clone(),
            options: options.clone(),
        };
        config.driver_options = options;

        let client = DriverClient::new(driver).with_timeout(config.driver_timeout);
        info!(driver = client.driver_name(), "introspecting schema");
        let schema = client.introspect(&request)?;

        Self::from_schema(config, schema)
    }

    /// Build a run state from an already-introspected schema. The schema is
    /// validated and finalized here; tests and embedders use this to skip
    /// the subprocess boundary.
    pub fn from_schema(config: Config, schema: Schema) -> Result<Self, Error> {
        let schema = schema.finalize()?;
        let aliases = AliasSet::resolve(&schema, &config.aliases)?;

        let mut registry = Registry::new();
        for (artifact, path) in &config.replacements {
            let text = fs::read_to_string(path).map_err(|e| {
                Error::config(format!(
                    "replacement template '{}' unreadable: {e}",
                    path.display()
                ))
            })?;
            registry.replace_with_text(artifact, text)?;
        }

        info!(
            tables = schema.tables.len(),
            "schema validated and aliases resolved"
        );

        Ok(Self {
            config,
            schema,
            aliases,
            registry,
        })
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    #[must_use]
    pub fn aliases(&self) -> &AliasSet {
        &self.aliases
    }

    /// Substitute a per-table template function for a named artifact.
    pub fn override_template(
        &mut self,
        artifact: &str,
        f: crate::render::TableTemplateFn,
    ) -> Result<(), Error> {
        self.registry.replace_with_fn(artifact, f)
    }

    /// Render every artifact, then write the tree. The wipe of a previous
    /// tree happens inside the writer, strictly after rendering succeeded.
    pub fn run(&self) -> Result<Report, Error> {
        let (files, imports) = self.render()?;
        write_output(&self.config.out_dir, &files, self.config.wipe)?;

        Ok(Report {
            tables: self.schema.entity_tables().count(),
            files: files.len(),
            imports,
        })
    }

    /// Render without writing; exposed for callers that post-process.
    pub fn render(&self) -> Result<(Vec<RenderedFile>, ImportCollection), Error> {
        render_schema(&self.schema, &self.aliases, &self.config, &self.registry)
    }
}
