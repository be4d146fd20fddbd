//! `modelgen` command line entry point: flag parsing and config assembly
//! around the generation pipeline.

use clap::Parser;
use modelgen::prelude::*;
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use std::{fs, io};
use tracing::debug;

fn long_version() -> String {
    format!(
        "{} (driver protocol v{})",
        modelgen::VERSION,
        PROTOCOL_VERSION
    )
}

#[derive(Parser)]
#[command(name = "modelgen")]
#[command(version = modelgen::VERSION, long_version = long_version())]
#[command(about = "Generate a typed data-access layer from your database schema")]
#[command(
    long_about = "modelgen introspects a database through an external driver process \
                  (modelgen-driver-<name> on PATH, or an explicit path) and generates \
                  entities, query builders, relationship accessors, and lifecycle hooks \
                  tailored to the schema."
)]
struct Cli {
    /// Driver name (postgres, mysql, sqlite) or path to a driver executable
    driver: String,

    /// Folder to write generated files into
    #[arg(short, long, default_value = "models")]
    output: PathBuf,

    /// Module name stamped into the generated files
    #[arg(short, long, default_value = "models")]
    pkgname: String,

    /// Disable generated test modules
    #[arg(long)]
    no_tests: bool,

    /// Disable lifecycle hooks in generated mutations
    #[arg(long)]
    no_hooks: bool,

    /// Disable automatic created_at/updated_at maintenance
    #[arg(long)]
    no_auto_timestamps: bool,

    /// Generated functions take no context argument
    #[arg(long)]
    no_context: bool,

    /// Delete the output folder before generation
    #[arg(long)]
    wipe: bool,

    /// Casing for generated field annotations: snake or camel
    #[arg(long, default_value = "snake")]
    tag_casing: TagCasing,

    /// Extra derive to attach to generated entities (repeatable)
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Replace a named template: <artifact>:<file> (repeatable)
    #[arg(long = "replace", value_name = "ARTIFACT:FILE")]
    replacements: Vec<String>,

    /// Only include these tables (repeatable)
    #[arg(long)]
    whitelist: Vec<String>,

    /// Exclude these tables (repeatable)
    #[arg(long)]
    blacklist: Vec<String>,

    /// Database host
    #[arg(long)]
    host: Option<String>,

    /// Database port
    #[arg(long)]
    port: Option<u16>,

    /// Database user
    #[arg(long)]
    user: Option<String>,

    /// Database password
    #[arg(long, env = "MODELGEN_PASSWORD")]
    password: Option<String>,

    /// Database name
    #[arg(long)]
    dbname: Option<String>,

    /// SSL mode handed to the driver
    #[arg(long)]
    sslmode: Option<String>,

    /// Database file path, for embedded engines
    #[arg(long)]
    db_path: Option<String>,

    /// Engine-specific option: <key>=<value> (repeatable)
    #[arg(long = "driver-option", value_name = "KEY=VALUE")]
    driver_options: Vec<String>,

    /// Kill the driver if introspection exceeds this many seconds
    #[arg(long)]
    driver_timeout_secs: Option<u64>,

    /// Alias overrides as a JSON document
    #[arg(long, value_name = "FILE")]
    aliases: Option<PathBuf>,

    /// Import overrides as a JSON document
    #[arg(long, value_name = "FILE")]
    imports: Option<PathBuf>,

    /// Print the underlying cause chain on failure
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "modelgen=debug" } else { "modelgen=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let verbose = cli.verbose;
    match generate(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            if verbose {
                let mut cause = err.source();
                while let Some(err) = cause {
                    eprintln!("  caused by: {err}");
                    cause = err.source();
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn generate(cli: Cli) -> Result<(), Error> {
    let config = build_config(cli)?;

    let state = State::new(config)?;
    let report = state.run()?;

    println!(
        "generated {} files for {} tables",
        report.files, report.tables
    );

    Ok(())
}

fn build_config(cli: Cli) -> Result<Config, Error> {
    let mut config = Config::new(cli.driver, cli.output);

    config.pkg_name = cli.pkgname;
    config.features = Features {
        tests: !cli.no_tests,
        hooks: !cli.no_hooks,
        timestamps: !cli.no_auto_timestamps,
        context: !cli.no_context,
    };
    config.tag_casing = cli.tag_casing;
    config.tags = cli.tags;
    config.wipe = cli.wipe;
    config.whitelist = cli.whitelist;
    config.blacklist = cli.blacklist;
    config.driver_timeout = cli.driver_timeout_secs.map(Duration::from_secs);

    config.connection = ConnectionParams {
        host: cli.host,
        port: cli.port,
        user: cli.user,
        password: cli.password,
        dbname: cli.dbname,
        sslmode: cli.sslmode,
        path: cli.db_path,
    };

    config.driver_options = parse_driver_options(&cli.driver_options)?;

    for spec in &cli.replacements {
        let (artifact, path) = spec.split_once(':').ok_or_else(|| Error::Config {
            reason: format!("replacement '{spec}' is not in <artifact>:<file> form"),
        })?;
        config
            .replacements
            .insert(artifact.to_string(), PathBuf::from(path));
    }

    if let Some(path) = &cli.aliases {
        config.aliases = read_json(path)?;
        debug!(path = %path.display(), "loaded alias overrides");
    }
    if let Some(path) = &cli.imports {
        config.imports = read_json(path)?;
        debug!(path = %path.display(), "loaded import overrides");
    }

    Ok(config)
}

fn parse_driver_options(
    pairs: &[String],
) -> Result<BTreeMap<String, serde_json::Value>, Error> {
    let mut options = BTreeMap::new();
    for pair in pairs {
        let (key, value) = pair.split_once('=').ok_or_else(|| Error::Config {
            reason: format!("driver option '{pair}' is not in <key>=<value> form"),
        })?;
        options.insert(key.to_string(), value.into());
    }

    Ok(options)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> Result<T, Error> {
    let text = fs::read_to_string(path).map_err(|e| Error::Config {
        reason: format!("override file '{}' unreadable: {e}", path.display()),
    })?;

    serde_json::from_str(&text).map_err(|e| Error::Config {
        reason: format!("override file '{}' malformed: {e}", path.display()),
    })
}
