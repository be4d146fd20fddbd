use crate::{alias::AliasOverrides, imports::ImportOverrides};
use derive_more::{Display, FromStr};
use modelgen_driver::ConnectionParams;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

///
/// Features
///
/// The switches that change which artifact sections are emitted. Stored
/// positively; the CLI exposes them as `--no-*` flags.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Features {
    /// Generate a test file per entity plus the singleton test harness.
    pub tests: bool,

    /// Generate lifecycle hook points and registration code.
    pub hooks: bool,

    /// Maintain created_at/updated_at automatically in mutation code.
    pub timestamps: bool,

    /// Generated functions accept an explicit context argument.
    pub context: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            tests: true,
            hooks: true,
            timestamps: true,
            context: true,
        }
    }
}

///
/// TagCasing
///
/// Casing policy for generated field annotations.
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, FromStr, PartialEq, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TagCasing {
    #[default]
    Snake,
    Camel,
}

///
/// Config
///
/// One generation request, fully assembled by the CLI/config collaborator
/// before the pipeline starts. Everything here is read-only for the run.
///

#[derive(Clone, Debug)]
pub struct Config {
    /// Driver identifier: a bare engine name or an explicit executable path.
    pub driver: String,

    pub out_dir: PathBuf,

    /// Module name stamped into generated file headers.
    pub pkg_name: String,

    pub features: Features,

    pub tag_casing: TagCasing,

    /// Extra derive identifiers attached to generated entities.
    pub tags: Vec<String>,

    /// Recursively delete `out_dir` before writing. Destructive; applied
    /// only after rendering has fully succeeded.
    pub wipe: bool,

    pub whitelist: Vec<String>,
    pub blacklist: Vec<String>,

    pub connection: ConnectionParams,
    pub driver_options: BTreeMap<String, serde_json::Value>,
    pub driver_timeout: Option<Duration>,

    pub aliases: AliasOverrides,
    pub imports: ImportOverrides,

    /// Static template replacements: artifact name → file whose contents
    /// stand in for the built-in template.
    pub replacements: BTreeMap<String, PathBuf>,
}

impl Config {
    /// A config with every collaborator-supplied knob at its default,
    /// ready for tests and programmatic use.
    #[must_use]
    pub fn new(driver: impl Into<String>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            driver: driver.into(),
            out_dir: out_dir.into(),
            pkg_name: "models".to_string(),
            features: Features::default(),
            tag_casing: TagCasing::default(),
            tags: Vec::new(),
            wipe: false,
            whitelist: Vec::new(),
            blacklist: Vec::new(),
            connection: ConnectionParams::default(),
            driver_options: BTreeMap::new(),
            driver_timeout: None,
            aliases: AliasOverrides::default(),
            imports: ImportOverrides::default(),
            replacements: BTreeMap::new(),
        }
    }
}
