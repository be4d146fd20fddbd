pub mod alias;
pub mod config;
pub mod imports;
pub mod inflect;
pub mod output;
pub mod render;
pub mod state;
pub mod templates;

pub use alias::{AliasSet, ColumnAlias, TableAlias};
pub use config::{Config, Features, TagCasing};
pub use imports::{ImportCollection, ImportOverrides, ImportSet};
pub use render::GenerationContext;
pub use state::State;

use std::io;
use std::path::PathBuf;
use thiserror::Error as ThisError;

///
/// Error
///
/// Every fatal outcome of a generation run, one variant per stage. There is
/// no partial-success mode: downstream code assumes a complete, mutually
/// consistent artifact tree, so the first failure aborts the run.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Driver(#[from] modelgen_driver::Error),

    #[error(transparent)]
    Schema(#[from] modelgen_schema::Error),

    #[error("alias collision: tables '{first}' and '{second}' both resolve to exported name '{alias}'")]
    AliasCollision {
        alias: String,
        first: String,
        second: String,
    },

    #[error("rendering artifact '{artifact}' for '{table}' failed: {reason}")]
    Render {
        table: String,
        artifact: String,
        reason: String,
    },

    #[error("failed writing '{path}' ({written} files written before the failure): {source}")]
    Write {
        path: PathBuf,
        written: usize,
        #[source]
        source: io::Error,
    },

    #[error("invalid generation config: {reason}")]
    Config { reason: String },
}

impl Error {
    pub(crate) fn render(
        table: impl Into<String>,
        artifact: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Render {
            table: table.into(),
            artifact: artifact.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}
