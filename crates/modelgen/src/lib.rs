//! modelgen generates a typed data-access layer from a live database
//! schema, introspected through an external driver process.
//!
//! This facade re-exports the public surface of the workspace crates;
//! embedders depend on this crate alone.

pub use modelgen_core;
pub use modelgen_driver;
pub use modelgen_schema;

/// Tool version stamped into `--version` output.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use modelgen_core::{
        Config, Error, Features, ImportCollection, ImportOverrides, State, TagCasing,
    };
    pub use modelgen_driver::{ConnectionParams, Engine, PROTOCOL_VERSION};
    pub use modelgen_schema::node::{Column, ForeignKey, PrimaryKey, Schema, Table};
    pub use modelgen_schema::types::Semantic;
}
