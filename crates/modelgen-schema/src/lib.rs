pub mod error;
pub mod node;
pub mod relationship;
pub mod types;
pub mod validate;

/// Maximum length for table identifiers accepted from a driver.
pub const MAX_TABLE_NAME_LEN: usize = 64;

/// Maximum length for column identifiers accepted from a driver.
pub const MAX_COLUMN_NAME_LEN: usize = 64;

use crate::error::ErrorTree;
use thiserror::Error as ThisError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        err,
        error::ErrorTree,
        node::{Column, ForeignKey, PrimaryKey, Schema, Table, UniqueConstraint},
        types::{ReferentialAction, Semantic},
    };
    pub use serde::{Deserialize, Serialize};
}

///
/// Error
///
/// A schema that fails these checks is rejected as a whole; generation never
/// proceeds on a partially consistent model.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("schema consistency check failed: {0}")]
    Consistency(ErrorTree),
}
