pub mod client;
pub mod options;
pub mod protocol;

pub use client::{DriverClient, ResolvedDriver};
pub use options::{ConnectionParams, Engine};
pub use protocol::{DriverFailure, IntrospectRequest, IntrospectResponse, PROTOCOL_VERSION};

use std::io;
use std::path::PathBuf;
use thiserror::Error as ThisError;

/// Executable name prefix drivers are searched under (`modelgen-driver-postgres`).
pub const DRIVER_BINARY_PREFIX: &str = "modelgen-driver-";

///
/// Error
///
/// Everything that can go wrong between "the user named a driver" and "we
/// hold a deserialized schema". Diagnostic text from the driver process is
/// surfaced verbatim, never reinterpreted.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("no driver executable found for '{name}' (looked for '{DRIVER_BINARY_PREFIX}{name}' on PATH)")]
    NotFound { name: String },

    #[error("driver executable '{path}' does not exist")]
    PathMissing { path: PathBuf },

    #[error("failed to launch driver '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("driver '{name}' exited with {status}: {stderr}")]
    Execution {
        name: String,
        status: String,
        stderr: String,
    },

    #[error("driver '{name}' produced no response within {seconds}s and was killed")]
    Timeout { name: String, seconds: u64 },

    #[error("driver protocol violation: {reason}")]
    Protocol { reason: String },

    #[error("driver reported {kind}: {message}")]
    Reported { kind: String, message: String },

    #[error("invalid configuration for engine '{engine}': {reason}")]
    Config { engine: String, reason: String },
}

impl Error {
    // Construct one protocol violation from any displayable cause.
    pub(crate) fn protocol(reason: impl Into<String>) -> Self {
        Self::Protocol {
            reason: reason.into(),
        }
    }

    pub(crate) fn config(engine: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Config {
            engine: engine.into(),
            reason: reason.into(),
        }
    }
}
