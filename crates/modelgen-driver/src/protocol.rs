use crate::Error;
use modelgen_schema::node::{Schema, Table};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Protocol revision spoken by this build. A driver that cannot honor the
/// requested revision must answer with an explicit `error` response; a
/// best-effort schema from a mismatched driver is a protocol violation.
pub const PROTOCOL_VERSION: u32 = 1;

///
/// IntrospectRequest
///
/// The single document written to a driver's stdin. Engine-specific knobs
/// travel in `options`, already validated against the recognized set for
/// known engines.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct IntrospectRequest {
    pub version: u32,

    pub connection: crate::options::ConnectionParams,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub whitelist: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blacklist: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, serde_json::Value>,
}

///
/// IntrospectResponse
///
/// The single document read back from a driver's stdout.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntrospectResponse {
    Schema { tables: Vec<Table> },
    Error { error: DriverFailure },
}

///
/// DriverFailure
///
/// Structured refusal from a driver: a stable machine kind plus free text.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DriverFailure {
    pub kind: String,
    pub message: String,
}

/// Kinds a driver uses to refuse a protocol revision it cannot speak.
pub const FAILURE_KIND_VERSION: &str = "incompatible_version";

/// Decode a raw stdout payload into an unvalidated schema model.
///
/// Truncated output, unknown shapes, and missing required fields all land in
/// [`Error::Protocol`]; a well-formed `error` response is surfaced under its
/// own kind so version refusals stay distinguishable.
pub fn parse_response(payload: &[u8]) -> Result<Schema, Error> {
    if payload.is_empty() {
        return Err(Error::protocol("driver produced no output"));
    }

    let response: IntrospectResponse = serde_json::from_slice(payload)
        .map_err(|e| Error::protocol(format!("undecodable response: {e}")))?;

    match response {
        IntrospectResponse::Schema { tables } => Ok(Schema { tables }),
        IntrospectResponse::Error { error } if error.kind == FAILURE_KIND_VERSION => {
            Err(Error::protocol(format!(
                "driver refused protocol version {PROTOCOL_VERSION}: {}",
                error.message
            )))
        }
        IntrospectResponse::Error { error } => Err(Error::Reported {
            kind: error.kind,
            message: error.message,
        }),
    }
}
