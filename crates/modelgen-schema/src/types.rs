use crate::prelude::*;
use derive_more::{Display, FromStr};
use std::fmt;

///
/// Semantic
///
/// The mapped semantic type of a column, independent of the engine's declared
/// type string. Drivers translate their native catalog types into one of
/// these; everything downstream (aliasing, imports, templates) works from the
/// semantic form only.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum Semantic {
    Bool,
    Bytes,
    Date,
    Decimal,
    Enum {
        name: String,
        variants: Vec<String>,
    },
    Float32,
    Float64,
    Int16,
    Int32,
    Int64,
    Json,
    /// An engine type with no portable mapping; carried through verbatim.
    Opaque(String),
    Text,
    Time,
    Timestamp,
    Uuid,
}

impl Semantic {
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Self::Int16 | Self::Int32 | Self::Int64)
    }

    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        self.is_integer() || matches!(self, Self::Decimal | Self::Float32 | Self::Float64)
    }

    #[must_use]
    pub const fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::Time | Self::Timestamp)
    }

    // Json is equality-comparable in generated filters, floats are not.
    #[must_use]
    pub const fn supports_eq(&self) -> bool {
        !matches!(self, Self::Float32 | Self::Float64)
    }

    #[must_use]
    pub const fn supports_ord(&self) -> bool {
        !matches!(self, Self::Bytes | Self::Json | Self::Opaque(_))
    }

    /// A short machine key for this type, used by per-type import overrides.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Bytes => "bytes",
            Self::Date => "date",
            Self::Decimal => "decimal",
            Self::Enum { .. } => "enum",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Json => "json",
            Self::Opaque(_) => "opaque",
            Self::Text => "text",
            Self::Time => "time",
            Self::Timestamp => "timestamp",
            Self::Uuid => "uuid",
        }
    }

    /// The `use` entry a column of this type drags into generated code, if
    /// any. Unused types must never surface in the output imports.
    #[must_use]
    pub const fn third_party_import(&self) -> Option<&'static str> {
        match self {
            Self::Date => Some("chrono::NaiveDate"),
            Self::Time => Some("chrono::NaiveTime"),
            Self::Timestamp => Some("chrono::{DateTime, Utc}"),
            Self::Decimal => Some("rust_decimal::Decimal"),
            Self::Json => Some("serde_json::Value as JsonValue"),
            Self::Uuid => Some("uuid::Uuid"),
            _ => None,
        }
    }

    /// The Rust type generated entities use for a non-nullable column of
    /// this semantic type, in the short form brought into scope by
    /// [`Self::third_party_import`]. `Enum` yields its declared name; the
    /// entity template owns the casing of the emitted enum declaration.
    #[must_use]
    pub fn base_rust_type(&self) -> String {
        match self {
            Self::Bool => "bool".to_string(),
            Self::Bytes => "Vec<u8>".to_string(),
            Self::Date => "NaiveDate".to_string(),
            Self::Decimal => "Decimal".to_string(),
            Self::Enum { name, .. } => name.clone(),
            Self::Float32 => "f32".to_string(),
            Self::Float64 => "f64".to_string(),
            Self::Int16 => "i16".to_string(),
            Self::Int32 => "i32".to_string(),
            Self::Int64 => "i64".to_string(),
            Self::Json => "JsonValue".to_string(),
            Self::Opaque(ty) => ty.clone(),
            Self::Text => "String".to_string(),
            Self::Time => "NaiveTime".to_string(),
            Self::Timestamp => "DateTime<Utc>".to_string(),
            Self::Uuid => "Uuid".to_string(),
        }
    }

    /// Rust type including nullability wrapping.
    #[must_use]
    pub fn rust_type(&self, nullable: bool) -> String {
        let base = self.base_rust_type();
        if nullable { format!("Option<{base}>") } else { base }
    }
}

impl fmt::Display for Semantic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enum { name, .. } => write!(f, "enum '{name}'"),
            Self::Opaque(ty) => write!(f, "opaque '{ty}'"),
            other => write!(f, "{other:?}"),
        }
    }
}

///
/// ReferentialAction
///
/// Cascade semantics attached to a foreign key, as reported by the driver.
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, FromStr, PartialEq, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ReferentialAction {
    #[default]
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}
