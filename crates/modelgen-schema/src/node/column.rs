use crate::prelude::*;

///
/// Column
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Column {
    pub name: String,

    /// The engine's declared type, verbatim (`character varying(80)`).
    pub db_type: String,

    pub semantic: Semantic,

    #[serde(default)]
    pub nullable: bool,

    /// Default-value expression as reported by the catalog, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    #[serde(default)]
    pub unique: bool,

    /// Identity/serial columns; generated insert code omits these.
    #[serde(default)]
    pub auto_generated: bool,
}

impl Column {
    #[must_use]
    pub fn rust_type(&self) -> String {
        self.semantic.rust_type(self.nullable)
    }
}
