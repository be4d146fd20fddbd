use crate::prelude::*;

///
/// PrimaryKey
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PrimaryKey {
    pub name: String,

    /// Ordered key columns; composite keys carry more than one.
    pub columns: Vec<String>,
}

///
/// ForeignKey
///
/// A single-column reference to another table. Composite foreign keys are not
/// representable on the wire; drivers report them as errors.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ForeignKey {
    pub name: String,
    pub column: String,
    pub foreign_table: String,
    pub foreign_column: String,

    #[serde(default)]
    pub on_delete: ReferentialAction,

    #[serde(default)]
    pub on_update: ReferentialAction,
}

///
/// UniqueConstraint
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct UniqueConstraint {
    pub name: String,
    pub columns: Vec<String>,
}
