mod column;
mod key;
mod schema;
mod table;

pub use column::Column;
pub use key::{ForeignKey, PrimaryKey, UniqueConstraint};
pub use schema::Schema;
pub use table::Table;
