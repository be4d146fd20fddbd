mod consistency;
mod naming;

use crate::{error::ErrorTree, node::Schema};

/// Run every schema check, collecting all failures into one tree.
pub fn validate_schema(schema: &Schema) -> Result<(), ErrorTree> {
    let mut errs = ErrorTree::new();

    naming::validate_naming(schema, &mut errs);
    consistency::validate_keys(schema, &mut errs);
    consistency::validate_references(schema, &mut errs);

    errs.result()
}
