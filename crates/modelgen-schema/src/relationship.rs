use crate::prelude::*;

///
/// ToOneRelationship
///
/// The referencing side of a foreign key: this table holds the key column
/// and points at exactly one row of the foreign table.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ToOneRelationship {
    pub name: String,
    pub local_column: String,
    pub foreign_table: String,
    pub foreign_column: String,

    /// A nullable key column makes the association optional.
    pub nullable: bool,
}

///
/// ToManyRelationship
///
/// The referenced side: some other table (or a join table, for many-to-many)
/// points back at this one.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ToManyRelationship {
    pub name: String,
    pub local_column: String,
    pub foreign_table: String,
    pub foreign_column: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub through: Option<JoinThrough>,
}

impl ToManyRelationship {
    #[must_use]
    pub const fn is_many_to_many(&self) -> bool {
        self.through.is_some()
    }

    /// The table whose entities this accessor ultimately yields.
    #[must_use]
    pub fn target_table(&self) -> &str {
        self.through
            .as_ref()
            .map_or(self.foreign_table.as_str(), |t| t.target_table.as_str())
    }
}

///
/// JoinThrough
///
/// Join-table hop for a many-to-many association.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct JoinThrough {
    pub join_table: String,

    /// Join-table column referencing the source side.
    pub source_join_column: String,

    /// Join-table column referencing the target side.
    pub target_join_column: String,

    pub target_table: String,
    pub target_column: String,
}

/// Relationships computed from this table's own foreign keys.
/// Order follows the table's key order, so output is stable.
#[must_use]
pub fn to_one_relationships(table: &Table) -> Vec<ToOneRelationship> {
    table
        .foreign_keys
        .iter()
        .map(|fk| ToOneRelationship {
            name: fk.name.clone(),
            local_column: fk.column.clone(),
            foreign_table: fk.foreign_table.clone(),
            foreign_column: fk.foreign_column.clone(),
            nullable: table.get_column(&fk.column).is_some_and(|c| c.nullable),
        })
        .collect()
}

/// Relationships computed from foreign keys elsewhere in the schema that
/// reference `table`. A referencing join table contributes a many-to-many
/// accessor through its far side instead of a plain to-many.
#[must_use]
pub fn to_many_relationships(table: &Table, schema: &Schema) -> Vec<ToManyRelationship> {
    let mut out = Vec::new();

    // Self-referencing keys are legal; `other` may be `table` itself.
    for other in &schema.tables {
        for fk in &other.foreign_keys {
            if fk.foreign_table != table.name {
                continue;
            }

            if other.is_join_table {
                // The far foreign key of the join table names the target.
                let Some(far) = other.foreign_keys.iter().find(|f| f.name != fk.name) else {
                    continue;
                };

                out.push(ToManyRelationship {
                    name: fk.name.clone(),
                    local_column: fk.foreign_column.clone(),
                    foreign_table: other.name.clone(),
                    foreign_column: fk.column.clone(),
                    through: Some(JoinThrough {
                        join_table: other.name.clone(),
                        source_join_column: fk.column.clone(),
                        target_join_column: far.column.clone(),
                        target_table: far.foreign_table.clone(),
                        target_column: far.foreign_column.clone(),
                    }),
                });
            } else {
                out.push(ToManyRelationship {
                    name: fk.name.clone(),
                    local_column: fk.foreign_column.clone(),
                    foreign_table: other.name.clone(),
                    foreign_column: fk.column.clone(),
                    through: None,
                });
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::{to_many_relationships, to_one_relationships};
    use crate::node::{Column, ForeignKey, PrimaryKey, Schema, Table};
    use crate::types::Semantic;

    fn column(name: &str, semantic: Semantic, nullable: bool) -> Column {
        Column {
            name: name.to_string(),
            db_type: "integer".to_string(),
            semantic,
            nullable,
            default: None,
            unique: false,
            auto_generated: false,
        }
    }

    fn keyed_table(name: &str, mut columns: Vec<Column>) -> Table {
        columns.insert(0, column("id", Semantic::Int64, false));
        Table {
            name: name.to_string(),
            columns,
            primary_key: Some(PrimaryKey {
                name: format!("{name}_pkey"),
                columns: vec!["id".to_string()],
            }),
            foreign_keys: vec![],
            unique_constraints: vec![],
            is_view: false,
            is_join_table: false,
        }
    }

    fn fk(table: &str, column: &str, foreign_table: &str) -> ForeignKey {
        ForeignKey {
            name: format!("{table}_{column}_fkey"),
            column: column.to_string(),
            foreign_table: foreign_table.to_string(),
            foreign_column: "id".to_string(),
            on_delete: Default::default(),
            on_update: Default::default(),
        }
    }

    fn users_posts_schema() -> Schema {
        let users = keyed_table("users", vec![column("name", Semantic::Text, false)]);
        let mut posts = keyed_table(
            "posts",
            vec![
                column("user_id", Semantic::Int64, false),
                column("title", Semantic::Text, false),
            ],
        );
        posts.foreign_keys = vec![fk("posts", "user_id", "users")];

        Schema {
            tables: vec![users, posts],
        }
        .finalize()
        .expect("fixture schema must be consistent")
    }

    #[test]
    fn foreign_key_side_yields_to_one() {
        let schema = users_posts_schema();
        let posts = schema.get_table("posts").unwrap();

        let rels = to_one_relationships(posts);
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].foreign_table, "users");
        assert_eq!(rels[0].local_column, "user_id");
        assert!(!rels[0].nullable);
    }

    #[test]
    fn referenced_side_yields_to_many() {
        let schema = users_posts_schema();
        let users = schema.get_table("users").unwrap();

        let rels = to_many_relationships(users, &schema);
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].foreign_table, "posts");
        assert_eq!(rels[0].foreign_column, "user_id");
        assert!(rels[0].through.is_none());
    }

    #[test]
    fn join_table_yields_many_to_many_on_both_sides() {
        let users = keyed_table("users", vec![]);
        let roles = keyed_table("roles", vec![]);
        let mut user_roles = Table {
            name: "user_roles".to_string(),
            columns: vec![
                column("user_id", Semantic::Int64, false),
                column("role_id", Semantic::Int64, false),
            ],
            primary_key: Some(PrimaryKey {
                name: "user_roles_pkey".to_string(),
                columns: vec!["user_id".to_string(), "role_id".to_string()],
            }),
            foreign_keys: vec![],
            unique_constraints: vec![],
            is_view: false,
            is_join_table: false,
        };
        user_roles.foreign_keys = vec![
            fk("user_roles", "user_id", "users"),
            fk("user_roles", "role_id", "roles"),
        ];

        let schema = Schema {
            tables: vec![users, roles, user_roles],
        }
        .finalize()
        .expect("fixture schema must be consistent");

        let users_rels = to_many_relationships(schema.get_table("users").unwrap(), &schema);
        assert_eq!(users_rels.len(), 1);
        let through = users_rels[0].through.as_ref().expect("must be many-to-many");
        assert_eq!(through.join_table, "user_roles");
        assert_eq!(through.target_table, "roles");
        assert_eq!(users_rels[0].target_table(), "roles");

        let roles_rels = to_many_relationships(schema.get_table("roles").unwrap(), &schema);
        assert_eq!(roles_rels.len(), 1);
        assert_eq!(roles_rels[0].target_table(), "users");
    }
}
