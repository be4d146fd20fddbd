use crate::{node::Schema, prelude::*};

/// Key structure checks local to each table: primary key and unique
/// constraint columns must exist on the table that declares them.
pub fn validate_keys(schema: &Schema, errs: &mut ErrorTree) {
    for table in &schema.tables {
        if let Some(pk) = &table.primary_key {
            if pk.columns.is_empty() {
                err!(
                    errs,
                    "primary key '{}' on table '{}' has no columns",
                    pk.name,
                    table.name
                );
            }
            for column in &pk.columns {
                if table.get_column(column).is_none() {
                    err!(
                        errs,
                        "primary key '{}' on table '{}' names missing column '{column}'",
                        pk.name,
                        table.name
                    );
                }
            }
        }

        for unique in &table.unique_constraints {
            for column in &unique.columns {
                if table.get_column(column).is_none() {
                    err!(
                        errs,
                        "unique constraint '{}' on table '{}' names missing column '{column}'",
                        unique.name,
                        table.name
                    );
                }
            }
        }
    }
}

/// Cross-table reference checks. A dangling foreign key rejects the whole
/// model; generation on top of it would emit accessors into nothing.
pub fn validate_references(schema: &Schema, errs: &mut ErrorTree) {
    for table in &schema.tables {
        for fk in &table.foreign_keys {
            if table.get_column(&fk.column).is_none() {
                err!(
                    errs,
                    "foreign key '{}' on table '{}' names missing local column '{}'",
                    fk.name,
                    table.name,
                    fk.column
                );
            }

            let Some(foreign) = schema.get_table(&fk.foreign_table) else {
                err!(
                    errs,
                    "foreign key '{}' on table '{}' references missing table '{}'",
                    fk.name,
                    table.name,
                    fk.foreign_table
                );
                continue;
            };

            if foreign.get_column(&fk.foreign_column).is_none() {
                err!(
                    errs,
                    "foreign key '{}' on table '{}' references missing column '{}.{}'",
                    fk.name,
                    table.name,
                    fk.foreign_table,
                    fk.foreign_column
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::node::{Column, ForeignKey, PrimaryKey, Schema, Table};
    use crate::types::Semantic;

    fn column(name: &str, semantic: Semantic) -> Column {
        Column {
            name: name.to_string(),
            db_type: "integer".to_string(),
            semantic,
            nullable: false,
            default: None,
            unique: false,
            auto_generated: false,
        }
    }

    fn fk(name: &str, column: &str, foreign_table: &str, foreign_column: &str) -> ForeignKey {
        ForeignKey {
            name: name.to_string(),
            column: column.to_string(),
            foreign_table: foreign_table.to_string(),
            foreign_column: foreign_column.to_string(),
            on_delete: Default::default(),
            on_update: Default::default(),
        }
    }

    fn table(name: &str, columns: Vec<Column>) -> Table {
        Table {
            name: name.to_string(),
            columns,
            primary_key: None,
            foreign_keys: vec![],
            unique_constraints: vec![],
            is_view: false,
            is_join_table: false,
        }
    }

    #[test]
    fn dangling_foreign_table_rejects_schema() {
        let mut posts = table("posts", vec![column("user_id", Semantic::Int64)]);
        posts.foreign_keys = vec![fk("posts_user_id_fkey", "user_id", "users", "id")];

        let schema = Schema {
            tables: vec![posts],
        };
        let err = schema
            .finalize()
            .expect_err("reference into a missing table must fail");

        assert!(err.to_string().contains("missing table 'users'"));
    }

    #[test]
    fn dangling_foreign_column_rejects_schema() {
        let users = table("users", vec![column("id", Semantic::Int64)]);
        let mut posts = table("posts", vec![column("user_id", Semantic::Int64)]);
        posts.foreign_keys = vec![fk("posts_user_id_fkey", "user_id", "users", "uuid")];

        let schema = Schema {
            tables: vec![users, posts],
        };
        let err = schema
            .finalize()
            .expect_err("reference into a missing column must fail");

        assert!(err.to_string().contains("missing column 'users.uuid'"));
    }

    #[test]
    fn primary_key_over_missing_column_rejects_schema() {
        let mut users = table("users", vec![column("id", Semantic::Int64)]);
        users.primary_key = Some(PrimaryKey {
            name: "users_pkey".to_string(),
            columns: vec!["uuid".to_string()],
        });

        let schema = Schema {
            tables: vec![users],
        };
        let err = schema
            .finalize()
            .expect_err("primary key over a missing column must fail");

        assert!(err.to_string().contains("missing column 'uuid'"));
    }

    #[test]
    fn consistent_schema_finalizes_with_derived_flags() {
        let mut users = table(
            "users",
            vec![column("id", Semantic::Int64), column("name", Semantic::Text)],
        );
        users.primary_key = Some(PrimaryKey {
            name: "users_pkey".to_string(),
            columns: vec!["id".to_string()],
        });

        let mut roles = table("roles", vec![column("id", Semantic::Int64)]);
        roles.primary_key = Some(PrimaryKey {
            name: "roles_pkey".to_string(),
            columns: vec!["id".to_string()],
        });

        let mut user_roles = table(
            "user_roles",
            vec![
                column("user_id", Semantic::Int64),
                column("role_id", Semantic::Int64),
            ],
        );
        user_roles.primary_key = Some(PrimaryKey {
            name: "user_roles_pkey".to_string(),
            columns: vec!["user_id".to_string(), "role_id".to_string()],
        });
        user_roles.foreign_keys = vec![
            fk("user_roles_user_id_fkey", "user_id", "users", "id"),
            fk("user_roles_role_id_fkey", "role_id", "roles", "id"),
        ];

        let schema = Schema {
            tables: vec![users, roles, user_roles],
        }
        .finalize()
        .expect("consistent schema must finalize");

        assert!(!schema.get_table("users").unwrap().is_join_table);
        assert!(schema.get_table("user_roles").unwrap().is_join_table);
    }

    #[test]
    fn join_table_with_extra_column_is_not_flagged() {
        let mut users = table("users", vec![column("id", Semantic::Int64)]);
        users.primary_key = Some(PrimaryKey {
            name: "users_pkey".to_string(),
            columns: vec!["id".to_string()],
        });

        let mut roles = table("roles", vec![column("id", Semantic::Int64)]);
        roles.primary_key = Some(PrimaryKey {
            name: "roles_pkey".to_string(),
            columns: vec!["id".to_string()],
        });

        let mut user_roles = table(
            "user_roles",
            vec![
                column("user_id", Semantic::Int64),
                column("role_id", Semantic::Int64),
                column("granted_at", Semantic::Timestamp),
            ],
        );
        user_roles.primary_key = Some(PrimaryKey {
            name: "user_roles_pkey".to_string(),
            columns: vec!["user_id".to_string(), "role_id".to_string()],
        });
        user_roles.foreign_keys = vec![
            fk("user_roles_user_id_fkey", "user_id", "users", "id"),
            fk("user_roles_role_id_fkey", "role_id", "roles", "id"),
        ];

        let schema = Schema {
            tables: vec![users, roles, user_roles],
        }
        .finalize()
        .expect("consistent schema must finalize");

        assert!(!schema.get_table("user_roles").unwrap().is_join_table);
    }
}
