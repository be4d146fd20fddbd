//! End-to-end pipeline tests over in-memory schemas: render, aliasing,
//! relationships, feature flags, and output-tree behavior.

use modelgen_core::{Config, Error, Features, State};
use modelgen_schema::node::{Column, ForeignKey, PrimaryKey, Schema, Table};
use modelgen_schema::types::Semantic;
use std::path::Path;

fn column(name: &str, semantic: Semantic) -> Column {
    Column {
        name: name.to_string(),
        db_type: "sql".to_string(),
        semantic,
        nullable: false,
        default: None,
        unique: false,
        auto_generated: false,
    }
}

fn keyed(name: &str, extra: Vec<Column>) -> Table {
    let mut columns = vec![column("id", Semantic::Int64)];
    columns.extend(extra);
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

fn fk(table: &str, col: &str, foreign: &str) -> ForeignKey {
    ForeignKey {
        name: format!("{table}_{col}_fkey"),
        column: col.to_string(),
        foreign_table: foreign.to_string(),
        foreign_column: "id".to_string(),
        on_delete: Default::default(),
        on_update: Default::default(),
    }
}

fn users_posts() -> Schema {
    let users = keyed("users", vec![column("name", Semantic::Text)]);
    let mut posts = keyed(
        "posts",
        vec![
            column("user_id", Semantic::Int64),
            column("title", Semantic::Text),
        ],
    );
    posts.foreign_keys = vec![fk("posts", "user_id", "users")];

    Schema {
        tables: vec![users, posts],
    }
}

fn user_roles() -> Schema {
    let users = keyed("users", vec![column("name", Semantic::Text)]);
    let roles = keyed("roles", vec![column("label", Semantic::Text)]);
    let mut link = Table {
        name: "user_roles".to_string(),
        columns: vec![
            column("user_id", Semantic::Int64),
            column("role_id", Semantic::Int64),
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
    link.foreign_keys = vec![
        fk("user_roles", "user_id", "users"),
        fk("user_roles", "role_id", "roles"),
    ];

    Schema {
        tables: vec![users, roles, link],
    }
}

fn config(out: &Path) -> Config {
    Config::new("unused", out)
}

fn minimal_features() -> Features {
    Features {
        tests: false,
        hooks: false,
        timestamps: false,
        context: false,
    }
}

fn contents<'a>(files: &'a [modelgen_core::render::RenderedFile], name: &str) -> &'a str {
    files
        .iter()
        .find(|f| f.path == Path::new(name))
        .unwrap_or_else(|| panic!("expected rendered file '{name}'"))
        .contents
        .as_str()
}

#[test]
fn users_posts_renders_entities_and_relationships() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = config(&dir.path().join("models"));
    config.features = minimal_features();

    let state = State::from_schema(config, users_posts()).expect("consistent schema");
    let (files, _) = state.render().expect("rendering must succeed");

    let names: Vec<_> = files.iter().map(|f| f.path.display().to_string()).collect();
    assert_eq!(names, ["helpers.rs", "mod.rs", "post.rs", "user.rs"]);

    let user = contents(&files, "user.rs");
    assert!(user.contains("pub struct User {"));
    assert!(user.contains("pub fn posts(&self"), "to-many accessor on User");

    let post = contents(&files, "post.rs");
    assert!(post.contains("pub struct Post {"));
    assert!(post.contains("pub fn user(&self"), "to-one accessor on Post");
    assert!(post.contains("UserQuery::new().filter_id(self.user_id"));

    let root = contents(&files, "mod.rs");
    assert!(root.contains("pub mod post;"));
    assert!(root.contains("pub use self::user::{User, UserQuery};"));
}

#[test]
fn disabled_features_leave_no_trace_in_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = config(&dir.path().join("models"));
    config.features = minimal_features();

    let state = State::from_schema(config, users_posts()).expect("consistent schema");
    let (files, imports) = state.render().expect("rendering must succeed");

    for file in &files {
        assert!(!file.contents.contains("Hook"), "{}: hooks are off", file.path.display());
        assert!(!file.contents.contains("#[cfg(test)]"), "tests are off");
        assert!(!file.contents.contains("Context"), "context is off");
    }

    // no unused imports: nothing here uses a codec crate or the hook runtime
    let user = contents(&files, "user.rs");
    assert!(!user.contains("use chrono"));
    assert!(!user.contains("use std::sync"));
    assert!(imports.test.is_empty());
}

#[test]
fn enabled_features_render_their_sections() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = config(&dir.path().join("models"));
    config.features = Features::default();

    let mut schema = users_posts();
    schema.tables[0]
        .columns
        .push(column("created_at", Semantic::Timestamp));
    schema.tables[0]
        .columns
        .push(column("updated_at", Semantic::Timestamp));

    let state = State::from_schema(config, schema).expect("consistent schema");
    let (files, imports) = state.render().expect("rendering must succeed");

    let user = contents(&files, "user.rs");
    assert!(user.contains("pub enum UserHook {"));
    assert!(user.contains("register_user_hook"));
    assert!(user.contains("use chrono::{DateTime, Utc};"));
    assert!(user.contains("self.created_at = now;"));
    assert!(user.contains("self.updated_at = now;"));
    assert!(user.contains("#[cfg(test)]"));
    assert!(user.contains("fn user_round_trips_through_serde()"));
    assert!(user.contains("ctx: &Context"));

    // the timestamp codec flows into the run-level collection exactly once
    assert!(imports.main.third_party.contains("chrono::{DateTime, Utc}"));

    // posts has no timestamp columns, so no codec import there
    let post = contents(&files, "post.rs");
    assert!(!post.contains("use chrono"));
}

#[test]
fn join_table_generates_accessors_not_an_entity() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = config(&dir.path().join("models"));
    config.features = minimal_features();

    let state = State::from_schema(config, user_roles()).expect("consistent schema");
    assert!(
        state
            .schema()
            .get_table("user_roles")
            .expect("table present")
            .is_join_table
    );

    let (files, _) = state.render().expect("rendering must succeed");

    let names: Vec<_> = files.iter().map(|f| f.path.display().to_string()).collect();
    assert_eq!(names, ["helpers.rs", "mod.rs", "role.rs", "user.rs"]);

    let user = contents(&files, "user.rs");
    assert!(user.contains("pub fn roles(&self"), "many-to-many accessor on User");
    assert!(user.contains("table: \"user_roles\""));

    let role = contents(&files, "role.rs");
    assert!(role.contains("pub fn users(&self"), "many-to-many accessor on Role");
}

#[test]
fn rendering_is_reproducible_byte_for_byte() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = config(&dir.path().join("models"));
    config.features = Features::default();

    let state = State::from_schema(config, user_roles()).expect("consistent schema");
    let (first, _) = state.render().expect("rendering must succeed");
    let (second, _) = state.render().expect("rendering must succeed");

    assert_eq!(first, second);
}

#[test]
fn run_writes_the_complete_tree() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("models");
    let mut config = config(&out);
    config.features = minimal_features();

    let state = State::from_schema(config, users_posts()).expect("consistent schema");
    let report = state.run().expect("run must succeed");

    assert_eq!(report.tables, 2);
    assert_eq!(report.files, 4);
    assert!(out.join("user.rs").exists());
    assert!(out.join("helpers.rs").exists());
}

#[test]
fn failed_rendering_leaves_a_wiped_destination_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("models");
    std::fs::create_dir_all(&out).unwrap();
    std::fs::write(out.join("previous.rs"), "pub struct Previous;\n").unwrap();

    let mut config = config(&out);
    config.wipe = true;

    let mut state = State::from_schema(config, users_posts()).expect("consistent schema");
    state
        .override_template("entity", |_| Err("boom".to_string()))
        .expect("entity is a known artifact");

    let err = state.run().expect_err("rendering failure must abort the run");
    assert!(matches!(err, Error::Render { artifact, .. } if artifact == "entity"));

    // the destructive clean must not have run
    assert!(out.join("previous.rs").exists());
}

#[test]
fn replacement_text_substitutes_a_named_artifact() {
    let dir = tempfile::tempdir().expect("tempdir");
    let replacement = dir.path().join("entity.rs.tpl");
    std::fs::write(&replacement, "// replaced entity section\n").unwrap();

    let mut config = config(&dir.path().join("models"));
    config.features = minimal_features();
    config
        .replacements
        .insert("entity".to_string(), replacement);

    let state = State::from_schema(config, users_posts()).expect("consistent schema");
    let (files, _) = state.render().expect("rendering must succeed");

    let user = contents(&files, "user.rs");
    assert!(user.contains("// replaced entity section"));
    assert!(!user.contains("pub struct User {"));
}

#[test]
fn unknown_replacement_artifact_is_a_config_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let replacement = dir.path().join("x.tpl");
    std::fs::write(&replacement, "x").unwrap();

    let mut config = config(&dir.path().join("models"));
    config
        .replacements
        .insert("nonexistent".to_string(), replacement);

    let err = State::from_schema(config, users_posts())
        .expect_err("unknown artifact name must be rejected");
    assert!(matches!(err, Error::Config { reason } if reason.contains("nonexistent")));
}
