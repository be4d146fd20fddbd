use assert_cmd::Command;

#[test]
fn help_describes_the_tool() {
    let output = Command::cargo_bin("modelgen")
        .expect("binary builds")
        .arg("--help")
        .output()
        .expect("help runs");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("data-access layer"));
    assert!(stdout.contains("--no-hooks"));
    assert!(stdout.contains("--wipe"));
}

#[test]
fn missing_driver_argument_fails_with_usage() {
    let output = Command::cargo_bin("modelgen")
        .expect("binary builds")
        .output()
        .expect("command runs");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage:"));
}

#[test]
fn unresolvable_driver_reports_a_classified_error() {
    let output = Command::cargo_bin("modelgen")
        .expect("binary builds")
        .args(["definitely-not-a-real-engine", "--host", "localhost"])
        .output()
        .expect("command runs");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no driver executable found for 'definitely-not-a-real-engine'"));
}

#[cfg(unix)]
#[test]
fn stub_driver_generates_a_complete_tree() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().expect("tempdir");
    let driver = dir.path().join("modelgen-driver-stub");
    let response = r#"{"kind":"schema","tables":[
        {"name":"users",
         "columns":[{"name":"id","db_type":"bigint","semantic":"Int64"},
                    {"name":"name","db_type":"text","semantic":"Text"}],
         "primary_key":{"name":"users_pkey","columns":["id"]}},
        {"name":"posts",
         "columns":[{"name":"id","db_type":"bigint","semantic":"Int64"},
                    {"name":"user_id","db_type":"bigint","semantic":"Int64"},
                    {"name":"title","db_type":"text","semantic":"Text"}],
         "primary_key":{"name":"posts_pkey","columns":["id"]},
         "foreign_keys":[{"name":"posts_user_id_fkey","column":"user_id",
                          "foreign_table":"users","foreign_column":"id"}]}
    ]}"#;
    std::fs::write(
        &driver,
        format!("#!/bin/sh\ncat > /dev/null\necho '{}'\n", response.replace('\n', " ")),
    )
    .expect("stub script written");
    std::fs::set_permissions(&driver, std::fs::Permissions::from_mode(0o755))
        .expect("stub marked executable");

    let out = dir.path().join("models");
    let output = Command::cargo_bin("modelgen")
        .expect("binary builds")
        .args([driver.to_str().unwrap(), "--output", out.to_str().unwrap()])
        .output()
        .expect("command runs");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stderr: {stderr}");

    let user = std::fs::read_to_string(out.join("user.rs")).expect("user.rs written");
    assert!(user.contains("pub struct User {"));
    assert!(user.contains("pub fn posts(&self"));
    assert!(std::fs::read_to_string(out.join("post.rs"))
        .expect("post.rs written")
        .contains("pub fn user(&self"));
    assert!(out.join("mod.rs").exists());
    assert!(out.join("helpers.rs").exists());
}

#[test]
fn malformed_driver_option_is_rejected_before_launch() {
    let output = Command::cargo_bin("modelgen")
        .expect("binary builds")
        .args(["postgres", "--driver-option", "no-equals-sign"])
        .output()
        .expect("command runs");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no-equals-sign"));
}
