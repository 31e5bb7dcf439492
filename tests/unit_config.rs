mod support;

use predicates::str::contains;
use serde_json::Value;

use support::TestHome;

#[test]
fn config_show_defaults_to_mock_backend() {
    let home = TestHome::mock();
    let data = home.json(&["config", "show"]);
    assert_eq!(data["backend"], "memory");
    assert_eq!(data["config_file_exists"], false);
    assert!(data.get("database").is_none());
    assert_eq!(data["tasks"]["default_category"], "work");
}

#[test]
fn commands_never_write_config_file() {
    let home = TestHome::mock();
    home.json(&["login", "--email", "demo@example.com", "--password", "demo123"]);
    home.json(&["view", "card"]);
    home.json(&["config", "show"]);
    assert!(!home.path().join("config.toml").exists());
    assert_eq!(home.json(&["config", "show"])["config_file_exists"], false);
}

#[test]
fn config_show_reports_file_backend() {
    let home = TestHome::file_backed();
    let data = home.json(&["config", "show"]);
    assert_eq!(data["backend"], "file");
    assert_eq!(
        data["database"].as_str().map(std::path::PathBuf::from),
        Some(home.database_path())
    );
}

#[test]
fn partial_credentials_fall_back_to_mock() {
    let home = TestHome::mock();
    home.write_config(
        r#"
[backend]
project_id = "p"
api_key = "k"
"#,
    );
    let data = home.json(&["config", "show"]);
    assert_eq!(data["backend"], "memory");
}

#[test]
fn invalid_config_is_a_user_error() {
    let home = TestHome::mock();
    home.write_config("[tasks]\ncategories = []");
    home.cmd()
        .arg("stats")
        .assert()
        .code(2)
        .stderr(contains("tasks.categories cannot be empty"))
        .stderr(contains("hint: fix config.toml"));
}

#[test]
fn file_backend_without_credentials_is_rejected() {
    let home = TestHome::mock();
    home.write_config("[backend]\nkind = \"file\"");
    let error: Value = home.json_error(&["config", "show"], 2);
    assert_eq!(error["kind"], "user_error");
    assert!(error["message"]
        .as_str()
        .unwrap_or_default()
        .contains("requires project_id"));
}

#[test]
fn custom_categories_are_enforced() {
    let home = TestHome::file_backed();
    let mut config = String::from(support::FILE_BACKEND_CONFIG);
    config.push_str("\n[tasks]\ncategories = [\"deep-work\", \"admin\"]\ndefault_category = \"admin\"\n");
    home.write_config(&config);
    home.register("cats@example.com");

    let id = home.add_task(&["Inbox zero", "--time", "0.5"]);
    let data = home.json(&["show", &id]);
    assert_eq!(data["task"]["category"], "admin");

    home.cmd()
        .args(["add", "Gym", "--category", "health"])
        .assert()
        .code(2)
        .stderr(contains("unknown category 'health'"));
}

#[test]
fn invalid_today_override_is_rejected() {
    let home = TestHome::mock();
    home.cmd()
        .env("TASKLOG_TODAY", "17/10/2026")
        .arg("stats")
        .assert()
        .code(2)
        .stderr(contains("expected YYYY-MM-DD"));
}
