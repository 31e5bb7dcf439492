mod support;

use predicates::str::contains;

use support::TestHome;

#[test]
fn demo_account_signs_in_on_mock_backend() {
    let home = TestHome::mock();
    let data = home.json(&["login", "--email", "demo@example.com", "--password", "demo123"]);
    assert_eq!(data["user"]["uid"], "user3");
    assert_eq!(data["user"]["displayName"], "Demo User");
    assert_eq!(data["mock_backend"], true);

    let whoami = home.json(&["whoami"]);
    assert_eq!(whoami["signed_in"], true);
    assert_eq!(whoami["user"]["email"], "demo@example.com");
}

#[test]
fn login_email_is_case_insensitive() {
    let home = TestHome::mock();
    let data = home.json(&["login", "--email", "Demo@Example.com", "--password", "demo123"]);
    assert_eq!(data["user"]["uid"], "user3");
}

#[test]
fn wrong_password_is_an_auth_error() {
    let home = TestHome::mock();
    let error = home.json_error(
        &["login", "--email", "demo@example.com", "--password", "nope"],
        3,
    );
    assert_eq!(error["kind"], "auth_error");
    assert_eq!(error["message"], "Invalid email or password combination.");

    let whoami = home.json(&["whoami"]);
    assert_eq!(whoami["signed_in"], false);
}

#[test]
fn task_commands_require_sign_in() {
    let home = TestHome::mock();
    home.cmd()
        .arg("list")
        .assert()
        .code(3)
        .stderr(contains("Please log in to view tasks"))
        .stderr(contains("hint: tasklog login"));

    let error = home.json_error(&["add", "Write report"], 3);
    assert_eq!(error["message"], "Please log in to add tasks");
}

#[test]
fn registration_validation() {
    let home = TestHome::mock();

    let mismatch = home.json_error(
        &["register", "--email", "a@b.co", "--password", "abc123", "--confirm", "abc124"],
        2,
    );
    assert_eq!(mismatch["message"], "Passwords do not match");

    let invalid = home.json_error(
        &["register", "--email", "not-an-email", "--password", "abc123", "--confirm", "abc123"],
        2,
    );
    assert_eq!(invalid["message"], "Please enter a valid email address");

    let short = home.json_error(
        &["register", "--email", "a@b.co", "--password", "ab1", "--confirm", "ab1"],
        3,
    );
    assert!(short["message"].as_str().unwrap_or_default().contains("at least"));

    let weak = home.json_error(
        &["register", "--email", "a@b.co", "--password", "abcdefgh", "--confirm", "abcdefgh"],
        3,
    );
    assert!(weak["message"]
        .as_str()
        .unwrap_or_default()
        .contains("one letter and one number"));
}

#[test]
fn registered_account_survives_logout_on_file_backend() {
    let home = TestHome::file_backed();
    let uid = home.register("Sam@Example.com");
    assert!(uid.starts_with("user_"));
    assert!(home.database_path().exists());

    let logout = home.json(&["logout"]);
    assert_eq!(logout["signed_out"], true);
    assert_eq!(home.json(&["whoami"])["signed_in"], false);

    let again = home.json(&["logout"]);
    assert_eq!(again["signed_out"], false);

    let login = home.json(&["login", "--email", "sam@example.com", "--password", "secret123"]);
    assert_eq!(login["user"]["uid"], uid.as_str());
    assert_eq!(login["user"]["email"], "sam@example.com");
    assert_eq!(login["mock_backend"], false);
}

#[test]
fn duplicate_registration_is_rejected() {
    let home = TestHome::file_backed();
    home.register("dup@example.com");

    let error = home.json_error(
        &[
            "register",
            "--email",
            "dup@example.com",
            "--password",
            "other123",
            "--confirm",
            "other123",
        ],
        3,
    );
    assert_eq!(error["kind"], "auth_error");
}

#[test]
fn google_sign_in_creates_a_profile() {
    let home = TestHome::file_backed();
    let data = home.json(&["login-google"]);
    let uid = data["user"]["uid"].as_str().expect("uid");
    assert!(uid.starts_with("google_"));
    assert_eq!(data["user"]["provider"], "google");

    let whoami = home.json(&["whoami"]);
    assert_eq!(whoami["user"]["uid"], uid);
}

#[test]
fn corrupt_session_reads_as_signed_out() {
    let home = TestHome::mock();
    std::fs::write(home.path().join("session.json"), "{not json").expect("write session");
    assert_eq!(home.json(&["whoami"])["signed_in"], false);
}

#[test]
fn google_sign_in_keeps_tasks_across_sessions() {
    let home = TestHome::file_backed();
    let first = home.json(&["login-google"]);
    let uid = first["user"]["uid"].as_str().expect("uid").to_string();
    home.add_task(&["Google task"]);
    home.json(&["logout"]);

    let second = home.json(&["login-google"]);
    assert_eq!(second["user"]["uid"], uid.as_str());
    let list = home.json(&["list"]);
    assert_eq!(list["total"], 1);
    assert_eq!(list["tasks"][0]["title"], "Google task");
}
