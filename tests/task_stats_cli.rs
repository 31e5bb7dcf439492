mod support;

use predicates::str::contains;
use serde_json::Value;

use support::TestHome;

#[test]
fn seeded_demo_account_stats() {
    let home = TestHome::mock();
    home.json(&["login", "--email", "demo@example.com", "--password", "demo123"]);

    let stats = home.json(&["stats"]);
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["completed"], 2);
    assert_eq!(stats["time_spent"], 7.0);
    assert_eq!(stats["streak"], 2);
    assert_eq!(stats["by_status"]["in-progress"], 1);
    assert_eq!(stats["by_category"]["work"], 2);
    assert_eq!(stats["by_category"]["health"], 1);
}

#[test]
fn stats_human_output() {
    let home = TestHome::mock();
    home.json(&["login", "--email", "demo@example.com", "--password", "demo123"]);

    home.cmd()
        .arg("stats")
        .assert()
        .success()
        .stdout(contains("- total tasks: 3"))
        .stdout(contains("- time spent: 7.0h"))
        .stdout(contains("- streak: 2 day(s)"));
}

#[test]
fn streak_stops_at_first_gap() {
    let home = TestHome::file_backed();
    home.register("streak@example.com");

    home.add_task(&["Today", "--time", "1"]);
    home.add_task(&["Yesterday", "--date", "2026-10-16", "--status", "completed"]);
    home.add_task(&["After gap", "--date", "2026-10-14", "--time", "0.25"]);
    home.add_task(&["Future", "--date", "2026-10-18"]);

    let stats = home.json(&["stats"]);
    assert_eq!(stats["total"], 4);
    assert_eq!(stats["completed"], 1);
    assert_eq!(stats["time_spent"], 1.25);
    assert_eq!(stats["streak"], 2);
}

#[test]
fn streak_is_zero_without_a_task_today() {
    let home = TestHome::file_backed();
    home.register("idle@example.com");
    home.add_task(&["Yesterday only", "--date", "2026-10-16"]);

    let stats = home.json(&["stats"]);
    assert_eq!(stats["streak"], 0);
    assert_eq!(stats["by_status"]["pending"], 1);
    assert_eq!(stats["by_status"]["completed"], 0);
}

#[test]
fn stats_for_new_account_are_empty() {
    let home = TestHome::file_backed();
    home.register("fresh@example.com");

    let stats = home.json(&["stats"]);
    assert_eq!(stats["total"], 0);
    assert_eq!(stats["time_spent"], 0.0);
    assert_eq!(stats["streak"], 0);
}

#[test]
fn earliest_calendar_day_does_not_crash() {
    let home = TestHome::mock();
    let first = chrono::NaiveDate::MIN.format("%Y-%m-%d").to_string();
    let run = |args: &[&str]| -> Value {
        let output = home
            .cmd()
            .env("TASKLOG_TODAY", &first)
            .args(args)
            .arg("--json")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let envelope: Value = serde_json::from_slice(&output).expect("json envelope");
        envelope["data"].clone()
    };

    run(&["login", "--email", "demo@example.com", "--password", "demo123"]);
    let stats = run(&["stats"]);
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["streak"], 1);
    assert_eq!(run(&["list", "--date", "yesterday"])["total"], 0);
    assert_eq!(run(&["list", "--date", "week"])["total"], 3);
    assert_eq!(run(&["list", "--date", "month"])["total"], 3);
}
