#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// Calendar day pinned for every CLI test.
pub const TODAY: &str = "2026-10-17";

pub const FILE_BACKEND_CONFIG: &str = r#"
[backend]
kind = "file"
project_id = "daily-tasks-test"
api_key = "test-key"
app_id = "test-app"
"#;

/// Isolated tasklog data directory.
pub struct TestHome {
    dir: TempDir,
}

impl TestHome {
    /// Empty home: no config, so the seeded mock backend is used.
    pub fn mock() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create tempdir"),
        }
    }

    /// Home configured for the on-disk document store.
    pub fn file_backed() -> Self {
        let home = Self::mock();
        home.write_config(FILE_BACKEND_CONFIG);
        home
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_config(&self, contents: &str) -> PathBuf {
        let path = self.dir.path().join("config.toml");
        fs::write(&path, contents.trim()).expect("write config");
        path
    }

    pub fn database_path(&self) -> PathBuf {
        self.dir.path().join("db").join("daily-tasks-test.json")
    }

    pub fn cmd(&self) -> Command {
        tasklog_cmd(self.path())
    }

    /// Run with `--json`, require success and return the `data` payload.
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .args(args)
            .arg("--json")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let envelope: Value = serde_json::from_slice(&output).expect("json envelope");
        assert_eq!(envelope["schema_version"], "tasklog.v1");
        assert_eq!(envelope["status"], "success");
        envelope["data"].clone()
    }

    /// Run with `--json`, require failure with `code` and return the error body.
    pub fn json_error(&self, args: &[&str], code: i32) -> Value {
        let output = self
            .cmd()
            .args(args)
            .arg("--json")
            .assert()
            .code(code)
            .get_output()
            .stdout
            .clone();
        let envelope: Value = serde_json::from_slice(&output).expect("json envelope");
        assert_eq!(envelope["status"], "error");
        envelope["error"].clone()
    }

    /// Register `email` (password `secret123`) and leave it signed in.
    pub fn register(&self, email: &str) -> String {
        let data = self.json(&[
            "register",
            "--email",
            email,
            "--password",
            "secret123",
            "--confirm",
            "secret123",
        ]);
        data["user"]["uid"].as_str().expect("uid").to_string()
    }

    /// Add a task and return its id.
    pub fn add_task(&self, args: &[&str]) -> String {
        let mut full = vec!["add"];
        full.extend_from_slice(args);
        let data = self.json(&full);
        data["task"]["id"].as_str().expect("task id").to_string()
    }
}

pub fn tasklog_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tasklog").expect("binary");
    cmd.env("TASKLOG_HOME", home)
        .env("TASKLOG_TODAY", TODAY)
        .env_remove("RUST_LOG")
        .current_dir(home);
    cmd
}
