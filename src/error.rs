//! Error types for tasklog
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, invalid config, validation failure, unknown task)
//! - 3: Auth error (not signed in, bad credentials, rejected registration)
//! - 4: Operation failed (I/O, serialization, lock contention)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the tasklog CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const AUTH_ERROR: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for tasklog operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid task: {0}")]
    InvalidTask(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    // Auth errors (exit code 3)
    #[error("Please log in to {0}")]
    NotSignedIn(String),

    #[error("Invalid email or password combination.")]
    InvalidCredentials,

    #[error("An account with this email already exists: {0}")]
    EmailInUse(String),

    #[error("Registration rejected: {0}")]
    WeakCredentials(String),

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Corrupt document store {path}: {reason}")]
    CorruptStore { path: PathBuf, reason: String },

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::InvalidTask(_)
            | Error::TaskNotFound(_) => exit_codes::USER_ERROR,

            Error::NotSignedIn(_)
            | Error::InvalidCredentials
            | Error::EmailInUse(_)
            | Error::WeakCredentials(_) => exit_codes::AUTH_ERROR,

            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::LockFailed(_)
            | Error::CorruptStore { .. }
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured payload attached to JSON error output, when one applies.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::TaskNotFound(id) => Some(serde_json::json!({ "task_id": id })),
            Error::EmailInUse(email) => Some(serde_json::json!({ "email": email })),
            Error::LockFailed(path) => Some(serde_json::json!({ "lock": path })),
            Error::CorruptStore { path, .. } => Some(serde_json::json!({ "store": path })),
            _ => None,
        }
    }
}

/// Result type alias for tasklog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
