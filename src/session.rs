//! Signed-in user persistence.
//!
//! The current user is kept in `<home>/session.json` so that separate
//! `tasklog` invocations share one login. An unreadable session file counts
//! as signed out.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::User;
use crate::error::Result;
use crate::lock::write_atomic;

const SESSION_FILENAME: &str = "session.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: User,
    pub signed_in_at: DateTime<Utc>,
}

pub fn session_path(home: &Path) -> PathBuf {
    home.join(SESSION_FILENAME)
}

/// Load the persisted user, if any.
pub fn load(home: &Path) -> Option<Session> {
    let path = session_path(home);
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) => {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %err, "session file unreadable");
            }
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(session) => Some(session),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "ignoring corrupt session file");
            None
        }
    }
}

pub fn save(home: &Path, user: &User) -> Result<Session> {
    let session = Session {
        user: user.clone(),
        signed_in_at: Utc::now(),
    };
    let mut bytes = serde_json::to_vec_pretty(&session)?;
    bytes.push(b'\n');
    write_atomic(session_path(home), &bytes)?;
    Ok(session)
}

/// Remove the session. Returns whether one existed.
pub fn clear(home: &Path) -> Result<bool> {
    match std::fs::remove_file(session_path(home)) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err.into()),
    }
}
