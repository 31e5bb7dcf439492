//! Per-installation display preferences (`<home>/prefs.json`).

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lock::write_atomic;

const PREFS_FILENAME: &str = "prefs.json";

/// How `list` renders tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    List,
    Card,
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            View::List => "list",
            View::Card => "card",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for View {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "list" => Ok(View::List),
            "card" => Ok(View::Card),
            other => Err(Error::InvalidArgument(format!(
                "invalid view '{other}': must be list or card"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub view: View,
}

pub fn prefs_path(home: &Path) -> PathBuf {
    home.join(PREFS_FILENAME)
}

impl Preferences {
    /// Load saved preferences. A corrupt file is deleted and defaults returned.
    pub fn load(home: &Path) -> Result<Self> {
        let path = prefs_path(home);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_str(&raw) {
            Ok(prefs) => Ok(prefs),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "clearing corrupt preferences");
                std::fs::remove_file(&path)?;
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self, home: &Path) -> Result<()> {
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');
        write_atomic(prefs_path(home), &bytes)
    }
}
