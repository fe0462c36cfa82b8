//! The side-channel record of the previously active subscription.
//!
//! Kept apart from the Azure profile in `~/.aztx.json`, which also carries
//! the user's preferred log level.

use std::{fs, io::ErrorKind, path::PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{Error, Result},
    profile::write_atomic,
};

/// Previous active subscription. Empty strings mean "none".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastContext {
    pub id: String,
    pub display_name: String,
}

impl LastContext {
    pub fn is_empty(&self) -> bool {
        self.id.is_empty() || self.display_name.is_empty()
    }
}

pub trait LastContextStore {
    fn get_last_context(&self) -> Result<LastContext>;
    fn set_last_context(&self, id: &str, display_name: &str) -> Result<()>;
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct StateFile {
    #[serde(rename = "lastContextId", default)]
    pub last_context_id: String,
    #[serde(rename = "lastContextDisplayName", default)]
    pub last_context_display_name: String,
    #[serde(rename = "lastUpdated", default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(rename = "logLevel", default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A missing file reads as an empty state.
    pub fn load(&self) -> Result<StateFile> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StateFile::default()),
            Err(e) => return Err(self.failure("read", e)),
        };
        if content.trim().is_empty() {
            return Ok(StateFile::default());
        }
        serde_json::from_str(&content).map_err(|e| self.failure("read", e))
    }

    fn save(&self, state: &StateFile) -> Result<()> {
        let content = serde_json::to_string_pretty(state).map_err(|e| self.failure("write", e))?;
        write_atomic(&self.path, &content).map_err(|e| self.failure("write", e))
    }

    fn failure(&self, op: &'static str, reason: impl ToString) -> Error {
        Error::StoreFailure {
            op,
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

impl LastContextStore for FileStateStore {
    fn get_last_context(&self) -> Result<LastContext> {
        let state = self.load()?;
        Ok(LastContext {
            id: state.last_context_id,
            display_name: state.last_context_display_name,
        })
    }

    fn set_last_context(&self, id: &str, display_name: &str) -> Result<()> {
        let mut state = self.load()?;
        state.last_context_id = id.to_string();
        state.last_context_display_name = display_name.to_string();
        state.last_updated = Some(Utc::now().to_rfc3339());
        debug!(id, display_name, "recording previous context");
        self.save(&state)
    }
}
