use anyhow::{Context, Result};
use std::{ffi::OsString, path::PathBuf, time::Duration};
use tracing::level_filters::LevelFilter;

use crate::state::FileStateStore;

const PROFILE_FILE: &str = "azureProfile.json";
const STATE_FILE: &str = ".aztx.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    pub fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

/// Runtime settings for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub profile_path: PathBuf,
    pub state_path: PathBuf,
    pub log_level: LogLevel,
    pub timeout: Option<Duration>,
}

/// Values already taken from flags or `AZTX_*` variables.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub profile_file: Option<PathBuf>,
    pub state_file: Option<PathBuf>,
    pub log_level: Option<LogLevel>,
    pub timeout_secs: Option<u64>,
}

impl Settings {
    pub fn resolve(overrides: Overrides) -> Result<Self> {
        let profile_path = match overrides.profile_file {
            Some(path) => path,
            None => profile_path_from(std::env::var_os("AZURE_CONFIG_DIR"), dirs::home_dir())?,
        };
        let state_path = match overrides.state_file {
            Some(path) => path,
            None => home()?.join(STATE_FILE),
        };

        // The state file may also carry a preferred log level.
        let stored_level = FileStateStore::new(&state_path)
            .load()
            .ok()
            .and_then(|s| s.log_level);
        let log_level = log_level_from(overrides.log_level, stored_level.as_deref());

        Ok(Settings {
            profile_path,
            state_path,
            log_level,
            timeout: overrides.timeout_secs.map(Duration::from_secs),
        })
    }
}

fn home() -> Result<PathBuf> {
    dirs::home_dir().context("Cannot find home directory")
}

/// `$AZURE_CONFIG_DIR/azureProfile.json`, else `~/.azure/azureProfile.json`.
pub fn profile_path_from(config_dir: Option<OsString>, home: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = config_dir.filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir).join(PROFILE_FILE));
    }
    let home = home.context("Cannot find home directory")?;
    Ok(home.join(".azure").join(PROFILE_FILE))
}

pub fn log_level_from(explicit: Option<LogLevel>, stored: Option<&str>) -> LogLevel {
    explicit
        .or_else(|| stored.and_then(LogLevel::parse))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn azure_config_dir_wins() {
        let path = profile_path_from(
            Some(OsString::from("/opt/az")),
            Some(PathBuf::from("/home/me")),
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/opt/az/azureProfile.json"));
    }

    #[test]
    fn falls_back_to_home() {
        let path =
            profile_path_from(Some(OsString::new()), Some(PathBuf::from("/home/me"))).unwrap();
        assert_eq!(path, PathBuf::from("/home/me/.azure/azureProfile.json"));
        assert!(profile_path_from(None, None).is_err());
    }

    #[test]
    fn log_level_precedence() {
        assert_eq!(log_level_from(Some(LogLevel::Error), Some("debug")), LogLevel::Error);
        assert_eq!(log_level_from(None, Some("DEBUG")), LogLevel::Debug);
        assert_eq!(log_level_from(None, Some("loud")), LogLevel::Info);
        assert_eq!(log_level_from(None, None), LogLevel::Info);
    }

    #[test]
    fn resolve_reads_level_from_state_file() {
        let dir = TempDir::new().unwrap();
        let state = dir.path().join(".aztx.json");
        fs::write(&state, r#"{"logLevel":"warn"}"#).unwrap();

        let settings = Settings::resolve(Overrides {
            profile_file: Some(dir.path().join("azureProfile.json")),
            state_file: Some(state.clone()),
            log_level: None,
            timeout_secs: Some(5),
        })
        .unwrap();

        assert_eq!(settings.log_level, LogLevel::Warn);
        assert_eq!(settings.state_path, state);
        assert_eq!(settings.timeout, Some(Duration::from_secs(5)));
    }
}
