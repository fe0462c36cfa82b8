use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    types::{validate_configuration, Configuration},
};

const BOM: &str = "\u{feff}";

/// Where the profile document lives and how it is encoded is up to the
/// implementation; callers only ever load and store it wholesale.
pub trait ProfileStore {
    fn read(&self) -> Result<Configuration>;
    fn write(&self, config: &Configuration) -> Result<()>;
}

pub struct FileProfileStore {
    path: PathBuf,
}

impl FileProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_failure(&self, reason: impl ToString) -> Error {
        Error::ReadFailure {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

impl ProfileStore for FileProfileStore {
    fn read(&self) -> Result<Configuration> {
        debug!(path = %self.path.display(), "reading azure profile");
        let content = fs::read_to_string(&self.path).map_err(|e| self.read_failure(e))?;
        let config = decode(&content).map_err(|e| self.read_failure(e))?;
        if let Err(e) = validate_configuration(Some(&config)) {
            warn!(path = %self.path.display(), "profile has incomplete records: {e}");
        }
        Ok(config)
    }

    fn write(&self, config: &Configuration) -> Result<()> {
        debug!(path = %self.path.display(), "writing azure profile");
        let content = serde_json::to_string_pretty(config).map_err(|e| Error::WriteFailure {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        write_atomic(&self.path, &content).map_err(|e| Error::WriteFailure {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }
}

/// The Azure CLI writes its profile with a UTF-8 byte-order mark.
pub fn decode(content: &str) -> serde_json::Result<Configuration> {
    serde_json::from_str(content.strip_prefix(BOM).unwrap_or(content))
}

/// Atomically write a JSON file: validate → temp file → rename → chmod 600.
pub fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    // Validate JSON before touching the real file
    let _: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension(format!("tmp.{}", std::process::id()));

    {
        let mut f = fs::File::create(&temp_path)?;
        f.write_all(content.as_bytes())?;
        f.flush()?;
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    #[cfg(unix)]
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;

    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::*;
    use tempfile::TempDir;

    #[test]
    fn reads_profile_with_bom() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("azureProfile.json");
        let json = serde_json::to_string(&configuration(vec![subscription(
            1, "dev", 10, "alice", true,
        )]))
        .unwrap();
        fs::write(&path, format!("{BOM}{json}")).unwrap();

        let config = FileProfileStore::new(&path).read().unwrap();
        assert_eq!(config.subscriptions[0].name, "dev");
    }

    #[test]
    fn missing_file_is_read_failure() {
        let dir = TempDir::new().unwrap();
        let store = FileProfileStore::new(dir.path().join("nope.json"));
        assert!(matches!(store.read(), Err(Error::ReadFailure { .. })));
    }

    #[test]
    fn malformed_json_is_read_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("azureProfile.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            FileProfileStore::new(&path).read(),
            Err(Error::ReadFailure { .. })
        ));
    }

    #[test]
    fn write_then_read_preserves_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("azureProfile.json");
        let store = FileProfileStore::new(&path);
        let config = configuration(vec![
            subscription(1, "dev", 10, "alice", false),
            subscription(2, "prod", 11, "bob", true),
        ]);

        store.write(&config).unwrap();
        assert_eq!(store.read().unwrap(), config);

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\n  \"installationId\""));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn written_profile_is_private() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("azureProfile.json");
        write_atomic(&path, "{}").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn refuses_to_write_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("azureProfile.json");
        assert!(write_atomic(&path, "{").is_err());
        assert!(!path.exists());
    }
}
