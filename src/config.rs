//! Mapty configuration.
//!
//! Loaded from `~/.mapty/config.toml` when present. Every key is optional.
//!
//! The data directory is resolved through a chain:
//!
//! 1. `--data-dir <path>`: explicit per-command override
//! 2. `MAPTY_DATA_DIR` env var
//! 3. `data-dir` in the config file
//! 4. `~/.mapty`

use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::{Deserialize, Serialize};

use crate::storage::{DEFAULT_KEY, is_valid_key};

/// Mapty configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Where workouts are stored.
    pub data_dir: Option<PathBuf>,

    /// The storage key holding the workout collection.
    pub storage_key: Option<String>,
}

impl Config {
    /// Load config from `~/.mapty/config.toml`, or defaults if there is none.
    pub fn load() -> Result<Self, String> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from `path`, or defaults if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
        };

        let config: Self = toml::from_str(&contents)
            .map_err(|e| format!("invalid config at {}: {e}", path.display()))?;

        if let Some(key) = config.storage_key.as_deref()
            && !is_valid_key(key)
        {
            return Err(format!(
                "invalid storage-key {key:?} in {}\n\
                 Use only letters, digits, `-` and `_`.",
                path.display()
            ));
        }

        Ok(config)
    }

    /// The config file path: `~/.mapty/config.toml`.
    pub fn path() -> Option<PathBuf> {
        home().map(|h| h.join("config.toml"))
    }

    /// The storage key, falling back to `"workouts"`.
    pub fn storage_key(&self) -> &str {
        self.storage_key.as_deref().unwrap_or(DEFAULT_KEY)
    }

    /// Resolve the data directory from the chain described in the module docs.
    pub fn resolve_data_dir(&self, explicit: Option<&Path>) -> Result<PathBuf, String> {
        if let Some(dir) = explicit {
            return Ok(dir.to_path_buf());
        }

        if let Ok(dir) = env::var("MAPTY_DATA_DIR")
            && !dir.is_empty()
        {
            return Ok(PathBuf::from(dir));
        }

        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }

        home().ok_or_else(|| "could not determine home directory".to_string())
    }
}

fn home() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".mapty"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();

        assert!(config.data_dir.is_none());
        assert_eq!(config.storage_key(), "workouts");
    }

    #[test]
    fn reads_kebab_case_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "data-dir = \"/tmp/mapty\"\nstorage-key = \"log\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/mapty")));
        assert_eq!(config.storage_key(), "log");
    }

    #[test]
    fn rejects_unknown_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "storage = \"log\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.contains("invalid config"));
    }

    #[test]
    fn rejects_empty_storage_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "storage-key = \"\"\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn rejects_storage_key_with_path_separators() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        for key in ["../x", "a/b"] {
            fs::write(&path, format!("storage-key = \"{key}\"\n")).unwrap();
            let err = Config::load_from(&path).unwrap_err();
            assert!(err.contains("invalid storage-key"));
        }
    }

    #[test]
    fn explicit_data_dir_wins() {
        // An explicit directory is returned without consulting env or config.
        let config = Config {
            data_dir: Some(PathBuf::from("/from/config")),
            storage_key: None,
        };
        let dir = config
            .resolve_data_dir(Some(Path::new("/from/flag")))
            .unwrap();
        assert_eq!(dir, PathBuf::from("/from/flag"));
    }
}
