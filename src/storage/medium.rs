//! Key/value storage media holding one text blob per key.

use std::{collections::HashMap, fs, io, path::PathBuf};

use super::is_valid_key;

/// A place to keep text blobs by key. Writes replace the whole value.
pub trait Medium {
    /// Returns the blob under `key`, or `None` if nothing was ever written.
    fn read(&self, key: &str) -> io::Result<Option<String>>;

    /// Replaces the blob under `key`.
    fn write(&mut self, key: &str, value: &str) -> io::Result<()>;
}

/// One `<key>.json` file per key inside a data directory.
#[derive(Debug)]
pub struct FileMedium {
    root: PathBuf,
}

impl FileMedium {
    /// Opens a medium rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path(&self, key: &str) -> io::Result<PathBuf> {
        if !is_valid_key(key) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid storage key: {key:?}"),
            ));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl Medium for FileMedium {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path(key)?) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    // Written beside the target and renamed over it so readers never see a partial blob.
    fn write(&mut self, key: &str, value: &str) -> io::Result<()> {
        let path = self.path(key)?;
        let tmp = self.root.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)
    }
}

/// Blobs kept in memory for the life of the process.
#[derive(Debug, Default)]
pub struct MemoryMedium {
    blobs: HashMap<String, String>,
}

impl MemoryMedium {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Medium for MemoryMedium {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.blobs.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
