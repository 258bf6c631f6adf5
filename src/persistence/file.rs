//! One JSON file per key in a directory

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::KeyValueStore;
use crate::error::StoreError;

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(json) => Ok(Some(json)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        // Write beside the target, then rename over it
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        log::debug!("wrote {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("shape-match-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_missing_key_reads_none() {
        let store = FileStore::new(scratch_dir("missing"));
        assert_eq!(store.get("nothing").unwrap(), None);
    }

    #[test]
    fn test_write_then_read() {
        let dir = scratch_dir("roundtrip");
        let mut store = FileStore::new(&dir);
        store.set("scores", "[1,2,3]").unwrap();
        assert_eq!(store.get("scores").unwrap().as_deref(), Some("[1,2,3]"));
        assert!(dir.join("scores.json").exists());
        assert!(!dir.join("scores.json.tmp").exists());

        store.set("scores", "[]").unwrap();
        assert_eq!(store.get("scores").unwrap().as_deref(), Some("[]"));
        let _ = fs::remove_dir_all(&dir);
    }
}
