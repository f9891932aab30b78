use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::{KeyValueStore, StoreError};

/// Directory-backed store: one file per key.
///
/// Writes land in a sibling temp file which is then renamed over the
/// target, so readers see either the old value or the new one.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key))
    }
}

fn replace_via(tmp: &Path, path: &Path, value: &str) -> io::Result<()> {
    let mut file = fs::File::create(tmp)?;
    file.write_all(value.as_bytes())?;
    file.sync_all()?;
    drop(file);
    fs::rename(tmp, path)
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let write_err = |source| StoreError::Write {
            key: key.to_string(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(write_err)?;

        let tmp = self.dir.join(format!(".{key}.tmp"));
        if let Err(source) = replace_via(&tmp, &path, value) {
            match fs::remove_file(&tmp) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => {
                    tracing::warn!(key, "could not remove temp file: {e}");
                }
                _ => {}
            }
            return Err(write_err(source));
        }
        tracing::trace!(key, bytes = value.len(), "wrote store key");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Write {
                key: key.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_directory_reads_as_absent() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().join("not-yet"));
        assert_eq!(store.get("projects").unwrap(), None);
    }

    #[test]
    fn set_then_get_returns_value() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().join("store"));
        store.set("projects", "[1,2]").unwrap();
        assert_eq!(store.get("projects").unwrap().as_deref(), Some("[1,2]"));
        assert!(tmp.path().join("store/projects").exists());
    }

    #[test]
    fn set_overwrites_whole_value_and_leaves_no_temp_file() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path());
        store.set("tasks", "a much longer first value").unwrap();
        store.set("tasks", "short").unwrap();
        assert_eq!(store.get("tasks").unwrap().as_deref(), Some("short"));
        assert!(!tmp.path().join(".tasks.tmp").exists());
    }

    #[test]
    fn failed_rename_cleans_up_temp_file() {
        let tmp = TempDir::new().unwrap();
        // A non-empty directory at the target path makes the rename fail.
        fs::create_dir_all(tmp.path().join("projects/blocker")).unwrap();
        let store = FileStore::new(tmp.path());

        let err = store.set("projects", "[]").unwrap_err();
        assert!(matches!(err, StoreError::Write { ref key, .. } if key == "projects"));
        assert!(!tmp.path().join(".projects.tmp").exists());
        assert!(tmp.path().join("projects/blocker").is_dir());
    }

    #[test]
    fn remove_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path());
        store.set("currentStory", "sty-1").unwrap();
        store.remove("currentStory").unwrap();
        store.remove("currentStory").unwrap();
        assert_eq!(store.get("currentStory").unwrap(), None);
    }

    #[test]
    fn path_like_keys_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path());
        for key in ["", "../escape", "a/b", ".hidden"] {
            assert!(
                matches!(store.set(key, "x"), Err(StoreError::InvalidKey(_))),
                "key {key:?} should be rejected"
            );
        }
    }

    #[test]
    fn unreadable_entry_is_a_read_error() {
        let tmp = TempDir::new().unwrap();
        // A directory where a file is expected cannot be read as a string.
        fs::create_dir_all(tmp.path().join("stories")).unwrap();
        let store = FileStore::new(tmp.path());
        assert!(matches!(store.get("stories"), Err(StoreError::Read { .. })));
    }
}
