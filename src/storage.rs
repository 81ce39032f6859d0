//! Atomic JSON file persistence for the local backend.

use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::crypto::secure_random;

/// A single JSON document on disk.
///
/// Writes go through a sibling temp file that is synced and then renamed
/// over the target, so a crash leaves either the old or the new document.
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and deserializes the document, `None` if it was never written.
    pub fn load<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        if !self.exists() {
            return Ok(None);
        }
        let data = fs::read(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let value = serde_json::from_slice(&data)
            .with_context(|| format!("corrupted document {}", self.path.display()))?;
        Ok(Some(value))
    }

    /// Serializes and atomically replaces the document.
    ///
    /// Creates parent directories if they don't exist.
    pub fn save<T: Serialize>(&self, value: &T) -> Result<()> {
        let data = serde_json::to_vec_pretty(value)?;
        self.write_atomic(&data)
    }

    /// Deletes the document. Missing files are not an error.
    pub fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("failed to remove file"),
        }
    }

    fn write_atomic(&self, data: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.random_tmp_path()?;

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut tmp_file = options
            .open(&tmp_path)
            .context("failed to create temporary file")?;

        tmp_file.write_all(data)?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        if let Err(e) = self.atomic_replace(&tmp_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        if let Some(parent) = self.path.parent() {
            let dir = File::open(parent)?;
            dir.sync_all()?;
        }

        debug!(path = %self.path.display(), bytes = data.len(), "document saved");
        Ok(())
    }

    /// `filename.tmp.<randomhex>` next to the target.
    fn random_tmp_path(&self) -> Result<PathBuf> {
        let mut buf = [0u8; 8];
        secure_random(&mut buf)?;

        let file_name = self
            .path
            .file_name()
            .context("storage path has no file name")?
            .to_string_lossy();

        Ok(self
            .path
            .with_file_name(format!("{}.tmp.{}", file_name, hex::encode(buf))))
    }

    #[cfg(target_os = "windows")]
    fn atomic_replace(&self, tmp_path: &Path) -> Result<()> {
        use std::ffi::OsStr;
        use std::os::windows::ffi::OsStrExt;
        use windows_sys::Win32::Storage::FileSystem::{
            MOVEFILE_REPLACE_EXISTING, MOVEFILE_WRITE_THROUGH, MoveFileExW,
        };

        fn to_wide(s: &OsStr) -> Vec<u16> {
            s.encode_wide().chain(std::iter::once(0)).collect()
        }

        let target_w = to_wide(self.path.as_os_str());
        let tmp_w = to_wide(tmp_path.as_os_str());

        // SAFETY: both buffers are null-terminated UTF-16 and outlive the call.
        let result = unsafe {
            MoveFileExW(
                tmp_w.as_ptr(),
                target_w.as_ptr(),
                MOVEFILE_REPLACE_EXISTING | MOVEFILE_WRITE_THROUGH,
            )
        };

        if result == 0 {
            let err = std::io::Error::last_os_error();
            return Err(err).context("atomic replace failed");
        }

        Ok(())
    }

    #[cfg(not(target_os = "windows"))]
    fn atomic_replace(&self, tmp_path: &Path) -> Result<()> {
        fs::rename(tmp_path, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Doc {
        name: String,
        count: u32,
    }

    fn doc(count: u32) -> Doc {
        Doc {
            name: "vault".into(),
            count,
        }
    }

    #[test]
    fn load_returns_saved_document() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("store.json"));

        storage.save(&doc(1)).unwrap();

        assert_eq!(storage.load::<Doc>().unwrap(), Some(doc(1)));
    }

    #[test]
    fn load_missing_file_is_none() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("missing.json"));

        assert!(!storage.exists());
        assert_eq!(storage.load::<Doc>().unwrap(), None);
    }

    #[test]
    fn load_corrupted_file_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, b"{not json").unwrap();

        assert!(Storage::new(path).load::<Doc>().is_err());
    }

    #[test]
    fn save_replaces_existing_document() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("store.json"));

        storage.save(&doc(1)).unwrap();
        storage.save(&doc(2)).unwrap();

        assert_eq!(storage.load::<Doc>().unwrap(), Some(doc(2)));
    }

    #[test]
    fn tmp_file_is_removed_after_success() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("store.json"));
        storage.save(&doc(1)).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();

        assert_eq!(entries, vec!["store.json"]);
    }

    #[test]
    fn tmp_names_are_unique_siblings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        let storage = Storage::new(path.clone());

        let a = storage.random_tmp_path().unwrap();
        let b = storage.random_tmp_path().unwrap();

        assert_ne!(a, b);
        assert_ne!(a, path);
        assert_eq!(a.parent(), path.parent());
    }

    #[test]
    fn parent_directory_is_created() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("store.json");

        Storage::new(nested.clone()).save(&doc(3)).unwrap();

        assert!(nested.exists());
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("session.json"));
        storage.save(&doc(1)).unwrap();

        storage.remove().unwrap();
        storage.remove().unwrap();

        assert!(!storage.exists());
    }

    #[cfg(unix)]
    #[test]
    fn documents_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("store.json"));
        storage.save(&doc(1)).unwrap();

        let mode = fs::metadata(storage.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
