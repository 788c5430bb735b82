//! Per-session working directories on the filesystem.
//!
//! Each pairing session owns one directory under a configured root, named
//! after its token. The protocol connector persists credential files into
//! that directory; the archival step later snapshots it wholesale.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Creates and resolves session working directories under a root.
#[derive(Debug, Clone)]
pub struct SessionStore {
    root: PathBuf,
}

impl SessionStore {
    /// Open a store rooted at `root`, creating the root if missing.
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Root directory holding all session directories.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the working directory for `token`. Does not create it.
    pub fn session_dir(&self, token: &str) -> PathBuf {
        self.root.join(token)
    }

    /// Create (or reuse) the working directory for `token`.
    pub fn create_session_dir(&self, token: &str) -> io::Result<PathBuf> {
        let dir = self.session_dir(token);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_creates_root() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("sessions");
        assert!(!root.exists());

        let store = SessionStore::new(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(store.root(), root);
    }

    #[test]
    fn test_create_session_dir_under_root() {
        let tmp = TempDir::new().unwrap();
        let store = SessionStore::new(tmp.path()).unwrap();

        let dir = store.create_session_dir("abc-123").unwrap();
        assert!(dir.is_dir());
        assert_eq!(dir, tmp.path().join("abc-123"));
        assert_eq!(store.session_dir("abc-123"), dir);
    }

    #[test]
    fn test_create_session_dir_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = SessionStore::new(tmp.path()).unwrap();

        let first = store.create_session_dir("tok").unwrap();
        let second = store.create_session_dir("tok").unwrap();
        assert_eq!(first, second);
    }
}
