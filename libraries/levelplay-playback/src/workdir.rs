//! Working directory for per-track buffers
//!
//! Every working file is named `{prefix}{seq:04}-{stage}.{ext}` and belongs to
//! exactly one track. A [`TrackScope`] removes its files when dropped, so a
//! track's buffers disappear whether it played or failed. Files left behind by
//! a crashed run are purged when the next session starts.

use crate::error::Result;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The session's working directory
#[derive(Debug, Clone)]
pub struct WorkDir {
    root: PathBuf,
    prefix: String,
}

impl WorkDir {
    /// Describe a working directory; nothing touches the disk until [`prepare`](Self::prepare)
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
        }
    }

    /// Directory path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Working-file prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Create the directory if needed and purge stale working files
    ///
    /// Returns the number of files removed.
    pub async fn prepare(&self) -> Result<usize> {
        tokio::fs::create_dir_all(&self.root).await?;
        self.purge().await
    }

    /// Remove every regular file whose name starts with the prefix
    ///
    /// Other files and all directories are left alone. Running it twice
    /// removes nothing the second time.
    pub async fn purge(&self) -> Result<usize> {
        let mut removed = 0;
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let matches = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(&self.prefix));
            if !matches {
                continue;
            }
            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        if removed > 0 {
            debug!(dir = %self.root.display(), removed, "Purged stale working files");
        }
        Ok(removed)
    }

    /// Open the file scope for the `seq`-th track of the session
    pub fn track(&self, seq: usize) -> TrackScope {
        TrackScope {
            root: self.root.clone(),
            stem: format!("{}{:04}", self.prefix, seq),
            files: Vec::new(),
        }
    }
}

/// Working files owned by one track; removed on drop
#[derive(Debug)]
pub struct TrackScope {
    root: PathBuf,
    stem: String,
    files: Vec<PathBuf>,
}

impl TrackScope {
    /// Path for a stage's buffer, registered for cleanup
    pub fn file(&mut self, stage: &str, ext: &str) -> PathBuf {
        let path = self.root.join(format!("{}-{}.{}", self.stem, stage, ext));
        if !self.files.contains(&path) {
            self.files.push(path.clone());
        }
        path
    }

    /// Every path handed out so far
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

impl Drop for TrackScope {
    fn drop(&mut self) {
        for path in &self.files {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove working file"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_purge_removes_only_matching_files() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        std::fs::write(root.join("levelplay-0001-source.flac"), b"x").unwrap();
        std::fs::write(root.join("levelplay-0007-final.wav"), b"x").unwrap();
        std::fs::write(root.join("notes.txt"), b"keep").unwrap();
        std::fs::write(root.join("other-levelplay-0001.wav"), b"keep").unwrap();
        std::fs::create_dir(root.join("levelplay-cache")).unwrap();

        let workdir = WorkDir::new(root, "levelplay-");
        assert_eq!(workdir.prepare().await.unwrap(), 2);

        assert!(!root.join("levelplay-0001-source.flac").exists());
        assert!(!root.join("levelplay-0007-final.wav").exists());
        assert!(root.join("notes.txt").exists());
        assert!(root.join("other-levelplay-0001.wav").exists());
        assert!(root.join("levelplay-cache").is_dir());
    }

    #[tokio::test]
    async fn test_purge_is_idempotent() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("levelplay-0001-staged.wav"), b"x").unwrap();

        let workdir = WorkDir::new(dir.path(), "levelplay-");
        assert_eq!(workdir.purge().await.unwrap(), 1);
        assert_eq!(workdir.purge().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_prepare_creates_directory() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("nested").join("work");

        let workdir = WorkDir::new(&root, "levelplay-");
        assert_eq!(workdir.prepare().await.unwrap(), 0);
        assert!(root.is_dir());
    }

    #[test]
    fn test_scope_names_and_cleanup() {
        let dir = TempDir::new().unwrap();
        let workdir = WorkDir::new(dir.path(), "levelplay-");

        let mut scope = workdir.track(3);
        let source = scope.file("source", "flac");
        let staged = scope.file("staged", "wav");
        assert_eq!(source, dir.path().join("levelplay-0003-source.flac"));
        assert_eq!(scope.file("source", "flac"), source);
        assert_eq!(scope.files().len(), 2);

        // Only one of the two buffers was ever written
        std::fs::write(&source, b"x").unwrap();
        drop(scope);

        assert!(!source.exists());
        assert!(!staged.exists());
    }
}
