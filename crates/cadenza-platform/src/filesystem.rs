//! File System Abstraction
//!
//! Sound lookups are rooted at a single search directory. Candidate files are
//! named `<root>/<basename>.<extension>`.

use std::path::{Path, PathBuf};

use crate::{PlatformError, PlatformResult};

/// File system view rooted at the sound search directory
#[derive(Debug, Clone, Default)]
pub struct FileSystem {
    /// Search root, unset until a valid directory is configured
    root: Option<PathBuf>,
}

impl FileSystem {
    /// Create a file system with no search root
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Create a file system rooted at `root`.
    ///
    /// Fails if `root` does not exist.
    pub fn with_root(root: impl AsRef<Path>) -> PlatformResult<Self> {
        let mut fs = Self::new();
        fs.set_root(root)?;
        Ok(fs)
    }

    /// Set the search root. The previous root is kept if `root` is missing.
    pub fn set_root(&mut self, root: impl AsRef<Path>) -> PlatformResult<()> {
        let root = root.as_ref();
        if !self.exists(root) {
            return Err(PlatformError::PathNotFound(root.to_path_buf()));
        }
        self.root = Some(root.to_path_buf());
        Ok(())
    }

    /// Get the search root
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Build the candidate path for `basename` with `extension`
    pub fn candidate(&self, basename: &str, extension: &str) -> Option<PathBuf> {
        let root = self.root.as_ref()?;
        Some(root.join(format!("{basename}.{extension}")))
    }

    /// Check if a path exists
    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        path.as_ref().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_system_without_root() {
        let fs = FileSystem::new();
        assert!(fs.root().is_none());
        assert!(fs.candidate("rain", "ogg").is_none());
    }

    #[test]
    fn test_candidate_path() {
        let dir = tempfile::tempdir().unwrap();
        let fs = FileSystem::with_root(dir.path()).unwrap();

        let path = fs.candidate("weather/rain", "ogg").unwrap();
        assert_eq!(path, dir.path().join("weather/rain.ogg"));
        assert!(!fs.exists(&path));
    }

    #[test]
    fn test_missing_root_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut fs = FileSystem::with_root(dir.path()).unwrap();

        let result = fs.set_root(dir.path().join("nope"));
        assert!(matches!(result, Err(PlatformError::PathNotFound(_))));
        assert_eq!(fs.root(), Some(dir.path()));
    }
}
