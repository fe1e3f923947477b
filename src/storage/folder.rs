//! Shared folder module
//!
//! Handles file I/O for the shared and download folders. The folder root is
//! the only place a file name may resolve to.

use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info, trace, warn};

use crate::error::ShareError;

/// Whether `name` is a single plain file name with no way out of its folder
pub fn is_safe_filename(name: &str) -> bool {
    if name.is_empty() || name.contains('\0') || name.contains('/') || name.contains('\\') {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// A directory on local disk holding shared or downloaded files
#[derive(Debug, Clone)]
pub struct ShareFolder {
    /// Absolute, canonical root
    root: PathBuf,
}

impl ShareFolder {
    /// Open a folder, creating it if absent
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, ShareError> {
        let path = path.as_ref();
        if !path.exists() {
            info!("Creating folder: {}", path.display());
        }
        fs::create_dir_all(path).await.map_err(|e| {
            error!("Failed to create folder '{}': {}", path.display(), e);
            ShareError::storage_error_full("Failed to create folder", path.display().to_string(), e.to_string())
        })?;
        let root = fs::canonicalize(path).await.map_err(|e| {
            error!("Failed to resolve folder '{}': {}", path.display(), e);
            ShareError::storage_error_full("Failed to resolve folder", path.display().to_string(), e.to_string())
        })?;
        debug!("Opened folder: {}", root.display());
        Ok(Self { root })
    }

    /// Canonical root of the folder
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether both folders are the same directory
    pub fn same_root(&self, other: &ShareFolder) -> bool {
        self.root == other.root
    }

    /// Names of the regular files currently in the folder, sorted
    pub async fn list_files(&self) -> Result<Vec<String>, ShareError> {
        let mut entries = fs::read_dir(&self.root).await.map_err(|e| {
            error!("Failed to read folder '{}': {}", self.root.display(), e);
            ShareError::storage_error_full("Failed to read folder", self.root.display().to_string(), e.to_string())
        })?;

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let file_type = entry.file_type().await?;
            let servable = if file_type.is_symlink() {
                self.servable_target(&entry.path()).await.is_some()
            } else {
                file_type.is_file()
            };
            if !servable {
                trace!("Skipping non-file entry: {}", entry.path().display());
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => warn!("Skipping file with non UTF-8 name: {:?}", raw),
            }
        }
        names.sort();
        debug!("Found {} files in {}", names.len(), self.root.display());
        Ok(names)
    }

    /// Path of `filename` inside the folder, rejecting anything that is not a plain name
    pub fn resolve(&self, filename: &str) -> Result<PathBuf, ShareError> {
        if !is_safe_filename(filename) {
            warn!("Rejected unsafe file name: {:?}", filename);
            return Err(ShareError::file_not_found_in(filename, self.root.display().to_string()));
        }
        Ok(self.root.join(filename))
    }

    /// Regular file `path` ends up at, if that lies inside the folder.
    ///
    /// Symlinks may point anywhere; only their target counts.
    async fn servable_target(&self, path: &Path) -> Option<PathBuf> {
        let target = fs::canonicalize(path).await.ok()?;
        if !target.starts_with(&self.root) {
            warn!("Rejected {} resolving outside {}", path.display(), self.root.display());
            return None;
        }
        let metadata = fs::metadata(&target).await.ok()?;
        metadata.is_file().then_some(target)
    }

    /// Read the full contents of `filename`
    pub async fn read(&self, filename: &str) -> Result<Bytes, ShareError> {
        let path = self.resolve(filename)?;
        let not_found = || ShareError::file_not_found_in(filename, self.root.display().to_string());

        let target = self.servable_target(&path).await.ok_or_else(not_found)?;

        let data = fs::read(&target).await.map_err(|e| {
            error!("Failed to read '{}': {}", target.display(), e);
            ShareError::storage_error_full("Failed to read file", target.display().to_string(), e.to_string())
        })?;
        debug!("Read {} ({} bytes)", target.display(), data.len());
        Ok(Bytes::from(data))
    }

    /// Write `data` as `filename`, replacing any existing file
    pub async fn write(&self, filename: &str, data: &[u8]) -> Result<PathBuf, ShareError> {
        let path = self.resolve(filename)?;
        fs::write(&path, data).await.map_err(|e| {
            error!("Failed to write '{}': {}", path.display(), e);
            ShareError::storage_error_full("Failed to write file", path.display().to_string(), e.to_string())
        })?;
        debug!("Wrote {} ({} bytes)", path.display(), data.len());
        Ok(path)
    }

    /// Move `filename` from this folder into `dest`, replacing any existing file there
    pub async fn move_into(&self, filename: &str, dest: &ShareFolder) -> Result<PathBuf, ShareError> {
        let from = self.resolve(filename)?;
        let to = dest.resolve(filename)?;
        if self.same_root(dest) {
            return Ok(to);
        }

        if let Err(e) = fs::rename(&from, &to).await {
            // Rename fails across filesystems
            debug!("Rename {} -> {} failed ({}), copying instead", from.display(), to.display(), e);
            fs::copy(&from, &to).await.map_err(|e| {
                error!("Failed to copy '{}' to '{}': {}", from.display(), to.display(), e);
                ShareError::storage_error_full("Failed to move file", to.display().to_string(), e.to_string())
            })?;
            fs::remove_file(&from).await.map_err(|e| {
                error!("Failed to remove '{}': {}", from.display(), e);
                ShareError::storage_error_full("Failed to remove moved file", from.display().to_string(), e.to_string())
            })?;
        }
        info!("Moved {} into {}", filename, dest.root.display());
        Ok(to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_safe_filename() {
        assert!(is_safe_filename("doc.txt"));
        assert!(is_safe_filename("my file (1).pdf"));
        assert!(is_safe_filename("..hidden"));
        assert!(!is_safe_filename(""));
        assert!(!is_safe_filename("."));
        assert!(!is_safe_filename(".."));
        assert!(!is_safe_filename("../etc/passwd"));
        assert!(!is_safe_filename("sub/doc.txt"));
        assert!(!is_safe_filename("..\\windows"));
        assert!(!is_safe_filename("/etc/passwd"));
        assert!(!is_safe_filename("bad\0name"));
    }

    #[tokio::test]
    async fn test_open_creates_missing_folder() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("shared");

        let folder = ShareFolder::open(&path).await.unwrap();

        assert!(path.is_dir());
        assert!(folder.root().is_absolute());
    }

    #[tokio::test]
    async fn test_list_files_skips_directories() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("b.txt"), b"b").unwrap();
        std::fs::write(tmp.path().join("a.txt"), b"a").unwrap();
        std::fs::create_dir(tmp.path().join("subdir")).unwrap();

        let folder = ShareFolder::open(tmp.path()).await.unwrap();

        assert_eq!(folder.list_files().await.unwrap(), vec!["a.txt".to_string(), "b.txt".to_string()]);
    }

    #[tokio::test]
    async fn test_read_existing_and_missing() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("doc.txt"), b"hello").unwrap();
        let folder = ShareFolder::open(tmp.path()).await.unwrap();

        assert_eq!(folder.read("doc.txt").await.unwrap(), Bytes::from_static(b"hello"));
        assert!(matches!(folder.read("missing.txt").await, Err(ShareError::FileNotFound { .. })));
    }

    #[tokio::test]
    async fn test_read_rejects_traversal() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("secret.txt"), b"secret").unwrap();
        let shared = tmp.path().join("shared");
        let folder = ShareFolder::open(&shared).await.unwrap();

        assert!(matches!(folder.read("../secret.txt").await, Err(ShareError::FileNotFound { .. })));
        assert!(matches!(folder.read("..").await, Err(ShareError::FileNotFound { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_read_rejects_symlink_escape() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("secret.txt"), b"secret").unwrap();
        let shared = tmp.path().join("shared");
        std::fs::create_dir(&shared).unwrap();
        std::os::unix::fs::symlink(tmp.path().join("secret.txt"), shared.join("link.txt")).unwrap();
        let folder = ShareFolder::open(&shared).await.unwrap();

        assert!(matches!(folder.read("link.txt").await, Err(ShareError::FileNotFound { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_files_announces_only_servable_symlinks() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("secret.txt"), b"secret").unwrap();
        let shared = tmp.path().join("shared");
        std::fs::create_dir(&shared).unwrap();
        std::fs::write(shared.join("real.txt"), b"real").unwrap();
        std::os::unix::fs::symlink(shared.join("real.txt"), shared.join("link.txt")).unwrap();
        std::os::unix::fs::symlink(tmp.path().join("secret.txt"), shared.join("escape.txt")).unwrap();
        std::os::unix::fs::symlink(shared.join("gone.txt"), shared.join("dangling.txt")).unwrap();
        let folder = ShareFolder::open(&shared).await.unwrap();

        let files = folder.list_files().await.unwrap();

        assert_eq!(files, vec!["link.txt".to_string(), "real.txt".to_string()]);
        for name in &files {
            assert!(folder.read(name).await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_write_then_move_into() {
        let tmp = TempDir::new().unwrap();
        let downloads = ShareFolder::open(tmp.path().join("downloads")).await.unwrap();
        let shared = ShareFolder::open(tmp.path().join("shared")).await.unwrap();

        downloads.write("doc.txt", b"content").await.unwrap();
        let moved = downloads.move_into("doc.txt", &shared).await.unwrap();

        assert_eq!(moved, shared.root().join("doc.txt"));
        assert!(!downloads.root().join("doc.txt").exists());
        assert_eq!(std::fs::read(moved).unwrap(), b"content");
    }

    #[tokio::test]
    async fn test_move_into_same_folder_is_noop() {
        let tmp = TempDir::new().unwrap();
        let folder = ShareFolder::open(tmp.path()).await.unwrap();
        let same = ShareFolder::open(tmp.path()).await.unwrap();
        folder.write("doc.txt", b"x").await.unwrap();

        let path = folder.move_into("doc.txt", &same).await.unwrap();

        assert!(path.exists());
        assert!(folder.same_root(&same));
    }
}
