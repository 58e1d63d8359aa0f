// ============================================================================
// Preview Infrastructure - Sandboxed Local Source
// File: crates/preview-infrastructure/src/source/local.rs
// ============================================================================

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::debug;

use preview_core::repositories::{ByteStream, LocalSource, SourceError};

/// Reads files beneath a fixed root. Paths that climb out of the root,
/// either lexically or through symlinks, are refused.
pub struct SandboxedLocalSource {
    root: PathBuf,
}

impl SandboxedLocalSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve_sync(root: &Path, relative: &str) -> Result<PathBuf, SourceError> {
        let rel = Path::new(relative);
        if rel.components().any(|c| !matches!(c, Component::Normal(_) | Component::CurDir)) {
            return Err(SourceError::OutsideSandbox(relative.to_string()));
        }

        let root = match root.canonicalize() {
            Ok(r) => r,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(SourceError::NotFound),
            Err(e) => return Err(e.into()),
        };
        let candidate = match root.join(rel).canonicalize() {
            Ok(p) => p,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(SourceError::NotFound),
            Err(e) => return Err(e.into()),
        };

        if !candidate.starts_with(&root) {
            return Err(SourceError::OutsideSandbox(relative.to_string()));
        }
        if !candidate.is_file() {
            return Err(SourceError::NotFound);
        }
        Ok(candidate)
    }
}

#[async_trait]
impl LocalSource for SandboxedLocalSource {
    async fn open(&self, relative: &str) -> Result<ByteStream, SourceError> {
        let root = self.root.clone();
        let rel = relative.to_string();
        let path = tokio::task::spawn_blocking(move || Self::resolve_sync(&root, &rel))
            .await
            .map_err(|e| SourceError::Io(std::io::Error::other(format!("spawn_blocking failed: {e}"))))??;

        debug!("Opening local source {}", path.display());
        let file = fs::File::open(&path).await?;
        Ok(Box::pin(ReaderStream::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_reads_file_inside_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("images")).unwrap();
        std::fs::write(dir.path().join("images/dog.jpg"), b"jpeg").unwrap();

        let source = SandboxedLocalSource::new(dir.path());
        let mut stream = source.open("images/dog.jpg").await.unwrap();
        let chunk = stream.next().await.unwrap().unwrap();
        assert_eq!(&chunk[..], b"jpeg");
    }

    #[tokio::test]
    async fn test_missing_file_and_directory_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("images.png")).unwrap();
        let source = SandboxedLocalSource::new(dir.path());

        assert!(matches!(source.open("nope.png").await, Err(SourceError::NotFound)));
        assert!(matches!(source.open("images.png").await, Err(SourceError::NotFound)));
    }

    #[tokio::test]
    async fn test_traversal_is_refused() {
        let outer = tempfile::tempdir().unwrap();
        std::fs::write(outer.path().join("secret.png"), b"x").unwrap();
        let root = outer.path().join("root");
        std::fs::create_dir(&root).unwrap();

        let source = SandboxedLocalSource::new(&root);
        assert!(matches!(source.open("../secret.png").await, Err(SourceError::OutsideSandbox(_))));
        assert!(matches!(
            source.open(outer.path().join("secret.png").to_str().unwrap()).await,
            Err(SourceError::OutsideSandbox(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_escape_is_refused() {
        let outer = tempfile::tempdir().unwrap();
        std::fs::write(outer.path().join("secret.png"), b"x").unwrap();
        let root = outer.path().join("root");
        std::fs::create_dir(&root).unwrap();
        std::os::unix::fs::symlink(outer.path().join("secret.png"), root.join("link.png")).unwrap();

        let source = SandboxedLocalSource::new(&root);
        assert!(matches!(source.open("link.png").await, Err(SourceError::OutsideSandbox(_))));
    }
}
