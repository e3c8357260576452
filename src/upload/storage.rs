//! Filesystem persistence
//!
//! Destinations are opened with create + truncate, so an existing file at
//! the rendered path is replaced.

use super::UploadError;
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};

/// Make sure the parent directory of `path` exists
///
/// Missing ancestors are created recursively.
pub async fn prepare_destination(path: &Path) -> Result<(), UploadError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => return Ok(()),
    };

    let exists = fs::try_exists(dir)
        .await
        .map_err(|source| UploadError::FileState {
            path: dir.to_path_buf(),
            source,
        })?;

    if !exists {
        tracing::debug!(dir = %dir.display(), "Creating upload directory");
        fs::create_dir_all(dir)
            .await
            .map_err(|source| UploadError::DirectoryCreate {
                path: dir.to_path_buf(),
                source,
            })?;
    }

    Ok(())
}

/// Copy `content` into `path`, returning the number of bytes written
pub async fn write_stream<R>(path: &Path, content: &mut R) -> Result<u64, UploadError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut file = fs::File::create(path)
        .await
        .map_err(|source| UploadError::NotWritable {
            path: path.to_path_buf(),
            source,
        })?;

    let write_err = |source: std::io::Error| UploadError::Write {
        path: path.to_path_buf(),
        source,
    };

    let written = tokio::io::copy(content, &mut file).await.map_err(write_err)?;
    file.flush().await.map_err(write_err)?;

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prepare_creates_missing_ancestors() {
        let root = tempfile::tempdir().unwrap();
        let dest = root.path().join("a/b/c/file.png");

        prepare_destination(&dest).await.unwrap();

        assert!(root.path().join("a/b/c").is_dir());
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_prepare_existing_directory_is_noop() {
        let root = tempfile::tempdir().unwrap();
        let dest = root.path().join("file.png");
        prepare_destination(&dest).await.unwrap();
    }

    #[tokio::test]
    async fn test_prepare_fails_when_ancestor_is_a_file() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();

        let dest = blocker.join("sub/file.png");
        let err = prepare_destination(&dest).await.unwrap_err();
        assert!(matches!(
            err,
            UploadError::DirectoryCreate { .. } | UploadError::FileState { .. }
        ));
    }

    #[tokio::test]
    async fn test_write_overwrites_existing_file() {
        let root = tempfile::tempdir().unwrap();
        let dest = root.path().join("img.png");
        std::fs::write(&dest, b"old content that is longer").unwrap();

        let written = write_stream(&dest, &mut &b"new"[..]).await.unwrap();

        assert_eq!(written, 3);
        assert_eq!(std::fs::read(&dest).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_write_into_directory_is_not_writable() {
        let root = tempfile::tempdir().unwrap();
        let err = write_stream(root.path(), &mut &b"x"[..]).await.unwrap_err();
        assert!(matches!(err, UploadError::NotWritable { .. }));
    }
}
