use crate::error::AppError;
use std::path::{Path, PathBuf};

/// Case-insensitive extension check; `ext` has no leading dot.
pub fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

pub fn file_name_string(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

/// Write `bytes` to `dir/file_name` so that readers only ever see a complete file.
///
/// Data goes to a `.part` sibling first and is renamed into place.
pub async fn write_atomically(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf, AppError> {
    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        AppError::Export(format!("Failed to create directory {}: {}", dir.display(), e))
    })?;

    let dest = dir.join(file_name);
    let partial = dir.join(format!("{}.part", file_name));

    if let Err(e) = tokio::fs::write(&partial, bytes).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(AppError::Export(format!(
            "Failed to write {}: {}",
            partial.display(),
            e
        )));
    }

    if let Err(e) = tokio::fs::rename(&partial, &dest).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(AppError::Export(format!(
            "Failed to move {} into place: {}",
            dest.display(),
            e
        )));
    }

    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_extension() {
        assert!(has_extension(Path::new("model.h5"), "h5"));
        assert!(has_extension(Path::new("/tmp/MODEL.H5"), "h5"));
        assert!(!has_extension(Path::new("model.h5.bak"), "h5"));
        assert!(!has_extension(Path::new("h5"), "h5"));
    }

    #[tokio::test]
    async fn test_write_atomically_leaves_no_partial() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");

        let path = write_atomically(&out, "out.zip", b"payload").await.unwrap();

        assert_eq!(path, out.join("out.zip"));
        assert_eq!(std::fs::read(&path).unwrap(), b"payload");
        assert!(!out.join("out.zip.part").exists());
    }

    #[tokio::test]
    async fn test_write_atomically_reports_export_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"not a dir").unwrap();

        let result = write_atomically(&blocker.join("sub"), "out.zip", b"x").await;
        assert!(matches!(result, Err(AppError::Export(_))));
    }
}
