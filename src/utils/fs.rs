use crate::error::{RestageError, Result};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn map_io(path: &Path, e: io::Error) -> RestageError {
    match e.kind() {
        io::ErrorKind::PermissionDenied => RestageError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => RestageError::from(e),
    }
}

/// Create `path` and any missing parents. Another thread creating the same
/// directory concurrently is not an error.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    match std::fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(map_io(path, e)),
    }
}

/// Remove every immediate child of `dir`, directories recursively. `dir`
/// itself is kept.
pub fn clear_dir_contents(dir: &Path) -> Result<usize> {
    let mut removed = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            std::fs::remove_dir_all(&path).map_err(|e| map_io(&path, e))?;
        } else {
            std::fs::remove_file(&path).map_err(|e| map_io(&path, e))?;
        }
        removed += 1;
    }
    Ok(removed)
}

/// Stream `from` into `to`, creating parents and truncating an existing file.
pub fn copy_file(from: &Path, to: &Path) -> Result<u64> {
    if let Some(parent) = to.parent() {
        ensure_dir_exists(parent)?;
    }

    let mut source = File::open(from).map_err(|e| map_io(from, e))?;
    let mut dest = File::create(to).map_err(|e| map_io(to, e))?;
    let copied = io::copy(&mut source, &mut dest)?;
    Ok(copied)
}

/// Delete every `*.zip` file anywhere below `dir`, except the paths in `keep`.
pub fn remove_zip_files(dir: &Path, keep: &[PathBuf]) -> Result<usize> {
    let mut removed = 0;
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(|e| RestageError::Walk {
            path: e.path().unwrap_or(dir).to_path_buf(),
            message: e.to_string(),
        })?;
        let path = entry.path();
        let is_zip = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("zip"))
            .unwrap_or(false);

        if is_zip && entry.file_type().is_file() && !keep.iter().any(|k| k == path) {
            std::fs::remove_file(path).map_err(|e| map_io(path, e))?;
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_dir_exists_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a/b/c");

        ensure_dir_exists(&nested).unwrap();
        ensure_dir_exists(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn test_clear_dir_contents_keeps_root() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("sub/deeper")).unwrap();
        std::fs::write(temp.path().join("sub/deeper/file.txt"), "x").unwrap();
        std::fs::write(temp.path().join("top.txt"), "y").unwrap();

        let removed = clear_dir_contents(temp.path()).unwrap();
        assert_eq!(removed, 2);
        assert!(temp.path().is_dir());
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_copy_file_truncates_existing() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src.bin");
        let dst = temp.path().join("out/dst.bin");
        std::fs::write(&src, "short").unwrap();
        std::fs::create_dir_all(temp.path().join("out")).unwrap();
        std::fs::write(&dst, "a much longer previous body").unwrap();

        let copied = copy_file(&src, &dst).unwrap();
        assert_eq!(copied, 5);
        assert_eq!(std::fs::read_to_string(&dst).unwrap(), "short");
    }

    #[test]
    fn test_remove_zip_files_is_recursive() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("RobloxApp.zip"), "zip").unwrap();
        std::fs::write(temp.path().join("shaders.ZIP"), "zip").unwrap();
        std::fs::write(temp.path().join("AppSettings.xml"), "xml").unwrap();
        std::fs::create_dir_all(temp.path().join("content/sky")).unwrap();
        std::fs::write(temp.path().join("content/sky/bundled.zip"), "zip").unwrap();
        std::fs::write(temp.path().join("content/sky/sky.tex"), "tex").unwrap();

        let removed = remove_zip_files(temp.path(), &[]).unwrap();
        assert_eq!(removed, 3);
        assert!(temp.path().join("AppSettings.xml").exists());
        assert!(temp.path().join("content/sky/sky.tex").exists());
        assert!(!temp.path().join("content/sky/bundled.zip").exists());
        assert!(!temp.path().join("RobloxApp.zip").exists());
    }

    #[test]
    fn test_remove_zip_files_keeps_listed_paths() {
        let temp = TempDir::new().unwrap();
        let kept = temp.path().join("extra.zip");
        std::fs::write(&kept, "zip").unwrap();
        std::fs::write(temp.path().join("RobloxApp.zip"), "zip").unwrap();

        let removed = remove_zip_files(temp.path(), &[kept.clone()]).unwrap();
        assert_eq!(removed, 1);
        assert!(kept.exists());
    }
}
