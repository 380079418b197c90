use crate::error::{RestageError, Result};
use crate::utils::fs;
use std::fs::File;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use zip::ZipArchive;

/// Resolve a catalog subfolder such as `content/fonts/` to a relative path.
/// Anything other than plain names is rejected.
pub fn subfolder_path(subfolder: &str) -> Result<PathBuf> {
    let path = Path::new(subfolder);
    let is_plain = path
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !is_plain {
        return Err(RestageError::PathTraversal {
            entry: subfolder.to_string(),
        });
    }
    Ok(path.to_path_buf())
}

/// Unpack `archive_path` into `staging/subfolder`. Returns the number of
/// files written.
pub fn extract_zip(archive_path: &Path, staging: &Path, subfolder: &str) -> Result<usize> {
    let corrupt = |e: zip::result::ZipError| RestageError::CorruptArchive {
        path: archive_path.to_path_buf(),
        message: e.to_string(),
    };

    let root = staging.join(subfolder_path(subfolder)?);
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file).map_err(corrupt)?;

    fs::ensure_dir_exists(&root)?;

    let mut written = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(corrupt)?;
        let outpath = match entry.enclosed_name() {
            Some(path) => root.join(path),
            None => {
                return Err(RestageError::PathTraversal {
                    entry: entry.name().to_string(),
                })
            }
        };

        if entry.is_dir() {
            fs::ensure_dir_exists(&outpath)?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            fs::ensure_dir_exists(parent)?;
        }
        let mut outfile = File::create(&outpath)?;
        std::io::copy(&mut entry, &mut outfile)?;
        written += 1;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))?;
            }
        }
    }

    debug!(
        "Extracted {} files from {:?} into {:?}",
        written, archive_path, root
    );
    Ok(written)
}


#[cfg(test)]
mod tests {
    use super::test_support::write_zip;
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_extract_into_subfolder() {
        let temp = TempDir::new().unwrap();
        let staging = temp.path().join("out");
        let archive = temp.path().join("pkg.zip");
        write_zip(
            &archive,
            &[("a/", ""), ("a/b.txt", "hello world"), ("c.dat", "\x00\x01\x02")],
        );

        let written = extract_zip(&archive, &staging, "X/").unwrap();
        assert_eq!(written, 2);
        assert_eq!(
            std::fs::read(staging.join("X/a/b.txt")).unwrap(),
            b"hello world"
        );
        assert_eq!(std::fs::read(staging.join("X/c.dat")).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_extract_at_root_overwrites() {
        let temp = TempDir::new().unwrap();
        let staging = temp.path().join("out");
        std::fs::create_dir_all(&staging).unwrap();
        std::fs::write(staging.join("RobloxPlayerBeta.exe"), "previous, longer content").unwrap();

        let archive = temp.path().join("RobloxApp.zip");
        write_zip(&archive, &[("RobloxPlayerBeta.exe", "new")]);

        extract_zip(&archive, &staging, "").unwrap();
        assert_eq!(
            std::fs::read_to_string(staging.join("RobloxPlayerBeta.exe")).unwrap(),
            "new"
        );
    }

    #[test]
    fn test_existing_directory_entry_is_fine() {
        let temp = TempDir::new().unwrap();
        let staging = temp.path().join("out");
        std::fs::create_dir_all(staging.join("content/fonts")).unwrap();

        let archive = temp.path().join("fonts.zip");
        write_zip(&archive, &[("fonts/", ""), ("fonts/a.ttf", "ttf")]);

        extract_zip(&archive, &staging, "content/").unwrap();
        assert!(staging.join("content/fonts/a.ttf").exists());
    }

    #[test]
    fn test_rejects_path_traversal() {
        let temp = TempDir::new().unwrap();
        let staging = temp.path().join("out");
        let archive = temp.path().join("evil.zip");
        write_zip(&archive, &[("ok.txt", "fine"), ("../../escape.txt", "gotcha")]);

        let err = extract_zip(&archive, &staging, "ssl/").unwrap_err();
        assert!(matches!(err, RestageError::PathTraversal { .. }));
        assert!(!temp.path().join("escape.txt").exists());
    }

    #[test]
    fn test_corrupt_archive() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("broken.zip");
        std::fs::write(&archive, "this is not a zip file").unwrap();

        let err = extract_zip(&archive, &temp.path().join("out"), "").unwrap_err();
        assert!(matches!(err, RestageError::CorruptArchive { .. }));
    }

    #[test]
    fn test_rejects_absolute_entry() {
        let temp = TempDir::new().unwrap();
        let staging = temp.path().join("out");
        let archive = temp.path().join("absolute.zip");
        write_zip(&archive, &[("/tmp/escape.txt", "gotcha")]);

        let err = extract_zip(&archive, &staging, "").unwrap_err();
        assert!(matches!(err, RestageError::PathTraversal { .. }));
    }

    #[test]
    fn test_inner_parent_dir_stays_enclosed() {
        let temp = TempDir::new().unwrap();
        let staging = temp.path().join("out");
        let archive = temp.path().join("dots.zip");
        write_zip(&archive, &[("a/../b.txt", "b")]);

        extract_zip(&archive, &staging, "sky/").unwrap();
        assert_eq!(std::fs::read_to_string(staging.join("sky/b.txt")).unwrap(), "b");
    }

    #[test]
    fn test_subfolder_path() {
        assert_eq!(
            subfolder_path("content/fonts/").unwrap(),
            PathBuf::from("content/fonts")
        );
        assert_eq!(subfolder_path("").unwrap(), PathBuf::new());
        assert!(subfolder_path("/etc").is_err());
        assert!(subfolder_path("../outside/").is_err());
    }
}
