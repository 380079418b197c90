//! Tree mirror: make a destination directory an exact copy of a source tree.

use crate::core::pool::WorkerPool;
use crate::core::report::{ItemOutcome, MirrorReport, Outcome};
use crate::error::{RestageError, Result};
use crate::utils::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Every regular file below a root. A walk error is yielded once as a
/// `Walk` error and ends the iteration, so a truncated walk is never mistaken
/// for a complete one.
pub struct SourceFiles {
    root: PathBuf,
    inner: walkdir::IntoIter,
    finished: bool,
}

pub fn source_files(root: &Path) -> SourceFiles {
    SourceFiles {
        root: root.to_path_buf(),
        inner: WalkDir::new(root).into_iter(),
        finished: false,
    }
}

impl Iterator for SourceFiles {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            match self.inner.next() {
                None => {
                    self.finished = true;
                    return None;
                }
                Some(Ok(entry)) => {
                    if entry.file_type().is_file() {
                        return Some(Ok(entry.into_path()));
                    }
                }
                Some(Err(e)) => {
                    self.finished = true;
                    let path = e.path().unwrap_or(self.root.as_path()).to_path_buf();
                    return Some(Err(RestageError::Walk {
                        path,
                        message: e.to_string(),
                    }));
                }
            }
        }
    }
}

fn check_disjoint(source: &Path, destination: &Path) -> Result<()> {
    let source = std::fs::canonicalize(source)?;
    let destination = std::fs::canonicalize(destination)?;

    if source.starts_with(&destination) || destination.starts_with(&source) {
        return Err(RestageError::config_error(format!(
            "mirror source {source:?} and destination {destination:?} overlap"
        )));
    }
    Ok(())
}

fn copy_one(source: &Path, destination: &Path, path: &Path) -> ItemOutcome {
    let relative = match path.strip_prefix(source) {
        Ok(rel) => rel,
        Err(_) => {
            let err = RestageError::Walk {
                path: path.to_path_buf(),
                message: format!("not below {source:?}"),
            };
            return ItemOutcome::failed(path.to_string_lossy(), &err);
        }
    };
    let item = relative.to_string_lossy().replace('\\', "/");

    match fs::copy_file(path, &destination.join(relative)) {
        Ok(bytes) => {
            debug!("Copied {}", item);
            ItemOutcome::new(item, Outcome::Copied { bytes })
        }
        Err(e) => {
            warn!("Error copying {}: {}", item, e);
            ItemOutcome::failed(item, &e)
        }
    }
}

/// Wipe `destination` and copy every file of `source` into it on `pool`.
///
/// `destination` must already exist. The source is walked in full before
/// anything is removed, and the wipe finishes before the first copy starts.
/// Per-file copy failures are recorded in the report and do not stop the
/// remaining copies; a failure leaves the destination partially populated.
pub fn replace_files(source: &Path, destination: &Path, pool: &WorkerPool) -> Result<MirrorReport> {
    replace_files_except(source, destination, pool, &[])
}

/// [`replace_files`], leaving the source files listed in `skip` uncopied.
pub fn replace_files_except(
    source: &Path,
    destination: &Path,
    pool: &WorkerPool,
    skip: &[PathBuf],
) -> Result<MirrorReport> {
    if !destination.is_dir() {
        return Err(RestageError::DestinationMissing {
            path: destination.to_path_buf(),
        });
    }

    let mut files = source_files(source).collect::<Result<Vec<_>>>()?;
    files.retain(|path| !skip.contains(path));
    check_disjoint(source, destination)?;

    let removed = fs::clear_dir_contents(destination)?;
    debug!("Removed {} entries from {:?}", removed, destination);

    info!(
        "Copying {} files from {:?} to {:?} on {} workers",
        files.len(),
        source,
        destination,
        pool.workers()
    );
    let outcomes = pool.run(files, |path| copy_one(source, destination, &path));

    Ok(MirrorReport {
        source: source.to_path_buf(),
        destination: destination.to_path_buf(),
        removed,
        files: outcomes,
    })
}
