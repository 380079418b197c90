//! Package fetcher: download every package of a deployment into the staging
//! tree and unpack each one as soon as it lands.

use crate::core::archive;
use crate::core::catalog::PackageCatalog;
use crate::core::download::Downloader;
use crate::core::pool::WorkerPool;
use crate::core::report::{ItemOutcome, Outcome};
use crate::error::{RestageError, Result};
use crate::utils::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Written into every staging directory restage prepares. A non-empty
/// directory without it is never cleared.
pub const STAGING_MARKER: &str = ".restage-staging";

pub fn staging_marker(staging: &Path) -> PathBuf {
    staging.join(STAGING_MARKER)
}

pub fn package_url(cdn_url: &str, version: &str, package: &str) -> String {
    format!("{}/{version}-{package}", cdn_url.trim_end_matches('/'))
}

pub struct PackageFetcher<'a> {
    downloader: &'a Downloader,
    pool: &'a WorkerPool,
    catalog: &'a PackageCatalog,
    cdn_url: &'a str,
    staging: &'a Path,
}

impl<'a> PackageFetcher<'a> {
    pub fn new(
        downloader: &'a Downloader,
        pool: &'a WorkerPool,
        catalog: &'a PackageCatalog,
        cdn_url: &'a str,
        staging: &'a Path,
    ) -> Self {
        Self {
            downloader,
            pool,
            catalog,
            cdn_url,
            staging,
        }
    }

    /// Empty the staging directory, creating it if needed. Only a directory
    /// that is empty or carries the staging marker is accepted.
    pub fn prepare_staging(&self) -> Result<()> {
        let resolved = std::path::absolute(self.staging)?;
        let is_root = resolved.parent().is_none();
        let is_home = dirs::home_dir().is_some_and(|home| home == resolved);
        if is_root || is_home {
            return Err(RestageError::config_error(format!(
                "refusing to use {resolved:?} as the staging directory"
            )));
        }

        let marker = staging_marker(self.staging);
        if self.staging.exists() {
            if marker.is_file() {
                let removed = fs::clear_dir_contents(self.staging)?;
                debug!("Cleared {} entries from {:?}", removed, self.staging);
            } else if std::fs::read_dir(self.staging)?.next().is_some() {
                return Err(RestageError::config_error(format!(
                    "refusing to clear {resolved:?}: it is not empty and is not a restage \
                     staging directory"
                )));
            }
        }

        fs::ensure_dir_exists(self.staging)?;
        std::fs::write(&marker, "")?;
        Ok(())
    }

    /// Download the catalog's packages plus `extra` for `version`. Extras
    /// not in the catalog are downloaded but not extracted. One failed package
    /// never stops the others; every package gets an outcome, in request order.
    pub fn download_and_extract_packages(
        &self,
        version: &str,
        extra: &[String],
    ) -> Result<Vec<ItemOutcome>> {
        self.prepare_staging()?;

        let mut packages: Vec<String> = self.catalog.packages().map(str::to_string).collect();
        for name in extra {
            if !packages.contains(name) {
                packages.push(name.clone());
            }
        }

        info!(
            "Fetching {} packages for {} on {} workers",
            packages.len(),
            version,
            self.pool.workers()
        );

        let outcomes = self.pool.run(packages, |package| {
            match self.fetch_package(version, &package) {
                Ok(outcome) => ItemOutcome::new(package, outcome),
                Err(e) => {
                    warn!("Error downloading and extracting package {}: {}", package, e);
                    ItemOutcome::failed(package, &e)
                }
            }
        });

        Ok(outcomes)
    }

    fn archive_path(&self, package: &str) -> Result<PathBuf> {
        let is_plain_name = !package.is_empty()
            && Path::new(package).file_name().and_then(|n| n.to_str()) == Some(package);
        if !is_plain_name {
            return Err(RestageError::download(package, "invalid package name"));
        }
        Ok(self.staging.join(package))
    }

    fn fetch_package(&self, version: &str, package: &str) -> Result<Outcome> {
        let archive_path = self.archive_path(package)?;
        let url = package_url(self.cdn_url, version, package);

        let bytes = self
            .downloader
            .download_file(&url, &archive_path)
            .map_err(|e| RestageError::download(package, e))?;

        match self.catalog.subfolder(package) {
            Some(subfolder) => {
                let files = archive::extract_zip(&archive_path, self.staging, subfolder)?;
                info!("Extracted \"{}\" ({} files)", package, files);
                Ok(Outcome::Extracted { bytes, files })
            }
            None => {
                info!(
                    "Package \"{}\" is not in the catalog, skipping extraction",
                    package
                );
                Ok(Outcome::Downloaded { bytes })
            }
        }
    }
}
