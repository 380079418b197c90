use crate::core::config::Config;
use crate::core::download::Downloader;
use crate::core::feed;
use crate::core::packages::PackageFetcher;
use crate::core::pool::WorkerPool;
use crate::core::report::{count_failures, ItemOutcome};
use crate::core::settings;
use crate::error::Result;
use crate::utils::fs;
use std::path::PathBuf;

/// Fetch and unpack every package of `version`, write the settings file and
/// drop every archive in the tree, leaving a staging tree ready to mirror.
/// Extra packages outside the catalog are kept as downloaded.
///
/// Package failures are reported, not returned; a settings write failure
/// aborts.
pub fn stage_deployment(
    config: &Config,
    downloader: &Downloader,
    pool: &WorkerPool,
    version: &str,
    extra: &[String],
) -> Result<Vec<ItemOutcome>> {
    let catalog = config.catalog();
    let staging = config.staging_dir.as_path();

    println!(
        "[+] Downloading {} catalog packages for {version} into {staging:?}...",
        catalog.len()
    );

    let fetcher = PackageFetcher::new(downloader, pool, &catalog, &config.cdn_url, staging);
    let outcomes = fetcher.download_and_extract_packages(version, extra)?;

    for outcome in &outcomes {
        if outcome.is_failure() {
            println!("  ⚠️  {outcome}");
        } else {
            println!("  • {outcome}");
        }
    }

    let failed = count_failures(&outcomes);
    if failed > 0 {
        println!(
            "[!] {failed} of {} packages failed; continuing with the rest",
            outcomes.len()
        );
    }

    let settings_path = settings::write_app_settings(staging)?;
    tracing::debug!("Wrote {:?}", settings_path);

    let extras: Vec<PathBuf> = extra
        .iter()
        .filter(|name| !catalog.contains(name))
        .map(|name| staging.join(name))
        .collect();
    let removed = fs::remove_zip_files(staging, &extras)?;
    tracing::debug!("Removed {} downloaded archives", removed);

    Ok(outcomes)
}

/// Resolve the build to stage when none was given: the second-to-last
/// deployment in the feed.
pub fn resolve_old_version(config: &Config, downloader: &Downloader) -> Result<String> {
    let records = feed::fetch_deployments(downloader, &config.feed_url, &config.platform)?;
    let (old, _) = feed::select_old_and_latest(&records)?;
    Ok(old.version.clone())
}
