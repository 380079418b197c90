use crate::commands::mirror::mirror_installations;
use crate::commands::stage::stage_deployment;
use crate::core::config::Config;
use crate::core::download::Downloader;
use crate::core::feed;
use crate::core::pool::WorkerPool;
use crate::core::report::{MirrorStatus, RunReport};
use crate::error::Result;
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Write the JSON run report here when set.
    pub report_path: Option<PathBuf>,
    /// Stop after staging.
    pub skip_mirror: bool,
    pub extra_packages: Vec<String>,
}

/// Full run: read the feed, stage the second-newest deployment and mirror it
/// into every installation folder named after the newest one.
///
/// Feed and settings failures abort; package and mirror failures end up in
/// the returned report.
pub fn run(config: &Config, options: &RunOptions) -> Result<RunReport> {
    let mut report = RunReport::new();
    let downloader = Downloader::new(config)?;
    let pool = WorkerPool::new(config.workers)?;

    println!("Fetching deployment history...");
    let deployments = feed::fetch_deployments(&downloader, &config.feed_url, &config.platform)?;
    let (old, latest) = feed::select_old_and_latest(&deployments)?;

    println!("Old deployment for {}: {old}", config.platform);
    println!("Latest deployment for {}: {latest}", config.platform);
    report.old = Some(old.clone());
    report.latest = Some(latest.clone());

    report.packages = stage_deployment(
        config,
        &downloader,
        &pool,
        &old.version,
        &options.extra_packages,
    )?;

    if options.skip_mirror {
        println!("[*] Skipping installation mirror; staged files are in {:?}", config.staging_dir);
    } else {
        report.mirrors = mirror_installations(config, &pool, &latest.version);
    }

    report.finish();

    if let Some(path) = &options.report_path {
        report.write_json(path)?;
        println!("Run report written to {path:?}");
    }

    let mirrored = report
        .mirrors
        .iter()
        .filter(|m| matches!(m.status, MirrorStatus::Completed { .. }))
        .count();
    println!();
    println!(
        "[+] Done! {} package(s) failed, {mirrored}/{} installation(s) updated.",
        report.failed_packages(),
        report.mirrors.len()
    );

    Ok(report)
}
