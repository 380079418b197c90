use crate::commands::stage::{resolve_old_version, stage_deployment};
use crate::core::config::Config;
use crate::core::download::Downloader;
use crate::core::pool::WorkerPool;
use crate::core::report::{count_failures, ItemOutcome};
use crate::error::Result;

/// Stage a deployment without touching any installation.
pub fn fetch_packages(
    config: &Config,
    version: Option<&str>,
    extra: &[String],
) -> Result<Vec<ItemOutcome>> {
    let downloader = Downloader::new(config)?;
    let pool = WorkerPool::new(config.workers)?;

    let version = match version {
        Some(v) => v.to_string(),
        None => {
            println!("Fetching deployment history...");
            let v = resolve_old_version(config, &downloader)?;
            println!("Using deployment {v}");
            v
        }
    };

    let outcomes = stage_deployment(config, &downloader, &pool, &version, extra)?;

    let failed = count_failures(&outcomes);
    println!();
    if failed == 0 {
        println!("✅ Staged {version} in {:?}", config.staging_dir);
    } else {
        println!(
            "⚠️  Staged {version} in {:?} with {failed} failed package(s)",
            config.staging_dir
        );
    }

    Ok(outcomes)
}
