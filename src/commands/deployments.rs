use crate::core::config::Config;
use crate::core::download::Downloader;
use crate::core::feed::{self, DeploymentRecord};
use crate::error::Result;

pub fn list_deployments(config: &Config, limit: usize) -> Result<Vec<DeploymentRecord>> {
    let downloader = Downloader::new(config)?;
    let records = feed::fetch_deployments(&downloader, &config.feed_url, &config.platform)?;

    if records.is_empty() {
        println!("No deployments found for {}.", config.platform);
        return Ok(records);
    }

    println!("Deployments for {} (newest last):", config.platform);
    println!();

    let skip = records.len().saturating_sub(limit);
    let last = records.len() - 1;
    for (i, record) in records.iter().enumerate().skip(skip) {
        let marker = if i == last {
            " (latest)"
        } else if i + 1 == last {
            " (old, staged by `run`)"
        } else {
            ""
        };
        println!("  {}  {}{marker}", record.version, record.file_version);
    }

    Ok(records)
}
