//! Deployment history feed reader.
//!
//! The feed is plain text, one deployment per line, oldest first:
//!
//! ```text
//! New WindowsPlayer version-1a2b3c at 3/2/2021 6:13:21 PM, file version: 0, 465, 0, 410, git hash: 0.465.0.410 ...
//! ```

use crate::core::download::Downloader;
use crate::error::{RestageError, Result};
use serde::Serialize;
use std::io::{BufRead, BufReader};
use tracing::{debug, info};

const FIELD_COUNT: usize = 17;
const PLATFORM_FIELD: usize = 1;
const VERSION_FIELD: usize = 2;
const FILE_VERSION_FIELDS: std::ops::Range<usize> = 9..13;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentRecord {
    pub version: String,
    pub file_version: String,
}

impl std::fmt::Display for DeploymentRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (file version {})", self.version, self.file_version)
    }
}

/// Parse one feed line, returning `None` for lines that do not describe a
/// deployment of `platform`.
pub fn parse_line(line: &str, platform: &str) -> Option<DeploymentRecord> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != FIELD_COUNT || fields[PLATFORM_FIELD] != platform {
        return None;
    }

    Some(DeploymentRecord {
        version: fields[VERSION_FIELD].to_string(),
        file_version: fields[FILE_VERSION_FIELDS].concat().replace(',', ""),
    })
}

/// Parse a whole feed, keeping feed order. Lines are read as raw bytes, so
/// one undecodable line is skipped like any other non-matching line.
pub fn parse_deployments<R: BufRead>(reader: R, platform: &str) -> Result<Vec<DeploymentRecord>> {
    let mut records = Vec::new();
    for line in reader.split(b'\n') {
        let line = line?;
        if let Some(record) = parse_line(&String::from_utf8_lossy(&line), platform) {
            records.push(record);
        }
    }
    Ok(records)
}

pub fn fetch_deployments(
    downloader: &Downloader,
    url: &str,
    platform: &str,
) -> Result<Vec<DeploymentRecord>> {
    info!("Fetching deployment history from {}", url);
    let response = downloader.get(url)?;

    let records = parse_deployments(BufReader::new(response), platform)
        .map_err(|e| RestageError::network(url, format!("error reading deployment history: {e}")))?;

    debug!("{} deployments found for {}", records.len(), platform);
    Ok(records)
}

/// The second-to-last and last records: the build to download and the build
/// whose installation folder gets overwritten.
pub fn select_old_and_latest(
    records: &[DeploymentRecord],
) -> Result<(&DeploymentRecord, &DeploymentRecord)> {
    match records {
        [.., old, latest] => Ok((old, latest)),
        _ => Err(RestageError::EmptyFeed {
            found: records.len(),
        }),
    }
}
