use crate::core::config::Config;
use crate::error::{RestageError, Result};
use crate::utils::fs;
use reqwest::blocking::{Client, Response};
use std::fs::File;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("restage/", env!("CARGO_PKG_VERSION"));

/// Blocking HTTP client shared by the feed reader and the package workers.
#[derive(Clone)]
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_timeouts(
            Duration::from_secs(config.connect_timeout_secs),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn with_timeouts(connect_timeout: Duration, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| RestageError::config_error(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// GET `url`, treating transport failures and non-success statuses as
    /// `Network` errors.
    pub fn get(&self, url: &str) -> Result<Response> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| RestageError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RestageError::network(url, format!("unexpected status {status}")));
        }

        Ok(response)
    }

    /// Stream the body of `url` into `destination`, returning the bytes written.
    pub fn download_file(&self, url: &str, destination: &Path) -> Result<u64> {
        let mut response = self.get(url)?;

        if let Some(parent) = destination.parent() {
            fs::ensure_dir_exists(parent)?;
        }

        let mut file = File::create(destination)?;
        let written = std::io::copy(&mut response, &mut file)
            .map_err(|e| RestageError::network(url, format!("error reading body: {e}")))?;

        debug!("Downloaded {} bytes to {:?}", written, destination);
        Ok(written)
    }
}
