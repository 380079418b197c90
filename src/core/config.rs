use crate::core::catalog::PackageCatalog;
use crate::error::{RestageError, Result};
use crate::utils::fs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_FEED_URL: &str = "https://setup.rbxcdn.com/DeployHistory.txt";
pub const DEFAULT_CDN_URL: &str = "https://roblox-setup.cachefly.net";
pub const DEFAULT_PLATFORM: &str = "WindowsPlayer";

/// An installation whose `Versions/<version>` folder gets mirrored over.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InstallRoot {
    pub name: String,
    pub path: PathBuf,
    /// Printed when mirroring into this root fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl InstallRoot {
    pub fn version_dir(&self, version: &str) -> PathBuf {
        self.path.join(version)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub feed_url: String,
    pub cdn_url: String,
    pub platform: String,
    pub staging_dir: PathBuf,
    pub workers: usize,
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
    pub install_roots: Vec<InstallRoot>,
    /// Replaces the built-in package table when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<BTreeMap<String, String>>,
}

impl Default for Config {
    fn default() -> Self {
        let local_dir = dirs::data_local_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("AppData").join("Local")))
            .unwrap_or_else(|| PathBuf::from("."));

        Config {
            feed_url: DEFAULT_FEED_URL.to_string(),
            cdn_url: DEFAULT_CDN_URL.to_string(),
            platform: DEFAULT_PLATFORM.to_string(),
            staging_dir: PathBuf::from("out"),
            workers: 8,
            connect_timeout_secs: 30,
            timeout_secs: 600,
            install_roots: vec![
                InstallRoot {
                    name: "Roblox".to_string(),
                    path: local_dir.join("Roblox").join("Versions"),
                    hint: Some(
                        "Make sure Roblox is closed and updated before running again. \
                         (Ignore this if you're using Bloxstrap)"
                            .to_string(),
                    ),
                },
                InstallRoot {
                    name: "Bloxstrap".to_string(),
                    path: local_dir.join("Bloxstrap").join("Versions"),
                    hint: Some(
                        "Make sure Roblox & Bloxstrap are closed and updated before running \
                         again. (Ignore this if you're not using Bloxstrap)"
                            .to_string(),
                    ),
                },
            ],
            catalog: None,
        }
    }
}

impl Config {
    /// Load from `path`, or from the default location when `None`. A missing
    /// file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => get_config_path()?,
        };

        if !config_path.exists() {
            if path.is_some() {
                return Err(RestageError::config_error(format!(
                    "config file {config_path:?} does not exist"
                )));
            }
            tracing::debug!("No config at {:?}, using defaults", config_path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config = Self::parse(&content)?;
        tracing::debug!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| RestageError::config_error(format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(RestageError::config_error("workers must be at least 1"));
        }
        if self.feed_url.trim().is_empty() {
            return Err(RestageError::config_error("feed_url must not be empty"));
        }
        if self.cdn_url.trim().is_empty() {
            return Err(RestageError::config_error("cdn_url must not be empty"));
        }
        if self.platform.trim().is_empty() {
            return Err(RestageError::config_error("platform must not be empty"));
        }
        if self.catalog.is_some() && self.catalog().is_empty() {
            return Err(RestageError::config_error("catalog must not be empty"));
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| RestageError::config_error(format!("failed to serialize config: {e}")))
    }

    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => get_config_path()?,
        };

        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::ensure_dir_exists(parent)?;
            }
        }

        std::fs::write(&config_path, self.to_toml()?)?;
        Ok(config_path)
    }

    pub fn catalog(&self) -> PackageCatalog {
        match &self.catalog {
            Some(entries) => PackageCatalog::from_entries(
                entries.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            ),
            None => PackageCatalog::default(),
        }
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .map(|dir| dir.join("restage").join("config.toml"))
        .ok_or(RestageError::HomeDirectoryNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_partial_config_keeps_defaults() {
        let content = r#"
platform = "WindowsStudio64"
workers = 2

[[install_roots]]
name = "Portable"
path = "/opt/client/Versions"
"#;

        let config = Config::parse(content).unwrap();
        assert_eq!(config.platform, "WindowsStudio64");
        assert_eq!(config.workers, 2);
        assert_eq!(config.feed_url, DEFAULT_FEED_URL);
        assert_eq!(config.install_roots.len(), 1);
        assert_eq!(
            config.install_roots[0].version_dir("version-abc"),
            PathBuf::from("/opt/client/Versions/version-abc")
        );
        assert_eq!(config.install_roots[0].hint, None);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let err = Config::parse("workers = 0").unwrap_err();
        assert!(matches!(err, RestageError::ConfigError { .. }));
    }

    #[test]
    fn test_catalog_override() {
        let content = r#"
[catalog]
"RobloxApp.zip" = ""
"shaders.zip" = "shaders/"
"#;
        let config = Config::parse(content).unwrap();
        let catalog = config.catalog();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.subfolder("shaders.zip"), Some("shaders/"));
        assert_eq!(catalog.subfolder("ssl.zip"), None);
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let err = Config::parse("[catalog]\n").unwrap_err();
        assert!(matches!(err, RestageError::ConfigError { .. }));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("nested/config.toml");

        let mut config = Config::default();
        config.workers = 3;
        config.save(Some(&path)).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let missing = temp.path().join("nope.toml");
        assert!(Config::load(Some(&missing)).is_err());
    }
}
