use crate::core::feed::DeploymentRecord;
use crate::error::{RestageError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Downloaded and unpacked into the staging tree.
    Extracted { bytes: u64, files: usize },
    /// Downloaded but not in the catalog, so left as-is.
    Downloaded { bytes: u64 },
    Copied { bytes: u64 },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemOutcome {
    pub item: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl ItemOutcome {
    pub fn new<S: Into<String>>(item: S, outcome: Outcome) -> Self {
        Self {
            item: item.into(),
            outcome,
        }
    }

    pub fn failed<S: Into<String>>(item: S, error: &RestageError) -> Self {
        Self::new(
            item,
            Outcome::Failed {
                error: error.to_string(),
            },
        )
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failed { .. })
    }
}

impl fmt::Display for ItemOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Extracted { bytes, files } => {
                write!(f, "{}: extracted {files} files ({bytes} bytes)", self.item)
            }
            Outcome::Downloaded { bytes } => {
                write!(f, "{}: downloaded {bytes} bytes, not extracted", self.item)
            }
            Outcome::Copied { bytes } => write!(f, "{}: copied {bytes} bytes", self.item),
            Outcome::Failed { error } => write!(f, "{}: FAILED: {error}", self.item),
        }
    }
}

pub fn count_failures(outcomes: &[ItemOutcome]) -> usize {
    outcomes.iter().filter(|o| o.is_failure()).count()
}

/// Result of mirroring one source tree into one destination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MirrorReport {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Top-level destination entries removed before copying.
    pub removed: usize,
    pub files: Vec<ItemOutcome>,
}

impl MirrorReport {
    pub fn copied(&self) -> usize {
        self.files.len() - self.failed()
    }

    pub fn failed(&self) -> usize {
        count_failures(&self.files)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MirrorStatus {
    Completed { copied: usize, failed: usize },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MirrorOutcome {
    pub name: String,
    pub destination: PathBuf,
    #[serde(flatten)]
    pub status: MirrorStatus,
}

impl MirrorOutcome {
    pub fn from_result(name: &str, destination: &Path, result: &Result<MirrorReport>) -> Self {
        let status = match result {
            Ok(report) => MirrorStatus::Completed {
                copied: report.copied(),
                failed: report.failed(),
            },
            Err(e) => MirrorStatus::Failed {
                error: e.to_string(),
            },
        };

        Self {
            name: name.to_string(),
            destination: destination.to_path_buf(),
            status,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub old: Option<DeploymentRecord>,
    pub latest: Option<DeploymentRecord>,
    pub packages: Vec<ItemOutcome>,
    pub mirrors: Vec<MirrorOutcome>,
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            old: None,
            latest: None,
            packages: Vec::new(),
            mirrors: Vec::new(),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn failed_packages(&self) -> usize {
        count_failures(&self.packages)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                crate::utils::fs::ensure_dir_exists(parent)?;
            }
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_json_shape() {
        let outcome = ItemOutcome::new(
            "ssl.zip",
            Outcome::Extracted {
                bytes: 10,
                files: 2,
            },
        );
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["item"], "ssl.zip");
        assert_eq!(json["status"], "extracted");
        assert_eq!(json["files"], 2);
    }

    #[test]
    fn test_failure_counting() {
        let err = RestageError::download("shaders.zip", "unexpected status 404");
        let outcomes = vec![
            ItemOutcome::new("a", Outcome::Copied { bytes: 1 }),
            ItemOutcome::failed("b", &err),
        ];
        assert_eq!(count_failures(&outcomes), 1);
        assert!(outcomes[1].to_string().contains("unexpected status 404"));
    }

    #[test]
    fn test_mirror_outcome_from_error() {
        let result: Result<MirrorReport> = Err(RestageError::DestinationMissing {
            path: PathBuf::from("/nowhere"),
        });
        let outcome = MirrorOutcome::from_result("Roblox", Path::new("/nowhere"), &result);
        assert!(matches!(outcome.status, MirrorStatus::Failed { .. }));
    }

    #[test]
    fn test_run_report_writes_json() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("reports/run.json");

        let mut report = RunReport::new();
        report.latest = Some(DeploymentRecord {
            version: "version-eee".to_string(),
            file_version: "0467112".to_string(),
        });
        report.finish();
        report.write_json(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["latest"]["version"], "version-eee");
        assert!(json["finished_at"].is_string());
    }
}
