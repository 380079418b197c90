use crate::core::config::Config;
use crate::core::mirror::{replace_files, replace_files_except};
use crate::core::packages::staging_marker;
use crate::core::pool::WorkerPool;
use crate::core::report::{MirrorOutcome, MirrorReport};
use crate::error::Result;
use std::path::Path;

fn print_report(report: &MirrorReport) {
    for failure in report.files.iter().filter(|f| f.is_failure()) {
        println!("  ⚠️  {failure}");
    }
    println!(
        "  {} files copied, {} failed, {} old entries removed",
        report.copied(),
        report.failed(),
        report.removed
    );
}

/// Mirror an arbitrary `source` tree over `destination`.
pub fn mirror_tree(config: &Config, source: &Path, destination: &Path) -> Result<MirrorReport> {
    let pool = WorkerPool::new(config.workers)?;

    println!("[+] Replacing files in {destination:?} with {source:?}");
    let report = replace_files(source, destination, &pool)?;
    print_report(&report);

    Ok(report)
}

/// Mirror the staging tree into `<root>/<version>` of every configured
/// installation root. A failing root is reported and the next one is still
/// attempted.
pub fn mirror_installations(config: &Config, pool: &WorkerPool, version: &str) -> Vec<MirrorOutcome> {
    let mut outcomes = Vec::with_capacity(config.install_roots.len());
    let skip = [staging_marker(&config.staging_dir)];

    for root in &config.install_roots {
        let destination = root.version_dir(version);
        println!("[+] Replacing files in {} directory: {destination:?}", root.name);

        let result = replace_files_except(&config.staging_dir, &destination, pool, &skip);
        match &result {
            Ok(report) => {
                print_report(report);
                println!("[+] Files replaced in {} directory!", root.name);
            }
            Err(e) => {
                tracing::warn!("Mirror into {:?} failed: {}", destination, e);
                println!("  ⚠️  {e}");
                if let Some(hint) = &root.hint {
                    println!("  {hint}");
                }
            }
        }

        outcomes.push(MirrorOutcome::from_result(&root.name, &destination, &result));
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::InstallRoot;
    use crate::core::report::MirrorStatus;
    use tempfile::TempDir;

    #[test]
    fn test_failed_root_does_not_block_the_next() {
        let temp = TempDir::new().unwrap();
        let staging = temp.path().join("out");
        std::fs::create_dir_all(staging.join("content")).unwrap();
        std::fs::write(staging.join("content/a.txt"), "a").unwrap();
        std::fs::write(staging_marker(&staging), "").unwrap();

        let present = temp.path().join("Bloxstrap/Versions");
        std::fs::create_dir_all(present.join("version-new")).unwrap();

        let config = Config {
            staging_dir: staging,
            install_roots: vec![
                InstallRoot {
                    name: "Roblox".to_string(),
                    path: temp.path().join("Roblox/Versions"),
                    hint: Some("close it first".to_string()),
                },
                InstallRoot {
                    name: "Bloxstrap".to_string(),
                    path: present.clone(),
                    hint: None,
                },
            ],
            ..Config::default()
        };

        let pool = WorkerPool::new(2).unwrap();
        let outcomes = mirror_installations(&config, &pool, "version-new");

        assert_eq!(outcomes.len(), 2);
        assert!(matches!(outcomes[0].status, MirrorStatus::Failed { .. }));
        assert_eq!(
            outcomes[1].status,
            MirrorStatus::Completed {
                copied: 1,
                failed: 0
            }
        );
        assert!(present.join("version-new/content/a.txt").exists());
        assert!(!staging_marker(&present.join("version-new")).exists());
    }
}
