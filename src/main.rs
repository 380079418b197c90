use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use restage::commands;
use restage::core::config::Config;
use restage::utils::logging;

#[derive(Parser)]
#[clap(name = "restage")]
#[clap(about = "Download, stage and mirror client deployment packages")]
#[clap(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Path to the configuration file (default: <config dir>/restage/config.toml)
    #[clap(long, global = true)]
    config: Option<PathBuf>,
    /// Show debug logging
    #[clap(short, long, global = true)]
    verbose: bool,
    #[clap(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Stage the previous deployment and mirror it over the installations (default)
    Run {
        /// Write a JSON report of the run to this path
        #[clap(long)]
        report: Option<PathBuf>,
        /// Stage only, do not touch any installation
        #[clap(long)]
        skip_mirror: bool,
        /// Extra package to download as-is (repeatable)
        #[clap(long = "extra-package")]
        extra_packages: Vec<String>,
    },
    /// List deployments from the history feed
    Deployments {
        /// Number of most recent deployments to show
        #[clap(short, long, default_value = "10")]
        limit: usize,
    },
    /// Download and extract packages into the staging directory only
    Fetch {
        /// Deployment version to fetch (default: the previous deployment)
        #[clap(long)]
        version: Option<String>,
        /// Extra package to download as-is (repeatable)
        #[clap(long = "extra-package")]
        extra_packages: Vec<String>,
    },
    /// Replace the contents of an existing directory with a copy of another tree
    Mirror {
        /// Tree to copy from
        source: PathBuf,
        /// Existing directory to wipe and fill
        destination: PathBuf,
    },
    /// Show the effective configuration, or write the defaults
    Config {
        /// Write the default configuration file
        #[clap(long)]
        init: bool,
        /// Overwrite an existing file with --init
        #[clap(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let config_path = cli.config.as_deref();
    let command = cli.command.unwrap_or(Commands::Run {
        report: None,
        skip_mirror: false,
        extra_packages: Vec::new(),
    });

    let result = match command {
        Commands::Config { init: true, force } => commands::config::init_config(config_path, force)
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!(e)),
        command => Config::load(config_path)
            .map_err(|e| anyhow::anyhow!(e))
            .and_then(|config| dispatch(command, &config, config_path)),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}

fn dispatch(command: Commands, config: &Config, config_path: Option<&std::path::Path>) -> Result<()> {
    match command {
        Commands::Run {
            report,
            skip_mirror,
            extra_packages,
        } => {
            let options = commands::run::RunOptions {
                report_path: report,
                skip_mirror,
                extra_packages,
            };
            commands::run::run(config, &options)
                .map(|_| ())
                .map_err(|e| anyhow::anyhow!(e))
        }
        Commands::Deployments { limit } => commands::deployments::list_deployments(config, limit)
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!(e)),
        Commands::Fetch {
            version,
            extra_packages,
        } => commands::fetch::fetch_packages(config, version.as_deref(), &extra_packages)
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!(e)),
        Commands::Mirror {
            source,
            destination,
        } => commands::mirror::mirror_tree(config, &source, &destination)
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!(e)),
        Commands::Config { .. } => {
            commands::config::show_config(config, config_path).map_err(|e| anyhow::anyhow!(e))
        }
    }
}
