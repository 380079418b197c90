use crate::core::config::{get_config_path, Config};
use crate::error::{RestageError, Result};
use std::path::{Path, PathBuf};

pub fn show_config(config: &Config, path: Option<&Path>) -> Result<()> {
    let location = match path {
        Some(p) => p.to_path_buf(),
        None => get_config_path()?,
    };

    if location.exists() {
        println!("# Loaded from {location:?}");
    } else {
        println!("# No config file at {location:?}; showing defaults");
    }
    println!("{}", config.to_toml()?);
    Ok(())
}

/// Write the default configuration so it can be edited.
pub fn init_config(path: Option<&Path>, force: bool) -> Result<PathBuf> {
    let location = match path {
        Some(p) => p.to_path_buf(),
        None => get_config_path()?,
    };

    if location.exists() && !force {
        return Err(RestageError::config_error(format!(
            "{location:?} already exists (use --force to overwrite)"
        )));
    }

    let written = Config::default().save(Some(&location))?;
    println!("✅ Wrote default configuration to {written:?}");
    Ok(written)
}
