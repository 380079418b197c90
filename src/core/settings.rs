use crate::error::Result;
use crate::utils::fs;
use std::path::{Path, PathBuf};

pub const APP_SETTINGS_FILE: &str = "AppSettings.xml";

pub const APP_SETTINGS_XML: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<Settings>\n\
\t<ContentFolder>content</ContentFolder>\n\
\t<BaseUrl>http://www.roblox.com</BaseUrl>\n\
</Settings>";

/// Write the client's `AppSettings.xml` at the root of the staging tree.
pub fn write_app_settings(staging: &Path) -> Result<PathBuf> {
    fs::ensure_dir_exists(staging)?;
    let path = staging.join(APP_SETTINGS_FILE);
    std::fs::write(&path, APP_SETTINGS_XML)?;
    Ok(path)
}
