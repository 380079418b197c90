//! Package catalog: which archives make up a deployment and where each one
//! is unpacked inside the staging tree.

use std::collections::BTreeMap;

const DEFAULT_PACKAGES: &[(&str, &str)] = &[
    ("RobloxApp.zip", ""),
    ("shaders.zip", "shaders/"),
    ("ssl.zip", "ssl/"),
    ("WebView2.zip", ""),
    ("WebView2RuntimeInstaller.zip", "WebView2RuntimeInstaller/"),
    ("content-avatar.zip", "content/avatar/"),
    ("content-configs.zip", "content/configs/"),
    ("content-fonts.zip", "content/fonts/"),
    ("content-sky.zip", "content/sky/"),
    ("content-sounds.zip", "content/sounds/"),
    ("content-textures2.zip", "content/textures/"),
    ("content-models.zip", "content/models/"),
    ("content-textures3.zip", "PlatformContent/pc/textures/"),
    ("content-terrain.zip", "PlatformContent/pc/terrain/"),
    ("content-platform-fonts.zip", "PlatformContent/pc/fonts/"),
    ("extracontent-luapackages.zip", "ExtraContent/LuaPackages/"),
    ("extracontent-translations.zip", "ExtraContent/translations/"),
    ("extracontent-models.zip", "ExtraContent/models/"),
    ("extracontent-textures.zip", "ExtraContent/textures/"),
    ("extracontent-places.zip", "ExtraContent/places/"),
];

/// Immutable package name -> destination subfolder table. An empty subfolder
/// means the staging root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageCatalog {
    entries: BTreeMap<String, String>,
}

impl Default for PackageCatalog {
    fn default() -> Self {
        Self::from_entries(DEFAULT_PACKAGES.iter().copied())
    }
}

impl PackageCatalog {
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, folder)| (name.to_string(), folder.to_string()))
                .collect(),
        }
    }

    pub fn subfolder(&self, package: &str) -> Option<&str> {
        self.entries.get(package).map(String::as_str)
    }

    pub fn contains(&self, package: &str) -> bool {
        self.entries.contains_key(package)
    }

    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
