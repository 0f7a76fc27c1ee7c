use std::{fmt, path::Path};

use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parsing(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parsing(e) => write!(f, "TOML parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        ConfigError::Parsing(value)
    }
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct Config {
    pub site: Option<SiteConfig>,
    pub dirs: Option<DirsConfig>,
}

impl Config {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&data)?;

        Ok(config)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct SiteConfig {
    pub title: Option<String>,
    pub tagline: Option<String>,
    pub author: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: Some("Plume".into()),
            tagline: Some("Documentation, indexed and rendered".to_string()),
            author: None,
        }
    }
}

/// Output directories for the generated index pages. Every field has a
/// default so an absent `[dirs]` table still yields usable paths.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct DirsConfig {
    pub tag_dir: String,
    pub category_dir: String,
    pub archive_dir: String,
    pub wiki_dir: String,
}

impl Default for DirsConfig {
    fn default() -> Self {
        Self {
            tag_dir: "tags".to_string(),
            category_dir: "categories".to_string(),
            archive_dir: "archives".to_string(),
            wiki_dir: "wiki".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dirs_default_when_table_missing() {
        let config: Config = toml::from_str("[site]\ntitle = \"Docs\"\n").unwrap();
        assert!(config.dirs.is_none());

        let dirs = DirsConfig::default();
        assert_eq!(dirs.tag_dir, "tags");
        assert_eq!(dirs.category_dir, "categories");
        assert_eq!(dirs.archive_dir, "archives");
        assert_eq!(dirs.wiki_dir, "wiki");
    }

    #[test]
    fn partial_dirs_table_fills_defaults() {
        let config: Config = toml::from_str("[dirs]\nwiki_dir = \"notes\"\n").unwrap();
        let dirs = config.dirs.unwrap();
        assert_eq!(dirs.wiki_dir, "notes");
        assert_eq!(dirs.tag_dir, "tags");
    }

    #[test]
    fn site_table_overrides_defaults() {
        let config: Config = toml::from_str("[site]\ntitle = \"Docs\"\n").unwrap();
        let site = config.site.unwrap();
        assert_eq!(site.title.as_deref(), Some("Docs"));
        // Absent fields fall back to the serde defaults, not None across the board
        assert!(site.tagline.is_some());
    }
}
