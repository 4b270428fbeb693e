use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use common::{MediaKind, ScanRoot};
use serde::{Deserialize, Serialize};

use crate::filter::FileFilter;

pub const CONFIG_VERSION: u32 = 1;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub movies: Vec<String>,
    pub tv_shows: Vec<String>,
    pub concerts: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    pub version: u32,
    pub index_path: String,
    pub debug_log: bool,
    pub movies: Vec<ScanRoot>,
    pub tv_shows: Vec<ScanRoot>,
    pub concerts: Vec<ScanRoot>,
    pub filters: FilterConfig,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            index_path: "media.redb".to_string(),
            debug_log: false,
            movies: Vec::new(),
            tv_shows: Vec::new(),
            concerts: Vec::new(),
            filters: FilterConfig::default(),
        }
    }
}

impl LibraryConfig {
    pub fn directories(&self, kind: MediaKind) -> &[ScanRoot] {
        match kind {
            MediaKind::Movie => &self.movies,
            MediaKind::TvShow => &self.tv_shows,
            MediaKind::Concert => &self.concerts,
        }
    }

    pub fn file_filter(&self, kind: MediaKind) -> FileFilter {
        let patterns = match kind {
            MediaKind::Movie => &self.filters.movies,
            MediaKind::TvShow => &self.filters.tv_shows,
            MediaKind::Concert => &self.filters.concerts,
        };
        if patterns.iter().all(|pattern| pattern.trim().is_empty()) {
            FileFilter::video()
        } else {
            FileFilter::new(patterns)
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "io error: {}", err),
            ConfigError::Yaml(err) => write!(f, "yaml error: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Yaml(err)
    }
}

pub fn config_path_from_env() -> PathBuf {
    match env::var("MEDIASHELF_CONFIG") {
        Ok(value) if !value.trim().is_empty() => PathBuf::from(value),
        _ => default_config_path(),
    }
}

fn default_config_path() -> PathBuf {
    match env::current_exe() {
        Ok(exe) => exe
            .parent()
            .map(|dir| dir.join("config.yaml"))
            .unwrap_or_else(|| PathBuf::from("config.yaml")),
        Err(_) => PathBuf::from("config.yaml"),
    }
}

pub fn load_or_create_config(path: &Path) -> Result<(LibraryConfig, bool), ConfigError> {
    if path.exists() {
        let contents = fs::read_to_string(path)?;
        let mut config: LibraryConfig = serde_yaml::from_str(&contents)?;
        if config.version < CONFIG_VERSION {
            config.version = CONFIG_VERSION;
        }
        if config.index_path.trim().is_empty() {
            config.index_path = "media.redb".to_string();
        }
        return Ok((config, false));
    }

    let config = LibraryConfig::default();
    save_config(path, &config)?;
    Ok((config, true))
}

pub fn save_config(path: &Path, config: &LibraryConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let contents = serde_yaml::to_string(config)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Anchors a relative `value` at the directory holding the configuration.
pub fn resolve_path(config_path: &Path, value: &str) -> PathBuf {
    let raw = PathBuf::from(value);
    if raw.is_absolute() {
        return raw;
    }
    let base = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    base.join(raw)
}

pub fn resolve_directories(
    config_path: &Path,
    config: &LibraryConfig,
    kind: MediaKind,
) -> Vec<ScanRoot> {
    config
        .directories(kind)
        .iter()
        .map(|root| ScanRoot {
            path: resolve_path(config_path, &root.path.to_string_lossy()),
            ..root.clone()
        })
        .collect()
}
