//! Runtime configuration
//!
//! Resolution order, lowest to highest precedence: built-in defaults, the
//! TOML config file, `ROSTER_*` environment variables (a `.env` file is
//! honoured), then command-line flags.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "roster-sync";
pub const CONFIG_FILE_NAME: &str = "config.toml";

pub const ENV_CONFIG: &str = "ROSTER_CONFIG";
pub const ENV_DATA_DIR: &str = "ROSTER_DATA_DIR";
pub const ENV_ARCHIVE_DIR: &str = "ROSTER_ARCHIVE_DIR";

/// Where the workbooks live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the master and queue workbooks
    pub data_dir: PathBuf,
    /// Directory receiving archived queues and rejection reports
    pub archive_dir: PathBuf,
    pub master_file: String,
    pub queue_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("Data"),
            archive_dir: PathBuf::from("Archive"),
            master_file: "Master_Database.xlsx".into(),
            queue_file: "update_queue.xlsx".into(),
        }
    }
}

impl Config {
    /// Load configuration from `explicit`, `$ROSTER_CONFIG`, or the user
    /// config directory, in that order; then apply environment overrides
    ///
    /// A missing file is only an error when it was named explicitly.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(ENV_CONFIG).map(PathBuf::from));

        let mut config = match named {
            Some(path) => Self::from_file(&path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply `ROSTER_DATA_DIR` / `ROSTER_ARCHIVE_DIR` via `lookup`; blank
    /// values are ignored
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v: &String| !v.trim().is_empty());

        if let Some(dir) = non_blank(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = non_blank(ENV_ARCHIVE_DIR) {
            self.archive_dir = PathBuf::from(dir);
        }
    }

    /// Apply `--data-dir` / `--archive-dir`
    pub fn apply_overrides(&mut self, data_dir: Option<PathBuf>, archive_dir: Option<PathBuf>) {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        if let Some(dir) = archive_dir {
            self.archive_dir = dir;
        }
    }

    pub fn master_path(&self) -> PathBuf {
        self.data_dir.join(&self.master_file)
    }

    pub fn queue_path(&self) -> PathBuf {
        self.data_dir.join(&self.queue_file)
    }
}

/// `~/.config/roster-sync/config.toml` (platform equivalent)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.master_path(), PathBuf::from("Data/Master_Database.xlsx"));
        assert_eq!(config.queue_path(), PathBuf::from("Data/update_queue.xlsx"));
        assert_eq!(config.archive_dir, PathBuf::from("Archive"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(r#"data_dir = "/srv/roster""#).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/roster"));
        assert_eq!(config.queue_file, "update_queue.xlsx");
    }

    #[test]
    fn test_env_overrides_directories() {
        let mut config = Config::default();
        config.apply_env(env(&[(ENV_DATA_DIR, "/srv/roster")]));
        assert_eq!(config.data_dir, PathBuf::from("/srv/roster"));
        assert_eq!(config.archive_dir, PathBuf::from("Archive"));

        config.apply_env(env(&[(ENV_ARCHIVE_DIR, "/mnt/archive")]));
        assert_eq!(config.archive_dir, PathBuf::from("/mnt/archive"));
    }

    #[test]
    fn test_flags_override_env() {
        let mut config = Config::default();
        config.apply_env(env(&[(ENV_DATA_DIR, "/srv/roster")]));
        config.apply_overrides(Some(PathBuf::from("/tmp/roster")), None);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/roster"));
        assert_eq!(config.archive_dir, PathBuf::from("Archive"));
    }

    #[test]
    fn test_blank_env_ignored() {
        let mut config = Config::default();
        config.apply_env(env(&[(ENV_DATA_DIR, "  ")]));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "archive_dir = \"old\"\nmaster_file = \"m.xlsx\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.archive_dir, PathBuf::from("old"));
        assert_eq!(config.master_file, "m.xlsx");
        assert!(Config::from_file(&dir.path().join("missing.toml")).is_err());
    }
}
