//! Run settings
//!
//! [`Settings`] is the persisted user document; [`CacherConfig`] is the
//! explicit value a cacher is built from.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CacheError, CacheResult};

/// Cache file name
pub const CACHE_FILE_NAME: &str = "asset.dat";
/// Backup of the previous cache
pub const BACKUP_FILE_NAME: &str = "asset.dat.bak";
/// Unresolved dependency report
pub const WARNINGS_FILE_NAME: &str = "warnings.log";
/// Export staging file
pub const TEMP_FILE_NAME: &str = "asset.dat.tmp";
/// Default settings document
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// How unresolved inputs are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputPolicy {
    /// Count only
    #[serde(alias = "relaxed")]
    Relaxed,
    /// Count and report in the warnings log
    #[default]
    #[serde(alias = "informative")]
    Informative,
    /// Report, and drop the input from the exported record
    #[serde(alias = "pedantic")]
    Pedantic,
}

impl InputPolicy {
    /// Whether missing inputs are written to the warnings log
    pub const fn logs_warnings(self) -> bool {
        matches!(self, Self::Informative | Self::Pedantic)
    }

    /// Whether missing inputs are invalidated
    pub const fn invalidates(self) -> bool {
        matches!(self, Self::Pedantic)
    }
}

impl fmt::Display for InputPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Relaxed => "Relaxed",
            Self::Informative => "Informative",
            Self::Pedantic => "Pedantic",
        };
        f.write_str(name)
    }
}

impl FromStr for InputPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "relaxed" => Ok(Self::Relaxed),
            "informative" => Ok(Self::Informative),
            "pedantic" => Ok(Self::Pedantic),
            other => Err(format!(
                "unknown input policy '{other}' (expected relaxed, informative or pedantic)"
            )),
        }
    }
}

/// Persisted user settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Import the previous cache and merge into it
    #[serde(rename = "Incremental")]
    pub incremental: bool,
    /// Print the effective settings before a run
    #[serde(rename = "Show settings")]
    pub show_settings: bool,
    /// Treatment of unresolved inputs
    #[serde(rename = "Input policy")]
    pub input_policy: InputPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            incremental: false,
            show_settings: true,
            input_policy: InputPolicy::Informative,
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults
    ///
    /// A missing document is normal on first use. A malformed one is
    /// reported and replaced by defaults on the next save.
    pub fn load(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                debug!("No settings at {}: {}", path.display(), e);
                return Self::default();
            }
        };

        serde_json::from_str(&text).unwrap_or_else(|e| {
            warn!("Ignoring malformed settings in {}: {}", path.display(), e);
            Self::default()
        })
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: &Path) -> CacheResult<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).map_err(|e| CacheError::io(path, e))
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "incremental: {}, show settings: {}, input policy: {}",
            self.incremental, self.show_settings, self.input_policy
        )
    }
}

/// Parameters of one cache run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacherConfig {
    /// Asset root; also holds the cache and its companion files
    pub root: PathBuf,
    /// Import the previous cache before scanning
    pub incremental: bool,
    /// Treatment of unresolved inputs
    pub input_policy: InputPolicy,
}

impl CacherConfig {
    /// Create a config for `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            incremental: false,
            input_policy: InputPolicy::default(),
        }
    }

    /// Take the run parameters from user settings
    pub fn from_settings(root: impl Into<PathBuf>, settings: &Settings) -> Self {
        Self {
            root: root.into(),
            incremental: settings.incremental,
            input_policy: settings.input_policy,
        }
    }

    /// Set the incremental flag
    pub fn with_incremental(mut self, incremental: bool) -> Self {
        self.incremental = incremental;
        self
    }

    /// Set the input policy
    pub fn with_input_policy(mut self, input_policy: InputPolicy) -> Self {
        self.input_policy = input_policy;
        self
    }

    /// Path of the cache file
    pub fn cache_path(&self) -> PathBuf {
        self.root.join(CACHE_FILE_NAME)
    }

    /// Path of the backup file
    pub fn backup_path(&self) -> PathBuf {
        self.root.join(BACKUP_FILE_NAME)
    }

    /// Path of the warnings log
    pub fn warnings_path(&self) -> PathBuf {
        self.root.join(WARNINGS_FILE_NAME)
    }

    /// Path of the export staging file
    pub fn temp_path(&self) -> PathBuf {
        self.root.join(TEMP_FILE_NAME)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(!settings.incremental);
        assert!(settings.show_settings);
        assert_eq!(settings.input_policy, InputPolicy::Informative);
    }

    #[test]
    fn test_document_keys() {
        let settings = Settings {
            incremental: true,
            show_settings: false,
            input_policy: InputPolicy::Pedantic,
        };
        let value = serde_json::to_value(&settings).expect("Operation should succeed");
        assert_eq!(
            value,
            serde_json::json!({
                "Incremental": true,
                "Show settings": false,
                "Input policy": "Pedantic"
            })
        );
    }

    #[test]
    fn test_lowercase_policy_and_missing_keys() {
        let settings: Settings =
            serde_json::from_str(r#"{ "Input policy": "relaxed", "Other": 1 }"#)
                .expect("Operation should succeed");
        assert_eq!(
            settings,
            Settings {
                input_policy: InputPolicy::Relaxed,
                ..Settings::default()
            }
        );
    }

    #[test]
    fn test_load_missing_and_malformed() {
        let dir = TempDir::new().expect("Operation should succeed");
        let path = dir.path().join(SETTINGS_FILE_NAME);
        assert_eq!(Settings::load(&path), Settings::default());

        fs::write(&path, "{ not json").expect("Operation should succeed");
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().expect("Operation should succeed");
        let path = dir.path().join(SETTINGS_FILE_NAME);
        let settings = Settings {
            incremental: true,
            show_settings: false,
            input_policy: InputPolicy::Relaxed,
        };

        settings.save(&path).expect("Operation should succeed");
        assert_eq!(Settings::load(&path), settings);
    }

    #[test]
    fn test_save_to_missing_directory() {
        let dir = TempDir::new().expect("Operation should succeed");
        let path = dir.path().join("missing").join(SETTINGS_FILE_NAME);
        assert!(matches!(
            Settings::default().save(&path),
            Err(CacheError::Io { .. })
        ));
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("Pedantic".parse::<InputPolicy>(), Ok(InputPolicy::Pedantic));
        assert_eq!("RELAXED".parse::<InputPolicy>(), Ok(InputPolicy::Relaxed));
        assert!("strict".parse::<InputPolicy>().is_err());
        assert_eq!(InputPolicy::Informative.to_string(), "Informative");
    }

    #[test]
    fn test_config_paths() {
        let config = CacherConfig::new("/assets").with_input_policy(InputPolicy::Pedantic);
        assert_eq!(config.cache_path(), Path::new("/assets/asset.dat"));
        assert_eq!(config.backup_path(), Path::new("/assets/asset.dat.bak"));
        assert_eq!(config.warnings_path(), Path::new("/assets/warnings.log"));
        assert_eq!(config.temp_path(), Path::new("/assets/asset.dat.tmp"));
        assert!(config.input_policy.invalidates());
    }
}
