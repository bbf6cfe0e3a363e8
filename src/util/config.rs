//! Configuration file support for Rigging.
//!
//! Two configuration file locations are read:
//! - Global: `~/.rigging/config.toml` - User-wide defaults
//! - Project: `<recipe root>/.rigging/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::settings::{Settings, SettingsError};

/// Rigging configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend settings
    pub build: BuildConfig,

    /// Default settings profile, applied beneath the recipe's own settings
    pub settings: BTreeMap<String, String>,
}

/// Backend-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// CMake executable (None = `cmake` on PATH)
    pub cmake: Option<PathBuf>,

    /// CMake generator passed with `-G`
    pub generator: Option<String>,

    /// Default number of parallel jobs (None = backend default)
    pub jobs: Option<usize>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration, or the defaults if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.build.cmake.is_some() {
            self.build.cmake = other.build.cmake;
        }
        if other.build.generator.is_some() {
            self.build.generator = other.build.generator;
        }
        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }
        self.settings.extend(other.settings);
    }

    /// The configured settings profile, validated.
    pub fn default_settings(&self) -> Result<Settings, SettingsError> {
        Settings::from_pairs(self.settings.clone())
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.rigging/config.toml)
/// 2. Global config (~/.rigging/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global) = global_path {
        config.merge(Config::load_or_default(global)?);
    }
    config.merge(Config::load_or_default(project_path)?);

    tracing::debug!("config: {:?}", config);
    Ok(config)
}

/// Get the global rigging config directory (~/.rigging).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".rigging"))
}

/// Get the project config path (.rigging/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".rigging").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::SettingKey;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let config: Config = toml::from_str(
            r#"
[build]
cmake = "/opt/cmake/bin/cmake"
generator = "Ninja"
jobs = 8

[settings]
compiler = "clang"
"#,
        )
        .unwrap();

        assert_eq!(config.build.cmake, Some(PathBuf::from("/opt/cmake/bin/cmake")));
        assert_eq!(config.build.generator.as_deref(), Some("Ninja"));
        assert_eq!(config.build.jobs, Some(8));
        assert_eq!(
            config.default_settings().unwrap().get(SettingKey::Compiler),
            Some("clang")
        );
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_project_overrides_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = tmp.path().join("project.toml");
        std::fs::write(
            &global,
            "[build]\ngenerator = \"Unix Makefiles\"\njobs = 2\n\n[settings]\nos = \"Linux\"\ncompiler = \"gcc\"\n",
        )
        .unwrap();
        std::fs::write(
            &project,
            "[build]\njobs = 16\n\n[settings]\ncompiler = \"clang\"\n",
        )
        .unwrap();

        let config = load_config(Some(&global), &project).unwrap();
        assert_eq!(config.build.generator.as_deref(), Some("Unix Makefiles"));
        assert_eq!(config.build.jobs, Some(16));
        assert_eq!(config.settings.get("os").map(String::as_str), Some("Linux"));
        assert_eq!(config.settings.get("compiler").map(String::as_str), Some("clang"));
    }

    #[test]
    fn test_missing_files_are_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(None, &tmp.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_config_is_error() {
        let tmp = TempDir::new().unwrap();
        let project = project_config_path(tmp.path());
        std::fs::create_dir_all(project.parent().unwrap()).unwrap();
        std::fs::write(&project, "[build]\njobs = \"many\"\n").unwrap();

        assert!(load_config(None, &project).is_err());
    }

    #[test]
    fn test_unknown_setting_in_profile() {
        let config: Config = toml::from_str("[settings]\nlibcxx = \"libstdc++\"\n").unwrap();
        assert!(matches!(
            config.default_settings(),
            Err(SettingsError::UnknownKey(k)) if k == "libcxx"
        ));
    }
}
