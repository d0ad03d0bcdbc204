use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths::normalize_lexically;

const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../../config.example.toml");

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub additional_allowed_directories: AdditionalAllowedDirectories,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub project: ProjectConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdditionalAllowedDirectories {
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NotifyConfig {
    pub macos_notify: bool,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProjectConfig {
    /// Keep a copy of the descriptor as `project.pbxproj.bak` before saving.
    pub backup: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            additional_allowed_directories: AdditionalAllowedDirectories { paths: vec![] },
            notify: NotifyConfig::default(),
            project: ProjectConfig::default(),
        }
    }
}

impl Config {
    /// Loads the configuration used for a run.
    ///
    /// # Resolution
    /// 1. `XCPROJ_HELPER_TEST_MODE=1` without `XCPROJ_HELPER_DISABLE_TEST_MODE`
    ///    returns an allow-all config and never touches the filesystem
    /// 2. Otherwise reads `XCPROJ_HELPER_CONFIG_PATH` or
    ///    `~/.config/xcproj-helper/config.toml`
    /// 3. A missing config file is created from the bundled template
    pub fn load() -> Result<Self, String> {
        if Self::is_explicit_allow_all_test_mode_enabled() {
            return Ok(Self {
                additional_allowed_directories: AdditionalAllowedDirectories {
                    paths: vec![PathBuf::from("/")],
                },
                ..Self::default()
            });
        }

        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;

        let config: Config =
            toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))?;
        config.validate()?;

        Ok(config)
    }

    fn is_explicit_allow_all_test_mode_enabled() -> bool {
        if std::env::var("XCPROJ_HELPER_DISABLE_TEST_MODE").is_ok() {
            return false;
        }

        matches!(std::env::var("XCPROJ_HELPER_TEST_MODE").as_deref(), Ok("1"))
    }

    /// `additional_allowed_directories.paths` accepts absolute paths only.
    fn validate(&self) -> Result<(), String> {
        for (index, path) in self.additional_allowed_directories.paths.iter().enumerate() {
            if !path.is_absolute() {
                return Err(format!(
                    "Invalid config: additional_allowed_directories.paths[{index}] must be an absolute path: {}",
                    path.display()
                ));
            }
        }

        Ok(())
    }

    /// Checks whether a file may be moved from or to `path`.
    ///
    /// Every path is allowed while `additional_allowed_directories.paths` is
    /// empty. Once directories are listed, `path` must fall under one of:
    ///
    /// # Scopes
    /// - the current working directory
    /// - `source_root`, the directory the project's groups resolve against
    /// - every entry of `additional_allowed_directories.paths`
    pub fn is_path_allowed(&self, path: &Path, source_root: &Path) -> bool {
        if self.additional_allowed_directories.paths.is_empty() {
            return true;
        }

        let Some(resolved_target) = Self::resolve_target_path(path) else {
            return false;
        };

        self.allowed_scopes(source_root)
            .iter()
            .any(|scope| resolved_target.starts_with(scope))
    }

    fn resolve_target_path(path: &Path) -> Option<PathBuf> {
        let absolute_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            let cwd = std::env::current_dir().ok()?;
            cwd.join(path)
        };

        Some(Self::canonicalize_with_missing(&absolute_path))
    }

    /// Canonicalizes the longest existing prefix and appends the missing tail.
    fn canonicalize_with_missing(path: &Path) -> PathBuf {
        if path.exists() {
            return path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        }

        let mut existing = path;
        let mut missing_tail: Vec<std::ffi::OsString> = Vec::new();

        while !existing.exists() {
            let Some(name) = existing.file_name() else {
                break;
            };
            missing_tail.push(name.to_os_string());

            let Some(parent) = existing.parent() else {
                break;
            };
            existing = parent;
        }

        let mut resolved = if existing.exists() {
            existing
                .canonicalize()
                .unwrap_or_else(|_| existing.to_path_buf())
        } else {
            existing.to_path_buf()
        };

        for part in missing_tail.iter().rev() {
            resolved.push(part);
        }

        normalize_lexically(&resolved)
    }

    fn allowed_scopes(&self, source_root: &Path) -> Vec<PathBuf> {
        let mut scopes = Vec::new();

        if let Ok(cwd) = std::env::current_dir() {
            scopes.push(cwd.canonicalize().unwrap_or(cwd));
        }

        scopes.push(Self::canonicalize_with_missing(source_root));

        for dir in &self.additional_allowed_directories.paths {
            scopes.push(Self::canonicalize_with_missing(dir));
        }

        scopes
    }

    /// Determines the path to the configuration file.
    ///
    /// # Priority
    /// 1. XCPROJ_HELPER_CONFIG_PATH environment variable
    /// 2. ~/.config/xcproj-helper/config.toml
    fn config_path() -> Result<PathBuf, String> {
        if let Ok(path) = std::env::var("XCPROJ_HELPER_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let home_dir =
            dirs::home_dir().ok_or_else(|| "Could not determine home directory".to_string())?;

        Ok(home_dir
            .join(".config")
            .join("xcproj-helper")
            .join("config.toml"))
    }

    fn create_default_config(config_path: &Path) -> Result<(), String> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {e}"))?;
        }

        fs::write(config_path, DEFAULT_CONFIG_TEMPLATE)
            .map_err(|e| format!("Failed to write default config: {e}"))
    }
}
