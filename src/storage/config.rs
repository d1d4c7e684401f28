use super::Result;
use crate::error::{ConfigError, StorageError};
use crate::utils::validation::validate_url;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_DIR_NAME: &str = "chms-cli";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DEFAULT_PROFILE_NAME: &str = "default";
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Keys accepted by `config set`
pub const SETTABLE_KEYS: [&str; 4] = ["api_url", "timeout_seconds", "page_size", "default_profile"];

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub default_profile: Option<String>,
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Profile {
    pub api_url: String,
    pub timeout_seconds: Option<u64>,
    pub page_size: Option<u32>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_seconds: None,
            page_size: None,
        }
    }
}

impl Profile {
    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

impl Config {
    /// Location of the config file, inside `dir` when given
    pub fn file_path(dir: Option<&Path>) -> Result<PathBuf> {
        let dir = match dir {
            Some(dir) => dir.to_path_buf(),
            None => dirs::config_dir()
                .ok_or(StorageError::ConfigDirNotFound)?
                .join(APP_DIR_NAME),
        };
        Ok(dir.join(CONFIG_FILE_NAME))
    }

    /// Missing files yield the default configuration
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| StorageError::FileIo {
            path: path.to_string_lossy().to_string(),
            source,
        })?;

        toml::from_str(&content).map_err(|e| StorageError::ConfigParseError {
            message: format!("{}: {}", path.display(), e),
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::FileIo {
                path: parent.to_string_lossy().to_string(),
                source,
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| StorageError::ConfigSaveFailed {
            message: e.to_string(),
        })?;

        fs::write(path, content).map_err(|source| StorageError::FileIo {
            path: path.to_string_lossy().to_string(),
            source,
        })?;
        log::debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Explicit name, then the configured default, then `default`
    pub fn active_profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_string)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| DEFAULT_PROFILE_NAME.to_string())
    }

    /// Profile to run with. A missing profile is an error only when it was
    /// asked for by name; otherwise the built-in defaults apply.
    pub fn resolve_profile(&self, requested: Option<&str>) -> std::result::Result<Profile, ConfigError> {
        let name = self.active_profile_name(requested);
        match self.profiles.get(&name) {
            Some(profile) => Ok(profile.clone()),
            None if requested.is_some() => Err(ConfigError::ProfileNotFound { name }),
            None => Ok(Profile::default()),
        }
    }

    pub fn get_profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }

    /// Apply `config set <key> <value>` to profile `profile_name`
    pub fn set_value(
        &mut self,
        profile_name: &str,
        key: &str,
        value: &str,
    ) -> std::result::Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidValue {
            field: key.to_string(),
            value: value.to_string(),
            reason,
        };

        if key == "default_profile" {
            if value.trim().is_empty() {
                return Err(invalid("profile name cannot be empty".to_string()));
            }
            self.default_profile = Some(value.to_string());
            return Ok(());
        }

        let profile = self.profiles.entry(profile_name.to_string()).or_default();
        match key {
            "api_url" => {
                validate_url(value).map_err(|e| invalid(e.to_string()))?;
                profile.api_url = value.trim_end_matches('/').to_string();
            }
            "timeout_seconds" => {
                let secs = value
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or_else(|| invalid("expected a positive number of seconds".to_string()))?;
                profile.timeout_seconds = Some(secs);
            }
            "page_size" => {
                let size = value
                    .parse::<u32>()
                    .ok()
                    .filter(|size| *size > 0)
                    .ok_or_else(|| invalid("expected a positive page size".to_string()))?;
                profile.page_size = Some(size);
            }
            _ => {
                return Err(invalid(format!(
                    "unknown key, expected one of: {}",
                    SETTABLE_KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }
}
