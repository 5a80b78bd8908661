//! Configuration management for tcctl
//!
//! Handles configuration loading from files and environment variables.
//! Configuration is stored in TOML format with support for multiple named profiles.

#[cfg(target_os = "macos")]
use directories::BaseDirs;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::error::{ConfigError, Result};
use super::resilience::{PollConfig, RetryConfig};

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Profile used when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    /// Map of profile name -> profile configuration
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// One TeamCloud instance
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Profile {
    /// Base URL of the TeamCloud API
    pub url: String,
    /// Bearer token sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Accept invalid TLS certificates
    #[serde(default)]
    pub insecure: bool,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub poll: PollConfig,
}

impl Profile {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            access_token: None,
            insecure: false,
            retry: RetryConfig::default(),
            poll: PollConfig::default(),
        }
    }

    pub fn has_access_token(&self) -> bool {
        self.access_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

impl Config {
    /// Resolve the profile to use
    ///
    /// Resolution order: explicit name, `default_profile`, then the first
    /// profile in alphabetical order.
    pub fn resolve_profile(&self, explicit_profile: Option<&str>) -> Result<String> {
        if let Some(profile_name) = explicit_profile {
            return Ok(profile_name.to_string());
        }

        if let Some(ref default) = self.default_profile {
            return Ok(default.clone());
        }

        if let Some((name, _)) = self.list_profiles().first() {
            return Ok((*name).clone());
        }

        Err(ConfigError::NoProfiles {
            suggestion: "Use 'tcctl profile set' to create a profile, or pass --url.".to_string(),
        })
    }

    /// Look up a profile by name
    pub fn profile(&self, name: &str) -> Result<&Profile> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.to_string(),
            })
    }

    /// Load configuration from the standard location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::LoadError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        // Expand environment variables in the config content
        let expanded_content = Self::expand_env_vars(&content);

        let config: Config = toml::from_str(&expanded_content)?;

        Ok(config)
    }

    /// Save configuration to the standard location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to_path(&config_path)
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::SaveError {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self)?;

        fs::write(config_path, content).map_err(|e| ConfigError::SaveError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        Ok(())
    }

    /// Set or update a profile
    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }

    /// Remove a profile by name, clearing the default if it pointed there
    pub fn remove_profile(&mut self, name: &str) -> Option<Profile> {
        if self.default_profile.as_deref() == Some(name) {
            self.default_profile = None;
        }
        self.profiles.remove(name)
    }

    /// List all profiles sorted by name
    pub fn list_profiles(&self) -> Vec<(&String, &Profile)> {
        let mut profiles: Vec<_> = self.profiles.iter().collect();
        profiles.sort_by_key(|(name, _)| *name);
        profiles
    }

    /// Get the path to the configuration file
    ///
    /// On macOS, `~/.config/tcctl/config.toml` is preferred when it (or its
    /// directory) exists, falling back to the platform location.
    ///
    /// On Linux: ~/.config/tcctl/config.toml
    /// On Windows: %APPDATA%\teamcloud\tcctl\config\config.toml
    pub fn config_path() -> Result<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            if let Some(base_dirs) = BaseDirs::new() {
                let linux_style_path = base_dirs
                    .home_dir()
                    .join(".config")
                    .join("tcctl")
                    .join("config.toml");

                if linux_style_path.exists()
                    || linux_style_path
                        .parent()
                        .map(|p| p.exists())
                        .unwrap_or(false)
                {
                    return Ok(linux_style_path);
                }
            }
        }

        let proj_dirs =
            ProjectDirs::from("com", "teamcloud", "tcctl").ok_or(ConfigError::ConfigDirError)?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Expand environment variables in configuration content
    ///
    /// Supports ${VAR} and ${VAR:-default}. Unset variables without a
    /// default are left as-is.
    ///
    /// Example:
    /// ```toml
    /// access_token = "${TC_ACCESS_TOKEN}"
    /// url = "${TC_URL:-https://teamcloud.example.com}"
    /// ```
    fn expand_env_vars(content: &str) -> String {
        let expanded =
            shellexpand::env_with_context_no_errors(content, |var| std::env::var(var).ok());
        expanded.to_string()
    }
}
