//! Connection management for TeamCloud clients

use crate::error::{Result as CliResult, TcCtlError};
use anyhow::Context;
use tcctl_core::{Config, ConfigError, PollConfig, Profile, RetryConfig, TeamCloudClient};
use tracing::{debug, info, trace};

/// User agent string for tcctl HTTP requests
const TCCTL_USER_AGENT: &str = concat!("tcctl/", env!("CARGO_PKG_VERSION"));

const ENV_URL: &str = "TC_URL";
const ENV_ACCESS_TOKEN: &str = "TC_ACCESS_TOKEN";

/// A client plus the retry and polling policy of the profile it came from
pub struct Connection {
    pub client: TeamCloudClient,
    pub retry: RetryConfig,
    pub poll: PollConfig,
}

/// Connection manager for creating authenticated clients
#[derive(Clone)]
pub struct ConnectionManager {
    pub config: Config,
    pub config_path: Option<std::path::PathBuf>,
}

impl ConnectionManager {
    /// Create a new connection manager with a custom config path
    pub fn with_config_path(config: Config, config_path: Option<std::path::PathBuf>) -> Self {
        Self {
            config,
            config_path,
        }
    }

    /// Save the configuration to the appropriate location
    pub fn save_config(&self) -> CliResult<()> {
        if let Some(ref path) = self.config_path {
            self.config
                .save_to_path(path)
                .context("Failed to save configuration")?;
        } else {
            self.config.save().context("Failed to save configuration")?;
        }
        Ok(())
    }

    /// Create a client for the TeamCloud instance named on the command line
    ///
    /// The base url comes from `--url`, then `TC_URL`, then the resolved
    /// profile. `TC_ACCESS_TOKEN` overrides the profile token. When
    /// --config-file is explicitly specified, environment variables are
    /// ignored.
    pub fn create_client(
        &self,
        url_flag: Option<&str>,
        profile_name: Option<&str>,
    ) -> CliResult<Connection> {
        debug!("Creating TeamCloud client");
        trace!("Url flag: {:?}, profile name: {:?}", url_flag, profile_name);

        let use_env_vars = self.config_path.is_none();
        if !use_env_vars {
            info!("--config-file specified explicitly, ignoring environment variables");
        }
        let env_var = |name: &str| {
            if use_env_vars {
                std::env::var(name).ok().filter(|v| !v.is_empty())
            } else {
                None
            }
        };

        let profile = self.lookup_profile(profile_name)?;

        let url = match (url_flag, env_var(ENV_URL), profile) {
            (Some(url), _, _) => {
                debug!("Using url from --url");
                url.to_string()
            }
            (None, Some(url), _) => {
                info!("Using url from {} environment variable", ENV_URL);
                url
            }
            (None, None, Some(profile)) => profile.url.clone(),
            (None, None, None) => return Err(TcCtlError::NoUrlConfigured),
        };

        let access_token = match env_var(ENV_ACCESS_TOKEN) {
            Some(token) => {
                debug!("Found {} environment variable", ENV_ACCESS_TOKEN);
                Some(token)
            }
            None => profile.and_then(|p| p.access_token.clone()),
        };
        if access_token.is_none() {
            debug!("No access token configured, sending unauthenticated requests");
        }

        let insecure = profile.is_some_and(|p| p.insecure);
        let client = TeamCloudClient::builder()
            .base_url(url)
            .access_token(access_token)
            .user_agent(TCCTL_USER_AGENT)
            .insecure(insecure)
            .build()?;
        info!("Connecting to TeamCloud at {}", client.base_url());

        Ok(Connection {
            client,
            retry: profile.map(|p| p.retry.clone()).unwrap_or_default(),
            poll: profile.map(|p| p.poll.clone()).unwrap_or_default(),
        })
    }

    /// The profile to draw settings from, if any
    ///
    /// A named profile must exist. Without a name, having no profiles at
    /// all is fine as long as the url comes from elsewhere.
    fn lookup_profile(&self, profile_name: Option<&str>) -> CliResult<Option<&Profile>> {
        match self.config.resolve_profile(profile_name) {
            Ok(name) => {
                info!("Using profile: {}", name);
                Ok(Some(self.config.profile(&name)?))
            }
            Err(ConfigError::NoProfiles { .. }) => {
                debug!("No profiles configured");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn manager_with(profiles: &[(&str, &str)], config_path: Option<&str>) -> ConnectionManager {
        let mut config = Config::default();
        for (name, url) in profiles {
            let mut profile = Profile::new(*url);
            profile.access_token = Some(format!("{}-token", name));
            config.set_profile(name.to_string(), profile);
        }
        ConnectionManager::with_config_path(config, config_path.map(Into::into))
    }

    #[test]
    #[serial]
    fn test_url_flag_wins() {
        let mgr = manager_with(&[("prod", "https://prod.example.com")], Some("/tmp/x.toml"));
        let conn = mgr
            .create_client(Some("https://other.example.com/"), None)
            .unwrap();
        assert_eq!(conn.client.base_url(), "https://other.example.com");
    }

    #[test]
    #[serial]
    fn test_profile_url_used_without_flag() {
        let mgr = manager_with(&[("prod", "https://prod.example.com")], Some("/tmp/x.toml"));
        let conn = mgr.create_client(None, None).unwrap();
        assert_eq!(conn.client.base_url(), "https://prod.example.com");
    }

    #[test]
    #[serial]
    fn test_env_url_beats_profile() {
        let mgr = manager_with(&[("prod", "https://prod.example.com")], None);
        unsafe { std::env::set_var(ENV_URL, "https://env.example.com") };
        let result = mgr.create_client(None, None);
        unsafe { std::env::remove_var(ENV_URL) };
        assert_eq!(result.unwrap().client.base_url(), "https://env.example.com");
    }

    #[test]
    #[serial]
    fn test_env_ignored_with_explicit_config_file() {
        let mgr = manager_with(&[("prod", "https://prod.example.com")], Some("/tmp/x.toml"));
        unsafe { std::env::set_var(ENV_URL, "https://env.example.com") };
        let result = mgr.create_client(None, None);
        unsafe { std::env::remove_var(ENV_URL) };
        assert_eq!(result.unwrap().client.base_url(), "https://prod.example.com");
    }

    #[test]
    #[serial]
    fn test_no_url_anywhere() {
        let mgr = manager_with(&[], Some("/tmp/x.toml"));
        let err = mgr.create_client(None, None).err().unwrap();
        assert!(matches!(err, TcCtlError::NoUrlConfigured));
    }

    #[test]
    #[serial]
    fn test_unknown_profile_is_an_error() {
        let mgr = manager_with(&[("prod", "https://prod.example.com")], Some("/tmp/x.toml"));
        let err = mgr
            .create_client(Some("https://other.example.com"), Some("staging"))
            .err()
            .unwrap();
        assert!(matches!(err, TcCtlError::ProfileNotFound { .. }));
    }
}
