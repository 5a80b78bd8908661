//! Retry and polling policy stored in profiles

use serde::{Deserialize, Serialize};

/// Retry configuration for idempotent status and resource queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Whether retry is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum number of attempts, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial backoff in milliseconds
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    /// Maximum backoff in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            backoff_ms: 100,
            max_backoff_ms: 5000,
        }
    }
}

/// Pacing and bounds of operation polling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Seconds per progress tick
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Ticks between two status queries
    #[serde(default = "default_ticks_per_poll")]
    pub ticks_per_poll: u32,

    /// Overall deadline in seconds; 0 waits forever
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: Option<u64>,

    /// Maximum number of status queries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_polls: Option<u32>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            ticks_per_poll: default_ticks_per_poll(),
            timeout_secs: default_timeout_secs(),
            max_polls: None,
        }
    }
}

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    100
}

fn default_max_backoff_ms() -> u64 {
    5000
}

fn default_interval_secs() -> u64 {
    1
}

fn default_ticks_per_poll() -> u32 {
    4
}

fn default_timeout_secs() -> Option<u64> {
    Some(600)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_retry_table_uses_defaults() {
        let retry: RetryConfig = toml::from_str("max_attempts = 5").unwrap();
        assert_eq!(retry.max_attempts, 5);
        assert!(retry.enabled);
        assert_eq!(retry.backoff_ms, 100);
        assert_eq!(retry.max_backoff_ms, 5000);
    }

    #[test]
    fn test_empty_poll_table_uses_defaults() {
        let poll: PollConfig = toml::from_str("").unwrap();
        assert_eq!(poll, PollConfig::default());
        assert_eq!(poll.timeout_secs, Some(600));
    }
}
