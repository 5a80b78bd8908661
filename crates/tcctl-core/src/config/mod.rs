//! Configuration and profile management for tcctl
//!
//! Profiles name a TeamCloud instance together with its access token and
//! the retry/polling policy used against it.
//!
//! # Features
//!
//! - Multiple named profiles with a default
//! - Environment variable expansion in config files
//! - Platform-specific config file locations

// Nested config module mirrors the file layout
#![allow(clippy::module_inception)]

pub mod config;
pub mod error;
pub mod resilience;

pub use config::{Config, Profile};
pub use error::{ConfigError, Result};
pub use resilience::{PollConfig, RetryConfig};
