//! # tcctl-core
//!
//! Shared engine for the TeamCloud CLI. The binary crate only parses
//! arguments and renders output; everything that talks to the service
//! lives here:
//!
//! - **models** - serde types for the TeamCloud REST API
//! - **operation** - classification of a single API response
//! - **client** - immutable REST client bound to one TeamCloud instance
//! - **progress** - long-running-operation poller with progress callbacks
//! - **location** - path-segment helpers for operation `location` URLs
//! - **validation** - input rules for identifiers, names and lists
//! - **config** - profiles stored in a TOML config file
//!
//! ## Driving a create to completion
//!
//! ```rust,ignore
//! use tcctl_core::{Poller, PollOptions, ResourceKind, TeamCloudClient};
//! use tcctl_core::models::ProjectDefinition;
//!
//! let client = TeamCloudClient::builder()
//!     .base_url("https://teamcloud.example.com")
//!     .build()?;
//!
//! let definition = ProjectDefinition::new("my-project");
//! let completion = Poller::new(&client, PollOptions::default())
//!     .run_create(ResourceKind::Project, None, client.create_project(&definition))
//!     .await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod location;
pub mod models;
pub mod operation;
pub mod progress;
pub mod validation;

pub use client::{OperationClient, ResourceKind, TeamCloudClient, TeamCloudClientBuilder};
pub use config::{Config, ConfigError, PollConfig, Profile, RetryConfig};
pub use error::{CoreError, Result};
pub use operation::{Completion, Operation};
pub use progress::{PollOptions, Poller, ProgressCallback, ProgressEvent};
