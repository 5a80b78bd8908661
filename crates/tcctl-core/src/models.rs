//! TeamCloud REST API models
//!
//! Field names follow the service's camelCase JSON. Everything the service
//! may omit is optional so that partial documents (for example a project
//! that is still provisioning) still decode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Free-form string map used for tags and properties
pub type StringMap = HashMap<String, String>;

// ============================================================================
// Users
// ============================================================================

/// Role of a user on the TeamCloud instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
pub enum TeamCloudUserRole {
    #[value(name = "Admin")]
    Admin,
    #[default]
    #[value(name = "Creator")]
    Creator,
}

/// Role of a user inside a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
pub enum ProjectUserRole {
    #[value(name = "Owner")]
    Owner,
    #[default]
    #[value(name = "Member")]
    Member,
}

impl std::fmt::Display for TeamCloudUserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeamCloudUserRole::Admin => write!(f, "Admin"),
            TeamCloudUserRole::Creator => write!(f, "Creator"),
        }
    }
}

impl std::fmt::Display for ProjectUserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectUserRole::Owner => write!(f, "Owner"),
            ProjectUserRole::Member => write!(f, "Member"),
        }
    }
}

/// Payload for creating a TeamCloud user or a project user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserDefinition {
    pub email: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<StringMap>,
}

impl UserDefinition {
    pub fn new(email: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            role: role.into(),
            tags: None,
        }
    }

    pub fn with_tags(mut self, tags: Option<StringMap>) -> Self {
        self.tags = tags;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMembership {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub properties: Option<StringMap>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub user_type: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub project_memberships: Option<Vec<ProjectMembership>>,
    #[serde(default)]
    pub tags: Option<StringMap>,
    #[serde(default)]
    pub properties: Option<StringMap>,
}

// ============================================================================
// Projects
// ============================================================================

/// Payload for creating a project
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<StringMap>,
}

impl ProjectDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            project_type: None,
            tags: None,
        }
    }

    pub fn project_type(mut self, project_type: Option<String>) -> Self {
        self.project_type = project_type;
        self
    }

    pub fn with_tags(mut self, tags: Option<StringMap>) -> Self {
        self.tags = tags;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AzureResourceGroup {
    #[serde(default)]
    pub resource_group_id: Option<String>,
    #[serde(default)]
    pub resource_group_name: Option<String>,
    #[serde(default)]
    pub subscription_id: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub project_type: Option<ProjectType>,
    #[serde(default)]
    pub resource_group: Option<AzureResourceGroup>,
    #[serde(default)]
    pub users: Option<Vec<User>>,
    #[serde(default)]
    pub tags: Option<StringMap>,
    #[serde(default)]
    pub properties: Option<StringMap>,
}

// ============================================================================
// Project types
// ============================================================================

/// Provider attached to a project type, with per-type properties
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProviderReference {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<StringMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectType {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscriptions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_capacity: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group_name_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub providers: Option<Vec<ProviderReference>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<StringMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<StringMap>,
}

impl ProjectType {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

// ============================================================================
// Providers
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDependencies {
    #[serde(default)]
    pub create: Vec<String>,
    #[serde(default)]
    pub init: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<ProviderDependencies>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<StringMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered: Option<DateTime<Utc>>,
}

impl Provider {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

// ============================================================================
// Result envelopes
// ============================================================================

/// Status document of an asynchronous operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StatusResult {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub state_message: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, rename = "_trackingId", alias = "trackingId")]
    pub tracking_id: Option<String>,
}

/// Envelope carrying a materialized resource (or list of resources)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataResult<T> {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub status: Option<String>,
    pub data: T,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResultError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<Vec<ValidationError>>,
}

/// Failure document returned by the service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResult {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub errors: Option<Vec<ResultError>>,
}

impl ErrorResult {
    /// First human-readable message in the error list, if any
    pub fn first_message(&self) -> Option<&str> {
        self.errors
            .as_ref()?
            .iter()
            .find_map(|e| e.message.as_deref())
    }

    /// Throttled (429) or server-side (5xx) failure
    pub fn is_transient(&self) -> bool {
        self.code.is_some_and(|code| code == 429 || code >= 500)
    }

    /// One-line summary used for diagnostics
    pub fn summary(&self) -> String {
        let status = self.status.as_deref().unwrap_or("Error");
        match (self.code, self.first_message()) {
            (Some(code), Some(msg)) => format!("{} ({}): {}", status, code, msg),
            (Some(code), None) => format!("{} ({})", status, code),
            (None, Some(msg)) => format!("{}: {}", status, msg),
            (None, None) => status.to_string(),
        }
    }
}
