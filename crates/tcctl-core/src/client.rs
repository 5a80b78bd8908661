//! REST client for a TeamCloud instance
//!
//! The client is bound to one base URL at construction time and never
//! mutated afterwards. Build one per target instance.
//!
//! HTTP redirects are not followed: a `302` is part of the operation
//! protocol and is handled by the poller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{CoreError, Result};
use crate::models::{
    Project, ProjectDefinition, ProjectType, Provider, User, UserDefinition,
};
use crate::operation::Operation;

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default user agent
const DEFAULT_USER_AGENT: &str = concat!("tcctl-core/", env!("CARGO_PKG_VERSION"));

/// Resource families exposed by the TeamCloud API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    User,
    Project,
    ProjectUser,
    ProjectType,
    Provider,
}

impl ResourceKind {
    /// Human-readable name used in logs and errors
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::User => "user",
            ResourceKind::Project => "project",
            ResourceKind::ProjectUser => "project user",
            ResourceKind::ProjectType => "project type",
            ResourceKind::Provider => "provider",
        }
    }

    /// Capitalized name used in progress messages ("Creating new Provider")
    pub fn type_name(&self) -> &'static str {
        match self {
            ResourceKind::User | ResourceKind::ProjectUser => "User",
            ResourceKind::Project => "Project",
            ResourceKind::ProjectType => "ProjectType",
            ResourceKind::Provider => "Provider",
        }
    }

    /// Path of the resource collection
    pub fn collection_path(&self, project_id: Option<&str>) -> Result<String> {
        let path = match self {
            ResourceKind::User => "/api/users".to_string(),
            ResourceKind::Project => "/api/projects".to_string(),
            ResourceKind::ProjectType => "/api/projectTypes".to_string(),
            ResourceKind::Provider => "/api/providers".to_string(),
            ResourceKind::ProjectUser => {
                let project_id = project_id.ok_or_else(|| {
                    CoreError::Validation("project users require a project id".to_string())
                })?;
                format!("/api/projects/{}/users", urlencoding::encode(project_id))
            }
        };
        Ok(path)
    }

    /// Path of a single resource
    pub fn item_path(&self, item_id: &str, project_id: Option<&str>) -> Result<String> {
        Ok(format!(
            "{}/{}",
            self.collection_path(project_id)?,
            urlencoding::encode(item_id)
        ))
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Status and resource lookups needed to drive an operation to completion
#[async_trait]
pub trait OperationClient: Send + Sync {
    /// Re-fetch the status of an operation, project-scoped when `project_id` is set
    async fn status<T>(&self, tracking_id: &str, project_id: Option<&str>) -> Result<Operation<T>>
    where
        T: DeserializeOwned + Send + 'static;

    /// Fetch a single resource by id
    async fn resource<T>(
        &self,
        kind: ResourceKind,
        item_id: &str,
        project_id: Option<&str>,
    ) -> Result<Operation<T>>
    where
        T: DeserializeOwned + Send + 'static;
}

/// Builder for [`TeamCloudClient`]
#[derive(Debug, Clone)]
pub struct TeamCloudClientBuilder {
    base_url: Option<String>,
    access_token: Option<String>,
    user_agent: String,
    timeout: Duration,
    insecure: bool,
}

impl Default for TeamCloudClientBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            access_token: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            insecure: false,
        }
    }
}

impl TeamCloudClientBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Accept invalid TLS certificates (local development instances)
    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub fn build(self) -> Result<TeamCloudClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| CoreError::Config("TeamCloud base URL is required".to_string()))?;
        let base_url = base_url.trim_end_matches('/').to_string();

        let http = reqwest::Client::builder()
            .redirect(Policy::none())
            .user_agent(self.user_agent)
            .timeout(self.timeout)
            .danger_accept_invalid_certs(self.insecure)
            .build()
            .map_err(|e| CoreError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(TeamCloudClient {
            http,
            base_url,
            access_token: self.access_token,
        })
    }
}

/// Client for one TeamCloud instance
#[derive(Debug, Clone)]
pub struct TeamCloudClient {
    http: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl TeamCloudClient {
    pub fn builder() -> TeamCloudClientBuilder {
        TeamCloudClientBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ------------------------------------------------------------------------
    // TeamCloud users
    // ------------------------------------------------------------------------

    pub async fn list_users(&self) -> Result<Operation<Vec<User>>> {
        self.get(&ResourceKind::User.collection_path(None)?).await
    }

    pub async fn get_user(&self, user: &str) -> Result<Operation<User>> {
        self.get(&ResourceKind::User.item_path(user, None)?).await
    }

    pub async fn create_user(&self, definition: &UserDefinition) -> Result<Operation<User>> {
        self.post(&ResourceKind::User.collection_path(None)?, definition)
            .await
    }

    pub async fn delete_user(&self, user: &str) -> Result<Operation<User>> {
        self.delete(&ResourceKind::User.item_path(user, None)?).await
    }

    // ------------------------------------------------------------------------
    // Projects
    // ------------------------------------------------------------------------

    pub async fn list_projects(&self) -> Result<Operation<Vec<Project>>> {
        self.get(&ResourceKind::Project.collection_path(None)?).await
    }

    /// Accepts either the project id or its name
    pub async fn get_project(&self, name_or_id: &str) -> Result<Operation<Project>> {
        self.get(&ResourceKind::Project.item_path(name_or_id, None)?)
            .await
    }

    pub async fn create_project(
        &self,
        definition: &ProjectDefinition,
    ) -> Result<Operation<Project>> {
        self.post(&ResourceKind::Project.collection_path(None)?, definition)
            .await
    }

    pub async fn delete_project(&self, name_or_id: &str) -> Result<Operation<Project>> {
        self.delete(&ResourceKind::Project.item_path(name_or_id, None)?)
            .await
    }

    // ------------------------------------------------------------------------
    // Project users
    // ------------------------------------------------------------------------

    pub async fn list_project_users(&self, project_id: &str) -> Result<Operation<Vec<User>>> {
        self.get(&ResourceKind::ProjectUser.collection_path(Some(project_id))?)
            .await
    }

    pub async fn get_project_user(
        &self,
        project_id: &str,
        user: &str,
    ) -> Result<Operation<User>> {
        self.get(&ResourceKind::ProjectUser.item_path(user, Some(project_id))?)
            .await
    }

    pub async fn create_project_user(
        &self,
        project_id: &str,
        definition: &UserDefinition,
    ) -> Result<Operation<User>> {
        self.post(
            &ResourceKind::ProjectUser.collection_path(Some(project_id))?,
            definition,
        )
        .await
    }

    pub async fn delete_project_user(
        &self,
        project_id: &str,
        user: &str,
    ) -> Result<Operation<User>> {
        self.delete(&ResourceKind::ProjectUser.item_path(user, Some(project_id))?)
            .await
    }

    // ------------------------------------------------------------------------
    // Project types
    // ------------------------------------------------------------------------

    pub async fn list_project_types(&self) -> Result<Operation<Vec<ProjectType>>> {
        self.get(&ResourceKind::ProjectType.collection_path(None)?)
            .await
    }

    pub async fn get_project_type(&self, id: &str) -> Result<Operation<ProjectType>> {
        self.get(&ResourceKind::ProjectType.item_path(id, None)?).await
    }

    pub async fn create_project_type(
        &self,
        project_type: &ProjectType,
    ) -> Result<Operation<ProjectType>> {
        self.post(
            &ResourceKind::ProjectType.collection_path(None)?,
            project_type,
        )
        .await
    }

    pub async fn delete_project_type(&self, id: &str) -> Result<Operation<ProjectType>> {
        self.delete(&ResourceKind::ProjectType.item_path(id, None)?)
            .await
    }

    // ------------------------------------------------------------------------
    // Providers
    // ------------------------------------------------------------------------

    pub async fn list_providers(&self) -> Result<Operation<Vec<Provider>>> {
        self.get(&ResourceKind::Provider.collection_path(None)?).await
    }

    pub async fn get_provider(&self, id: &str) -> Result<Operation<Provider>> {
        self.get(&ResourceKind::Provider.item_path(id, None)?).await
    }

    pub async fn create_provider(&self, provider: &Provider) -> Result<Operation<Provider>> {
        self.post(&ResourceKind::Provider.collection_path(None)?, provider)
            .await
    }

    pub async fn delete_provider(&self, id: &str) -> Result<Operation<Provider>> {
        self.delete(&ResourceKind::Provider.item_path(id, None)?)
            .await
    }

    // ------------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------------

    /// Status of an operation on a TeamCloud-level resource
    pub async fn get_status(&self, tracking_id: &str) -> Result<Operation<Value>> {
        self.get(&status_path(tracking_id, None)).await
    }

    /// Status of an operation on a project or one of its children
    pub async fn get_project_status(
        &self,
        project_id: &str,
        tracking_id: &str,
    ) -> Result<Operation<Value>> {
        self.get(&status_path(tracking_id, Some(project_id))).await
    }

    // ------------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------------

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);

        let builder = self
            .http
            .request(method, url)
            .header("Accept", "application/json");
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Operation<T>> {
        self.send(self.request(Method::GET, path)).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Operation<T>> {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<Operation<T>> {
        self.send(self.request(Method::DELETE, path)).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Operation<T>> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        trace!("Response {}: {}", status, text);

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str(&text) {
                Ok(body) => body,
                Err(_) if status >= 400 => {
                    return Err(CoreError::Http {
                        status,
                        message: text,
                    });
                }
                Err(e) => return Err(CoreError::Decode(e.to_string())),
            }
        };

        let operation = Operation::decode(status, body)?;
        debug!("Response classified as {}", operation.kind());
        Ok(operation)
    }
}

fn status_path(tracking_id: &str, project_id: Option<&str>) -> String {
    let tracking_id = urlencoding::encode(tracking_id);
    match project_id {
        Some(project_id) => format!(
            "/api/projects/{}/status/{}",
            urlencoding::encode(project_id),
            tracking_id
        ),
        None => format!("/api/status/{}", tracking_id),
    }
}

#[async_trait]
impl OperationClient for TeamCloudClient {
    async fn status<T>(&self, tracking_id: &str, project_id: Option<&str>) -> Result<Operation<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.get(&status_path(tracking_id, project_id)).await
    }

    async fn resource<T>(
        &self,
        kind: ResourceKind,
        item_id: &str,
        project_id: Option<&str>,
    ) -> Result<Operation<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.get(&kind.item_path(item_id, project_id)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_paths() {
        assert_eq!(
            ResourceKind::ProjectType.collection_path(None).unwrap(),
            "/api/projectTypes"
        );
        assert_eq!(
            ResourceKind::ProjectUser
                .collection_path(Some("p-1"))
                .unwrap(),
            "/api/projects/p-1/users"
        );
    }

    #[test]
    fn test_project_user_path_requires_project() {
        let err = ResourceKind::ProjectUser.collection_path(None).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_item_path_encodes_segments() {
        assert_eq!(
            ResourceKind::User
                .item_path("jane@contoso.com", None)
                .unwrap(),
            "/api/users/jane%40contoso.com"
        );
    }

    #[test]
    fn test_status_paths() {
        assert_eq!(status_path("t-1", None), "/api/status/t-1");
        assert_eq!(
            status_path("t-1", Some("p-1")),
            "/api/projects/p-1/status/t-1"
        );
    }

    #[test]
    fn test_builder_requires_base_url() {
        let err = TeamCloudClient::builder().build().unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let client = TeamCloudClient::builder()
            .base_url("https://tc.example.com/")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "https://tc.example.com");
    }
}
