//! Long-running operation polling
//!
//! Every mutating TeamCloud call may answer with a status document instead
//! of the resource. [`Poller`] drives such an operation to a terminal state:
//! it re-queries the status endpoint while the service reports `202`, follows
//! a `302` to the created resource, and hands back a [`Completion`].
//!
//! Service-reported failures are returned as [`Completion::Failed`], not
//! raised. Only client-side failures (transport, protocol violations,
//! deadlines, cancellation) surface as [`CoreError`].
//!
//! # Example
//!
//! ```rust,ignore
//! use tcctl_core::{Poller, PollOptions, ProgressEvent, ResourceKind, TeamCloudClient};
//!
//! let client = TeamCloudClient::builder().base_url("https://tc.example.com").build()?;
//! let definition = UserDefinition::new("jane@contoso.com", "Creator");
//!
//! let completion = Poller::new(&client, PollOptions::default())
//!     .with_progress(Box::new(|event| {
//!         if let ProgressEvent::Polling { message, .. } = event {
//!             eprintln!("{}", message);
//!         }
//!     }))
//!     .run_create(ResourceKind::User, None, client.create_user(&definition))
//!     .await?;
//! ```

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::{OperationClient, ResourceKind};
use crate::config::{PollConfig, RetryConfig};
use crate::error::{CoreError, Result};
use crate::location::{item_id_from_location, project_id_from_location};
use crate::models::StatusResult;
use crate::operation::{Completion, Operation};

/// Progress events emitted while an operation is driven to completion
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// The create/delete request is about to be submitted
    Started { message: String },
    /// One polling tick, or a redirect being followed
    Polling {
        state: Option<String>,
        message: String,
        elapsed: Duration,
    },
    /// Terminal state reached
    Finished { message: String },
    /// The service reported a failure
    Failed { message: String },
}

/// Callback type for progress updates
///
/// The CLI uses this to drive its spinner. Library callers can ignore it.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// Bounds and pacing of the polling loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOptions {
    /// Length of one progress tick
    pub tick: Duration,
    /// Ticks to wait between two status queries
    pub ticks_per_poll: u32,
    /// Deadline measured from submission; `None` waits forever
    pub timeout: Option<Duration>,
    /// Maximum number of follow-up queries; `None` is unbounded
    pub max_polls: Option<u32>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            ticks_per_poll: 4,
            timeout: Some(Duration::from_secs(600)),
            max_polls: None,
        }
    }
}

impl From<&PollConfig> for PollOptions {
    fn from(config: &PollConfig) -> Self {
        Self {
            tick: Duration::from_secs(config.interval_secs.max(1)),
            ticks_per_poll: config.ticks_per_poll,
            timeout: config
                .timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            max_polls: config.max_polls,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Create,
    Delete,
}

impl Flow {
    fn started_message(self, kind: ResourceKind) -> String {
        match self {
            Flow::Create => format!("Starting: Creating new {}", kind.type_name()),
            Flow::Delete => format!("Starting: Delete {}", kind.type_name()),
        }
    }

    fn default_message(self, kind: ResourceKind) -> String {
        match self {
            Flow::Create => format!("Creating new {}", kind.type_name()),
            Flow::Delete => format!("Deleting {}", kind.type_name()),
        }
    }
}

/// Drives one create or delete operation to a terminal state
pub struct Poller<'a, C> {
    client: &'a C,
    options: PollOptions,
    retry: RetryConfig,
    on_progress: Option<ProgressCallback>,
    cancel: Option<CancellationToken>,
}

impl<'a, C: OperationClient> Poller<'a, C> {
    pub fn new(client: &'a C, options: PollOptions) -> Self {
        Self {
            client,
            options,
            retry: RetryConfig::default(),
            on_progress: None,
            cancel: None,
        }
    }

    pub fn with_progress(mut self, on_progress: ProgressCallback) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    /// Stop polling with [`CoreError::Cancelled`] once the token fires
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Retry policy for status and resource re-queries
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Submit a create request and wait for the created resource
    ///
    /// A `302` answer is followed by fetching the item named in `location`,
    /// scoped to `project_scope` when given.
    pub async fn run_create<T, F>(
        &self,
        kind: ResourceKind,
        project_scope: Option<&str>,
        submit: F,
    ) -> Result<Completion<T>>
    where
        T: DeserializeOwned + Send + 'static,
        F: Future<Output = Result<Operation<T>>>,
    {
        self.run(Flow::Create, kind, project_scope, submit).await
    }

    /// Submit a delete request and wait until the service reports completion
    ///
    /// A `302` answer is a protocol violation in this flow.
    pub async fn run_delete<T, F>(
        &self,
        kind: ResourceKind,
        project_scope: Option<&str>,
        submit: F,
    ) -> Result<Completion<T>>
    where
        T: DeserializeOwned + Send + 'static,
        F: Future<Output = Result<Operation<T>>>,
    {
        self.run(Flow::Delete, kind, project_scope, submit).await
    }

    async fn run<T, F>(
        &self,
        flow: Flow,
        kind: ResourceKind,
        project_scope: Option<&str>,
        submit: F,
    ) -> Result<Completion<T>>
    where
        T: DeserializeOwned + Send + 'static,
        F: Future<Output = Result<Operation<T>>>,
    {
        let start = Instant::now();
        let started = flow.started_message(kind);
        info!("{}", started);
        self.emit(ProgressEvent::Started { message: started });

        let mut current = submit.await?;
        let mut polls: u32 = 0;

        loop {
            debug!(
                "{} {} operation answered {}",
                kind,
                if flow == Flow::Create { "create" } else { "delete" },
                current.kind()
            );

            match current {
                Operation::Data(result) => {
                    self.finish();
                    return Ok(Completion::Data(result));
                }
                Operation::Succeeded(status) => {
                    self.finish();
                    return Ok(Completion::Status(status));
                }
                Operation::Failed(error) => {
                    let message = error.summary();
                    warn!("{} operation failed: {}", kind, message);
                    self.emit(ProgressEvent::Failed { message });
                    return Ok(Completion::Failed(error));
                }
                Operation::Redirect(status) => {
                    if flow == Flow::Delete {
                        return Err(CoreError::ProtocolViolation(format!(
                            "unexpected redirect while deleting {}",
                            kind
                        )));
                    }

                    self.emit_polling(flow, kind, &status, start);
                    let location = status.location.as_deref().ok_or_else(|| {
                        CoreError::ProtocolViolation("redirect without a location".to_string())
                    })?;
                    let item_id = item_id_from_location(location).ok_or_else(|| {
                        CoreError::ProtocolViolation(format!(
                            "redirect location '{}' does not name an item",
                            location
                        ))
                    })?;

                    self.check_bounds(start, polls)?;
                    polls += 1;
                    debug!("Fetching {} '{}' after redirect", kind, item_id);

                    let client = self.client;
                    let item_id = item_id.as_str();
                    current = self
                        .retrying(move || client.resource::<T>(kind, item_id, project_scope))
                        .await?;
                }
                Operation::Running(status) => {
                    let tracking_id = status.tracking_id.clone().ok_or_else(|| {
                        CoreError::ProtocolViolation(
                            "running operation without a tracking id".to_string(),
                        )
                    })?;

                    for _ in 0..self.options.ticks_per_poll {
                        self.check_bounds(start, polls)?;
                        self.emit_polling(flow, kind, &status, start);
                        self.sleep(self.options.tick).await?;
                    }
                    self.check_bounds(start, polls)?;
                    polls += 1;

                    let project_id = status_scope(project_scope, &status);
                    debug!(
                        "Polling status of '{}' (project: {:?}, poll #{})",
                        tracking_id, project_id, polls
                    );

                    let client = self.client;
                    let tracking_id = tracking_id.as_str();
                    let project_id = project_id.as_deref();
                    current = self
                        .retrying(move || client.status::<T>(tracking_id, project_id))
                        .await?;
                }
            }
        }
    }

    fn check_bounds(&self, start: Instant, polls: u32) -> Result<()> {
        if self.cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
            return Err(CoreError::Cancelled);
        }
        if let Some(timeout) = self.options.timeout
            && start.elapsed() >= timeout
        {
            return Err(CoreError::PollTimeout(timeout));
        }
        if let Some(max_polls) = self.options.max_polls
            && polls >= max_polls
        {
            return Err(CoreError::PollLimitExceeded(max_polls));
        }
        Ok(())
    }

    /// Sleep that resolves early with [`CoreError::Cancelled`]
    async fn sleep(&self, duration: Duration) -> Result<()> {
        let sleep = tokio::time::sleep(duration);
        match &self.cancel {
            Some(token) => tokio::select! {
                _ = token.cancelled() => Err(CoreError::Cancelled),
                _ = sleep => Ok(()),
            },
            None => {
                sleep.await;
                Ok(())
            }
        }
    }

    /// Run an idempotent query with bounded exponential backoff
    ///
    /// Transport errors and service failures with 429 or 5xx are retried.
    /// When attempts run out the last outcome is returned as is.
    async fn retrying<T, F, Fut>(&self, mut call: F) -> Result<Operation<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Operation<T>>>,
    {
        let max_attempts = if self.retry.enabled {
            self.retry.max_attempts.max(1)
        } else {
            1
        };
        let max_backoff = Duration::from_millis(self.retry.max_backoff_ms);
        let mut backoff = Duration::from_millis(self.retry.backoff_ms).min(max_backoff);
        let mut attempt = 1;

        loop {
            let outcome = call().await;
            let reason = match &outcome {
                Err(e) if e.is_retryable() => Some(e.to_string()),
                Ok(Operation::Failed(error)) if error.is_transient() => Some(error.summary()),
                _ => None,
            };

            match reason {
                Some(reason) if attempt < max_attempts => {
                    warn!(
                        "Attempt {}/{} failed: {}; retrying in {:?}",
                        attempt, max_attempts, reason, backoff
                    );
                    self.sleep(backoff).await?;
                    backoff = (backoff * 2).min(max_backoff);
                    attempt += 1;
                }
                _ => return outcome,
            }
        }
    }

    fn finish(&self) {
        info!("Finished.");
        self.emit(ProgressEvent::Finished {
            message: "Finished.".to_string(),
        });
    }

    fn emit_polling(&self, flow: Flow, kind: ResourceKind, status: &StatusResult, start: Instant) {
        let detail = status
            .state_message
            .clone()
            .unwrap_or_else(|| flow.default_message(kind));
        let message = format!("{}: {}", status.state.as_deref().unwrap_or("Unknown"), detail);
        self.emit(ProgressEvent::Polling {
            state: status.state.clone(),
            message,
            elapsed: start.elapsed(),
        });
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(cb) = &self.on_progress {
            cb(event);
        }
    }
}

/// Project id of the status endpoint to query next
///
/// An explicit scope wins, then the project named in the status location.
/// `None` selects the global status endpoint.
fn status_scope(project_scope: Option<&str>, status: &StatusResult) -> Option<String> {
    project_scope.map(str::to_string).or_else(|| {
        status
            .location
            .as_deref()
            .and_then(project_id_from_location)
    })
}
