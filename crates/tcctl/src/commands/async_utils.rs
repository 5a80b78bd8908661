//! Shared handling of long-running TeamCloud operations
//!
//! Wraps the core [`Poller`] with a spinner on stderr and renders the
//! terminal outcome in the requested output format.

use std::future::Future;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tcctl_core::models::ErrorResult;
use tcctl_core::{
    Completion, CoreError, Operation, PollConfig, PollOptions, Poller, ProgressCallback,
    ProgressEvent, ResourceKind,
};
use tracing::{debug, error};

use super::CommandContext;
use crate::cli::WaitArgs;
use crate::connection::Connection;
use crate::error::{Result as CliResult, TcCtlError};
use crate::output::{TableView, print_output, print_output_with_view};

/// Polling bounds from the profile, overridden by command-line flags
pub fn poll_options(wait: &WaitArgs, poll: &PollConfig) -> PollOptions {
    let mut options = PollOptions::from(poll);
    if let Some(secs) = wait.poll_interval {
        options.tick = Duration::from_secs(secs.max(1));
    }
    if let Some(secs) = wait.wait_timeout {
        options.timeout = (secs > 0).then(|| Duration::from_secs(secs));
    }
    if wait.max_polls.is_some() {
        options.max_polls = wait.max_polls;
    }
    options
}

/// Spinner driven by poller progress events
fn progress_spinner() -> (ProgressBar, ProgressCallback) {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(120));

    let pb_clone = pb.clone();
    let callback: ProgressCallback = Box::new(move |event: ProgressEvent| match event {
        ProgressEvent::Started { message } => pb_clone.set_message(message),
        ProgressEvent::Polling { message, .. } => pb_clone.set_message(message),
        ProgressEvent::Finished { message } => pb_clone.finish_with_message(message),
        ProgressEvent::Failed { message } => {
            pb_clone.finish_with_message(format!("Failed: {}", message))
        }
    });

    (pb, callback)
}

fn poller<'a>(
    ctx: &CommandContext<'_>,
    conn: &'a Connection,
    wait: &WaitArgs,
) -> (ProgressBar, Poller<'a, tcctl_core::TeamCloudClient>) {
    let options = poll_options(wait, &conn.poll);
    debug!("Polling with {:?}", options);
    let (pb, callback) = progress_spinner();
    let poller = Poller::new(&conn.client, options)
        .with_progress(callback)
        .with_cancellation(ctx.cancel.clone())
        .with_retry(conn.retry.clone());
    (pb, poller)
}

/// Submit a create and, unless `--no-wait`, wait for the created resource
#[allow(clippy::too_many_arguments)]
pub async fn run_create<T, F>(
    ctx: &CommandContext<'_>,
    conn: &Connection,
    kind: ResourceKind,
    project_scope: Option<&str>,
    wait: &WaitArgs,
    view: TableView,
    submit: F,
) -> CliResult<()>
where
    T: Serialize + DeserializeOwned + Send + 'static,
    F: Future<Output = tcctl_core::Result<Operation<T>>>,
{
    if wait.no_wait {
        return render_operation(ctx, submit.await?, Some(view));
    }

    let (pb, poller) = poller(ctx, conn, wait);
    let completion = poller.run_create(kind, project_scope, submit).await;
    render_outcome(ctx, pb, completion, Some(view))
}

/// Submit a delete and, unless `--no-wait`, wait for the service to finish it
pub async fn run_delete<T, F>(
    ctx: &CommandContext<'_>,
    conn: &Connection,
    kind: ResourceKind,
    project_scope: Option<&str>,
    wait: &WaitArgs,
    submit: F,
) -> CliResult<()>
where
    T: Serialize + DeserializeOwned + Send + 'static,
    F: Future<Output = tcctl_core::Result<Operation<T>>>,
{
    if wait.no_wait {
        return render_operation(ctx, submit.await?, None);
    }

    let (pb, poller) = poller(ctx, conn, wait);
    let completion = poller.run_delete(kind, project_scope, submit).await;
    render_outcome(ctx, pb, completion, None)
}

fn render_outcome<T: Serialize>(
    ctx: &CommandContext<'_>,
    pb: ProgressBar,
    completion: tcctl_core::Result<Completion<T>>,
    view: Option<TableView>,
) -> CliResult<()> {
    match completion {
        Ok(completion) => {
            if !pb.is_finished() {
                pb.finish_and_clear();
            }
            render_completion(ctx, completion, view)
        }
        Err(err) => {
            pb.abandon_with_message(abandon_message(&err));
            Err(err.into())
        }
    }
}

fn abandon_message(err: &CoreError) -> String {
    match err {
        CoreError::Cancelled => "Cancelled".to_string(),
        err if err.is_timeout() => "Timed out".to_string(),
        _ => "Failed".to_string(),
    }
}

/// Print the terminal outcome of an operation
pub fn render_completion<T: Serialize>(
    ctx: &CommandContext<'_>,
    completion: Completion<T>,
    view: Option<TableView>,
) -> CliResult<()> {
    match completion {
        Completion::Data(result) => {
            print_output_with_view(&result.data, ctx.output.into(), ctx.query, view)?;
            Ok(())
        }
        Completion::Status(status) => {
            print_output(&status, ctx.output.into(), ctx.query)?;
            Ok(())
        }
        Completion::Failed(failure) => render_failure(ctx, failure),
    }
}

/// Print a single response without waiting
pub fn render_operation<T: Serialize>(
    ctx: &CommandContext<'_>,
    operation: Operation<T>,
    view: Option<TableView>,
) -> CliResult<()> {
    let completion = match operation {
        Operation::Data(result) => Completion::Data(result),
        Operation::Succeeded(status)
        | Operation::Running(status)
        | Operation::Redirect(status) => Completion::Status(status),
        Operation::Failed(failure) => Completion::Failed(failure),
    };
    render_completion(ctx, completion, view)
}

/// Log and print a service failure, then fail the command
fn render_failure(ctx: &CommandContext<'_>, failure: ErrorResult) -> CliResult<()> {
    let status = failure.status.clone().unwrap_or_else(|| "Error".to_string());
    error!("Error: {}", status);
    print_output(&failure, ctx.output.into(), ctx.query)?;
    Err(TcCtlError::OperationFailed {
        summary: failure.summary(),
    })
}
