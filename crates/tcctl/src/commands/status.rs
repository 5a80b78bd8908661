use tcctl_core::validation::validate_tracking_id;
use tracing::debug;

use super::CommandContext;
use super::async_utils::render_operation;
use super::utils::resolve_project_id;
use crate::error::Result as CliResult;

/// Query an operation once by its tracking id
pub async fn handle_status(
    ctx: &CommandContext<'_>,
    tracking_id: &str,
    project: Option<&str>,
) -> CliResult<()> {
    validate_tracking_id(tracking_id)?;
    let conn = ctx.connect()?;

    let operation = match project {
        Some(project) => {
            let project_id = resolve_project_id(&conn.client, project).await?;
            debug!("Querying status {} of project {}", tracking_id, project_id);
            conn.client
                .get_project_status(&project_id, tracking_id)
                .await?
        }
        None => conn.client.get_status(tracking_id).await?,
    };

    render_operation(ctx, operation, None)
}
