//! Project user commands
//!
//! The project may be given by name; it is resolved to its id first so
//! that follow-up status queries stay scoped to the project.

use tcctl_core::ResourceKind;
use tcctl_core::models::UserDefinition;
use tcctl_core::validation::{validate_user_name, validate_user_name_or_id};

use super::CommandContext;
use super::async_utils::{render_operation, run_create, run_delete};
use super::utils::{confirm_delete, resolve_project_id, tags};
use crate::cli::ProjectUserCommands;
use crate::error::Result as CliResult;
use crate::output::TableView;

pub async fn handle_project_user_command(
    ctx: &CommandContext<'_>,
    cmd: &ProjectUserCommands,
) -> CliResult<()> {
    match cmd {
        ProjectUserCommands::Create {
            project,
            name,
            role,
            tags: tag_args,
            wait,
        } => {
            validate_user_name(name)?;
            let definition = UserDefinition::new(name, role.to_string()).with_tags(tags(tag_args)?);

            let conn = ctx.connect()?;
            let project_id = resolve_project_id(&conn.client, project).await?;
            run_create(
                ctx,
                &conn,
                ResourceKind::ProjectUser,
                Some(&project_id),
                wait,
                TableView::Users,
                conn.client.create_project_user(&project_id, &definition),
            )
            .await
        }
        ProjectUserCommands::Delete {
            project,
            name,
            yes,
            wait,
        } => {
            validate_user_name_or_id(name)?;
            let conn = ctx.connect()?;
            let project_id = resolve_project_id(&conn.client, project).await?;
            if !confirm_delete("project user", name, *yes)? {
                return Ok(());
            }
            run_delete(
                ctx,
                &conn,
                ResourceKind::ProjectUser,
                Some(&project_id),
                wait,
                conn.client.delete_project_user(&project_id, name),
            )
            .await
        }
        ProjectUserCommands::List { project } => {
            let conn = ctx.connect()?;
            let project_id = resolve_project_id(&conn.client, project).await?;
            let operation = conn.client.list_project_users(&project_id).await?;
            render_operation(ctx, operation, Some(TableView::Users))
        }
        ProjectUserCommands::Show { project, name } => {
            validate_user_name_or_id(name)?;
            let conn = ctx.connect()?;
            let project_id = resolve_project_id(&conn.client, project).await?;
            let operation = conn.client.get_project_user(&project_id, name).await?;
            render_operation(ctx, operation, Some(TableView::Users))
        }
    }
}
