//! Project commands

use tcctl_core::ResourceKind;
use tcctl_core::models::ProjectDefinition;
use tcctl_core::validation::{validate_dotted_id, validate_project_name, validate_project_name_or_id};

use super::CommandContext;
use super::async_utils::{render_operation, run_create, run_delete};
use super::utils::{confirm_delete, tags};
use crate::cli::ProjectCommands;
use crate::error::Result as CliResult;
use crate::output::TableView;

pub async fn handle_project_command(
    ctx: &CommandContext<'_>,
    cmd: &ProjectCommands,
) -> CliResult<()> {
    match cmd {
        ProjectCommands::Create {
            name,
            project_type,
            tags: tag_args,
            wait,
        } => {
            validate_project_name(name)?;
            if let Some(project_type) = project_type {
                validate_dotted_id("--project-type", project_type)?;
            }
            let definition = ProjectDefinition::new(name)
                .project_type(project_type.clone())
                .with_tags(tags(tag_args)?);

            let conn = ctx.connect()?;
            run_create(
                ctx,
                &conn,
                ResourceKind::Project,
                None,
                wait,
                TableView::Projects,
                conn.client.create_project(&definition),
            )
            .await
        }
        ProjectCommands::Delete { name, yes, wait } => {
            validate_project_name_or_id(name)?;
            if !confirm_delete("project", name, *yes)? {
                return Ok(());
            }
            let conn = ctx.connect()?;
            run_delete(
                ctx,
                &conn,
                ResourceKind::Project,
                None,
                wait,
                conn.client.delete_project(name),
            )
            .await
        }
        ProjectCommands::List => {
            let conn = ctx.connect()?;
            let operation = conn.client.list_projects().await?;
            render_operation(ctx, operation, Some(TableView::Projects))
        }
        ProjectCommands::Show { name } => {
            validate_project_name_or_id(name)?;
            let conn = ctx.connect()?;
            let operation = conn.client.get_project(name).await?;
            render_operation(ctx, operation, Some(TableView::Projects))
        }
        ProjectCommands::User(user_cmd) => {
            super::project_user::handle_project_user_command(ctx, user_cmd).await
        }
    }
}
