//! TeamCloud user commands

use tcctl_core::ResourceKind;
use tcctl_core::models::UserDefinition;
use tcctl_core::validation::{validate_user_name, validate_user_name_or_id};

use super::CommandContext;
use super::async_utils::{render_operation, run_create, run_delete};
use super::utils::{confirm_delete, tags};
use crate::cli::UserCommands;
use crate::error::Result as CliResult;
use crate::output::TableView;

pub async fn handle_user_command(ctx: &CommandContext<'_>, cmd: &UserCommands) -> CliResult<()> {
    match cmd {
        UserCommands::Create {
            name,
            role,
            tags: tag_args,
            wait,
        } => {
            validate_user_name(name)?;
            let definition = UserDefinition::new(name, role.to_string()).with_tags(tags(tag_args)?);
            let conn = ctx.connect()?;
            run_create(
                ctx,
                &conn,
                ResourceKind::User,
                None,
                wait,
                TableView::Users,
                conn.client.create_user(&definition),
            )
            .await
        }
        UserCommands::Delete { name, yes, wait } => {
            validate_user_name_or_id(name)?;
            if !confirm_delete("user", name, *yes)? {
                return Ok(());
            }
            let conn = ctx.connect()?;
            run_delete(
                ctx,
                &conn,
                ResourceKind::User,
                None,
                wait,
                conn.client.delete_user(name),
            )
            .await
        }
        UserCommands::List => {
            let conn = ctx.connect()?;
            let operation = conn.client.list_users().await?;
            render_operation(ctx, operation, Some(TableView::Users))
        }
        UserCommands::Show { name } => {
            validate_user_name_or_id(name)?;
            let conn = ctx.connect()?;
            let operation = conn.client.get_user(name).await?;
            render_operation(ctx, operation, Some(TableView::Users))
        }
    }
}
