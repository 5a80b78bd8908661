//! Project type commands

use tcctl_core::ResourceKind;
use tcctl_core::models::ProjectType;
use tcctl_core::validation::{
    parse_provider_references, validate_dotted_id, validate_subscriptions,
};

use super::CommandContext;
use super::async_utils::{render_operation, run_create, run_delete};
use super::utils::{confirm_delete, non_empty_list, properties, tags};
use crate::cli::ProjectTypeCommands;
use crate::error::Result as CliResult;
use crate::output::TableView;

pub async fn handle_project_type_command(
    ctx: &CommandContext<'_>,
    cmd: &ProjectTypeCommands,
) -> CliResult<()> {
    match cmd {
        ProjectTypeCommands::Create {
            name,
            default,
            region,
            subscriptions,
            subscription_capacity,
            resource_group_name_prefix,
            providers,
            tags: tag_args,
            properties: property_args,
            wait,
        } => {
            validate_dotted_id("--name", name)?;
            if !subscriptions.is_empty() {
                validate_subscriptions(subscriptions)?;
            }
            let providers = parse_provider_references("--provider", providers)?;

            let project_type = ProjectType {
                default: Some(*default),
                region: region.clone(),
                subscriptions: non_empty_list(subscriptions),
                subscription_capacity: *subscription_capacity,
                resource_group_name_prefix: resource_group_name_prefix.clone(),
                providers: (!providers.is_empty()).then_some(providers),
                tags: tags(tag_args)?,
                properties: properties(property_args)?,
                ..ProjectType::new(name)
            };

            let conn = ctx.connect()?;
            run_create(
                ctx,
                &conn,
                ResourceKind::ProjectType,
                None,
                wait,
                TableView::ProjectTypes,
                conn.client.create_project_type(&project_type),
            )
            .await
        }
        ProjectTypeCommands::Delete { name, yes, wait } => {
            validate_dotted_id("--name", name)?;
            if !confirm_delete("project type", name, *yes)? {
                return Ok(());
            }
            let conn = ctx.connect()?;
            run_delete(
                ctx,
                &conn,
                ResourceKind::ProjectType,
                None,
                wait,
                conn.client.delete_project_type(name),
            )
            .await
        }
        ProjectTypeCommands::List => {
            let conn = ctx.connect()?;
            let operation = conn.client.list_project_types().await?;
            render_operation(ctx, operation, Some(TableView::ProjectTypes))
        }
        ProjectTypeCommands::Show { name } => {
            validate_dotted_id("--name", name)?;
            let conn = ctx.connect()?;
            let operation = conn.client.get_project_type(name).await?;
            render_operation(ctx, operation, Some(TableView::ProjectTypes))
        }
    }
}
