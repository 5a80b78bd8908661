//! Provider commands

use tcctl_core::ResourceKind;
use tcctl_core::models::{Provider, ProviderDependencies};
use tcctl_core::validation::{
    is_uuid, validate_auth_code, validate_dotted_id, validate_provider_id_list, validate_url,
};

use super::CommandContext;
use super::async_utils::{render_operation, run_create, run_delete};
use super::utils::{confirm_delete, non_empty_list, properties};
use crate::cli::ProviderCommands;
use crate::error::{Result as CliResult, TcCtlError};
use crate::output::TableView;

pub async fn handle_provider_command(
    ctx: &CommandContext<'_>,
    cmd: &ProviderCommands,
) -> CliResult<()> {
    match cmd {
        ProviderCommands::Create {
            name,
            endpoint,
            auth_code,
            principal_id,
            optional,
            create_dependencies,
            init_dependencies,
            events,
            properties: property_args,
            wait,
        } => {
            validate_dotted_id("--name", name)?;
            if let Some(endpoint) = endpoint {
                validate_url("--endpoint", endpoint)?;
            }
            if let Some(code) = auth_code {
                validate_auth_code(code)?;
            }
            if let Some(id) = principal_id
                && !is_uuid(id)
            {
                return Err(TcCtlError::InvalidInput {
                    message: "--principal-id should be a valid uuid".to_string(),
                });
            }
            validate_provider_id_list("--create-dependencies", create_dependencies)?;
            validate_provider_id_list("--init-dependencies", init_dependencies)?;
            validate_provider_id_list("--events", events)?;

            let dependencies = (!create_dependencies.is_empty() || !init_dependencies.is_empty())
                .then(|| ProviderDependencies {
                    create: create_dependencies.clone(),
                    init: init_dependencies.clone(),
                });

            let provider = Provider {
                url: endpoint.clone(),
                auth_code: auth_code.clone(),
                principal_id: principal_id.clone(),
                optional: Some(*optional),
                dependencies,
                events: non_empty_list(events),
                properties: properties(property_args)?,
                ..Provider::new(name)
            };

            let conn = ctx.connect()?;
            run_create(
                ctx,
                &conn,
                ResourceKind::Provider,
                None,
                wait,
                TableView::Providers,
                conn.client.create_provider(&provider),
            )
            .await
        }
        ProviderCommands::Delete { name, yes, wait } => {
            validate_dotted_id("--name", name)?;
            if !confirm_delete("provider", name, *yes)? {
                return Ok(());
            }
            let conn = ctx.connect()?;
            run_delete(
                ctx,
                &conn,
                ResourceKind::Provider,
                None,
                wait,
                conn.client.delete_provider(name),
            )
            .await
        }
        ProviderCommands::List => {
            let conn = ctx.connect()?;
            let operation = conn.client.list_providers().await?;
            render_operation(ctx, operation, Some(TableView::Providers))
        }
        ProviderCommands::Show { name } => {
            validate_dotted_id("--name", name)?;
            let conn = ctx.connect()?;
            let operation = conn.client.get_provider(name).await?;
            render_operation(ctx, operation, Some(TableView::Providers))
        }
    }
}
