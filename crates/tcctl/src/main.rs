use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, shells};
use tcctl_core::Config;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod connection;
mod error;
mod output;

use cli::{Cli, Commands};
use commands::CommandContext;
use connection::ConnectionManager;
use error::TcCtlError;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level
    init_tracing(cli.verbose);

    let (config, config_path) = match load_config(cli.config_file.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            e.print_diagnostic();
            std::process::exit(1);
        }
    };
    debug!(
        "Creating ConnectionManager with config_path: {:?}",
        config_path
    );
    let conn_mgr = ConnectionManager::with_config_path(config, config_path);

    let cancel = CancellationToken::new();
    spawn_ctrl_c_handler(cancel.clone());

    if let Err(e) = execute_command(&cli, &conn_mgr, cancel).await {
        e.print_diagnostic();
        std::process::exit(1);
    }

    Ok(())
}

/// Load configuration from the specified path or the default location
fn load_config(
    config_file: Option<&str>,
) -> Result<(Config, Option<std::path::PathBuf>), TcCtlError> {
    if let Some(config_file) = config_file {
        let path = std::path::PathBuf::from(config_file);
        debug!("Loading config from explicit path: {:?}", path);
        let config = Config::load_from_path(&path)?;
        Ok((config, Some(path)))
    } else {
        debug!("Loading config from default location");
        Ok((Config::load()?, None))
    }
}

/// Cancel polling on the first Ctrl-C
fn spawn_ctrl_c_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping");
            cancel.cancel();
        }
    });
}

fn init_tracing(verbose: u8) {
    // Check for RUST_LOG env var first, then fall back to verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "tcctl=warn,tcctl_core=warn",
            1 => "tcctl=info,tcctl_core=info",
            2 => "tcctl=debug,tcctl_core=debug",
            _ => "tcctl=trace,tcctl_core=trace",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .init();

    debug!("Tracing initialized with verbosity level: {}", verbose);
}

async fn execute_command(
    cli: &Cli,
    conn_mgr: &ConnectionManager,
    cancel: CancellationToken,
) -> Result<(), TcCtlError> {
    // Log command execution with sanitized parameters
    trace!("Executing command: {}", format_command(&cli.command));
    info!("Command: {}", format_command(&cli.command));

    let ctx = CommandContext {
        conn_mgr,
        url: cli.url.as_deref(),
        profile: cli.profile.as_deref(),
        output: cli.output,
        query: cli.query.as_deref(),
        cancel,
    };

    let start = std::time::Instant::now();
    let result = match &cli.command {
        Commands::Version => {
            debug!("Showing version information");
            match cli.output {
                cli::OutputFormat::Json | cli::OutputFormat::Yaml => {
                    let output_data = serde_json::json!({
                        "version": env!("CARGO_PKG_VERSION"),
                        "name": env!("CARGO_PKG_NAME"),
                    });
                    output::print_output(&output_data, cli.output.into(), None)?;
                }
                _ => {
                    println!("tcctl {}", env!("CARGO_PKG_VERSION"));
                }
            }
            Ok(())
        }
        Commands::Completions { shell } => {
            debug!("Generating completions for {:?}", shell);
            generate_completions(*shell);
            Ok(())
        }
        Commands::Profile(profile_cmd) => {
            debug!("Executing profile command");
            commands::profile::handle_profile_command(
                profile_cmd,
                conn_mgr,
                cli.url.as_deref(),
                cli.output,
            )
            .await
        }
        Commands::Status {
            tracking_id,
            project,
        } => commands::status::handle_status(&ctx, tracking_id, project.as_deref()).await,
        Commands::User(cmd) => commands::user::handle_user_command(&ctx, cmd).await,
        Commands::Project(cmd) => commands::project::handle_project_command(&ctx, cmd).await,
        Commands::ProjectType(cmd) => {
            commands::project_type::handle_project_type_command(&ctx, cmd).await
        }
        Commands::Provider(cmd) => commands::provider::handle_provider_command(&ctx, cmd).await,
    };

    let duration = start.elapsed();
    match &result {
        Ok(_) => info!("Command completed successfully in {:?}", duration),
        Err(e) => error!("Command failed after {:?}: {}", duration, e),
    }

    result
}

/// Generate shell completions
fn generate_completions(shell: cli::Shell) {
    let mut cmd = cli::Cli::command();
    let name = cmd.get_name().to_string();

    match shell {
        cli::Shell::Bash => generate(shells::Bash, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::Zsh => generate(shells::Zsh, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::Fish => generate(shells::Fish, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::PowerShell => {
            generate(shells::PowerShell, &mut cmd, name, &mut std::io::stdout())
        }
        cli::Shell::Elvish => generate(shells::Elvish, &mut cmd, name, &mut std::io::stdout()),
    }
}

/// Format command for human-readable logging (without sensitive data)
fn format_command(command: &Commands) -> String {
    match command {
        Commands::Version => "version".to_string(),
        Commands::Completions { shell } => format!("completions {:?}", shell),
        Commands::Status {
            tracking_id,
            project,
        } => match project {
            Some(project) => format!("status {} --project {}", tracking_id, project),
            None => format!("status {}", tracking_id),
        },
        Commands::Profile(cmd) => {
            use cli::ProfileCommands::*;
            match cmd {
                List => "profile list".to_string(),
                Path => "profile path".to_string(),
                Show { name } => format!("profile show {}", name),
                Set { name, .. } => format!("profile set {} [credentials redacted]", name),
                Remove { name } => format!("profile remove {}", name),
                Default { name } => format!("profile default {}", name),
            }
        }
        Commands::User(cmd) => format!("user {:?}", cmd),
        Commands::Project(cmd) => format!("project {:?}", cmd),
        Commands::ProjectType(cmd) => format!("project-type {:?}", cmd),
        Commands::Provider(cmd) => {
            use cli::ProviderCommands::*;
            match cmd {
                Create { name, .. } => format!("provider create {} [auth code redacted]", name),
                other => format!("provider {:?}", other),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_format_command_redacts_secrets() {
        let cli = Cli::parse_from([
            "tcctl",
            "profile",
            "set",
            "prod",
            "--url",
            "https://tc.example.com",
            "--access-token",
            "s3cret",
        ]);
        let formatted = format_command(&cli.command);
        assert!(!formatted.contains("s3cret"));

        let cli = Cli::parse_from([
            "tcctl",
            "provider",
            "create",
            "-n",
            "azure.devops",
            "--auth-code",
            "c2VjcmV0",
        ]);
        assert!(!format_command(&cli.command).contains("c2VjcmV0"));
    }

    #[test]
    fn test_project_type_provider_groups() {
        let cli = Cli::parse_from([
            "tcctl",
            "project-type",
            "create",
            "-n",
            "azure.default",
            "--provider",
            "azure.resourcemanager",
            "--provider",
            "azure.devops",
            "org=contoso",
        ]);
        match cli.command {
            Commands::ProjectType(cli::ProjectTypeCommands::Create { providers, .. }) => {
                assert_eq!(
                    providers,
                    vec![
                        "azure.resourcemanager".to_string(),
                        "azure.devops".to_string(),
                        "org=contoso".to_string(),
                    ]
                );
                let references =
                    tcctl_core::validation::parse_provider_references("--provider", &providers)
                        .unwrap();
                assert_eq!(references.len(), 2);
                assert_eq!(references[1].id, "azure.devops");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
