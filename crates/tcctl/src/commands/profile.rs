//! Profile management command implementations

use crate::cli::{OutputFormat, ProfileCommands};
use crate::connection::ConnectionManager;
use crate::error::TcCtlError;
use crate::output;
use colored::Colorize;
use tcctl_core::validation::validate_url;
use tcctl_core::{Config, Profile};
use tracing::{debug, info, trace};

/// Handle profile management commands
///
/// `url` is the global `--url` flag, used by `profile set`.
pub async fn handle_profile_command(
    profile_cmd: &ProfileCommands,
    conn_mgr: &ConnectionManager,
    url: Option<&str>,
    output_format: OutputFormat,
) -> Result<(), TcCtlError> {
    use ProfileCommands::*;

    match profile_cmd {
        List => handle_list(conn_mgr, output_format),
        Path => handle_path(conn_mgr, output_format),
        Show { name } => handle_show(conn_mgr, name, output_format),
        Set {
            name,
            access_token,
            insecure,
        } => handle_set(conn_mgr, name, url, access_token.as_deref(), *insecure),
        Remove { name } => handle_remove(conn_mgr, name),
        Default { name } => handle_default(conn_mgr, name),
    }
}

fn structured(output_format: OutputFormat) -> Option<output::OutputFormat> {
    match output_format {
        OutputFormat::Json => Some(output::OutputFormat::Json),
        OutputFormat::Yaml => Some(output::OutputFormat::Yaml),
        OutputFormat::Auto | OutputFormat::Table => None,
    }
}

fn config_file_display(conn_mgr: &ConnectionManager) -> Option<String> {
    conn_mgr
        .config_path
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .or_else(|| {
            Config::config_path()
                .ok()
                .map(|p| p.to_string_lossy().to_string())
        })
}

fn profile_json(name: &str, profile: &Profile, is_default: bool) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "url": profile.url,
        "is_default": is_default,
        "access_token_configured": profile.has_access_token(),
        "insecure": profile.insecure,
        "poll": profile.poll,
        "retry": profile.retry,
    })
}

fn handle_list(
    conn_mgr: &ConnectionManager,
    output_format: OutputFormat,
) -> Result<(), TcCtlError> {
    debug!("Listing all configured profiles");
    let profiles = conn_mgr.config.list_profiles();
    trace!("Found {} profiles", profiles.len());
    let default = conn_mgr.config.default_profile.as_deref();

    if let Some(fmt) = structured(output_format) {
        let profile_list: Vec<serde_json::Value> = profiles
            .iter()
            .map(|(name, profile)| profile_json(name, profile, default == Some(name.as_str())))
            .collect();

        let output_data = serde_json::json!({
            "config_path": config_file_display(conn_mgr),
            "profiles": profile_list,
            "count": profiles.len()
        });
        output::print_output(&output_data, fmt, None)?;
        return Ok(());
    }

    if let Some(path) = config_file_display(conn_mgr) {
        println!("Configuration file: {}", path);
        println!();
    }

    if profiles.is_empty() {
        info!("No profiles configured");
        println!("No profiles configured.");
        println!("Use 'tcctl profile set <name> --url <url>' to create a profile.");
        return Ok(());
    }

    for (name, profile) in &profiles {
        if default == Some(name.as_str()) {
            println!("  {} {}", name.bold().cyan(), "(default)".green());
        } else {
            println!("  {}", name.bold().cyan());
        }
        println!(
            "    {} {}{}",
            "URL:".dimmed(),
            profile.url,
            if profile.insecure { " (insecure)" } else { "" }
        );
    }

    Ok(())
}

fn handle_path(
    conn_mgr: &ConnectionManager,
    output_format: OutputFormat,
) -> Result<(), TcCtlError> {
    let config_path = match &conn_mgr.config_path {
        Some(path) => path.clone(),
        None => Config::config_path()?,
    };

    match structured(output_format) {
        Some(fmt) => {
            let output_data = serde_json::json!({
                "config_path": config_path.to_string_lossy()
            });
            output::print_output(&output_data, fmt, None)?;
        }
        None => {
            println!("{}", config_path.display());
        }
    }
    Ok(())
}

fn handle_show(
    conn_mgr: &ConnectionManager,
    name: &str,
    output_format: OutputFormat,
) -> Result<(), TcCtlError> {
    let profile = conn_mgr.config.profile(name)?;
    let is_default = conn_mgr.config.default_profile.as_deref() == Some(name);

    if let Some(fmt) = structured(output_format) {
        output::print_output(profile_json(name, profile, is_default), fmt, None)?;
        return Ok(());
    }

    println!("{}", format!("Profile: {}", name).bold());
    println!("  URL:          {}", profile.url);
    println!(
        "  Access token: {}",
        if profile.has_access_token() {
            "configured"
        } else {
            "not set"
        }
    );
    println!("  Insecure:     {}", profile.insecure);
    println!(
        "  Polling:      every {}s, status check every {} ticks, timeout {}",
        profile.poll.interval_secs,
        profile.poll.ticks_per_poll,
        match profile.poll.timeout_secs {
            Some(secs) if secs > 0 => format!("{}s", secs),
            _ => "none".to_string(),
        }
    );
    println!(
        "  Retry:        {}",
        if profile.retry.enabled {
            format!("up to {} attempts", profile.retry.max_attempts)
        } else {
            "disabled".to_string()
        }
    );
    if is_default {
        println!("  {}", "(default)".green());
    }
    Ok(())
}

fn handle_set(
    conn_mgr: &ConnectionManager,
    name: &str,
    url: Option<&str>,
    access_token: Option<&str>,
    insecure: bool,
) -> Result<(), TcCtlError> {
    debug!("Setting profile: {}", name);

    let existing = conn_mgr.config.profiles.get(name);
    let mut profile = match (url, existing) {
        (Some(url), Some(existing)) => Profile {
            url: url.to_string(),
            ..existing.clone()
        },
        (Some(url), None) => Profile::new(url),
        (None, Some(existing)) => existing.clone(),
        (None, None) => {
            return Err(TcCtlError::InvalidInput {
                message: format!("--url is required to create profile '{}'", name),
            });
        }
    };
    validate_url("--url", &profile.url)?;

    if let Some(token) = access_token {
        profile.access_token = Some(token.to_string());
    }
    if insecure {
        profile.insecure = true;
    }

    let mut config = conn_mgr.config.clone();
    config.set_profile(name.to_string(), profile);
    if config.default_profile.is_none() {
        info!("Making '{}' the default profile", name);
        config.default_profile = Some(name.to_string());
    }

    let updated = ConnectionManager::with_config_path(config, conn_mgr.config_path.clone());
    updated.save_config()?;

    println!("Profile '{}' saved", name);
    Ok(())
}

fn handle_remove(conn_mgr: &ConnectionManager, name: &str) -> Result<(), TcCtlError> {
    debug!("Removing profile: {}", name);

    let mut config = conn_mgr.config.clone();
    if config.remove_profile(name).is_none() {
        return Err(TcCtlError::ProfileNotFound { name: name.into() });
    }

    let updated = ConnectionManager::with_config_path(config, conn_mgr.config_path.clone());
    updated.save_config()?;

    println!("Profile '{}' removed", name);
    Ok(())
}

fn handle_default(conn_mgr: &ConnectionManager, name: &str) -> Result<(), TcCtlError> {
    conn_mgr.config.profile(name)?;

    let mut config = conn_mgr.config.clone();
    config.default_profile = Some(name.to_string());

    let updated = ConnectionManager::with_config_path(config, conn_mgr.config_path.clone());
    updated.save_config()?;

    println!("Default profile set to '{}'", name);
    Ok(())
}
