//! Helpers shared by the resource commands

use std::collections::HashMap;

use anyhow::Context;
use dialoguer::Confirm;
use tcctl_core::models::StringMap;
use tcctl_core::validation::{is_uuid, parse_key_values, parse_tags, validate_project_name_or_id};
use tcctl_core::{Operation, TeamCloudClient};
use tracing::debug;

use crate::error::{Result as CliResult, TcCtlError};

/// Ask before a destructive action
///
/// Without a terminal on stdin nothing is asked and the action is refused.
pub fn confirm_action(message: &str) -> CliResult<bool> {
    use std::io::IsTerminal;

    if std::io::stdin().is_terminal() {
        Ok(Confirm::new()
            .with_prompt(message)
            .default(false)
            .interact()
            .context("Failed to get user confirmation")?)
    } else {
        eprintln!("Warning: {} Use --yes to skip confirmation.", message);
        Ok(false)
    }
}

/// Confirm a delete unless `--yes` was given
pub fn confirm_delete(what: &str, name: &str, yes: bool) -> CliResult<bool> {
    if yes {
        return Ok(true);
    }
    let confirmed = confirm_action(&format!("Delete {} '{}'?", what, name))?;
    if !confirmed {
        eprintln!("Aborted");
    }
    Ok(confirmed)
}

fn non_empty(map: HashMap<String, String>) -> Option<StringMap> {
    (!map.is_empty()).then_some(map)
}

/// `--tags`; `None` when no tags were given
pub fn tags(values: &[String]) -> CliResult<Option<StringMap>> {
    Ok(non_empty(parse_tags(values)?))
}

/// `--properties`; `None` when no properties were given
pub fn properties(values: &[String]) -> CliResult<Option<StringMap>> {
    Ok(non_empty(parse_key_values("--properties", values)?))
}

/// `None` for an empty list
pub fn non_empty_list(values: &[String]) -> Option<Vec<String>> {
    (!values.is_empty()).then(|| values.to_vec())
}

/// Resolve a project name or id to the project id
///
/// Ids pass through. Names are looked up on the service; any failure to
/// find the project is reported the same way.
pub async fn resolve_project_id(client: &TeamCloudClient, name_or_id: &str) -> CliResult<String> {
    validate_project_name_or_id(name_or_id)?;
    if is_uuid(name_or_id) {
        return Ok(name_or_id.to_string());
    }

    debug!("Resolving project name '{}'", name_or_id);
    let not_found = || TcCtlError::ProjectNotFound {
        name: name_or_id.to_string(),
    };

    match client.get_project(name_or_id).await? {
        Operation::Data(result) => {
            let id = result.data.id.ok_or_else(not_found)?;
            debug!("Project '{}' has id {}", name_or_id, id);
            Ok(id)
        }
        _ => Err(not_found()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_tags_is_none() {
        assert_eq!(tags(&[]).unwrap(), None);
        assert_eq!(properties(&[]).unwrap(), None);
    }

    #[test]
    fn test_tags_and_properties() {
        let parsed = tags(&strings(&["env=prod", "pilot"])).unwrap().unwrap();
        assert_eq!(parsed.len(), 2);

        assert!(properties(&strings(&["pilot"])).is_err());
    }

    #[test]
    fn test_yes_skips_confirmation() {
        assert!(confirm_delete("project", "contoso-web", true).unwrap());
    }
}
