//! Input rules for identifiers, names and lists
//!
//! `is_*` functions are pure predicates. `validate_*` functions wrap them
//! and return [`CoreError::Validation`] with the message shown to users.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use uuid::{Uuid, Variant};

use crate::error::{CoreError, Result};
use crate::models::ProviderReference;

const ID_RULE: &str =
    "should start with a lowercase and contain only lowercase, numbers, and periods [.] with length [4,254]";

fn id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:[a-z][a-z0-9]+(?:\.[a-z0-9]+)+)$").unwrap())
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@]+@[^@]+\.[^@]+$").unwrap())
}

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^http[s]?://(?:[a-zA-Z]|[0-9]|[$-_@.&+]|[!*\(\), ]|(?:%[0-9a-fA-F][0-9a-fA-F]))+$",
        )
        .unwrap()
    })
}

fn auth_code_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z0-9/]{4})*([A-Za-z0-9/]{3}=|[A-Za-z0-9/]{2}==)?$").unwrap()
    })
}

fn resource_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\\/\?#]{2,254}$").unwrap())
}

// ----------------------------------------------------------------------------
// Predicates
// ----------------------------------------------------------------------------

/// A version 4 UUID written in canonical lowercase hyphenated form
pub fn is_uuid(value: &str) -> bool {
    Uuid::parse_str(value).is_ok_and(|id| {
        id.get_version_num() == 4
            && id.get_variant() == Variant::RFC4122
            && id.hyphenated().to_string() == value
    })
}

/// Project names are 5 to 30 characters long
pub fn is_project_name(name: &str) -> bool {
    let len = name.chars().count();
    4 < len && len < 31
}

/// Dotted lowercase identifier used for project types and providers
pub fn is_dotted_id(id: &str) -> bool {
    (4..=255).contains(&id.len()) && id_regex().is_match(id)
}

pub fn is_email(value: &str) -> bool {
    email_regex().is_match(value)
}

pub fn is_url(value: &str) -> bool {
    url_regex().is_match(value)
}

/// Base-64 digits without `+`, optionally ending in `=` or `==`
pub fn is_functions_auth_code(value: &str) -> bool {
    auth_code_regex().is_match(value)
}

pub fn is_resource_name(value: &str) -> bool {
    resource_name_regex().is_match(value)
}

// ----------------------------------------------------------------------------
// Validators
// ----------------------------------------------------------------------------

fn invalid(message: impl Into<String>) -> CoreError {
    CoreError::Validation(message.into())
}

pub fn validate_tracking_id(value: &str) -> Result<()> {
    if is_uuid(value) {
        Ok(())
    } else {
        Err(invalid("--tracking-id should be a valid uuid"))
    }
}

/// A new project's name
pub fn validate_project_name(value: &str) -> Result<()> {
    if is_uuid(value) || is_project_name(value) {
        Ok(())
    } else {
        Err(invalid(
            "--name should be a valid uuid or a project name string with length [4,31]",
        ))
    }
}

/// A project reference: uuid or project name
pub fn validate_project_name_or_id(value: &str) -> Result<()> {
    if is_uuid(value) || is_project_name(value) {
        Ok(())
    } else {
        Err(invalid(
            "--project should be a valid uuid or a project name string with length [4,31]",
        ))
    }
}

/// A new user's name
pub fn validate_user_name(value: &str) -> Result<()> {
    if is_email(value) {
        Ok(())
    } else {
        Err(invalid("--name should be a user name in email format"))
    }
}

/// A user reference: uuid or email
pub fn validate_user_name_or_id(value: &str) -> Result<()> {
    if is_uuid(value) || is_email(value) {
        Ok(())
    } else {
        Err(invalid(
            "--name should be a valid uuid or a user name in email format",
        ))
    }
}

/// A project type or provider id passed as `flag`
pub fn validate_dotted_id(flag: &str, value: &str) -> Result<()> {
    if is_dotted_id(value) {
        Ok(())
    } else {
        Err(invalid(format!("{} {}", flag, ID_RULE)))
    }
}

/// A list of provider ids passed as `flag` (events, dependencies)
pub fn validate_provider_id_list(flag: &str, values: &[String]) -> Result<()> {
    if values.iter().all(|v| is_dotted_id(v)) {
        Ok(())
    } else {
        Err(invalid(format!(
            "{} should be a space-separated list of valid provider ids, provider ids {}",
            flag, ID_RULE
        )))
    }
}

pub fn validate_subscriptions(values: &[String]) -> Result<()> {
    if values.len() >= 3 && values.iter().all(|v| is_uuid(v)) {
        Ok(())
    } else {
        Err(invalid(
            "--subscriptions should be a space-separated list of at least 3 valid uuids",
        ))
    }
}

pub fn validate_url(flag: &str, value: &str) -> Result<()> {
    if is_url(value) {
        Ok(())
    } else {
        Err(invalid(format!("{} should be a valid url", flag)))
    }
}

pub fn validate_auth_code(value: &str) -> Result<()> {
    if is_functions_auth_code(value) {
        Ok(())
    } else {
        Err(invalid(
            "--auth-code should contain only base-64 digits [A-Za-z0-9/] (excluding the plus sign (+)), ending in = or ==",
        ))
    }
}

pub fn validate_resource_name(value: &str) -> Result<()> {
    if is_resource_name(value) {
        Ok(())
    } else {
        Err(invalid(
            r"--name should have length [2,254] and not include characters [ '\', '/', '?', '#' ]",
        ))
    }
}

// ----------------------------------------------------------------------------
// Parsers
// ----------------------------------------------------------------------------

/// Parse `KEY=VALUE` pairs; the value may itself contain `=`
pub fn parse_key_values(flag: &str, items: &[String]) -> Result<HashMap<String, String>> {
    items
        .iter()
        .map(|item| {
            item.split_once('=')
                .filter(|(key, _)| !key.is_empty())
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .ok_or_else(|| invalid(format!("usage error: {} KEY=VALUE [KEY=VALUE ...]", flag)))
        })
        .collect()
}

/// Parse tags written as `KEY[=VALUE]`; a bare key gets an empty value
pub fn parse_tags(items: &[String]) -> Result<HashMap<String, String>> {
    items
        .iter()
        .map(|item| {
            let (key, value) = item.split_once('=').unwrap_or((item.as_str(), ""));
            if key.is_empty() {
                return Err(invalid("usage error: --tags KEY[=VALUE] [KEY[=VALUE] ...]"));
            }
            Ok((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Parse one `PROVIDER_ID [KEY=VALUE ...]` group
pub fn parse_provider_reference(flag: &str, values: &[String]) -> Result<ProviderReference> {
    let (id, properties) = values
        .split_first()
        .ok_or_else(|| invalid(format!("usage error: {} PROVIDER_ID [KEY=VALUE ...]", flag)))?;

    if !is_dotted_id(id) {
        return Err(invalid(format!(
            "usage error: {} PROVIDER_ID [KEY=VALUE ...] PROVIDER_ID {}",
            flag, ID_RULE
        )));
    }

    let properties = parse_key_values(flag, properties)?;
    Ok(ProviderReference {
        id: id.clone(),
        properties: Some(properties),
        depends_on: None,
    })
}

/// Parse the values of a repeated `PROVIDER_ID [KEY=VALUE ...]` flag
///
/// Values arrive flattened; each value without `=` opens the next group.
pub fn parse_provider_references(flag: &str, values: &[String]) -> Result<Vec<ProviderReference>> {
    let mut groups: Vec<Vec<String>> = Vec::new();
    for value in values {
        match groups.last_mut() {
            Some(group) if value.contains('=') => group.push(value.clone()),
            _ => groups.push(vec![value.clone()]),
        }
    }
    groups
        .iter()
        .map(|group| parse_provider_reference(flag, group))
        .collect()
}
