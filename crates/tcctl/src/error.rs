//! Error types for tcctl
//!
//! Every handler returns [`TcCtlError`]; `main` prints it as a cargo-style
//! diagnostic with suggestions and exits non-zero.

use colored::Colorize;
use tcctl_core::{ConfigError, CoreError};
use thiserror::Error;

/// Cargo-style diagnostic formatter for CLI errors.
///
/// Produces structured output like:
/// ```text
/// error: no project found matching provided project name
///   --project contoso-web
///
///   tip: list the projects you can see:
///       tcctl project list
/// ```
pub struct CliDiagnostic {
    message: String,
    detail: Option<String>,
    tips: Vec<(String, Vec<String>)>,
}

impl CliDiagnostic {
    /// Start a new error diagnostic with the given message.
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
            detail: None,
            tips: Vec::new(),
        }
    }

    /// Add a detail line below the error message.
    pub fn detail(mut self, text: &str) -> Self {
        self.detail = Some(text.to_string());
        self
    }

    /// Add a tip with optional example commands.
    pub fn tip(mut self, description: &str, commands: &[&str]) -> Self {
        self.tips.push((
            description.to_string(),
            commands.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    /// Print the diagnostic to stderr with colored formatting.
    pub fn print(&self) {
        eprint!("{}{}", "error".red().bold(), ": ".bold());
        eprintln!("{}", self.message);

        if let Some(detail) = &self.detail {
            eprintln!("  {}", detail);
        }

        for (description, commands) in &self.tips {
            eprintln!();
            eprint!("  {}{}", "tip".yellow().bold(), ": ".bold());
            eprintln!("{}", description);
            for cmd in commands {
                eprintln!("      {}", cmd);
            }
        }
    }
}

/// Main error type for the tcctl application
#[derive(Error, Debug)]
pub enum TcCtlError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("No TeamCloud url configured. Pass --url or create a profile with 'tcctl profile set'.")]
    NoUrlConfigured,

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("no project found matching provided project name")]
    ProjectNotFound { name: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("API error: {message}")]
    ApiError { message: String },

    /// The service reported a failure; the error document was already printed
    #[error("{summary}")]
    OperationFailed { summary: String },

    #[error("Connection error: {message}")]
    ConnectionError { message: String },

    #[error("Timeout: {message}")]
    Timeout { message: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Output formatting error: {message}")]
    OutputError { message: String },
}

/// Result type for tcctl operations
pub type Result<T> = std::result::Result<T, TcCtlError>;

impl TcCtlError {
    /// Get helpful suggestions for resolving this error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            TcCtlError::ProfileNotFound { name } => vec![
                "List available profiles: tcctl profile list".to_string(),
                format!("Create profile '{}': tcctl profile set {} --url <url>", name, name),
            ],
            TcCtlError::NoUrlConfigured => vec![
                "Create a profile: tcctl profile set <name> --url https://teamcloud.example.com"
                    .to_string(),
                "Or set TC_URL for a single session".to_string(),
            ],
            TcCtlError::ProjectNotFound { .. } => vec![
                "List the projects you can see: tcctl project list".to_string(),
                "Pass the project id (uuid) instead of its name".to_string(),
            ],
            TcCtlError::AuthenticationFailed { .. } => vec![
                "Check the access token: tcctl profile show <profile>".to_string(),
                "Or set TC_ACCESS_TOKEN for a single session".to_string(),
            ],
            TcCtlError::ConnectionError { message }
                if message.contains("certificate") || message.contains("SSL") =>
            {
                vec![
                    "For self-signed certificates: tcctl profile set <name> --url <url> --insecure"
                        .to_string(),
                    "Check that the server url is correct and reachable".to_string(),
                ]
            }
            TcCtlError::ConnectionError { .. } => vec![
                "Check network connectivity".to_string(),
                "Verify the server url is correct: tcctl profile show <profile>".to_string(),
            ],
            TcCtlError::Timeout { .. } => vec![
                "The operation may still finish; query it with: tcctl status -t <tracking-id>"
                    .to_string(),
                "Wait longer with --wait-timeout <secs> (0 waits forever)".to_string(),
            ],
            TcCtlError::InvalidInput { .. } => {
                vec!["Check the command syntax: tcctl <command> --help".to_string()]
            }
            _ => vec![],
        }
    }

    /// Print a cargo-style diagnostic to stderr using colored formatting.
    pub fn print_diagnostic(&self) {
        let mut diag = CliDiagnostic::error(&format!("{}", self));

        if let TcCtlError::ProjectNotFound { name } = self {
            diag = diag.detail(&format!("--project {}", name));
        }

        for suggestion in self.suggestions() {
            diag = diag.tip(&suggestion, &[]);
        }

        diag.print();
    }
}

impl From<CoreError> for TcCtlError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(message) => TcCtlError::InvalidInput { message },
            CoreError::Config(message) => TcCtlError::Configuration(message),
            CoreError::Connection(message) => TcCtlError::ConnectionError { message },
            CoreError::Http { status: 401 | 403, message } => {
                TcCtlError::AuthenticationFailed { message }
            }
            CoreError::PollTimeout(duration) => TcCtlError::Timeout {
                message: format!("operation still running after {} seconds", duration.as_secs()),
            },
            err @ CoreError::PollLimitExceeded(_) => TcCtlError::Timeout {
                message: err.to_string(),
            },
            CoreError::Cancelled => TcCtlError::Cancelled,
            other => TcCtlError::ApiError {
                message: other.to_string(),
            },
        }
    }
}

impl From<ConfigError> for TcCtlError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ProfileNotFound { name } => TcCtlError::ProfileNotFound { name },
            other => TcCtlError::Configuration(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for TcCtlError {
    fn from(err: serde_json::Error) -> Self {
        TcCtlError::OutputError {
            message: format!("JSON error: {}", err),
        }
    }
}

impl From<std::io::Error> for TcCtlError {
    fn from(err: std::io::Error) -> Self {
        TcCtlError::OutputError {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<anyhow::Error> for TcCtlError {
    fn from(err: anyhow::Error) -> Self {
        TcCtlError::Configuration(format!("{:#}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_validation_maps_to_invalid_input() {
        let err: TcCtlError = CoreError::Validation("--name is bad".to_string()).into();
        assert!(matches!(err, TcCtlError::InvalidInput { .. }));
        assert_eq!(err.to_string(), "Invalid input: --name is bad");
    }

    #[test]
    fn test_poll_bounds_map_to_timeout() {
        let err: TcCtlError = CoreError::PollTimeout(Duration::from_secs(600)).into();
        assert!(err.to_string().contains("600 seconds"));

        let err: TcCtlError = CoreError::PollLimitExceeded(5).into();
        assert!(matches!(err, TcCtlError::Timeout { .. }));
        assert!(!err.suggestions().is_empty());
    }

    #[test]
    fn test_unauthorized_maps_to_authentication_failed() {
        let err: TcCtlError = CoreError::Http {
            status: 401,
            message: "Unauthorized".to_string(),
        }
        .into();
        assert!(matches!(err, TcCtlError::AuthenticationFailed { .. }));
    }

    #[test]
    fn test_certificate_errors_suggest_insecure() {
        let err = TcCtlError::ConnectionError {
            message: "invalid peer certificate".to_string(),
        };
        assert!(err.suggestions().iter().any(|s| s.contains("--insecure")));
    }

    #[test]
    fn test_profile_not_found_keeps_name() {
        let err: TcCtlError = ConfigError::ProfileNotFound {
            name: "prod".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Profile 'prod' not found");
    }
}
