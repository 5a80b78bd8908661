//! CLI structure and command definitions
//!
//! Resource commands mirror the TeamCloud API: users, projects (with their
//! users), project types and providers. Create and delete commands drive
//! the operation to completion unless `--no-wait` is given.

use clap::{Args, Parser, Subcommand};
use tcctl_core::models::{ProjectUserRole, TeamCloudUserRole};

/// TeamCloud command-line client
#[derive(Parser, Debug)]
#[command(name = "tcctl")]
#[command(version, about = "Manage a TeamCloud instance from the command line")]
#[command(long_about = "
Manage a TeamCloud instance from the command line

EXAMPLES:
    # Save a profile for your instance
    tcctl profile set prod --url https://teamcloud.example.com --access-token $TOKEN

    # Create a project and wait for provisioning to finish
    tcctl project create -n contoso-web -t azure.default

    # Add a user to the project
    tcctl project user create -p contoso-web -n jane@contoso.com -r Owner

    # Filter output with JMESPath
    tcctl project list -q '[].name'

    # Query an operation by its tracking id
    tcctl status -t 2f3bc9ae-0a9c-4b8e-a8d9-1f5e6a1b9d3c

For more help on a specific command, run:
    tcctl <command> --help
")]
pub struct Cli {
    /// Base url of the TeamCloud instance (overrides the profile)
    #[arg(long, short = 'u', global = true)]
    pub url: Option<String>,

    /// Profile to use for this command
    #[arg(long, global = true, env = "TCCTL_PROFILE")]
    pub profile: Option<String>,

    /// Path to alternate configuration file
    #[arg(long, global = true, env = "TCCTL_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "auto")]
    pub output: OutputFormat,

    /// JMESPath query to filter output
    #[arg(long, short = 'q', global = true)]
    pub query: Option<String>,

    /// Enable verbose logging
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON for data, tables when stdout is a terminal and `-o table` is implied
    Auto,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Human-readable table format
    Table,
}

/// Options for commands that start a long-running operation
#[derive(Args, Debug, Clone, Default)]
pub struct WaitArgs {
    /// Print the first response and return without polling
    #[arg(long)]
    pub no_wait: bool,

    /// Maximum time to wait in seconds (0 waits forever)
    #[arg(long, conflicts_with = "no_wait")]
    pub wait_timeout: Option<u64>,

    /// Seconds between progress updates
    #[arg(long, conflicts_with = "no_wait")]
    pub poll_interval: Option<u64>,

    /// Give up after this many status checks
    #[arg(long, conflicts_with = "no_wait")]
    pub max_polls: Option<u32>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Get the status of a long-running operation
    #[command(after_help = "EXAMPLES:
    # Status of a TeamCloud-level operation
    tcctl status -t 2f3bc9ae-0a9c-4b8e-a8d9-1f5e6a1b9d3c

    # Status of an operation on a project
    tcctl status -t 2f3bc9ae-0a9c-4b8e-a8d9-1f5e6a1b9d3c -p contoso-web
")]
    Status {
        /// Operation tracking id
        #[arg(long, short = 't')]
        tracking_id: String,

        /// Project name or id (uuid)
        #[arg(long, short = 'p')]
        project: Option<String>,
    },

    /// Manage TeamCloud users
    #[command(subcommand)]
    User(UserCommands),

    /// Manage projects
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Manage project types
    #[command(subcommand, name = "project-type")]
    ProjectType(ProjectTypeCommands),

    /// Manage providers
    #[command(subcommand)]
    Provider(ProviderCommands),

    /// Profile management
    #[command(subcommand, visible_alias = "prof")]
    #[command(after_help = "EXAMPLES:
    # Create a profile
    tcctl profile set prod --url https://teamcloud.example.com --access-token $TOKEN

    # Local development instance with a self-signed certificate
    tcctl profile set local --url https://localhost:5001 --insecure

    # List all profiles
    tcctl profile list

    # Make a profile the default
    tcctl profile default prod
")]
    Profile(ProfileCommands),

    /// Version information
    #[command(visible_alias = "ver")]
    Version,

    /// Generate shell completions
    #[command(visible_alias = "comp")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion generation
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell", alias = "power-shell")]
    PowerShell,
    Elvish,
}

/// TeamCloud user commands
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Create a TeamCloud user
    Create {
        /// User email
        #[arg(long, short = 'n')]
        name: String,

        /// User role
        #[arg(long, short = 'r', value_enum, default_value_t = TeamCloudUserRole::Creator)]
        role: TeamCloudUserRole,

        /// Space-separated tags: key[=value]
        #[arg(long, num_args = 1..)]
        tags: Vec<String>,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Delete a TeamCloud user
    Delete {
        /// User id or email
        #[arg(long, short = 'n')]
        name: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// List TeamCloud users
    #[command(visible_alias = "ls")]
    List,

    /// Show a TeamCloud user
    Show {
        /// User id or email
        #[arg(long, short = 'n')]
        name: String,
    },
}

/// Project commands
#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Create a project
    Create {
        /// Project name
        #[arg(long, short = 'n')]
        name: String,

        /// Project type id
        #[arg(long, short = 't')]
        project_type: Option<String>,

        /// Space-separated tags: key[=value]
        #[arg(long, num_args = 1..)]
        tags: Vec<String>,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Delete a project
    Delete {
        /// Project name or id (uuid)
        #[arg(long, short = 'n')]
        name: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// List projects
    #[command(visible_alias = "ls")]
    List,

    /// Show a project
    Show {
        /// Project name or id (uuid)
        #[arg(long, short = 'n')]
        name: String,
    },

    /// Manage project users
    #[command(subcommand)]
    User(ProjectUserCommands),
}

/// Project user commands
#[derive(Subcommand, Debug)]
pub enum ProjectUserCommands {
    /// Add a user to a project
    Create {
        /// Project name or id (uuid)
        #[arg(long, short = 'p')]
        project: String,

        /// User email
        #[arg(long, short = 'n')]
        name: String,

        /// User role
        #[arg(long, short = 'r', value_enum, default_value_t = ProjectUserRole::Member)]
        role: ProjectUserRole,

        /// Space-separated tags: key[=value]
        #[arg(long, num_args = 1..)]
        tags: Vec<String>,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Remove a user from a project
    Delete {
        /// Project name or id (uuid)
        #[arg(long, short = 'p')]
        project: String,

        /// User id or email
        #[arg(long, short = 'n')]
        name: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// List project users
    #[command(visible_alias = "ls")]
    List {
        /// Project name or id (uuid)
        #[arg(long, short = 'p')]
        project: String,
    },

    /// Show a project user
    Show {
        /// Project name or id (uuid)
        #[arg(long, short = 'p')]
        project: String,

        /// User id or email
        #[arg(long, short = 'n')]
        name: String,
    },
}

/// Project type commands
#[derive(Subcommand, Debug)]
pub enum ProjectTypeCommands {
    /// Create a project type
    #[command(after_help = "EXAMPLES:
    tcctl project-type create -n azure.default --default \\
        --region eastus \\
        --subscriptions SUB1 SUB2 SUB3 \\
        --provider azure.resourcemanager \\
        --provider azure.devops org=contoso
")]
    Create {
        /// Project type id
        #[arg(long, short = 'n')]
        name: String,

        /// Use this project type when a project names none
        #[arg(long)]
        default: bool,

        /// Azure region for project resources
        #[arg(long)]
        region: Option<String>,

        /// Space-separated subscription ids (at least 3)
        #[arg(long, num_args = 1..)]
        subscriptions: Vec<String>,

        /// Number of projects per subscription
        #[arg(long)]
        subscription_capacity: Option<i32>,

        /// Prefix for project resource group names
        #[arg(long)]
        resource_group_name_prefix: Option<String>,

        /// Provider reference: PROVIDER_ID [KEY=VALUE ...] (repeatable)
        ///
        /// Every value without `=` starts a new provider reference.
        #[arg(long = "provider", num_args = 1.., value_name = "PROVIDER_ID [KEY=VALUE ...]", action = clap::ArgAction::Append)]
        providers: Vec<String>,

        /// Space-separated tags: key[=value]
        #[arg(long, num_args = 1..)]
        tags: Vec<String>,

        /// Space-separated properties: key=value
        #[arg(long, num_args = 1..)]
        properties: Vec<String>,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Delete a project type
    Delete {
        /// Project type id
        #[arg(long, short = 'n')]
        name: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// List project types
    #[command(visible_alias = "ls")]
    List,

    /// Show a project type
    Show {
        /// Project type id
        #[arg(long, short = 'n')]
        name: String,
    },
}

/// Provider commands
#[derive(Subcommand, Debug)]
pub enum ProviderCommands {
    /// Register a provider
    Create {
        /// Provider id
        #[arg(long, short = 'n')]
        name: String,

        /// Provider endpoint url
        #[arg(long)]
        endpoint: Option<String>,

        /// Azure Functions auth code for the endpoint
        #[arg(long)]
        auth_code: Option<String>,

        /// Principal id (uuid) of the provider's identity
        #[arg(long)]
        principal_id: Option<String>,

        /// Projects may opt out of this provider
        #[arg(long)]
        optional: bool,

        /// Providers that must run before this one on create
        #[arg(long, num_args = 1..)]
        create_dependencies: Vec<String>,

        /// Providers that must run before this one on init
        #[arg(long, num_args = 1..)]
        init_dependencies: Vec<String>,

        /// Providers whose events this one receives
        #[arg(long, num_args = 1..)]
        events: Vec<String>,

        /// Space-separated properties: key=value
        #[arg(long, num_args = 1..)]
        properties: Vec<String>,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Delete a provider
    Delete {
        /// Provider id
        #[arg(long, short = 'n')]
        name: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// List providers
    #[command(visible_alias = "ls")]
    List,

    /// Show a provider
    Show {
        /// Provider id
        #[arg(long, short = 'n')]
        name: String,
    },
}

/// Profile management commands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// List all configured profiles
    #[command(visible_alias = "ls")]
    List,

    /// Show the path to the configuration file
    Path,

    /// Show details of a specific profile
    #[command(visible_alias = "get")]
    Show {
        /// Profile name to show
        name: String,
    },

    /// Set or create a profile from the global --url
    #[command(visible_alias = "add")]
    Set {
        /// Profile name
        name: String,

        /// Bearer token for the TeamCloud API
        #[arg(long)]
        access_token: Option<String>,

        /// Accept invalid TLS certificates
        #[arg(long)]
        insecure: bool,
    },

    /// Remove a profile
    #[command(visible_alias = "rm")]
    Remove {
        /// Profile name to remove
        name: String,
    },

    /// Set the default profile
    Default {
        /// Profile name to use by default
        name: String,
    },
}
