pub mod async_utils;
pub mod profile;
pub mod project;
pub mod project_type;
pub mod project_user;
pub mod provider;
pub mod status;
pub mod user;
pub mod utils;

use tokio_util::sync::CancellationToken;

use crate::cli::OutputFormat;
use crate::connection::{Connection, ConnectionManager};
use crate::error::Result as CliResult;

/// Everything a resource command needs besides its own arguments
pub struct CommandContext<'a> {
    pub conn_mgr: &'a ConnectionManager,
    pub url: Option<&'a str>,
    pub profile: Option<&'a str>,
    pub output: OutputFormat,
    pub query: Option<&'a str>,
    pub cancel: CancellationToken,
}

impl CommandContext<'_> {
    pub fn connect(&self) -> CliResult<Connection> {
        self.conn_mgr.create_client(self.url, self.profile)
    }
}
