//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod completions;
pub mod config_cmd;
pub mod entries;
pub mod links;
pub mod status;
pub mod util;

use quicklink_core::ConnectionConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a command that needs a Home Assistant connection.
pub async fn dispatch(
    cmd: Command,
    conn: &ConnectionConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Entries(args) => entries::handle(args, conn, global).await,
        Command::Links(args) => links::handle(args, conn, global).await,
        Command::Status => status::handle(conn, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
