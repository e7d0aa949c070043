mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Local-only commands
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),
        Command::Completions(args) => commands::completions::handle(&args),
        Command::Links(args) if commands::links::is_offline(&args) => {
            commands::links::handle_offline(&cli.global)
        }

        // Everything else talks to Home Assistant
        cmd => {
            let conn = config::build_connection_config(&cli.global)?;
            tracing::debug!(command = ?cmd, url = %conn.url, "dispatching command");
            commands::dispatch(cmd, &conn, &cli.global).await
        }
    }
}
