//! Shell completion generation.

use clap::CommandFactory;
use clap_complete::{generate, generate_to};

use crate::cli::{Cli, CompletionsArgs};
use crate::error::CliError;

const BIN_NAME: &str = "quicklink";

pub fn handle(args: &CompletionsArgs) -> Result<(), CliError> {
    let mut cmd = Cli::command();
    match args.dir {
        Some(ref dir) => {
            std::fs::create_dir_all(dir)?;
            let path = generate_to(args.shell, &mut cmd, BIN_NAME, dir)?;
            eprintln!("✓ Wrote {}", path.display());
        }
        None => generate(args.shell, &mut cmd, BIN_NAME, &mut std::io::stdout()),
    }
    Ok(())
}
