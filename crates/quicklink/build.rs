use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;

// cli.rs only depends on clap and clap_complete, both build-dependencies.
#[path = "src/cli.rs"]
mod cli;

fn main() -> io::Result<()> {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let out_dir: PathBuf = std::env::var_os("OUT_DIR")
        .ok_or_else(|| io::Error::other("OUT_DIR not set"))?
        .into();
    let man_dir = out_dir.join("man");
    std::fs::create_dir_all(&man_dir)?;

    write_manpages(&cli::Cli::command(), &man_dir)
}

/// One page per command, named `quicklink-entries-edit.1` and so on.
fn write_manpages(cmd: &clap::Command, dir: &Path) -> io::Result<()> {
    let name = cmd.get_name().to_owned();

    let mut page = Vec::new();
    clap_mangen::Man::new(cmd.clone()).render(&mut page)?;
    std::fs::write(dir.join(format!("{name}.1")), page)?;

    for sub in cmd.get_subcommands().filter(|s| !s.is_hide_set()) {
        let renamed = sub.clone().name(format!("{name}-{}", sub.get_name()));
        write_manpages(&renamed, dir)?;
    }
    Ok(())
}
