//! `fflat` - folder flattening engine.
//!
//! See `README.md` for user documentation and `DESIGN.md` for architecture.

use anyhow::Result;
use clap::Parser;

use fflat::cli::{Cli, Command};

fn main() -> Result<()> {
    // Diagnostics go to stderr so `--json` NDJSON on stdout stays clean.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let exit_code = match cli.command {
        Command::Schema => {
            let schema = fflat::model::generate_schema();
            println!("{}", schema);
            0
        }
        Command::Flatten(args) => fflat::engine::run(args)?,
        Command::Undo(args) => fflat::engine::undo(args)?,
    };
    std::process::exit(exit_code);
}
