//! MIXGRID CLI entrypoint.
//!
//! Provides a thin wrapper over the `cli` module: parse args, dispatch to
//! the compose, edit or frames subcommand, and exit with appropriate status.
//! For programmatic use, prefer the library API (`mixgrid::api`).

use clap::Parser;

mod cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = cli::CliArgs::parse();
    cli::run(args)
}
