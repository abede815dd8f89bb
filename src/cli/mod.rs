//! Command Line Interface (CLI) layer for MIXGRID.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) for the compose, edit and frames
//! subcommands. It wires user-provided options to the underlying library
//! functionality exposed via `mixgrid::api`.
//!
//! If you are embedding MIXGRID into another application, prefer using
//! the high-level `mixgrid::api` module instead of calling the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
