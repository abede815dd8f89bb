use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing required argument: {arg}")]
    MissingArgument { arg: String },

    #[error("Conflicting arguments: {first} and {second}")]
    ConflictingArguments { first: String, second: String },

    #[error("Nothing to compose: pass --project or at least one --image")]
    NoImages,

    #[error("{count} images do not fit a {rows}x{cols} grid")]
    GridTooSmall { count: usize, rows: u32, cols: u32 },

    #[error(transparent)]
    Library(#[from] mixgrid::Error),
}
