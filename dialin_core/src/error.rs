use thiserror::Error;

/// Raised by the strict linear-system solver when a pivot falls below the
/// caller's threshold. The modeling pipeline itself uses the lenient solver
/// and never surfaces this; it exists for callers that want a hard failure.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("matrix is numerically singular at column {column}")]
pub struct SingularMatrix {
    pub column: usize,
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
