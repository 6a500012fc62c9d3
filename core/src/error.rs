#![deny(missing_docs)]

//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.

use derive_more::{Display, From};
use std::path::PathBuf;

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// A value violated a construction-time invariant (empty path, bad status code...).
    #[from(ignore)]
    #[display("Validation Error: {_0}")]
    Validation(String),

    /// Documentation could not be loaded from the given file or directory.
    #[from(ignore)]
    #[display("Load Error ({}): {}", _0.display(), _1)]
    Load(PathBuf, String),

    /// The schema does not have the expected shape.
    #[from(ignore)]
    #[display("Schema Error: {_0}")]
    Schema(String),

    /// A code sample could not be generated.
    #[from(ignore)]
    #[display("Generation Error: {_0}")]
    Generation(String),

    /// The schema enhancer failed. The second field keeps the underlying cause.
    #[from(ignore)]
    #[display("Enhancement Error: {_0}")]
    Enhancement(String, Option<Box<AppError>>),

    /// Invalid configuration (bad regex, unknown encoding, unreadable config file).
    #[from(ignore)]
    #[display("Config Error: {_0}")]
    Config(String),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

impl AppError {
    /// Wraps `cause` as an enhancement failure.
    pub fn enhancement(message: impl Into<String>, cause: AppError) -> Self {
        AppError::Enhancement(message.into(), Some(Box::new(cause)))
    }
}

/// Manual implementation of the standard Error trait.
///
/// Only the IO and enhancement variants carry a source.
impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Io(e) => Some(e),
            AppError::Enhancement(_, Some(cause)) => Some(cause.as_ref()),
            _ => None,
        }
    }
}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
