//! Error types for runepkg

use std::path::PathBuf;

use thiserror::Error;

/// Convenience Result type for runepkg operations
pub type Result<T> = std::result::Result<T, RunepkgError>;

#[derive(Error, Debug)]
pub enum RunepkgError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Corrupt record {}: {detail}", .path.display())]
    Corrupt { path: PathBuf, detail: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unsatisfied dependencies: {}", .0.join(", "))]
    ConstraintUnsatisfied(Vec<String>),

    #[error("{name} {version} is already installed")]
    AlreadyInstalled { name: String, version: String },

    #[error("No exact match for {query}")]
    SuggestionsShown {
        query: String,
        candidates: Vec<String>,
    },

    #[error("Cancelled")]
    Cancelled,
}

impl RunepkgError {
    /// Process exit code the CLI maps this error to.
    ///
    /// `SuggestionsShown` is distinguished so callers can print the
    /// candidate list without also emitting their own "not found"
    /// message.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SuggestionsShown { .. } => 2,
            _ => 1,
        }
    }

    pub(crate) fn corrupt(path: &std::path::Path, detail: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.to_path_buf(),
            detail: detail.into(),
        }
    }
}
