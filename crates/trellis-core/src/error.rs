//! Error types for extraction.
//!
//! We keep errors simple and actionable. Configuration problems are
//! reported before any file is opened; I/O problems abort the run.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience type for functions that can fail during extraction.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Things that can go wrong when scanning a source tree.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The root directory does not exist.
    #[error("the directory '{0}' does not exist")]
    MissingRoot(PathBuf),

    /// The root exists but is a file.
    #[error("'{0}' is not a directory")]
    NotADirectory(PathBuf),

    /// The language tag is not one we ship an extractor for.
    #[error("unsupported language type: {0} (expected one of python, java, go, js, cpp, c, php)")]
    UnsupportedLanguage(String),

    /// Couldn't read a file from disk.
    #[error("failed to read file '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Tree-sitter could not be configured or returned no tree.
    #[error("parser error: {0}")]
    ParserError(String),

    /// The directory walk itself failed (permissions, loops).
    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
}

impl ExtractError {
    /// Creates an IO error with the path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }
}
