//! Custom error types for the save backup.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Source directory not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("Failed to copy {} to {}: {source}", from.display(), to.display())]
    FileCopy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to prepare destination {}: {source}", path.display())]
    DestinationPrepare {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to list directory {}: {source}", path.display())]
    Listing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Duplicate backup identifier: {0}")]
    DuplicateIdentifier(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification used by callers that react to a failure
/// without inspecting its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SourceNotFound,
    FileCopyFailure,
    DestinationPrepareFailure,
    Listing,
    Catalog,
    Config,
    Io,
}

impl BackupError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BackupError::SourceNotFound { .. } => ErrorKind::SourceNotFound,
            BackupError::FileCopy { .. } => ErrorKind::FileCopyFailure,
            BackupError::DestinationPrepare { .. } => ErrorKind::DestinationPrepareFailure,
            BackupError::Listing { .. } => ErrorKind::Listing,
            BackupError::DuplicateIdentifier(_)
            | BackupError::Http(_)
            | BackupError::Api { .. }
            | BackupError::Serialization(_) => ErrorKind::Catalog,
            BackupError::Config(_) => ErrorKind::Config,
            BackupError::Io(_) => ErrorKind::Io,
        }
    }

    /// Single-line form written to the run log: `<kind>: <message>`.
    pub fn log_line(&self) -> String {
        format!("{}: {}", self.kind(), self)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::SourceNotFound => "SourceNotFound",
            ErrorKind::FileCopyFailure => "FileCopyFailure",
            ErrorKind::DestinationPrepareFailure => "DestinationPrepareFailure",
            ErrorKind::Listing => "ListingFailure",
            ErrorKind::Catalog => "CatalogFailure",
            ErrorKind::Config => "ConfigFailure",
            ErrorKind::Io => "IoFailure",
        };
        f.write_str(name)
    }
}

pub type Result<T> = std::result::Result<T, BackupError>;
