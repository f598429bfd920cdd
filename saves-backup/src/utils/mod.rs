//! Utility modules for the save backup.

pub mod errors;
pub mod logger;

pub use errors::{BackupError, ErrorKind, Result};
