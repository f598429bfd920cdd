//! Save Backup Library
//!
//! Mirrors game-save directories from Steam and the Ubisoft launcher into a
//! local backup tree, recording every outcome in a dated run log.

pub mod catalog;
pub mod config;
pub mod executor;
pub mod fs;
pub mod journal;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use executor::{BackupRunner, CopyJob, RunResult};
pub use journal::RunLog;
pub use utils::errors::BackupError;
pub type Result<T> = std::result::Result<T, BackupError>;
