//! Dated, append-only run log.
//!
//! Every outcome of a backup pass ends up here as one line:
//!
//! ```text
//! [10/16/2026 9:41:07 PM]: Backup Completed: Portal 2, Assassin's Creed 3
//! ```
//!
//! One file per calendar day, named `log <D>_<M>_<Y>.txt`, created on the
//! first write of that day. Writers on any thread serialize on a single
//! mutex, so lines never interleave.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Datelike, Local, NaiveDate};

/// Timestamp layout inside the brackets of each line.
const TIMESTAMP_FORMAT: &str = "%-m/%-d/%Y %-I:%M:%S %p";

/// File name of the log for `date`.
pub fn log_file_name(date: NaiveDate) -> String {
    format!("log {}_{}_{}.txt", date.day(), date.month(), date.year())
}

/// Render one log line, newline included.
pub fn format_line(at: DateTime<Local>, message: &str) -> String {
    format!("[{}]: {}\n", at.format(TIMESTAMP_FORMAT), message)
}

/// Shared writer for the dated log files in one directory.
///
/// Construct once at startup and hand out clones of an `Arc<RunLog>`.
#[derive(Debug)]
pub struct RunLog {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl RunLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the log file for `date`.
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(log_file_name(date))
    }

    /// Path of today's log file (which may not exist yet).
    pub fn current_path(&self) -> PathBuf {
        self.path_for(Local::now().date_naive())
    }

    /// Append one timestamped line to today's file.
    ///
    /// The lock is held from open through flush. A panic in another writer
    /// poisons nothing we care about, so a poisoned lock is taken over.
    pub fn append(&self, message: &str) -> std::io::Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let now = Local::now();
        let path = self.path_for(now.date_naive());
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

        // Single write per line so a short write can't split it
        file.write_all(format_line(now, message).as_bytes())?;
        file.flush()
    }

    /// Append, reporting a failure only to diagnostics.
    ///
    /// Log write failures are never written back into the log and never retried.
    pub fn record(&self, message: &str) {
        if let Err(e) = self.append(message) {
            tracing::warn!(
                dir = %self.dir.display(),
                error = %e,
                "Failed to write run log entry: {}",
                message
            );
        }
    }

    /// Ensure the log directory exists. Returns `true` if it had to be created.
    pub fn ensure_dir(&self) -> std::io::Result<bool> {
        if self.dir.is_dir() {
            return Ok(false);
        }
        fs::create_dir_all(&self.dir)?;
        Ok(true)
    }
}
