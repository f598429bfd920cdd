//! Backup run executor - Orchestrates one full backup pass.
//!
//! This module ties together:
//! - Source / destination guards
//! - The recursive mirror
//! - Per-run error tallies
//! - The dated run log

pub mod mirror;
pub mod tally;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::fs::guard::{prepare_destination, Prepared};
use crate::journal::RunLog;
use crate::utils::errors::Result;
use mirror::{FileCopier, Mirror, StdCopier};
pub use tally::ErrorTally;

/// One game's source-to-backup copy task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyJob {
    identifier: String,
    source_path: PathBuf,
    dest_path: PathBuf,
}

impl CopyJob {
    pub fn new(
        identifier: impl Into<String>,
        source_path: impl Into<PathBuf>,
        dest_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            source_path: source_path.into(),
            dest_path: dest_path.into(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn dest_path(&self) -> &Path {
        &self.dest_path
    }
}

/// Backup run result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    pub file_errors: usize,
    pub job_errors: usize,
    /// Identifiers of jobs whose copy ran to the end, in processed order
    pub completed: Vec<String>,
}

impl RunResult {
    pub fn is_clean(&self) -> bool {
        self.file_errors == 0 && self.job_errors == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    Running,
    Summarizing,
}

/// Runs backup passes over a list of jobs, one job at a time.
pub struct BackupRunner<C: FileCopier = StdCopier> {
    mirror: Mirror<C>,
    log: Arc<RunLog>,
    state: RunnerState,
}

impl BackupRunner<StdCopier> {
    pub fn new(log: Arc<RunLog>) -> Self {
        Self::with_mirror(Mirror::new(log.clone()), log)
    }
}

impl<C: FileCopier> BackupRunner<C> {
    pub fn with_mirror(mirror: Mirror<C>, log: Arc<RunLog>) -> Self {
        Self {
            mirror,
            log,
            state: RunnerState::Idle,
        }
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    fn transition(&mut self, next: RunnerState) {
        debug!("Runner state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Run every job in order.
    ///
    /// A failing job is logged and counted and never stops the jobs after it.
    pub fn run(&mut self, jobs: &[CopyJob]) -> RunResult {
        self.transition(RunnerState::Running);
        info!("Starting backup run ({} jobs)", jobs.len());

        let mut tally = ErrorTally::default();
        let mut completed = Vec::with_capacity(jobs.len());

        for job in jobs {
            match self.mirror.copy(job.source_path(), job.dest_path()) {
                Ok(job_tally) => {
                    info!(
                        job = job.identifier(),
                        file_errors = job_tally.file_errors,
                        job_errors = job_tally.job_errors,
                        "Backed up {}",
                        job.source_path().display()
                    );
                    tally += job_tally;
                    completed.push(job.identifier().to_string());
                }
                Err(e) => {
                    error!(job = job.identifier(), "Backup failed: {}", e);
                    tally.record_job_error();
                    self.log
                        .record(&format!("{}: {}", job.identifier(), e.log_line()));
                }
            }
        }

        self.transition(RunnerState::Summarizing);
        self.log
            .record(&format!("Backup Completed: {}", completed.join(", ")));

        let result = RunResult {
            file_errors: tally.file_errors,
            job_errors: tally.job_errors,
            completed,
        };

        info!(
            file_errors = result.file_errors,
            job_errors = result.job_errors,
            "Backup run finished"
        );
        self.log.record("Backup Process Finished.");
        self.transition(RunnerState::Idle);

        result
    }
}

/// Ensure a top-level directory (backup root, game directory) exists
/// without touching its contents.
pub fn ensure_root(path: &Path, log: &RunLog) -> Result<()> {
    if prepare_destination(path, false)? == Prepared::Created {
        log.record(&format!("Destination Directory created at {}", path.display()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_failed_job_does_not_block_others() {
        let temp_dir = TempDir::new().unwrap();
        let log = Arc::new(RunLog::new(temp_dir.path()));
        let game_dir = temp_dir.path().join("GameSaves");

        let valid = temp_dir.path().join("valid");
        fs::create_dir_all(&valid).unwrap();
        fs::write(valid.join("slot1.sav"), b"slot").unwrap();

        let jobs = vec![
            CopyJob::new("Missing", temp_dir.path().join("missing"), game_dir.join("Missing")),
            CopyJob::new("Valid", &valid, game_dir.join("Valid")),
        ];

        let mut runner = BackupRunner::new(log.clone());
        let result = runner.run(&jobs);

        assert_eq!(result.job_errors, 1);
        assert_eq!(result.file_errors, 0);
        assert_eq!(result.completed, vec!["Valid".to_string()]);
        assert!(!game_dir.join("Missing").exists());
        assert_eq!(fs::read(game_dir.join("Valid/slot1.sav")).unwrap(), b"slot");
        assert_eq!(runner.state(), RunnerState::Idle);

        let logged = fs::read_to_string(log.current_path()).unwrap();
        assert!(logged.contains("Missing: SourceNotFound: "));
        assert!(logged.contains("]: Backup Completed: Valid\n"));
        assert!(logged.trim_end().ends_with("]: Backup Process Finished."));
    }

    #[test]
    fn test_unpreparable_destination_fails_the_job() {
        let temp_dir = TempDir::new().unwrap();
        let log = Arc::new(RunLog::new(temp_dir.path()));

        let source = temp_dir.path().join("source");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("slot1.sav"), b"slot").unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, b"file").unwrap();

        let jobs = vec![CopyJob::new("Broken", &source, blocker.join("Broken"))];
        let result = BackupRunner::new(log.clone()).run(&jobs);

        assert_eq!(result.job_errors, 1);
        assert_eq!(result.file_errors, 0);
        assert!(result.completed.is_empty());

        let logged = fs::read_to_string(log.current_path()).unwrap();
        assert_eq!(logged.matches("DestinationPrepareFailure").count(), 1);
        assert!(logged.contains("]: Broken: DestinationPrepareFailure: "));
        assert!(logged.contains("]: Backup Completed: \n"));
    }

    #[test]
    fn test_empty_run() {
        let temp_dir = TempDir::new().unwrap();
        let log = Arc::new(RunLog::new(temp_dir.path()));

        let result = BackupRunner::new(log).run(&[]);
        assert!(result.is_clean());
        assert!(result.completed.is_empty());
    }

    #[test]
    fn test_ensure_root_keeps_contents() {
        let temp_dir = TempDir::new().unwrap();
        let log = RunLog::new(temp_dir.path());
        let root = temp_dir.path().join("SavesBackup");

        ensure_root(&root, &log).unwrap();
        fs::write(root.join("marker"), b"m").unwrap();
        ensure_root(&root, &log).unwrap();

        assert!(root.join("marker").exists());
        let logged = fs::read_to_string(log.current_path()).unwrap();
        assert_eq!(logged.matches("Destination Directory created at").count(), 1);
    }
}
