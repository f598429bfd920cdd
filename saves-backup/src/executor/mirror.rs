//! Recursive directory mirror.
//!
//! Depth-first and pre-order: at every level the files are copied before
//! any subdirectory is entered. Failures are contained as close to where
//! they happen as possible:
//!
//! | Failure                                | Counted as    | Stops             |
//! |----------------------------------------|---------------|-------------------|
//! | top level: missing, unlisted, prepare  | returned      | the whole call    |
//! | single file copy                       | `file_errors` | nothing           |
//! | subdirectory: listing, prepare, vanish | `job_errors`  | that subtree only |

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use super::tally::ErrorTally;
use crate::fs::guard::{prepare_destination, source_exists, Prepared};
use crate::fs::walker::list_directory;
use crate::journal::RunLog;
use crate::utils::errors::{BackupError, Result};

/// Copies one file. Implementations must refuse to overwrite `to`.
pub trait FileCopier {
    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<u64>;
}

/// Byte-for-byte copy through `std::fs`, failing if the target exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdCopier;

impl FileCopier for StdCopier {
    fn copy_file(&self, from: &Path, to: &Path) -> io::Result<u64> {
        let mut reader = File::open(from)?;
        let mut writer = OpenOptions::new().write(true).create_new(true).open(to)?;

        match io::copy(&mut reader, &mut writer) {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                // We created it, so a partial file is ours to remove
                drop(writer);
                let _ = std::fs::remove_file(to);
                Err(e)
            }
        }
    }
}

/// Options for a mirror call
#[derive(Debug, Clone, Copy)]
pub struct MirrorOptions {
    /// Recurse into subdirectories
    pub copy_subdirs: bool,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        Self { copy_subdirs: true }
    }
}

/// Recursive copier. Holds no state between calls.
pub struct Mirror<C: FileCopier = StdCopier> {
    copier: C,
    options: MirrorOptions,
    log: Arc<RunLog>,
}

impl Mirror<StdCopier> {
    pub fn new(log: Arc<RunLog>) -> Self {
        Self::with_copier(StdCopier, log)
    }
}

impl<C: FileCopier> Mirror<C> {
    pub fn with_copier(copier: C, log: Arc<RunLog>) -> Self {
        Self {
            copier,
            options: MirrorOptions::default(),
            log,
        }
    }

    pub fn options(mut self, options: MirrorOptions) -> Self {
        self.options = options;
        self
    }

    /// Mirror `source` into `dest`, wiping `dest` first if it exists.
    ///
    /// A failure at the top level (missing or unreadable `source`, `dest`
    /// that cannot be prepared) is returned and nothing below it is
    /// attempted. Failures further down are logged, counted in the returned
    /// tally, and skipped.
    pub fn copy(&self, source: &Path, dest: &Path) -> Result<ErrorTally> {
        let mut tally = ErrorTally::default();
        self.copy_level(source, dest, 0, &mut tally)?;
        Ok(tally)
    }

    /// Subdirectory boundary: nothing escapes past here.
    fn copy_subtree(&self, source: &Path, dest: &Path, depth: usize, tally: &mut ErrorTally) {
        if let Err(e) = self.copy_level(source, dest, depth, tally) {
            warn!(
                source = %source.display(),
                dest = %dest.display(),
                depth,
                "Abandoning subtree: {}",
                e
            );
            tally.record_job_error();
            self.log.record(&e.log_line());
        }
    }

    fn copy_level(
        &self,
        source: &Path,
        dest: &Path,
        depth: usize,
        tally: &mut ErrorTally,
    ) -> Result<()> {
        source_exists(source)?;

        let listing = list_directory(source).map_err(|e| BackupError::Listing {
            path: source.to_path_buf(),
            source: e,
        })?;

        // Only the job's own top-level directory may be wiped; anything
        // deeper may already hold files copied earlier in this call.
        match prepare_destination(dest, depth == 0)? {
            Prepared::Created => self
                .log
                .record(&format!("Destination Directory created at {}", dest.display())),
            Prepared::Recreated => self
                .log
                .record(&format!("Directory recreated at {}", dest.display())),
            Prepared::Existing => {}
        }

        for file in &listing.files {
            let target = dest.join(&file.name);
            match self.copier.copy_file(&file.path, &target) {
                Ok(bytes) => debug!("Copied {} ({} bytes)", file.path.display(), bytes),
                Err(e) => {
                    let err = BackupError::FileCopy {
                        from: file.path.clone(),
                        to: target,
                        source: e,
                    };
                    warn!("{}", err);
                    tally.record_file_error();
                    self.log.record(&err.log_line());
                }
            }
        }

        if self.options.copy_subdirs {
            for subdir in &listing.subdirs {
                self.copy_subtree(&subdir.path, &dest.join(&subdir.name), depth + 1, tally);
            }
        }

        Ok(())
    }
}
