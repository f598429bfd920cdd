//! Per-run error counters.

use std::ops::AddAssign;

/// Errors counted during one mirror call or one whole run.
///
/// A fresh tally is created for every call and merged into the caller's,
/// so nothing here is shared between runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorTally {
    /// Individual files that could not be copied
    pub file_errors: usize,

    /// Jobs or subtrees that were abandoned
    pub job_errors: usize,
}

impl ErrorTally {
    pub fn record_file_error(&mut self) {
        self.file_errors += 1;
    }

    pub fn record_job_error(&mut self) {
        self.job_errors += 1;
    }

    pub fn is_clean(&self) -> bool {
        self.file_errors == 0 && self.job_errors == 0
    }
}

impl AddAssign for ErrorTally {
    fn add_assign(&mut self, other: Self) {
        self.file_errors += other.file_errors;
        self.job_errors += other.job_errors;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge() {
        let mut run = ErrorTally::default();
        assert!(run.is_clean());

        let mut job = ErrorTally::default();
        job.record_file_error();
        job.record_file_error();
        job.record_job_error();

        run += job;
        run += job;
        assert_eq!(
            run,
            ErrorTally {
                file_errors: 4,
                job_errors: 2
            }
        );
        assert!(!run.is_clean());
    }
}
