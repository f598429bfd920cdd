//! Directory listing for the mirror and tree summaries for `list`.
//!
//! The mirror only ever looks one level deep at a time; [`list_directory`]
//! returns the immediate files and subdirectories of a source directory in
//! file-name order so two runs over the same tree behave identically.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// An entry discovered directly inside a listed directory
#[derive(Debug, Clone)]
pub struct EntryInfo {
    /// Full path to the entry
    pub path: PathBuf,

    /// File or directory name, used to build the destination path
    pub name: std::ffi::OsString,

    /// File size in bytes (0 for directories)
    pub size: u64,

    /// Is this a symlink?
    pub is_symlink: bool,
}

/// Immediate contents of one source directory
#[derive(Debug, Clone, Default)]
pub struct DirectoryListing {
    pub files: Vec<EntryInfo>,
    pub subdirs: Vec<EntryInfo>,
}

enum EntryClass {
    File(EntryInfo),
    Dir(EntryInfo),
    Skip,
}

/// Classify a DirEntry.
/// Symlinks to files count as files; symlinks to directories and broken
/// symlinks are skipped so recursion can never loop. A file that can't be
/// stat'd is still a file, with size 0; copying it reports the failure.
fn classify(entry: &DirEntry) -> EntryClass {
    let path = entry.path().to_path_buf();
    let name = entry.file_name().to_os_string();
    let file_type = entry.file_type();

    if file_type.is_symlink() {
        return match std::fs::metadata(&path) {
            Ok(resolved) if resolved.is_file() => EntryClass::File(EntryInfo {
                path,
                name,
                size: resolved.len(),
                is_symlink: true,
            }),
            Ok(_) => EntryClass::Skip,
            Err(_) => {
                tracing::debug!("Skipping broken symlink {}", path.display());
                EntryClass::Skip
            }
        };
    }

    if file_type.is_dir() {
        return EntryClass::Dir(EntryInfo {
            path,
            name,
            size: 0,
            is_symlink: false,
        });
    }

    if file_type.is_file() {
        let size = match entry.metadata() {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                tracing::debug!("Cannot stat {}: {}", path.display(), e);
                0
            }
        };
        return EntryClass::File(EntryInfo {
            path,
            name,
            size,
            is_symlink: false,
        });
    }

    // Sockets, fifos, devices
    EntryClass::Skip
}

/// List the immediate files and subdirectories of `dir`.
///
/// # Returns
/// * `Ok(DirectoryListing)` - Files and subdirectories, each sorted by name
/// * `Err(io::Error)` - If the directory cannot be read
pub fn list_directory(dir: &Path) -> std::io::Result<DirectoryListing> {
    let mut listing = DirectoryListing::default();

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry?;
        match classify(&entry) {
            EntryClass::File(info) => listing.files.push(info),
            EntryClass::Dir(info) => listing.subdirs.push(info),
            EntryClass::Skip => {}
        }
    }

    Ok(listing)
}

/// File count and byte total of a whole tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeSummary {
    pub files: usize,
    pub bytes: u64,
}

/// Walk a directory tree with a callback for each file
pub fn walk_files_with_callback<F>(root: &Path, mut callback: F) -> std::io::Result<()>
where
    F: FnMut(&EntryInfo),
{
    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry = entry?;
        if let EntryClass::File(info) = classify(&entry) {
            callback(&info);
        }
    }

    Ok(())
}

/// Count files and total bytes below `root`
pub fn summarize_tree(root: &Path) -> std::io::Result<TreeSummary> {
    let mut summary = TreeSummary::default();

    walk_files_with_callback(root, |file| {
        summary.files += 1;
        summary.bytes += file.size;
    })?;

    Ok(summary)
}
