//! File system helpers: source/destination checks and directory listing.

pub mod guard;
pub mod walker;

pub use guard::{prepare_destination, source_exists, Prepared};
pub use walker::{list_directory, summarize_tree, DirectoryListing, EntryInfo, TreeSummary};
