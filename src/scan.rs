use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::model::FileCandidate;

/// Dotfile check. Applies to the entry's own name only; files inside hidden
/// directories are still eligible.
pub fn is_hidden(name: &OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// Case-insensitive zip detection, so FILE.ZIP and File.Zip are caught on
/// every platform.
pub fn is_zip(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
}

/// Eligibility rules shared by the file scan and the archive scan.
#[derive(Debug, Clone, Default)]
pub struct ScanFilter {
    pub include_hidden: bool,
    /// Directory names whose subtrees are skipped entirely (exact component
    /// match, case-sensitive).
    pub exclude_dirs: Vec<String>,
}

impl ScanFilter {
    fn prunes(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && self
                .exclude_dirs
                .iter()
                .any(|name| entry.file_name() == OsStr::new(name))
    }

    fn admits(&self, entry: &DirEntry) -> bool {
        // depth >= 2 keeps root-level files out: only files whose parent is a
        // subdirectory of the root are candidates.
        entry.depth() >= 2
            && entry.file_type().is_file()
            && (self.include_hidden || !is_hidden(entry.file_name()))
    }
}

/// List all files under root's subdirectories (never files already in root).
/// Unreadable entries are skipped and an unreadable size is treated as zero;
/// a single bad entry never aborts the scan.
pub fn list_candidates(root: &Path, filter: &ScanFilter) -> Vec<FileCandidate> {
    walk(root, filter)
        .map(|entry| {
            let size = entry.metadata().map(|meta| meta.len()).unwrap_or(0);
            FileCandidate {
                source: entry.into_path(),
                size,
            }
        })
        .collect()
}

/// Zip archives located in subdirectories under root.
pub fn find_archives(root: &Path, filter: &ScanFilter) -> Vec<PathBuf> {
    walk(root, filter)
        .map(DirEntry::into_path)
        .filter(|path| is_zip(path))
        .collect()
}

fn walk<'a>(root: &Path, filter: &'a ScanFilter) -> impl Iterator<Item = DirEntry> + 'a {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(move |entry| !filter.prunes(entry))
        .filter_map(Result::ok)
        .filter(move |entry| filter.admits(entry))
}
