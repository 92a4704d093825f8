use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Check if two paths are on the same filesystem.
#[cfg(unix)]
fn same_filesystem(src: &Path, dst: &Path) -> Result<bool> {
    use std::os::unix::fs::MetadataExt;
    let src_meta = fs::metadata(src).context("failed to stat source")?;
    let dst_parent = dst.parent().unwrap_or_else(|| Path::new("."));
    let dst_parent_meta =
        fs::metadata(dst_parent).context("failed to stat destination parent")?;
    Ok(src_meta.dev() == dst_parent_meta.dev())
}

#[cfg(windows)]
fn same_filesystem(_src: &Path, _dst: &Path) -> Result<bool> {
    // volume_serial_number is unstable (feature `windows_by_handle`).
    // Fallback to copy+delete which is safe but slower.
    Ok(false)
}

#[cfg(not(any(unix, windows)))]
fn same_filesystem(_src: &Path, _dst: &Path) -> Result<bool> {
    Ok(false)
}

/// Move a file. Same-filesystem moves use an atomic rename; cross-device
/// moves fall back to copy+delete, so a failure can leave the copy behind
/// with the source intact (the source is only removed after a full copy).
pub fn move_file(src: &Path, dst: &Path) -> Result<()> {
    if same_filesystem(src, dst)? {
        fs::rename(src, dst)
            .with_context(|| format!("failed to move {} -> {}", src.display(), dst.display()))?;
    } else {
        fs::copy(src, dst)
            .with_context(|| format!("failed to copy {} -> {}", src.display(), dst.display()))?;
        fs::remove_file(src)
            .with_context(|| format!("failed to remove {}", src.display()))?;
    }
    Ok(())
}

/// Remove directories under `root` that are empty, deepest first, so a
/// drained child can make its parent removable in the same pass. The root
/// itself is never removed. Per-directory failures (permission, raced
/// content) leave that directory in place without aborting the sweep.
pub fn remove_empty_dirs(root: &Path) -> usize {
    let mut removed = 0;
    for entry in WalkDir::new(root)
        .min_depth(1)
        .contents_first(true)
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_dir() {
            continue;
        }
        let is_empty = fs::read_dir(entry.path())
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false);
        if is_empty && fs::remove_dir(entry.path()).is_ok() {
            removed += 1;
        }
    }
    removed
}
