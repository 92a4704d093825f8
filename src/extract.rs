use anyhow::{Context, Result, bail};
use std::fs;
use std::io;
use std::path::Path;
use tracing::warn;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::events::{MoveAction, ProgressEvent, ProgressSink};
use crate::model::DuplicateMode;
use crate::policy;

/// Per-archive accounting, folded into the run statistics by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveOutcome {
    /// Entries processed: written, or skipped as duplicates.
    pub extracted: usize,
    pub bytes_written: u64,
    pub overwrites: u64,
}

/// Stream the non-directory, non-encrypted entries of `zip_path` into
/// `root`, discarding the archive's internal directory structure. Duplicate
/// handling is the same policy file moves use, operating on a byte copy
/// instead of a rename. An `Err` means the archive itself is unreadable;
/// the orchestrator treats that as a per-archive failure and moves on.
///
/// Encrypted entries are skipped with an `error` event in real and dry runs
/// alike, so dry-run extraction counts match what a real run would do.
pub fn extract_archive(
    zip_path: &Path,
    root: &Path,
    mode: DuplicateMode,
    dry_run: bool,
    sink: &mut dyn ProgressSink,
) -> Result<ArchiveOutcome> {
    let archive_name = zip_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file = fs::File::open(zip_path)
        .with_context(|| format!("failed to open {}", zip_path.display()))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("not a valid zip archive: {}", zip_path.display()))?;

    let mut outcome = ArchiveOutcome::default();
    for index in 0..archive.len() {
        let entry_name = archive
            .name_for_index(index)
            .map(str::to_owned)
            .unwrap_or_else(|| format!("entry #{index}"));
        let mut entry = match archive.by_index(index) {
            Ok(entry) => entry,
            Err(ZipError::UnsupportedArchive(detail)) if detail == ZipError::PASSWORD_REQUIRED => {
                warn!(archive = %zip_path.display(), entry = %entry_name, "encrypted entry skipped");
                sink.emit(ProgressEvent::Error {
                    file: format!("{archive_name}:{entry_name}"),
                    error: format!("encrypted entry skipped: {entry_name}"),
                });
                continue;
            }
            Err(err) => bail!("failed to read entry {entry_name}: {err}"),
        };
        if entry.is_dir() {
            continue;
        }
        // Only the basename survives: extraction is flattening.
        let Some(base_name) = Path::new(entry.name()).file_name().map(|n| n.to_os_string())
        else {
            continue;
        };

        let resolution = policy::resolve_duplicate(mode, &root.join(&base_name));
        if resolution.action == MoveAction::Overwrite {
            outcome.overwrites += 1;
            if !dry_run {
                // Best-effort: a failed delete still proceeds to overwrite
                // via the copy below.
                let _ = fs::remove_file(&resolution.dest);
            }
        }
        if resolution.action != MoveAction::Skip {
            if !dry_run {
                if let Some(parent) = resolution.dest.parent() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("failed to create {}", parent.display())
                    })?;
                }
                let mut out = fs::File::create(&resolution.dest).with_context(|| {
                    format!("failed to create {}", resolution.dest.display())
                })?;
                io::copy(&mut entry, &mut out)
                    .with_context(|| format!("failed to write {}", resolution.dest.display()))?;
            }
            outcome.bytes_written += entry.size();
        }
        outcome.extracted += 1;

        sink.emit(ProgressEvent::ExtractFile {
            archive: zip_path.to_path_buf(),
            file: base_name.to_string_lossy().into_owned(),
            dest: Some(resolution.dest),
            action: resolution.action,
        });
    }
    Ok(outcome)
}
