use anyhow::{Context, Result};
use bytesize::ByteSize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::cancel::CancelToken;
use crate::cli::{FlattenArgs, UndoArgs};
use crate::events::{MoveAction, ProgressEvent, ProgressSink};
use crate::exit_codes::exit;
use crate::extract;
use crate::fsops;
use crate::journal::{self, JournalEntry, JournalStatus, JournalWriter};
use crate::model::{
    FileCandidate, FlattenError, FlattenOptions, MoveCategory, MoveRecord, OperationStats,
};
use crate::policy;
use crate::reporter::Reporter;
use crate::resolve;
use crate::scan::{self, ScanFilter};

/// Run one flatten operation: validate, optionally extract archives, scan,
/// move, optionally reap empty directories, finalize. The call is linear and
/// synchronous; `cancel` is polled before each archive and before each file
/// move, never mid-copy, so every completed unit of work is whole.
pub fn flatten(
    opts: &FlattenOptions,
    sink: &mut dyn ProgressSink,
    cancel: &CancelToken,
) -> Result<OperationStats, FlattenError> {
    let started = Instant::now();
    let root = opts.validate()?;
    let filter = ScanFilter {
        include_hidden: opts.include_hidden,
        exclude_dirs: opts.exclude_dirs.clone(),
    };
    let mut stats = OperationStats::default();

    if opts.extract_archives {
        extract_phase(opts, &root, &filter, &mut stats, sink, cancel);
    }

    let mut files = scan::list_candidates(&root, &filter);
    if opts.extract_archives {
        // Archives were handled above; keep them out of the move pass.
        files.retain(|candidate| !scan::is_zip(&candidate.source));
    }
    stats.total_files = files.len();
    stats.total_bytes = files.iter().map(|candidate| candidate.size).sum();
    sink.emit(ProgressEvent::Scan {
        current: 0,
        total: stats.total_files,
        bytes_total: stats.total_bytes,
        message: format!(
            "found {} files ({})",
            stats.total_files,
            ByteSize::b(stats.total_bytes)
        ),
    });

    for (index, candidate) in files.iter().enumerate() {
        if cancel.is_cancelled() {
            stats.cancelled = true;
            break;
        }
        move_candidate(opts, &root, candidate, index + 1, &mut stats, sink);
    }

    if opts.remove_empty && !stats.cancelled && !opts.dry_run {
        stats.empty_dirs_removed = fsops::remove_empty_dirs(&root);
    }

    stats.undo_supported =
        !opts.dry_run && !opts.extract_archives && stats.overwrites == 0 && !stats.cancelled;

    let message = format!(
        "{} in {}",
        stats.summary(),
        humantime::format_duration(Duration::from_millis(started.elapsed().as_millis() as u64))
    );
    info!(%message, "flatten finished");
    sink.emit(ProgressEvent::Done {
        stats: stats.clone(),
        message,
    });
    Ok(stats)
}

fn extract_phase(
    opts: &FlattenOptions,
    root: &Path,
    filter: &ScanFilter,
    stats: &mut OperationStats,
    sink: &mut dyn ProgressSink,
    cancel: &CancelToken,
) {
    let archives = scan::find_archives(root, filter);
    stats.archives_found = archives.len();
    sink.emit(ProgressEvent::ExtractScan {
        total: stats.archives_found,
        message: format!("found {} zip archive(s) to extract", stats.archives_found),
    });

    let archive_dir = opts
        .archive_folder
        .clone()
        .unwrap_or_else(|| root.join("_archives"));
    let mut archive_originals = opts.archive_originals;
    if archive_originals && !opts.dry_run {
        if let Err(err) = fs::create_dir_all(&archive_dir) {
            error!(dir = %archive_dir.display(), %err, "cannot create archive folder; originals stay in place");
            archive_originals = false;
        }
    }

    for (index, zip_path) in archives.iter().enumerate() {
        if cancel.is_cancelled() {
            stats.cancelled = true;
            break;
        }
        let name = zip_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        sink.emit(ProgressEvent::Extract {
            archive: zip_path.clone(),
            index: index + 1,
            total: stats.archives_found,
            message: format!("extracting {name}"),
        });

        match extract::extract_archive(zip_path, root, opts.duplicate_mode, opts.dry_run, sink) {
            Ok(outcome) => {
                stats.archives_extracted += outcome.extracted;
                stats.archive_bytes_written += outcome.bytes_written;
                stats.overwrites += outcome.overwrites;
                if archive_originals {
                    move_archive_original(opts, zip_path, &archive_dir, stats, sink);
                }
            }
            Err(err) => {
                error!(archive = %zip_path.display(), err = %err, "bad zip archive");
                sink.emit(ProgressEvent::Error {
                    file: zip_path.display().to_string(),
                    error: err.to_string(),
                });
            }
        }
    }
}

/// Park the extracted archive under the archive directory, collision-free.
fn move_archive_original(
    opts: &FlattenOptions,
    zip_path: &Path,
    archive_dir: &Path,
    stats: &mut OperationStats,
    sink: &mut dyn ProgressSink,
) {
    let desired = archive_dir.join(zip_path.file_name().unwrap_or_default());
    let target = resolve::unique_destination(&desired);
    let result = if opts.dry_run {
        Ok(())
    } else {
        prepare_and_move(zip_path, &target)
    };
    match result {
        Ok(()) => {
            stats.archives_moved += 1;
            if opts.record_moves && !opts.dry_run {
                stats.moves.push(MoveRecord {
                    source: zip_path.to_path_buf(),
                    destination: target.clone(),
                    category: MoveCategory::Archive,
                });
            }
            sink.emit(ProgressEvent::ArchiveMove {
                source: zip_path.to_path_buf(),
                dest: target,
            });
        }
        Err(err) => {
            error!(archive = %zip_path.display(), err = %err, "error moving archive");
            sink.emit(ProgressEvent::Error {
                file: zip_path.display().to_string(),
                error: err.to_string(),
            });
        }
    }
}

/// Move one candidate into the root under the duplicate policy. Failures are
/// per-file: counted, logged, reported, and the batch carries on.
fn move_candidate(
    opts: &FlattenOptions,
    root: &Path,
    candidate: &FileCandidate,
    current: usize,
    stats: &mut OperationStats,
    sink: &mut dyn ProgressSink,
) {
    let source = &candidate.source;
    let desired = root.join(source.file_name().unwrap_or_default());
    let resolution = policy::resolve_duplicate(opts.duplicate_mode, &desired);
    if resolution.action == MoveAction::Overwrite {
        stats.overwrites += 1;
        if !opts.dry_run {
            // Best-effort; if the stale file survives, the move below fails
            // and is counted as the error.
            let _ = fs::remove_file(&resolution.dest);
        }
    }

    let result = if resolution.action == MoveAction::Skip || opts.dry_run {
        Ok(())
    } else {
        prepare_and_move(source, &resolution.dest)
    };

    match result {
        Ok(()) => {
            let reason = if resolution.action == MoveAction::Skip {
                stats.skipped += 1;
                Some("duplicate".to_string())
            } else {
                stats.moved += 1;
                stats.bytes_moved += candidate.size;
                if opts.record_moves && !opts.dry_run {
                    stats.moves.push(MoveRecord {
                        source: source.clone(),
                        destination: resolution.dest.clone(),
                        category: MoveCategory::File,
                    });
                }
                None
            };
            sink.emit(ProgressEvent::Move {
                current,
                total: stats.total_files,
                file: source.clone(),
                dest: resolution.dest,
                action: resolution.action,
                reason,
                moved: stats.moved,
                skipped: stats.skipped,
                errors: stats.errors,
                bytes_moved: stats.bytes_moved,
                bytes_total: stats.total_bytes,
            });
        }
        Err(err) => {
            stats.errors += 1;
            error!(file = %source.display(), err = %err, "error moving file");
            sink.emit(ProgressEvent::Error {
                file: source.display().to_string(),
                error: err.to_string(),
            });
        }
    }
}

fn prepare_and_move(source: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fsops::move_file(source, dest)
}

/// CLI entry: run a flatten, write the journal if requested, map the stats
/// to an exit code.
pub fn run(args: FlattenArgs) -> Result<i32> {
    let mut reporter = Reporter::new(args.json);
    let opts = args.to_options();
    let cancel = CancelToken::new();

    let stats = match flatten(&opts, &mut reporter, &cancel) {
        Ok(stats) => stats,
        Err(err) => {
            error!(err = %err, "pre-flight validation failed");
            eprintln!("error: {err}");
            return Ok(exit::POLICY_FAILURE);
        }
    };

    if let Some(journal_path) = &args.journal {
        if stats.undo_supported {
            let mut writer = JournalWriter::open(journal_path.clone())?;
            for record in &stats.moves {
                writer.write(&JournalEntry::recorded(record))?;
            }
        } else {
            warn!("run does not support undo; journal not written");
        }
    }

    if !args.json {
        println!("{}", stats.summary());
    }
    Ok(if stats.cancelled {
        exit::CANCELLED
    } else if stats.errors > 0 {
        exit::OPERATIONAL_FAILURE
    } else {
        exit::SUCCESS
    })
}

/// Undo a recorded flatten by replaying its journal in reverse: every
/// recorded destination is moved back to its source, recreating parent
/// directories the reaper removed. Each reversal is appended to the journal
/// as `undone`, so a second undo is a no-op.
pub fn undo(args: UndoArgs) -> Result<i32> {
    let entries = journal::read_journal(args.journal.clone())?;
    let already_undone: HashSet<uuid::Uuid> = entries
        .iter()
        .filter(|entry| entry.status == JournalStatus::Undone)
        .map(|entry| entry.id)
        .collect();
    let mut writer = JournalWriter::open(args.journal.clone())?;

    let mut restored = 0usize;
    for entry in entries.iter().rev() {
        if entry.status != JournalStatus::Recorded || already_undone.contains(&entry.id) {
            continue;
        }
        if !args.dry_run {
            if let Some(parent) = entry.source.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to recreate {}", parent.display()))?;
            }
            fsops::move_file(&entry.destination, &entry.source)?;
            writer.write(&entry.undone())?;
        }
        restored += 1;
    }

    info!(restored, dry_run = args.dry_run, "undo finished");
    if args.json {
        println!(
            "{}",
            serde_json::json!({ "restored": restored, "dry_run": args.dry_run })
        );
    } else {
        println!("restored {restored} file(s)");
    }
    Ok(exit::SUCCESS)
}
