use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::model::{DuplicateMode, FlattenOptions};

/// Folder flattening engine.
#[derive(Parser)]
#[command(name = "fflat", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print JSON Schema for the engine options.
    Schema,
    /// Move every file found in subdirectories directly into the root.
    Flatten(FlattenArgs),
    /// Undo a journaled flatten run.
    Undo(UndoArgs),
}

#[derive(Args)]
pub struct FlattenArgs {
    /// Root directory to flatten.
    pub root: PathBuf,

    /// How destination name collisions are resolved.
    #[arg(long, value_enum, default_value = "rename")]
    pub duplicate_mode: DuplicateMode,

    /// Leave directories that end up empty in place.
    #[arg(long)]
    pub keep_empty: bool,

    /// Include dotfiles when scanning.
    #[arg(long)]
    pub include_hidden: bool,

    /// Simulate execution without writing.
    #[arg(long)]
    pub dry_run: bool,

    /// Extract zip archives found in subdirectories into the root.
    #[arg(long)]
    pub extract_archives: bool,

    /// After extraction, move the original archives into the archive folder.
    #[arg(long, requires = "extract_archives")]
    pub archive_originals: bool,

    /// Destination for archived originals (default: <root>/_archives).
    #[arg(long, requires = "archive_originals")]
    pub archive_folder: Option<PathBuf>,

    /// Directory name to skip together with its subtree. Repeatable.
    #[arg(long = "exclude", value_name = "NAME")]
    pub exclude_dirs: Vec<String>,

    /// Record moves to this journal so the run can be undone.
    #[arg(long)]
    pub journal: Option<PathBuf>,

    /// Output structured JSON events to stdout.
    #[arg(long)]
    pub json: bool,
}

impl FlattenArgs {
    pub fn to_options(&self) -> FlattenOptions {
        FlattenOptions {
            root: self.root.clone(),
            duplicate_mode: self.duplicate_mode,
            remove_empty: !self.keep_empty,
            include_hidden: self.include_hidden,
            dry_run: self.dry_run,
            extract_archives: self.extract_archives,
            archive_originals: self.archive_originals,
            archive_folder: self.archive_folder.clone(),
            exclude_dirs: self.exclude_dirs.clone(),
            record_moves: self.journal.is_some(),
        }
    }
}

#[derive(Args)]
pub struct UndoArgs {
    /// Path to journal file.
    #[arg(long, required = true)]
    pub journal: PathBuf,

    /// Output structured JSON to stdout.
    #[arg(long)]
    pub json: bool,

    /// Simulate undo without writing.
    #[arg(long)]
    pub dry_run: bool,
}
