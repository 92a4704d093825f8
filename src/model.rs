use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Full configuration of one flatten run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FlattenOptions {
    /// Root directory; files in its subdirectories are moved directly into it.
    pub root: PathBuf,
    /// Policy applied when the destination name already exists.
    #[serde(default = "default_duplicate_mode")]
    pub duplicate_mode: DuplicateMode,
    /// Remove directories left empty after the move pass.
    #[serde(default = "default_remove_empty")]
    pub remove_empty: bool,
    /// Include dotfiles when scanning.
    #[serde(default)]
    pub include_hidden: bool,
    /// Simulate only; no filesystem mutation.
    #[serde(default)]
    pub dry_run: bool,
    /// Extract zip archives found in subdirectories into the root.
    #[serde(default)]
    pub extract_archives: bool,
    /// After extraction, move the original archive into `archive_folder`.
    #[serde(default)]
    pub archive_originals: bool,
    /// Destination for archived originals; defaults to `root/_archives`.
    #[serde(default)]
    pub archive_folder: Option<PathBuf>,
    /// Directory names pruned from the scan together with their subtrees.
    #[serde(default)]
    pub exclude_dirs: Vec<String>,
    /// Record every real move so the run can be undone.
    #[serde(default)]
    pub record_moves: bool,
}

fn default_duplicate_mode() -> DuplicateMode {
    DuplicateMode::Rename
}

fn default_remove_empty() -> bool {
    true
}

impl FlattenOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            duplicate_mode: default_duplicate_mode(),
            remove_empty: default_remove_empty(),
            include_hidden: false,
            dry_run: false,
            extract_archives: false,
            archive_originals: false,
            archive_folder: None,
            exclude_dirs: Vec::new(),
            record_moves: false,
        }
    }

    /// Pre-flight validation. Returns the canonicalized root so every later
    /// phase works on one stable path.
    pub fn validate(&self) -> Result<PathBuf, FlattenError> {
        let root = self
            .root
            .canonicalize()
            .map_err(|source| FlattenError::RootResolve {
                path: self.root.clone(),
                source,
            })?;
        if !root.is_dir() {
            return Err(FlattenError::InvalidRoot { path: root });
        }
        Ok(root)
    }
}

/// Fatal pre-flight failures. Everything past validation is per-item and
/// recorded in [`OperationStats`] instead of aborting the run.
#[derive(Debug, thiserror::Error)]
pub enum FlattenError {
    #[error("not a directory: {path}")]
    InvalidRoot { path: PathBuf },
    #[error("cannot resolve root {path}: {source}")]
    RootResolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Duplicate-name resolution policy.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateMode {
    /// Append numeric suffix (_1, _2, …) before the extension.
    Rename,
    /// Remove the existing destination, then move into its place.
    Overwrite,
    /// Leave the source where it is.
    Skip,
}

/// A file slated for moving. Built once per scan, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub source: PathBuf,
    pub size: u64,
}

/// What a completed move was.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MoveCategory {
    File,
    Archive,
}

/// Record of one real move, kept so the run can be reversed.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct MoveRecord {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub category: MoveCategory,
}

/// Outcome of one flatten run. Counters accumulate while the orchestrator
/// runs; the struct is returned by value and never touched again.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationStats {
    pub total_files: usize,
    pub total_bytes: u64,
    pub moved: usize,
    pub skipped: usize,
    pub errors: usize,
    pub bytes_moved: u64,
    pub empty_dirs_removed: usize,
    pub cancelled: bool,
    pub archives_found: usize,
    /// Archive entries processed (written or skipped as duplicates).
    pub archives_extracted: usize,
    pub archive_bytes_written: u64,
    pub archives_moved: usize,
    pub overwrites: u64,
    pub undo_supported: bool,
    pub moves: Vec<MoveRecord>,
}

impl OperationStats {
    /// One-line human summary, mirrored into the terminal `done` event.
    pub fn summary(&self) -> String {
        format!(
            "completed: moved={}, skipped={}, errors={}, removed_empty={}{}",
            self.moved,
            self.skipped,
            self.errors,
            self.empty_dirs_removed,
            if self.cancelled { ", cancelled" } else { "" },
        )
    }
}

/// Generate JSON Schema for the options type.
pub fn generate_schema() -> String {
    let schema = schemars::schema_for!(FlattenOptions);
    serde_json::to_string_pretty(&schema).expect("failed to serialize schema")
}
