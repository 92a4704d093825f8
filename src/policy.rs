use std::path::{Path, PathBuf};

use crate::events::MoveAction;
use crate::model::DuplicateMode;
use crate::resolve;

/// Outcome of duplicate resolution: what to do and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub action: MoveAction,
    pub dest: PathBuf,
}

/// Decide how a name collision at `dest` is handled. Consults the real
/// filesystem for existence even in dry runs; the caller is responsible for
/// not mutating anything when simulating. File moves and archive extraction
/// share this single implementation.
pub fn resolve_duplicate(mode: DuplicateMode, dest: &Path) -> Resolution {
    if !dest.exists() {
        return Resolution {
            action: MoveAction::Move,
            dest: dest.to_path_buf(),
        };
    }
    match mode {
        DuplicateMode::Skip => Resolution {
            action: MoveAction::Skip,
            dest: dest.to_path_buf(),
        },
        DuplicateMode::Overwrite => Resolution {
            action: MoveAction::Overwrite,
            dest: dest.to_path_buf(),
        },
        DuplicateMode::Rename => Resolution {
            action: MoveAction::Move,
            dest: resolve::unique_destination(dest),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_vacant_destination_is_plain_move_for_every_mode() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a.txt");
        for mode in [
            DuplicateMode::Rename,
            DuplicateMode::Overwrite,
            DuplicateMode::Skip,
        ] {
            let resolution = resolve_duplicate(mode, &dest);
            assert_eq!(resolution.action, MoveAction::Move);
            assert_eq!(resolution.dest, dest);
        }
    }

    #[test]
    fn test_occupied_destination_follows_mode() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a.txt");
        fs::write(&dest, "x").unwrap();

        let skip = resolve_duplicate(DuplicateMode::Skip, &dest);
        assert_eq!(skip.action, MoveAction::Skip);
        assert_eq!(skip.dest, dest);

        let overwrite = resolve_duplicate(DuplicateMode::Overwrite, &dest);
        assert_eq!(overwrite.action, MoveAction::Overwrite);
        assert_eq!(overwrite.dest, dest);

        let rename = resolve_duplicate(DuplicateMode::Rename, &dest);
        assert_eq!(rename.action, MoveAction::Move);
        assert_eq!(rename.dest, dir.path().join("a_1.txt"));
    }
}
