use std::path::{Path, PathBuf};

/// Produce a collision-free destination path. If `desired` is unused it is
/// returned unchanged; otherwise `_N` is appended before the extension with
/// N incrementing until an unused name is found. The check-and-pick is not
/// atomic: the root is exclusively owned for the duration of a run.
pub fn unique_destination(desired: &Path) -> PathBuf {
    if !desired.exists() {
        return desired.to_path_buf();
    }
    let parent = desired.parent().unwrap_or_else(|| Path::new(""));
    let stem = desired
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = desired.extension().map(|e| e.to_string_lossy().into_owned());

    let mut counter = 1u64;
    loop {
        let name = match &extension {
            Some(ext) => format!("{stem}_{counter}.{ext}"),
            None => format!("{stem}_{counter}"),
        };
        let candidate = parent.join(name);
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_unused_path_returned_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let desired = dir.path().join("a.txt");
        assert_eq!(unique_destination(&desired), desired);
    }

    #[test]
    fn test_suffix_goes_before_extension() {
        let dir = tempfile::tempdir().unwrap();
        let desired = dir.path().join("a.txt");
        fs::write(&desired, "x").unwrap();
        assert_eq!(unique_destination(&desired), dir.path().join("a_1.txt"));

        fs::write(dir.path().join("a_1.txt"), "x").unwrap();
        fs::write(dir.path().join("a_2.txt"), "x").unwrap();
        assert_eq!(unique_destination(&desired), dir.path().join("a_3.txt"));
    }

    #[test]
    fn test_no_extension() {
        let dir = tempfile::tempdir().unwrap();
        let desired = dir.path().join("README");
        fs::write(&desired, "x").unwrap();
        assert_eq!(unique_destination(&desired), dir.path().join("README_1"));
    }

    #[test]
    fn test_dotfile_keeps_leading_dot() {
        let dir = tempfile::tempdir().unwrap();
        let desired = dir.path().join(".env");
        fs::write(&desired, "x").unwrap();
        assert_eq!(unique_destination(&desired), dir.path().join(".env_1"));
    }
}
