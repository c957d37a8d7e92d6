//! Candidate discovery under the asset root

use std::path::{Path, PathBuf};

use alae_formats::SourceKind;
use tracing::warn;
use walkdir::WalkDir;

/// Regular files with an accepted extension, in a stable order
///
/// Entries are visited sorted by file name so that repeated runs over an
/// unchanged tree produce the same store order. Unreadable entries are
/// logged and skipped.
pub fn candidate_files(root: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| SourceKind::from_path(entry.path()).is_some())
        .map(walkdir::DirEntry::into_path)
}

/// Number of candidate files; advisory only
pub fn count_candidates(root: &Path) -> usize {
    candidate_files(root).count()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_candidates() {
        let dir = TempDir::new().expect("Operation should succeed");
        let root = dir.path();
        fs::create_dir(root.join("sub")).expect("Operation should succeed");
        for name in ["b.w3d", "a.TGA", "notes.txt", "asset.dat", "sub/c.dds", "noext"] {
            fs::write(root.join(name), b"x").expect("Operation should succeed");
        }
        fs::create_dir(root.join("dir.w3d")).expect("Operation should succeed");

        let found: Vec<PathBuf> = candidate_files(root)
            .map(|path| path.strip_prefix(root).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            found,
            [
                PathBuf::from("a.TGA"),
                PathBuf::from("b.w3d"),
                PathBuf::from("sub").join("c.dds"),
            ]
        );
        assert_eq!(count_candidates(root), 3);
    }

    #[test]
    fn test_missing_root_has_no_candidates() {
        assert_eq!(count_candidates(Path::new("/nonexistent/alae/root")), 0);
    }
}
