//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Remove a directory and all its contents, if it exists.
///
/// Returns whether anything was removed.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_dir_all(path)
        .with_context(|| format!("failed to remove directory: {}", path.display()))?;
    Ok(true)
}

/// Get the relative path from `base` to `path`, or `path` itself if there is none.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_remove_dir_all_if_exists() {
        let tmp = TempDir::new().unwrap();
        let build = tmp.path().join("build/Release/generators");
        fs::create_dir_all(&build).unwrap();

        assert!(remove_dir_all_if_exists(&tmp.path().join("build")).unwrap());
        assert!(!tmp.path().join("build").exists());
        assert!(!remove_dir_all_if_exists(&tmp.path().join("build")).unwrap());
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            relative_path(Path::new("/work/app"), Path::new("/work/app/build/Release")),
            PathBuf::from("build/Release")
        );
        assert_eq!(
            relative_path(Path::new("/work/app"), Path::new("relative")),
            PathBuf::from("relative")
        );
    }
}
