//! Generated build artifacts.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::util::hash::{sha256_bytes, sha256_file};

/// The kind of a generated artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// CMake toolchain file encoding the settings.
    Toolchain,
    /// CMake file describing the runtime dependencies.
    DependencyMetadata,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Toolchain => write!(f, "toolchain"),
            ArtifactKind::DependencyMetadata => write!(f, "dependency metadata"),
        }
    }
}

/// Error writing generated artifacts.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum GenerationError {
    #[error("failed to write {kind} artifact: {}", .path.display())]
    #[diagnostic(
        code(rigging::generate::write),
        help("the generators directory must exist and be writable; it is created by the layout step")
    )]
    Write {
        kind: ArtifactKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A generated file: where it goes and what it contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArtifact {
    kind: ArtifactKind,
    path: PathBuf,
    contents: String,
}

impl BuildArtifact {
    pub fn new(kind: ArtifactKind, path: PathBuf, contents: String) -> Self {
        BuildArtifact {
            kind,
            path,
            contents,
        }
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// SHA-256 of the contents.
    pub fn digest(&self) -> String {
        sha256_bytes(self.contents.as_bytes())
    }

    /// Write the artifact to its path.
    ///
    /// The parent directory must already exist. A file that already holds
    /// identical content is left untouched.
    pub fn write(&self) -> Result<WriteStatus, GenerationError> {
        if self.path.is_file() {
            if let Ok(existing) = sha256_file(&self.path) {
                if existing == self.digest() {
                    tracing::debug!("{} unchanged: {}", self.kind, self.path.display());
                    return Ok(WriteStatus::Unchanged);
                }
            }
        }

        std::fs::write(&self.path, self.contents.as_bytes()).map_err(|source| {
            GenerationError::Write {
                kind: self.kind,
                path: self.path.clone(),
                source,
            }
        })?;
        tracing::debug!("wrote {}: {}", self.kind, self.path.display());
        Ok(WriteStatus::Written)
    }
}

/// Outcome of writing one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Written,
    Unchanged,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_and_skip_unchanged() {
        let tmp = TempDir::new().unwrap();
        let artifact = BuildArtifact::new(
            ArtifactKind::Toolchain,
            tmp.path().join("toolchain.cmake"),
            "set(X 1)\n".to_string(),
        );

        assert_eq!(artifact.write().unwrap(), WriteStatus::Written);
        assert_eq!(artifact.write().unwrap(), WriteStatus::Unchanged);
        assert_eq!(
            std::fs::read_to_string(artifact.path()).unwrap(),
            "set(X 1)\n"
        );
    }

    #[test]
    fn test_rewrites_changed_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("deps.cmake");
        std::fs::write(&path, "stale").unwrap();

        let artifact = BuildArtifact::new(ArtifactKind::DependencyMetadata, path, "fresh".into());
        assert_eq!(artifact.write().unwrap(), WriteStatus::Written);
        assert_eq!(std::fs::read_to_string(artifact.path()).unwrap(), "fresh");
    }

    #[test]
    fn test_missing_parent_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing").join("toolchain.cmake");
        let artifact = BuildArtifact::new(ArtifactKind::Toolchain, path.clone(), String::new());

        match artifact.write().unwrap_err() {
            GenerationError::Write { kind, path: p, .. } => {
                assert_eq!(kind, ArtifactKind::Toolchain);
                assert_eq!(p, path);
            }
        }
        assert!(!tmp.path().join("missing").exists());
    }
}
