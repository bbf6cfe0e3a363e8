//! Version discovery from a source artifact.
//!
//! A recipe's version is not written in the recipe itself. It is read from a
//! plain-text file in the source tree (typically a C header) that carries
//! three integer markers, for example:
//!
//! ```c
//! #define RENDERER_VERSION_MAJOR 2
//! #define RENDERER_VERSION_MINOR 0
//! #define RENDERER_VERSION_PATCH 1
//! ```
//!
//! Failing to find a version is not an error: the outcome is
//! [`VersionOutcome::Unresolved`] with the reason, and evaluation carries on
//! with an unknown version.

use std::fmt;
use std::path::{Path, PathBuf};

use regex::Regex;
use semver::Version;
use serde::{Deserialize, Serialize};

/// Names of the three version markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionMarkers {
    pub major: String,
    pub minor: String,
    pub patch: String,
}

impl VersionMarkers {
    /// Create markers from explicit names.
    pub fn new(
        major: impl Into<String>,
        minor: impl Into<String>,
        patch: impl Into<String>,
    ) -> Self {
        VersionMarkers {
            major: major.into(),
            minor: minor.into(),
            patch: patch.into(),
        }
    }

    /// Markers sharing a prefix: `<prefix>MAJOR`, `<prefix>MINOR`, `<prefix>PATCH`.
    pub fn with_prefix(prefix: &str) -> Self {
        VersionMarkers::new(
            format!("{prefix}MAJOR"),
            format!("{prefix}MINOR"),
            format!("{prefix}PATCH"),
        )
    }
}

/// Why a version could not be determined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// The recipe has no version source.
    NoVersionSource,
    /// The version file could not be read.
    Unreadable { path: PathBuf, cause: String },
    /// A marker does not appear in the file.
    MissingMarker { marker: String },
    /// A marker appears but is not followed by an integer.
    MalformedMarker { marker: String, line: String },
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedReason::NoVersionSource => write!(f, "no version source declared"),
            UnresolvedReason::Unreadable { path, cause } => {
                write!(f, "cannot read {}: {}", path.display(), cause)
            }
            UnresolvedReason::MissingMarker { marker } => {
                write!(f, "marker `{}` not found", marker)
            }
            UnresolvedReason::MalformedMarker { marker, line } => {
                write!(f, "marker `{}` has no integer value: `{}`", marker, line)
            }
        }
    }
}

/// Result of version resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionOutcome {
    Resolved(Version),
    Unresolved(UnresolvedReason),
}

impl VersionOutcome {
    /// Get the version, if resolved.
    pub fn version(&self) -> Option<&Version> {
        match self {
            VersionOutcome::Resolved(v) => Some(v),
            VersionOutcome::Unresolved(_) => None,
        }
    }

    /// Check if a version was found.
    pub fn is_resolved(&self) -> bool {
        matches!(self, VersionOutcome::Resolved(_))
    }
}

impl fmt::Display for VersionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionOutcome::Resolved(v) => write!(f, "{}", v),
            VersionOutcome::Unresolved(reason) => write!(f, "unknown ({})", reason),
        }
    }
}

/// Read the version markers from `path`.
pub fn resolve(path: &Path, markers: &VersionMarkers) -> VersionOutcome {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            return VersionOutcome::Unresolved(UnresolvedReason::Unreadable {
                path: path.to_path_buf(),
                cause: e.to_string(),
            })
        }
    };

    resolve_str(&text, markers)
}

/// Read the version markers from already loaded text.
pub fn resolve_str(text: &str, markers: &VersionMarkers) -> VersionOutcome {
    let mut parts = [0u64; 3];
    for (slot, marker) in parts
        .iter_mut()
        .zip([&markers.major, &markers.minor, &markers.patch])
    {
        match find_marker(text, marker) {
            Ok(value) => *slot = value,
            Err(reason) => return VersionOutcome::Unresolved(reason),
        }
    }

    let [major, minor, patch] = parts;
    VersionOutcome::Resolved(Version::new(major, minor, patch))
}

fn find_marker(text: &str, marker: &str) -> Result<u64, UnresolvedReason> {
    let escaped = regex::escape(marker);
    // Both patterns are built from an escaped literal and always compile.
    let assignment = Regex::new(&format!(r"(?m)(?:^|\b|\s){escaped}[ \t]+(\d+)\b"));
    let mention = Regex::new(&format!(r"(?m)^.*?(?:^|\b|\s){escaped}.*$"));
    let (Ok(assignment), Ok(mention)) = (assignment, mention) else {
        return Err(UnresolvedReason::MissingMarker {
            marker: marker.to_string(),
        });
    };

    if let Some(caps) = assignment.captures(text) {
        let digits = &caps[1];
        return digits
            .parse::<u64>()
            .map_err(|_| UnresolvedReason::MalformedMarker {
                marker: marker.to_string(),
                line: caps[0].trim().to_string(),
            });
    }

    match mention.find(text) {
        Some(line) => Err(UnresolvedReason::MalformedMarker {
            marker: marker.to_string(),
            line: line.as_str().trim().to_string(),
        }),
        None => Err(UnresolvedReason::MissingMarker {
            marker: marker.to_string(),
        }),
    }
}
