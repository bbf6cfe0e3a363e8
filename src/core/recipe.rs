//! Rigging.toml recipe parsing.
//!
//! A recipe fixes a package's metadata, settings and dependency lists. Once
//! loaded, a [`Recipe`] is immutable; everything derived from it (version,
//! layout, generated artifacts) belongs to a single evaluation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::core::dependency::{Declaration, DependencyDeclarationError};
use crate::core::settings::{Settings, SettingsError};
use crate::core::version::{UnresolvedReason, VersionMarkers, VersionOutcome};

/// Recipe file name.
pub const RECIPE_FILE: &str = "Rigging.toml";

/// Error loading a recipe.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum RecipeError {
    #[error("could not find `Rigging.toml` in {} or any parent directory", .dir.display())]
    #[diagnostic(
        code(rigging::recipe::not_found),
        help("run from a directory containing a recipe, or pass `--recipe <path>`")
    )]
    NotFound { dir: PathBuf },

    #[error("failed to read recipe: {}", .path.display())]
    #[diagnostic(code(rigging::recipe::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse recipe: {}", .path.display())]
    #[diagnostic(code(rigging::recipe::parse))]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Dependencies(#[from] DependencyDeclarationError),

    #[error("invalid [version] section: {reason}")]
    #[diagnostic(
        code(rigging::recipe::version_source),
        help("set `prefix`, or all of `major`, `minor` and `patch`")
    )]
    VersionSource { reason: String },
}

/// Raw `Rigging.toml` schema.
#[derive(Debug, Deserialize)]
struct RecipeToml {
    package: PackageSection,

    #[serde(default)]
    settings: BTreeMap<String, String>,

    #[serde(default)]
    version: Option<VersionSection>,

    #[serde(default)]
    dependencies: DependenciesSection,
}

#[derive(Debug, Deserialize)]
struct PackageSection {
    name: String,

    #[serde(default)]
    license: String,

    #[serde(default)]
    author: String,
}

#[derive(Debug, Deserialize)]
struct VersionSection {
    file: PathBuf,

    #[serde(default)]
    prefix: Option<String>,

    #[serde(default)]
    major: Option<String>,

    #[serde(default)]
    minor: Option<String>,

    #[serde(default)]
    patch: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DependenciesSection {
    requires: Vec<String>,
    build_requires: Vec<String>,
}

impl VersionSection {
    fn into_source(self) -> Result<VersionSource, RecipeError> {
        let base = self.prefix.as_deref().map(VersionMarkers::with_prefix);
        let pick = |explicit: Option<String>, from_prefix: Option<&String>, part: &str| {
            explicit
                .or_else(|| from_prefix.cloned())
                .ok_or_else(|| RecipeError::VersionSource {
                    reason: format!("no marker for `{}`", part),
                })
        };

        let markers = VersionMarkers {
            major: pick(self.major, base.as_ref().map(|m| &m.major), "major")?,
            minor: pick(self.minor, base.as_ref().map(|m| &m.minor), "minor")?,
            patch: pick(self.patch, base.as_ref().map(|m| &m.patch), "patch")?,
        };

        Ok(VersionSource {
            file: self.file,
            markers,
        })
    }
}

/// Where a recipe's version comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSource {
    /// File path, relative to the recipe root unless absolute.
    pub file: PathBuf,
    pub markers: VersionMarkers,
}

/// A loaded recipe.
#[derive(Debug, Clone)]
pub struct Recipe {
    name: String,
    license: String,
    author: String,
    settings: Settings,
    declaration: Declaration,
    version_source: Option<VersionSource>,
    root: PathBuf,
}

impl Recipe {
    /// Create a recipe with no settings, dependencies or version source.
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Recipe {
            name: name.into(),
            license: String::new(),
            author: String::new(),
            settings: Settings::new(),
            declaration: Declaration::default(),
            version_source: None,
            root: root.into(),
        }
    }

    /// Load a recipe from a `Rigging.toml` path.
    pub fn load(path: &Path) -> Result<Self, RecipeError> {
        let contents = std::fs::read_to_string(path).map_err(|source| RecipeError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let root = path.parent().unwrap_or(Path::new(".")).to_path_buf();

        Self::parse(&contents, path, root)
    }

    /// Parse recipe contents. `path` is only used for error messages.
    pub fn parse(contents: &str, path: &Path, root: PathBuf) -> Result<Self, RecipeError> {
        let raw: RecipeToml = toml::from_str(contents).map_err(|source| RecipeError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let settings = Settings::from_pairs(raw.settings)?;
        let declaration =
            Declaration::parse(raw.dependencies.requires, raw.dependencies.build_requires)?;
        let version_source = raw.version.map(VersionSection::into_source).transpose()?;

        tracing::debug!(
            "loaded recipe `{}` ({} requires, {} build_requires)",
            raw.package.name,
            declaration.requires().len(),
            declaration.build_requires().len()
        );

        Ok(Recipe {
            name: raw.package.name,
            license: raw.package.license,
            author: raw.package.author,
            settings,
            declaration,
            version_source,
            root,
        })
    }

    /// Set the recipe settings.
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Overlay settings on top of the declared ones (overrides take precedence).
    pub fn with_setting_overrides(mut self, overrides: &Settings) -> Self {
        self.settings.merge(overrides);
        self
    }

    /// Fill in settings the recipe does not declare.
    pub fn with_setting_defaults(mut self, defaults: &Settings) -> Self {
        let mut merged = defaults.clone();
        merged.merge(&self.settings);
        self.settings = merged;
        self
    }

    /// Set the dependency declaration.
    pub fn with_declaration(mut self, declaration: Declaration) -> Self {
        self.declaration = declaration;
        self
    }

    /// Set where the version is read from.
    pub fn with_version_source(mut self, source: VersionSource) -> Self {
        self.version_source = Some(source);
        self
    }

    /// Set license and author metadata.
    pub fn with_metadata(mut self, license: impl Into<String>, author: impl Into<String>) -> Self {
        self.license = license.into();
        self.author = author.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn license(&self) -> &str {
        &self.license
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn declaration(&self) -> &Declaration {
        &self.declaration
    }

    pub fn version_source(&self) -> Option<&VersionSource> {
        self.version_source.as_ref()
    }

    /// Directory containing the recipe.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run version resolution against this recipe's version source.
    ///
    /// Callers are expected to cache the outcome; see
    /// [`RecipeEvaluation::resolve_version`](crate::ops::evaluate::RecipeEvaluation::resolve_version).
    pub fn read_version(&self) -> VersionOutcome {
        match &self.version_source {
            Some(source) => {
                let path = self.root.join(&source.file);
                crate::core::version::resolve(&path, &source.markers)
            }
            None => VersionOutcome::Unresolved(UnresolvedReason::NoVersionSource),
        }
    }
}
