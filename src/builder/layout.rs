//! Build layout planning.
//!
//! The layout is the set of directories a recipe evaluation works in. It is
//! computed from the recipe root and settings alone, so two evaluations with
//! the same settings always agree on paths. Planning never touches the
//! filesystem; [`Layout::create_dirs`] is a separate step.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::core::settings::{EffectiveSettings, SettingKey, SettingValueError, Settings};

/// Error planning or materializing a layout.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum LayoutError {
    #[error("unsupported value `{value}` for setting `{key}` (settings: {settings})")]
    #[diagnostic(
        code(rigging::layout::unsupported_value),
        help("change the value in the recipe [settings], the config file or with `-s key=value`")
    )]
    UnsupportedValue {
        key: SettingKey,
        value: String,
        expected: String,
        settings: String,
    },

    #[error("compiler `{compiler}` cannot target os `{os}` (settings: {settings})")]
    #[diagnostic(
        code(rigging::layout::unsupported_combination),
        help("msvc only targets Windows and apple-clang only targets Macos or iOS")
    )]
    UnsupportedCombination {
        compiler: String,
        os: String,
        settings: String,
    },

    #[error("failed to create directory: {}", .path.display())]
    #[diagnostic(code(rigging::layout::create_dir))]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Directories used by one recipe evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layout {
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub generators_dir: PathBuf,
    pub package_dir: PathBuf,
    /// The settings this layout was planned from, with defaults applied.
    pub settings: EffectiveSettings,
}

impl Layout {
    /// Create the build, generators and package directories.
    pub fn create_dirs(&self) -> Result<(), LayoutError> {
        for dir in [&self.build_dir, &self.generators_dir, &self.package_dir] {
            std::fs::create_dir_all(dir).map_err(|source| LayoutError::CreateDir {
                path: dir.clone(),
                source,
            })?;
        }
        tracing::debug!("created layout directories under {}", self.build_dir.display());
        Ok(())
    }

    /// The path of a generated file inside the generators directory.
    pub fn generator_path(&self, file_name: &str) -> PathBuf {
        self.generators_dir.join(file_name)
    }

    /// Whether the backend shares one build directory across build types.
    pub fn is_multi_config(&self) -> bool {
        self.settings.compiler.is_multi_config()
    }
}

/// Computes layouts for recipes rooted at a directory.
#[derive(Debug, Clone)]
pub struct LayoutPlanner {
    root: PathBuf,
}

impl LayoutPlanner {
    /// Create a planner for a recipe root.
    pub fn new(root: impl AsRef<Path>) -> Self {
        LayoutPlanner {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Plan the layout for `settings`.
    ///
    /// Absent settings get backend defaults. Unknown values and compiler/os
    /// pairs the backend cannot handle are rejected.
    pub fn plan(&self, settings: &Settings) -> Result<Layout, LayoutError> {
        let effective = EffectiveSettings::resolve(settings).map_err(
            |SettingValueError {
                 key,
                 value,
                 expected,
             }| LayoutError::UnsupportedValue {
                key,
                value,
                expected,
                settings: settings.to_string(),
            },
        )?;

        if !effective.compiler.supports(effective.os) {
            return Err(LayoutError::UnsupportedCombination {
                compiler: effective.compiler.to_string(),
                os: effective.os.to_string(),
                settings: settings.to_string(),
            });
        }

        let source_dir = self.root.clone();
        let build_dir = if effective.compiler.is_multi_config() {
            self.root.join("build")
        } else {
            self.root.join("build").join(effective.build_type.as_str())
        };
        let generators_dir = build_dir.join("generators");
        let package_dir = self.root.join("package").join(package_id(&effective));

        Ok(Layout {
            source_dir,
            build_dir,
            generators_dir,
            package_dir,
            settings: effective,
        })
    }
}

fn package_id(settings: &EffectiveSettings) -> String {
    format!(
        "{}-{}-{}-{}",
        settings.os, settings.arch, settings.compiler, settings.build_type
    )
    .to_lowercase()
}
