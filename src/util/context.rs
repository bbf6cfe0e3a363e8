//! Global context for Rigging operations.
//!
//! Provides centralized access to the working directory, the Rigging home
//! directory and configuration paths.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::recipe::{RecipeError, RECIPE_FILE};
use crate::util::config::{global_config_dir, project_config_path};

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global Rigging data (~/.rigging/)
    home: Option<PathBuf>,
}

impl GlobalContext {
    /// Create a new GlobalContext for the process working directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        GlobalContext {
            cwd,
            home: global_config_dir(),
        }
    }

    /// Override the Rigging home directory. `None` disables the global config.
    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the Rigging home directory, if there is one.
    pub fn home(&self) -> Option<&Path> {
        self.home.as_deref()
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> Option<PathBuf> {
        self.home.as_ref().map(|home| home.join("config.toml"))
    }

    /// Get the project configuration file path for a recipe root.
    pub fn project_config_path(&self, root: &Path) -> PathBuf {
        project_config_path(root)
    }

    /// Find `Rigging.toml` starting from cwd and searching upward.
    pub fn find_recipe(&self) -> Result<PathBuf, RecipeError> {
        let mut current = self.cwd.clone();
        loop {
            let candidate = current.join(RECIPE_FILE);
            if candidate.is_file() {
                return Ok(candidate);
            }
            if !current.pop() {
                return Err(RecipeError::NotFound {
                    dir: self.cwd.clone(),
                });
            }
        }
    }
}
