//! Implementation of `rigging clean`.

use std::path::PathBuf;

use anyhow::Result;

use crate::builder::LayoutPlanner;
use crate::core::recipe::Recipe;
use crate::util::fs::remove_dir_all_if_exists;

/// Remove build output for a recipe.
///
/// Without `all`, only the layout planned from the recipe's current settings
/// is removed. With `all`, the whole `build/` and `package/` trees go.
/// Returns the directories that existed and were removed.
pub fn clean(recipe: &Recipe, all: bool) -> Result<Vec<PathBuf>> {
    let targets = if all {
        vec![recipe.root().join("build"), recipe.root().join("package")]
    } else {
        // Multi-config layouts share one build dir across build types.
        let layout = LayoutPlanner::new(recipe.root()).plan(recipe.settings())?;
        vec![layout.build_dir, layout.package_dir]
    };

    let mut removed = Vec::new();
    for dir in targets {
        if remove_dir_all_if_exists(&dir)? {
            tracing::debug!("removed {}", dir.display());
            removed.push(dir);
        }
    }
    Ok(removed)
}
