//! Recipe fixtures written to scratch directories.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::recipe::{Recipe, RecipeError, RECIPE_FILE};

/// Builder for a recipe directory: `Rigging.toml` plus an optional version header.
#[derive(Debug, Clone)]
pub struct RecipeFixture {
    pub name: String,
    pub settings: Vec<(String, String)>,
    pub requires: Vec<String>,
    pub build_requires: Vec<String>,
    /// (path, marker prefix, version)
    pub version_file: Option<(PathBuf, String, (u64, u64, u64))>,
}

impl RecipeFixture {
    pub fn new(name: impl Into<String>) -> Self {
        RecipeFixture {
            name: name.into(),
            settings: Vec::new(),
            requires: Vec::new(),
            build_requires: Vec::new(),
            version_file: None,
        }
    }

    pub fn setting(mut self, key: &str, value: &str) -> Self {
        self.settings.push((key.to_string(), value.to_string()));
        self
    }

    pub fn requires<'a>(mut self, refs: impl IntoIterator<Item = &'a str>) -> Self {
        self.requires.extend(refs.into_iter().map(String::from));
        self
    }

    pub fn build_requires<'a>(mut self, refs: impl IntoIterator<Item = &'a str>) -> Self {
        self.build_requires.extend(refs.into_iter().map(String::from));
        self
    }

    /// Write a header defining `<prefix>MAJOR`, `<prefix>MINOR` and
    /// `<prefix>PATCH`, and point the recipe at it.
    pub fn version_file(
        mut self,
        path: impl Into<PathBuf>,
        prefix: &str,
        version: (u64, u64, u64),
    ) -> Self {
        self.version_file = Some((path.into(), prefix.to_string(), version));
        self
    }

    /// Render `Rigging.toml`.
    pub fn manifest(&self) -> String {
        let quote = |items: &[String]| {
            items
                .iter()
                .map(|s| format!("\"{}\"", s))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut out = format!("[package]\nname = \"{}\"\nlicense = \"MIT\"\n", self.name);

        if !self.settings.is_empty() {
            out.push_str("\n[settings]\n");
            for (key, value) in &self.settings {
                out.push_str(&format!("{} = \"{}\"\n", key, value));
            }
        }

        if let Some((ref path, ref prefix, _)) = self.version_file {
            out.push_str(&format!(
                "\n[version]\nfile = \"{}\"\nprefix = \"{}\"\n",
                path.display(),
                prefix
            ));
        }

        out.push_str(&format!(
            "\n[dependencies]\nrequires = [{}]\nbuild_requires = [{}]\n",
            quote(&self.requires),
            quote(&self.build_requires)
        ));
        out
    }

    /// Write the fixture into a fresh temporary directory.
    pub fn write(&self) -> std::io::Result<WrittenRecipe> {
        let dir = TempDir::new()?;
        std::fs::write(dir.path().join(RECIPE_FILE), self.manifest())?;

        if let Some((ref path, ref prefix, (major, minor, patch))) = self.version_file {
            let full = dir.path().join(path);
            if let Some(parent) = full.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(
                full,
                format!(
                    "#pragma once\n\n#define {p}MAJOR {major}\n#define {p}MINOR {minor}\n#define {p}PATCH {patch}\n",
                    p = prefix
                ),
            )?;
        }

        Ok(WrittenRecipe { dir })
    }
}

/// A fixture on disk. Dropping it removes the directory.
#[derive(Debug)]
pub struct WrittenRecipe {
    dir: TempDir,
}

impl WrittenRecipe {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn recipe_path(&self) -> PathBuf {
        self.dir.path().join(RECIPE_FILE)
    }

    pub fn load(&self) -> Result<Recipe, RecipeError> {
        Recipe::load(&self.recipe_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::SettingKey;

    #[test]
    fn test_fixture_round_trips_through_loader() {
        let written = RecipeFixture::new("demo")
            .setting("os", "Linux")
            .requires(["zlib/1.3.1"])
            .version_file("include/demo/version.h", "DEMO_V_", (1, 4, 0))
            .write()
            .unwrap();

        let recipe = written.load().unwrap();
        assert_eq!(recipe.name(), "demo");
        assert_eq!(recipe.settings().get(SettingKey::Os), Some("Linux"));
        assert_eq!(recipe.declaration().requires().len(), 1);
        assert_eq!(recipe.read_version().to_string(), "1.4.0");
    }
}
