//! Implementation of `rigging build` and the commands that share its setup.
//!
//! Loading applies settings in precedence order: command line, then the
//! recipe's own `[settings]`, then the config profile. Backend defaults fill
//! whatever is still unset when the layout is planned.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::builder::{BuildInvoker, CMakeBackend, ProcessRunner};
use crate::core::recipe::Recipe;
use crate::core::settings::Settings;
use crate::ops::evaluate::RecipeEvaluation;
use crate::util::config::{load_config, Config};
use crate::util::GlobalContext;

/// Options shared by every command that evaluates a recipe.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit recipe path (None = search upward from cwd)
    pub recipe: Option<PathBuf>,

    /// `key=value` overrides from the command line
    pub settings: Vec<String>,
}

/// A recipe with its merged configuration.
#[derive(Debug, Clone)]
pub struct LoadedRecipe {
    pub recipe: Recipe,
    pub config: Config,
}

impl LoadedRecipe {
    /// Start a fresh evaluation of the recipe.
    pub fn evaluation(&self) -> RecipeEvaluation {
        RecipeEvaluation::new(self.recipe.clone())
    }
}

/// Parse `key=value` overrides.
pub fn parse_overrides(assignments: &[String]) -> Result<Settings> {
    let mut settings = Settings::new();
    for assignment in assignments {
        let (key, value) = Settings::parse_assignment(assignment)?;
        settings.insert(key, value);
    }
    Ok(settings)
}

/// Find and load the recipe, its config, and apply setting overrides.
pub fn load_recipe(ctx: &GlobalContext, opts: &LoadOptions) -> Result<LoadedRecipe> {
    let recipe_path = match opts.recipe {
        Some(ref path) => path.clone(),
        None => ctx.find_recipe()?,
    };

    let recipe = Recipe::load(&recipe_path)?;
    let config = load_config(
        ctx.config_path().as_deref(),
        &ctx.project_config_path(recipe.root()),
    )?;

    let defaults = config
        .default_settings()
        .context("invalid [settings] in config")?;
    let overrides = parse_overrides(&opts.settings)?;

    let recipe = recipe
        .with_setting_defaults(&defaults)
        .with_setting_overrides(&overrides);
    tracing::debug!("settings for `{}`: {}", recipe.name(), recipe.settings());

    Ok(LoadedRecipe { recipe, config })
}

/// Set up the CMake backend from config. `jobs` from the command line wins
/// over the configured value.
pub fn cmake_backend(config: &Config, jobs: Option<usize>) -> Result<CMakeBackend> {
    let backend = match config.build.cmake {
        Some(ref program) => CMakeBackend::new(program),
        None => CMakeBackend::detect()?,
    };

    Ok(backend
        .with_generator(config.build.generator.clone())
        .with_jobs(jobs.or(config.build.jobs)))
}

/// Options for the build command.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub load: LoadOptions,

    /// Number of parallel jobs
    pub jobs: Option<usize>,
}

/// Run the full lifecycle for a recipe.
///
/// Returns the finished evaluation. Backend failures come back as
/// [`EvaluationError`](crate::ops::evaluate::EvaluationError) inside the
/// `anyhow` error so callers can recover the captured output.
pub fn build(
    ctx: &GlobalContext,
    opts: &BuildOptions,
    runner: &dyn ProcessRunner,
) -> Result<RecipeEvaluation> {
    let loaded = load_recipe(ctx, &opts.load)?;
    let backend = cmake_backend(&loaded.config, opts.jobs)?;
    let invoker = BuildInvoker::new(runner, &backend);

    let mut eval = loaded.evaluation();
    eval.run(&invoker)?;
    Ok(eval)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::BuildInvocationError;
    use crate::core::settings::SettingKey;
    use crate::ops::evaluate::{EvaluationError, LifecycleState};
    use crate::test_support::{MockProcessOutput, MockRunner, RecipeFixture};

    fn write_config(root: &std::path::Path, contents: &str) {
        let path = root.join(".rigging/config.toml");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn ctx_for(root: &std::path::Path) -> GlobalContext {
        GlobalContext::with_cwd(root.to_path_buf()).with_home(None)
    }

    #[test]
    fn test_setting_precedence() {
        let fixture = RecipeFixture::new("app")
            .setting("os", "Linux")
            .setting("build_type", "Release")
            .write()
            .unwrap();
        write_config(
            fixture.root(),
            "[settings]\nos = \"Windows\"\ncompiler = \"clang\"\narch = \"armv8\"\n",
        );

        let opts = LoadOptions {
            recipe: None,
            settings: vec!["build_type=Debug".to_string()],
        };
        let loaded = load_recipe(&ctx_for(fixture.root()), &opts).unwrap();
        let settings = loaded.recipe.settings();

        assert_eq!(settings.get(SettingKey::Os), Some("Linux"));
        assert_eq!(settings.get(SettingKey::Compiler), Some("clang"));
        assert_eq!(settings.get(SettingKey::Arch), Some("armv8"));
        assert_eq!(settings.get(SettingKey::BuildType), Some("Debug"));
    }

    #[test]
    fn test_bad_override() {
        let fixture = RecipeFixture::new("app").write().unwrap();
        let opts = LoadOptions {
            recipe: Some(fixture.recipe_path()),
            settings: vec!["cppstd=17".to_string()],
        };
        assert!(load_recipe(&ctx_for(fixture.root()), &opts).is_err());
    }

    #[test]
    fn test_backend_from_config() {
        let config: Config =
            toml::from_str("[build]\ncmake = \"/opt/cmake\"\ngenerator = \"Ninja\"\njobs = 2\n")
                .unwrap();
        let backend = cmake_backend(&config, Some(12)).unwrap();
        assert_eq!(backend.program(), std::path::Path::new("/opt/cmake"));
        assert_eq!(
            backend,
            CMakeBackend::new("/opt/cmake")
                .with_generator(Some("Ninja".to_string()))
                .with_jobs(Some(12))
        );
    }

    #[test]
    fn test_build_runs_lifecycle() {
        let fixture = RecipeFixture::new("app")
            .setting("os", "Linux")
            .requires(["fmt/10.2.1"])
            .write()
            .unwrap();
        write_config(fixture.root(), "[build]\ncmake = \"cmake\"\njobs = 3\n");

        let runner = MockRunner::new();
        runner.set_default(MockProcessOutput::success(""));
        let eval = build(&ctx_for(fixture.root()), &BuildOptions::default(), &runner).unwrap();

        assert_eq!(eval.state(), LifecycleState::Built);
        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].args.ends_with(&["--parallel".to_string(), "3".to_string()]));
    }

    #[test]
    fn test_build_failure_keeps_invocation_error() {
        let fixture = RecipeFixture::new("app").setting("os", "Linux").write().unwrap();
        write_config(fixture.root(), "[build]\ncmake = \"cmake\"\n");

        let runner = MockRunner::new();
        runner.expect_contains("--build", MockProcessOutput::failure(4, "ld: error"));
        runner.set_default(MockProcessOutput::success(""));

        let err = build(&ctx_for(fixture.root()), &BuildOptions::default(), &runner).unwrap_err();
        match err.downcast_ref::<EvaluationError>() {
            Some(EvaluationError::Invocation(inner @ BuildInvocationError::Failed { .. })) => {
                assert_eq!(inner.exit_code(), Some(4));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
