//! Recipe evaluation lifecycle.
//!
//! One [`RecipeEvaluation`] drives one recipe through
//! `Unloaded → VersionResolved → LayoutPlanned → Generated → Built`.
//! Every step must be requested explicitly and in order; calling a step out
//! of order is a [`LifecycleOrderError`] and nothing is done implicitly to
//! make it valid. The only backward move allowed is regenerating after a
//! build, which puts the evaluation back in `Generated`.

use std::fmt;

use thiserror::Error;

use crate::builder::{
    self, BuildArtifact, BuildInvocationError, BuildInvoker, GenerationError, Layout, LayoutError,
    LayoutPlanner, ProcessResult,
};
use crate::core::recipe::Recipe;
use crate::core::version::VersionOutcome;

/// Where an evaluation is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LifecycleState {
    Unloaded,
    VersionResolved,
    LayoutPlanned,
    Generated,
    Built,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LifecycleState::Unloaded => "unloaded",
            LifecycleState::VersionResolved => "version-resolved",
            LifecycleState::LayoutPlanned => "layout-planned",
            LifecycleState::Generated => "generated",
            LifecycleState::Built => "built",
        };
        f.write_str(s)
    }
}

/// A lifecycle step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ResolveVersion,
    PlanLayout,
    CreateDirs,
    Generate,
    Build,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::ResolveVersion => "resolve version",
            Operation::PlanLayout => "plan layout",
            Operation::CreateDirs => "create directories",
            Operation::Generate => "generate",
            Operation::Build => "build",
        };
        f.write_str(s)
    }
}

/// A step was requested in a state that does not allow it.
#[derive(Debug, Clone, PartialEq, Eq, Error, miette::Diagnostic)]
#[error("cannot {operation} recipe `{recipe}` in state `{state}`")]
#[diagnostic(
    code(rigging::lifecycle::order),
    help("steps run in order: resolve version, plan layout, generate, build")
)]
pub struct LifecycleOrderError {
    pub recipe: String,
    pub operation: Operation,
    pub state: LifecycleState,
}

/// Any error that halts an evaluation.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum EvaluationError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lifecycle(#[from] LifecycleOrderError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Invocation(#[from] BuildInvocationError),
}

/// One evaluation of one recipe, owning everything derived from it.
#[derive(Debug)]
pub struct RecipeEvaluation {
    recipe: Recipe,
    state: LifecycleState,
    version: Option<VersionOutcome>,
    layout: Option<Layout>,
    artifacts: Vec<BuildArtifact>,
    build_result: Option<ProcessResult>,
}

impl RecipeEvaluation {
    /// Start evaluating a loaded recipe.
    pub fn new(recipe: Recipe) -> Self {
        RecipeEvaluation {
            recipe,
            state: LifecycleState::Unloaded,
            version: None,
            layout: None,
            artifacts: Vec::new(),
            build_result: None,
        }
    }

    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// The cached version outcome, once resolved.
    pub fn version_outcome(&self) -> Option<&VersionOutcome> {
        self.version.as_ref()
    }

    /// The resolved version, if resolution succeeded.
    pub fn version(&self) -> Option<&semver::Version> {
        self.version.as_ref().and_then(VersionOutcome::version)
    }

    /// The planned layout.
    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    /// Artifacts from the latest generation.
    pub fn artifacts(&self) -> &[BuildArtifact] {
        &self.artifacts
    }

    /// Result of the latest successful build.
    pub fn build_result(&self) -> Option<&ProcessResult> {
        self.build_result.as_ref()
    }

    fn order_error(&self, operation: Operation) -> LifecycleOrderError {
        LifecycleOrderError {
            recipe: self.recipe.name().to_string(),
            operation,
            state: self.state,
        }
    }

    /// Resolve the version.
    ///
    /// The version file is read only once; later calls return the cached
    /// outcome. An unresolved version is logged and does not stop evaluation.
    pub fn resolve_version(&mut self) -> &VersionOutcome {
        let recipe = &self.recipe;
        let state = &mut self.state;
        self.version.get_or_insert_with(|| {
            let outcome = recipe.read_version();
            match &outcome {
                VersionOutcome::Resolved(v) => {
                    tracing::info!("Resolved `{}` version {}", recipe.name(), v)
                }
                VersionOutcome::Unresolved(reason) => {
                    tracing::warn!("version of `{}` is unknown: {}", recipe.name(), reason)
                }
            }
            *state = LifecycleState::VersionResolved;
            outcome
        })
    }

    /// Plan the layout from the recipe settings.
    pub fn plan_layout(&mut self) -> Result<&Layout, EvaluationError> {
        if self.state != LifecycleState::VersionResolved {
            return Err(self.order_error(Operation::PlanLayout).into());
        }

        let layout = LayoutPlanner::new(self.recipe.root()).plan(self.recipe.settings())?;
        tracing::info!(
            "Planned layout for `{}` ({}): {}",
            self.recipe.name(),
            layout.settings,
            layout.build_dir.display()
        );

        self.state = LifecycleState::LayoutPlanned;
        Ok(self.layout.insert(layout))
    }

    /// Create the planned directories on disk.
    pub fn create_dirs(&self) -> Result<(), EvaluationError> {
        let layout = self
            .layout
            .as_ref()
            .ok_or_else(|| self.order_error(Operation::CreateDirs))?;
        layout.create_dirs()?;
        Ok(())
    }

    /// Write the toolchain and dependency metadata artifacts.
    ///
    /// Allowed once the layout is planned, and again after generating or
    /// building; regenerating after a build means the build must be
    /// requested again.
    pub fn generate(&mut self) -> Result<&[BuildArtifact], EvaluationError> {
        let layout = match (self.state, self.layout.as_ref()) {
            (
                LifecycleState::LayoutPlanned | LifecycleState::Generated | LifecycleState::Built,
                Some(layout),
            ) => layout,
            _ => return Err(self.order_error(Operation::Generate).into()),
        };

        let artifacts = builder::generate(layout, self.recipe.declaration())?;

        self.artifacts = artifacts;
        self.build_result = None;
        self.state = LifecycleState::Generated;
        Ok(&self.artifacts)
    }

    /// Configure and build with the generated artifacts.
    pub fn build(&mut self, invoker: &BuildInvoker<'_>) -> Result<&ProcessResult, EvaluationError> {
        let layout = match (self.state, self.layout.as_ref()) {
            (LifecycleState::Generated, Some(layout)) => layout,
            _ => return Err(self.order_error(Operation::Build).into()),
        };

        let result = invoker.invoke(layout, &self.artifacts)?;
        tracing::info!("Built `{}`", self.recipe.name());

        self.state = LifecycleState::Built;
        Ok(self.build_result.insert(result))
    }

    /// Run every step in order: resolve, plan, create directories,
    /// generate, build.
    pub fn run(&mut self, invoker: &BuildInvoker<'_>) -> Result<&ProcessResult, EvaluationError> {
        self.resolve_version();
        self.plan_layout()?;
        self.create_dirs()?;
        self.generate()?;
        self.build(invoker)
    }
}
