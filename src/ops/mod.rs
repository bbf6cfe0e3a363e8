//! High-level operations.
//!
//! This module contains the recipe lifecycle and the implementation of
//! Rigging commands.

pub mod evaluate;
pub mod rigging_build;
pub mod rigging_clean;

pub use evaluate::{
    EvaluationError, LifecycleOrderError, LifecycleState, Operation, RecipeEvaluation,
};
pub use rigging_build::{
    build, cmake_backend, load_recipe, BuildOptions, LoadOptions, LoadedRecipe,
};
pub use rigging_clean::clean;
