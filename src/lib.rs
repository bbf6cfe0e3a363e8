//! Rigging - a recipe-driven build orchestrator for CMake projects
//!
//! A recipe (`Rigging.toml`) fixes a package's settings and dependency
//! lists. Evaluating it resolves the version from a header, plans the build
//! directories, writes a CMake toolchain and dependency file, and runs
//! configure and build.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities and mocks for Rigging unit tests.
///
/// Only available when compiling tests. Provides a scripted process runner
/// and recipe fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{recipe::Recipe, settings::Settings};
pub use ops::evaluate::RecipeEvaluation;
pub use util::context::GlobalContext;
