//! Core data structures for Rigging.
//!
//! This module contains the recipe model:
//! - Settings (closed key set, backend-checked values)
//! - Dependency declarations (`requires` / `build_requires`)
//! - Version discovery from a source artifact
//! - The recipe itself

pub mod dependency;
pub mod recipe;
pub mod settings;
pub mod version;

pub use dependency::{Declaration, DependencyKind, DependencyReference};
pub use recipe::{Recipe, VersionSource, RECIPE_FILE};
pub use settings::{EffectiveSettings, SettingKey, Settings};
pub use version::{UnresolvedReason, VersionMarkers, VersionOutcome};
