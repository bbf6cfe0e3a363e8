//! Command implementations

pub mod build;
pub mod clean;
pub mod completions;
pub mod generate;
pub mod layout;
pub mod version;
