//! Dependency metadata generation.
//!
//! Emits one CMake file describing the recipe's runtime dependencies: their
//! versions and where their packages live under `RIGGING_PACKAGES_ROOT`.
//! Build requirements (test frameworks, benchmark libraries) never appear
//! here; they only matter while the package itself is being built.

use std::fmt::Write as _;

use crate::builder::artifact::{ArtifactKind, BuildArtifact};
use crate::builder::layout::Layout;
use crate::core::dependency::Declaration;

/// Generates `rigging_deps.cmake`.
pub struct DependencyMetadataGenerator<'a> {
    layout: &'a Layout,
    declaration: &'a Declaration,
}

impl<'a> DependencyMetadataGenerator<'a> {
    /// File name of the dependency metadata artifact.
    pub const FILE_NAME: &'static str = "rigging_deps.cmake";

    pub fn new(layout: &'a Layout, declaration: &'a Declaration) -> Self {
        DependencyMetadataGenerator {
            layout,
            declaration,
        }
    }

    /// Produce the artifact without writing it.
    pub fn generate(&self) -> BuildArtifact {
        BuildArtifact::new(
            ArtifactKind::DependencyMetadata,
            self.layout.generator_path(Self::FILE_NAME),
            self.render(),
        )
    }

    /// Render the metadata file contents, in `requires` declaration order.
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str("# Generated by rigging. Do not edit.\n");
        out.push_str("# Runtime dependencies only.\n\n");

        out.push_str("if(NOT DEFINED RIGGING_PACKAGES_ROOT)\n");
        out.push_str("  set(RIGGING_PACKAGES_ROOT \"$ENV{RIGGING_PACKAGES_ROOT}\")\n");
        out.push_str("endif()\n\n");

        let refs: Vec<String> = self.declaration.requires().map(|d| d.to_string()).collect();
        let _ = writeln!(out, "set(RIGGING_REQUIRES \"{}\")", refs.join(";"));

        for dep in self.declaration.requires() {
            let name = dep.name();
            out.push('\n');
            let _ = writeln!(out, "set({}_VERSION \"{}\")", name, dep.version());
            let _ = writeln!(
                out,
                "set({}_ROOT \"${{RIGGING_PACKAGES_ROOT}}/{}/{}\")",
                name,
                name,
                dep.version()
            );
            let _ = writeln!(out, "list(APPEND CMAKE_PREFIX_PATH \"${{{}_ROOT}}\")", name);
        }

        out
    }
}
