//! Layout planning, artifact generation and backend invocation.

pub mod artifact;
pub mod cmake;
pub mod deps;
pub mod invoker;
pub mod layout;
pub mod toolchain;

pub use artifact::{ArtifactKind, BuildArtifact, GenerationError, WriteStatus};
pub use cmake::CMakeBackend;
pub use deps::DependencyMetadataGenerator;
pub use invoker::{
    BuildInvocationError, BuildInvoker, CommandSpec, Phase, ProcessResult, ProcessRunner,
    SystemRunner,
};
pub use layout::{Layout, LayoutError, LayoutPlanner};
pub use toolchain::ToolchainGenerator;

use crate::core::dependency::Declaration;

/// Write the toolchain and dependency metadata artifacts into the layout's
/// generators directory.
///
/// The settings encoded in the toolchain file are the ones the layout was
/// planned from. The generators directory must already exist.
pub fn generate(
    layout: &Layout,
    declaration: &Declaration,
) -> Result<Vec<BuildArtifact>, GenerationError> {
    let artifacts = vec![
        ToolchainGenerator::new(layout).generate(),
        DependencyMetadataGenerator::new(layout, declaration).generate(),
    ];

    for artifact in &artifacts {
        if artifact.write()? == WriteStatus::Unchanged {
            tracing::info!("{} up to date: {}", artifact.kind(), artifact.path().display());
        } else {
            tracing::info!("Generated {}: {}", artifact.kind(), artifact.path().display());
        }
    }

    Ok(artifacts)
}
