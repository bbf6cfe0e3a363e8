//! Toolchain file generation.
//!
//! The toolchain file is handed to CMake at configure time via
//! `CMAKE_TOOLCHAIN_FILE`. It encodes the effective settings (build type,
//! compilers, target platform when cross-compiling) and points CMake at the
//! generators directory so the dependency metadata is found.

use std::fmt::Write as _;

use crate::builder::artifact::{ArtifactKind, BuildArtifact};
use crate::builder::deps::DependencyMetadataGenerator;
use crate::builder::layout::Layout;

/// Generates `rigging_toolchain.cmake`.
pub struct ToolchainGenerator<'a> {
    layout: &'a Layout,
}

impl<'a> ToolchainGenerator<'a> {
    /// File name of the toolchain artifact.
    pub const FILE_NAME: &'static str = "rigging_toolchain.cmake";

    pub fn new(layout: &'a Layout) -> Self {
        ToolchainGenerator { layout }
    }

    /// Produce the artifact without writing it.
    pub fn generate(&self) -> BuildArtifact {
        BuildArtifact::new(
            ArtifactKind::Toolchain,
            self.layout.generator_path(Self::FILE_NAME),
            self.render(),
        )
    }

    /// Render the toolchain file contents.
    ///
    /// Only settings feed the output, in canonical key order, and paths are
    /// expressed relative to the file itself.
    pub fn render(&self) -> String {
        let settings = &self.layout.settings;
        let (cc, cxx) = settings.compiler.executables();
        let mut out = String::new();

        out.push_str("# Generated by rigging. Do not edit.\n");
        let _ = writeln!(out, "# Settings: {}", settings);
        out.push('\n');
        out.push_str("include_guard()\n\n");

        for (key, value) in settings.pairs() {
            let _ = writeln!(
                out,
                "set(RIGGING_{} \"{}\")",
                key.as_str().to_uppercase(),
                value
            );
        }
        out.push('\n');

        if settings.is_cross() {
            let _ = writeln!(
                out,
                "set(CMAKE_SYSTEM_NAME {})",
                settings.os.cmake_system_name()
            );
            let _ = writeln!(
                out,
                "set(CMAKE_SYSTEM_PROCESSOR {})",
                settings.arch.cmake_processor()
            );
            out.push('\n');
        }

        let _ = writeln!(out, "set(CMAKE_C_COMPILER {})", cc);
        let _ = writeln!(out, "set(CMAKE_CXX_COMPILER {})", cxx);
        out.push('\n');

        if settings.compiler.is_multi_config() {
            let _ = writeln!(
                out,
                "set(CMAKE_CONFIGURATION_TYPES \"{}\" CACHE STRING \"Available build types\" FORCE)",
                settings.build_type
            );
        } else {
            let _ = writeln!(
                out,
                "set(CMAKE_BUILD_TYPE \"{}\" CACHE STRING \"Build type\" FORCE)",
                settings.build_type
            );
        }
        out.push('\n');

        out.push_str("list(PREPEND CMAKE_PREFIX_PATH \"${CMAKE_CURRENT_LIST_DIR}\")\n");
        out.push_str("list(PREPEND CMAKE_MODULE_PATH \"${CMAKE_CURRENT_LIST_DIR}\")\n");
        let _ = writeln!(
            out,
            "include(\"${{CMAKE_CURRENT_LIST_DIR}}/{}\" OPTIONAL)",
            DependencyMetadataGenerator::FILE_NAME
        );

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::layout::LayoutPlanner;
    use crate::core::settings::{Arch, Os, SettingKey, Settings};

    fn host_settings() -> Settings {
        Settings::new()
            .with(SettingKey::Os, Os::host().as_str())
            .with(SettingKey::Arch, Arch::host().as_str())
            .with(SettingKey::Compiler, "clang")
            .with(SettingKey::BuildType, "Debug")
    }

    #[test]
    fn test_render_single_config() {
        let layout = LayoutPlanner::new("/work/proj-root").plan(&host_settings()).unwrap();
        let text = ToolchainGenerator::new(&layout).render();

        assert!(text.contains("set(RIGGING_COMPILER \"clang\")"));
        assert!(text.contains("set(RIGGING_BUILD_TYPE \"Debug\")"));
        assert!(text.contains("set(CMAKE_C_COMPILER clang)"));
        assert!(text.contains("set(CMAKE_CXX_COMPILER clang++)"));
        assert!(text.contains("set(CMAKE_BUILD_TYPE \"Debug\" CACHE STRING \"Build type\" FORCE)"));
        assert!(
            text.contains("include(\"${CMAKE_CURRENT_LIST_DIR}/rigging_deps.cmake\" OPTIONAL)")
        );
        assert!(!text.contains("CMAKE_SYSTEM_NAME"));
        assert!(!text.contains("proj-root"));
    }

    #[test]
    fn test_settings_in_canonical_order() {
        let layout = LayoutPlanner::new("/r").plan(&host_settings()).unwrap();
        let text = ToolchainGenerator::new(&layout).render();

        let os = text.find("RIGGING_OS").unwrap();
        let compiler = text.find("RIGGING_COMPILER").unwrap();
        let build_type = text.find("RIGGING_BUILD_TYPE").unwrap();
        let arch = text.find("RIGGING_ARCH").unwrap();
        assert!(os < compiler && compiler < build_type && build_type < arch);
    }

    #[test]
    fn test_render_cross() {
        let target_os = if Os::host() == Os::Android { "FreeBSD" } else { "Android" };
        let settings = Settings::new()
            .with(SettingKey::Os, target_os)
            .with(SettingKey::Arch, "armv8")
            .with(SettingKey::Compiler, "clang");
        let layout = LayoutPlanner::new("/r").plan(&settings).unwrap();
        let text = ToolchainGenerator::new(&layout).render();

        assert!(text.contains("set(CMAKE_SYSTEM_NAME"));
        assert!(text.contains("set(CMAKE_SYSTEM_PROCESSOR aarch64)"));
    }

    #[test]
    fn test_multi_config_sets_configuration_types() {
        let settings = Settings::new()
            .with(SettingKey::Os, "Windows")
            .with(SettingKey::Compiler, "msvc")
            .with(SettingKey::BuildType, "RelWithDebInfo");
        let layout = LayoutPlanner::new("C:/r").plan(&settings).unwrap();
        let text = ToolchainGenerator::new(&layout).render();

        assert!(text.contains("set(CMAKE_C_COMPILER cl)"));
        assert!(text.contains("set(CMAKE_CONFIGURATION_TYPES \"RelWithDebInfo\""));
        assert!(!text.contains("set(CMAKE_BUILD_TYPE"));
    }

    #[test]
    fn test_artifact_path() {
        let layout = LayoutPlanner::new("/r").plan(&host_settings()).unwrap();
        let artifact = ToolchainGenerator::new(&layout).generate();
        assert_eq!(artifact.kind(), ArtifactKind::Toolchain);
        assert_eq!(
            artifact.path(),
            layout.generators_dir.join("rigging_toolchain.cmake")
        );
    }
}
