//! CMake backend command construction.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::builder::invoker::CommandSpec;
use crate::builder::layout::Layout;
use crate::util::process::find_cmake;

/// How to call CMake for configure and build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CMakeBackend {
    program: PathBuf,
    generator: Option<String>,
    jobs: Option<usize>,
}

impl CMakeBackend {
    /// Use a specific cmake executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CMakeBackend {
            program: program.into(),
            generator: None,
            jobs: None,
        }
    }

    /// Use the `cmake` found on PATH.
    pub fn detect() -> Result<Self> {
        match find_cmake() {
            Some(program) => Ok(CMakeBackend::new(program)),
            None => bail!(
                "CMake not found\n\
                 \n\
                 CMake is required to build recipes.\n\
                 Install CMake and ensure it's in your PATH, or set `build.cmake` in the config."
            ),
        }
    }

    /// Set the CMake generator (`-G`).
    pub fn with_generator(mut self, generator: Option<String>) -> Self {
        self.generator = generator;
        self
    }

    /// Set build parallelism (`--parallel`).
    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Command for the configure phase.
    pub fn configure_command(&self, layout: &Layout, toolchain_file: &Path) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.program)
            .arg("-S")
            .arg(layout.source_dir.display().to_string())
            .arg("-B")
            .arg(layout.build_dir.display().to_string())
            .arg(format!("-DCMAKE_TOOLCHAIN_FILE={}", toolchain_file.display()));

        if let Some(ref generator) = self.generator {
            cmd = cmd.arg("-G").arg(generator);
        }

        cmd.cwd(&layout.source_dir)
    }

    /// Command for the build phase.
    ///
    /// `--config` is always passed; single-config generators ignore it.
    pub fn build_command(&self, layout: &Layout) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.program)
            .arg("--build")
            .arg(layout.build_dir.display().to_string())
            .arg("--config")
            .arg(layout.settings.build_type.as_str());

        if let Some(jobs) = self.jobs {
            cmd = cmd.arg("--parallel").arg(jobs.to_string());
        }

        cmd.cwd(&layout.source_dir)
    }
}
