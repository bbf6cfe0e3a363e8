//! Build invocation against the external backend.
//!
//! The orchestrator only ever talks to the backend through [`ProcessRunner`]:
//! a command goes in, an exit code and captured output come out. The real
//! implementation spawns processes; tests substitute a scripted runner.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::builder::artifact::{ArtifactKind, BuildArtifact};
use crate::builder::cmake::CMakeBackend;
use crate::builder::layout::Layout;
use crate::util::process::{OutputStream, ProcessBuilder};

/// A command to run: program, arguments and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl AsRef<Path>) -> Self {
        CommandSpec {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Display the command for logs and error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Exit code and captured output of one external call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessResult {
    /// `None` if the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs external commands to completion.
pub trait ProcessRunner {
    /// Run `spec`, blocking until it exits. An `Err` means the process could
    /// not be started at all.
    fn run(&self, spec: &CommandSpec) -> io::Result<ProcessResult>;
}

/// Runs commands as real child processes, streaming their output to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> io::Result<ProcessResult> {
        let mut pb = ProcessBuilder::new(&spec.program).args(&spec.args);
        if let Some(ref cwd) = spec.cwd {
            pb = pb.cwd(cwd);
        }

        let output = pb.exec_streaming(|stream, line| match stream {
            OutputStream::Stdout => tracing::debug!("{}", line),
            OutputStream::Stderr => tracing::debug!("stderr: {}", line),
        })?;

        Ok(ProcessResult {
            exit_code: output.code,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Which external call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Configure,
    Build,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Configure => write!(f, "configure"),
            Phase::Build => write!(f, "build"),
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// Error invoking the backend.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum BuildInvocationError {
    #[error("{phase} failed ({}): {command}", describe_exit(.exit_code))]
    #[diagnostic(code(rigging::build::failed))]
    Failed {
        phase: Phase,
        command: String,
        exit_code: Option<i32>,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    },

    #[error("failed to start {phase}: `{}`", .program.display())]
    #[diagnostic(
        code(rigging::build::spawn),
        help("check that cmake is installed, or set `build.cmake` in the config")
    )]
    Spawn {
        phase: Phase,
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no toolchain artifact to configure with")]
    #[diagnostic(code(rigging::build::missing_toolchain))]
    MissingToolchain,
}

impl BuildInvocationError {
    /// The exit code to propagate to the caller, if the backend produced one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            BuildInvocationError::Failed { exit_code, .. } => *exit_code,
            _ => None,
        }
    }
}

/// Sequences configure then build.
pub struct BuildInvoker<'a> {
    runner: &'a dyn ProcessRunner,
    backend: &'a CMakeBackend,
}

impl<'a> BuildInvoker<'a> {
    pub fn new(runner: &'a dyn ProcessRunner, backend: &'a CMakeBackend) -> Self {
        BuildInvoker { runner, backend }
    }

    /// Configure with the toolchain artifact, then build.
    ///
    /// Returns the build phase's result. Build is never attempted when
    /// configure does not succeed. Nothing is retried.
    pub fn invoke(
        &self,
        layout: &Layout,
        artifacts: &[BuildArtifact],
    ) -> Result<ProcessResult, BuildInvocationError> {
        let toolchain = artifacts
            .iter()
            .find(|a| a.kind() == ArtifactKind::Toolchain)
            .ok_or(BuildInvocationError::MissingToolchain)?;

        tracing::info!("Configuring {}", layout.build_dir.display());
        let configure = self.backend.configure_command(layout, toolchain.path());
        self.run_phase(Phase::Configure, &configure)?;

        tracing::info!("Building {}", layout.build_dir.display());
        let build = self.backend.build_command(layout);
        self.run_phase(Phase::Build, &build)
    }

    fn run_phase(
        &self,
        phase: Phase,
        spec: &CommandSpec,
    ) -> Result<ProcessResult, BuildInvocationError> {
        tracing::debug!("{}: {}", phase, spec.display_command());

        let result = self
            .runner
            .run(spec)
            .map_err(|source| BuildInvocationError::Spawn {
                phase,
                program: spec.program.clone(),
                source,
            })?;

        if !result.success() {
            return Err(BuildInvocationError::Failed {
                phase,
                command: spec.display_command(),
                exit_code: result.exit_code,
                stdout: result.stdout,
                stderr: result.stderr,
            });
        }

        Ok(result)
    }
}
