//! Test utilities and mocks for Rigging unit tests.
//!
//! [`MockRunner`] stands in for the backend process so invocation and
//! lifecycle tests never spawn anything.
//!
//! # Example
//!
//! ```rust,ignore
//! use rigging::test_support::{MockProcessOutput, MockRunner};
//!
//! let runner = MockRunner::new();
//! runner.expect_contains("--build", MockProcessOutput::failure(1, "link error"));
//! runner.set_default(MockProcessOutput::success(""));
//! ```

pub mod fixtures;

use std::cell::RefCell;
use std::io;

use crate::builder::invoker::{CommandSpec, ProcessResult, ProcessRunner};

pub use fixtures::*;

/// Mock process output for testing command execution.
#[derive(Debug, Clone)]
pub struct MockProcessOutput {
    /// Exit status code (0 = success).
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl MockProcessOutput {
    /// Create a successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        MockProcessOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Create a failure output with the given stderr and status code.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Create an output with both stdout and stderr.
    pub fn with_output(status: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }
}

impl From<MockProcessOutput> for ProcessResult {
    fn from(output: MockProcessOutput) -> Self {
        ProcessResult {
            exit_code: Some(output.status),
            stdout: output.stdout.into_bytes(),
            stderr: output.stderr.into_bytes(),
        }
    }
}

/// Pattern for matching commands in [`MockRunner`].
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Match if the rendered command starts with prefix.
    StartsWith(String),
    /// Match if the rendered command contains substring.
    Contains(String),
}

impl CommandPattern {
    /// Check if this pattern matches the given command.
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    expectations: Vec<(CommandPattern, MockProcessOutput)>,
    default_output: Option<MockProcessOutput>,
    calls: Vec<CommandSpec>,
}

/// Scripted [`ProcessRunner`] that records every command it is given.
///
/// The first matching expectation wins. Commands matching nothing fall back
/// to the default output; without one they fail to "spawn".
#[derive(Debug, Default)]
pub struct MockRunner {
    state: RefCell<MockState>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an expectation for a command starting with a prefix.
    pub fn expect_prefix(&self, prefix: &str, output: MockProcessOutput) -> &Self {
        self.state
            .borrow_mut()
            .expectations
            .push((CommandPattern::StartsWith(prefix.to_string()), output));
        self
    }

    /// Add an expectation for a command containing a substring.
    pub fn expect_contains(&self, substring: &str, output: MockProcessOutput) -> &Self {
        self.state
            .borrow_mut()
            .expectations
            .push((CommandPattern::Contains(substring.to_string()), output));
        self
    }

    /// Set a default output for commands that don't match any expectation.
    pub fn set_default(&self, output: MockProcessOutput) -> &Self {
        self.state.borrow_mut().default_output = Some(output);
        self
    }

    /// Every command run so far, in order.
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.state.borrow().calls.clone()
    }
}

impl ProcessRunner for MockRunner {
    fn run(&self, spec: &CommandSpec) -> io::Result<ProcessResult> {
        let mut state = self.state.borrow_mut();
        state.calls.push(spec.clone());

        let cmd = spec.display_command();
        let output = state
            .expectations
            .iter()
            .find(|(pattern, _)| pattern.matches(&cmd))
            .map(|(_, output)| output.clone())
            .or_else(|| state.default_output.clone());

        match output {
            Some(output) => Ok(output.into()),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("unexpected command: {}", cmd),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_runner_matching() {
        let runner = MockRunner::new();
        runner.expect_prefix("cmake --build", MockProcessOutput::failure(2, "boom"));
        runner.set_default(MockProcessOutput::success("ok"));

        let configure = CommandSpec::new("cmake").arg("-S").arg(".");
        let build = CommandSpec::new("cmake").arg("--build").arg("build");

        assert_eq!(runner.run(&configure).unwrap().stdout, b"ok");
        let result = runner.run(&build).unwrap();
        assert_eq!(result.exit_code, Some(2));
        assert_eq!(result.stderr, b"boom");
        assert_eq!(runner.calls(), vec![configure, build]);
    }

    #[test]
    fn test_mock_runner_unexpected() {
        let runner = MockRunner::new();
        let err = runner.run(&CommandSpec::new("cmake")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert_eq!(runner.calls().len(), 1);
    }
}
