//! Shell output for the command-line front end.
//!
//! Status lines go to stderr as `{status:>12} {message}`. Long-running
//! backend phases get an `indicatif` spinner unless output is verbose or
//! stderr is not a terminal, in which case the log carries the progress.

use std::fmt::Display;
use std::io::{self, IsTerminal};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// --quiet: errors only, no spinner
    Quiet,
    #[default]
    Normal,
    /// --verbose: backend output is logged, no spinner
    Verbose,
}

/// Status types for output messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    // Success statuses (green)
    Generated,
    Finished,
    Removed,

    // In-progress statuses (cyan)
    Resolving,
    Building,

    // Info statuses (blue)
    Fresh,

    // Error status (red)
    Error,
}

impl Status {
    fn as_str(&self) -> &'static str {
        match self {
            Status::Generated => "Generated",
            Status::Finished => "Finished",
            Status::Removed => "Removed",
            Status::Resolving => "Resolving",
            Status::Building => "Building",
            Status::Fresh => "Fresh",
            Status::Error => "error",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            Status::Generated | Status::Finished | Status::Removed => "\x1b[1;32m",
            Status::Resolving | Status::Building => "\x1b[1;36m",
            Status::Fresh => "\x1b[1;34m",
            Status::Error => "\x1b[1;31m",
        }
    }
}

/// Central shell for all CLI output.
#[derive(Debug)]
pub struct Shell {
    verbosity: Verbosity,
    use_color: bool,
}

impl Shell {
    /// Create a shell, coloring output only when stderr is a terminal.
    pub fn new(verbosity: Verbosity) -> Self {
        Shell {
            verbosity,
            use_color: io::stderr().is_terminal(),
        }
    }

    /// Create a shell from CLI flags. Quiet wins over verbose.
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        let verbosity = if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };
        Shell::new(verbosity)
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    pub fn use_color(&self) -> bool {
        self.use_color
    }

    /// Print a status message. In quiet mode, only errors are printed.
    pub fn status(&self, status: Status, msg: impl Display) {
        if self.is_quiet() && status != Status::Error {
            return;
        }
        eprintln!("{} {}", self.format_status(status), msg);
    }

    fn format_status(&self, status: Status) -> String {
        format_status(status, self.use_color)
    }

    /// Start a spinner for a blocking phase.
    pub fn spinner(&self, status: Status, msg: impl Display) -> Spinner {
        let message = msg.to_string();
        let show = !self.is_quiet() && !self.is_verbose() && io::stderr().is_terminal();

        let pb = if show {
            let pb = ProgressBar::new_spinner();
            let style =
                ProgressStyle::default_spinner().template("{spinner:.cyan} {msg} {elapsed}");
            if let Ok(style) = style {
                pb.set_style(style);
            }
            pb.set_message(format!("{} {}", status.as_str(), message));
            pb.enable_steady_tick(Duration::from_millis(100));
            Some(pb)
        } else {
            self.status(status, &message);
            None
        };

        Spinner {
            pb,
            start: Instant::now(),
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new(Verbosity::default())
    }
}

/// A running spinner. Cleared when finished or dropped.
pub struct Spinner {
    pb: Option<ProgressBar>,
    start: Instant,
}

impl Spinner {
    /// Stop the spinner and return how long it ran.
    pub fn finish(self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if let Some(ref pb) = self.pb {
            pb.finish_and_clear();
        }
    }
}

fn format_status(status: Status, color: bool) -> String {
    if color {
        format!("{}{:>12}\x1b[0m", status.color_code(), status.as_str())
    } else {
        format!("{:>12}", status.as_str())
    }
}

/// Format a duration for display.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{:.2}s", secs)
    } else {
        let mins = (secs / 60.0).floor();
        format!("{}m {:.0}s", mins, secs - mins * 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_status_alignment() {
        assert_eq!(format_status(Status::Finished, false), "    Finished");
        assert_eq!(format_status(Status::Error, false), "       error");
        assert_eq!(
            format_status(Status::Generated, true),
            "\x1b[1;32m   Generated\x1b[0m"
        );
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(2500)), "2.50s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
    }

    #[test]
    fn test_from_flags() {
        assert_eq!(Shell::from_flags(true, true).verbosity(), Verbosity::Quiet);
        assert_eq!(Shell::from_flags(false, true).verbosity(), Verbosity::Verbose);
        assert_eq!(Shell::from_flags(false, false).verbosity(), Verbosity::Normal);
    }

    #[test]
    fn test_quiet_spinner_is_hidden() {
        let shell = Shell::new(Verbosity::Quiet);
        let spinner = shell.spinner(Status::Building, "app");
        assert!(spinner.pb.is_none());
        spinner.finish();
    }
}
