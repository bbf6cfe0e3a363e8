//! User-facing error reports.
//!
//! Domain errors carry a `miette` code and help text; this module flattens
//! an error chain into a terminal message with that help attached.

use std::fmt;

use miette::Diagnostic as MietteDiagnostic;

use crate::builder::{BuildInvocationError, LayoutError};
use crate::core::recipe::RecipeError;
use crate::core::settings::SettingsError;
use crate::ops::evaluate::EvaluationError;

/// Common suggestion messages.
pub mod suggestions {
    /// Suggestion when a build fails.
    pub const BUILD_FAILED: &str = "run `rigging build --verbose` to see the full backend output";
}

/// An error report with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// `miette` code of the underlying error
    pub code: Option<String>,
    /// Causes, outermost first
    pub context: Vec<String>,
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            code: None,
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Take the code and help text of a `miette` diagnostic.
    pub fn with_miette(mut self, diag: &dyn MietteDiagnostic) -> Self {
        if let Some(code) = diag.code() {
            self.code = Some(code.to_string());
        }
        if let Some(help) = diag.help() {
            self.suggestions.push(help.to_string());
        }
        self
    }

    /// Build a report from an error chain.
    ///
    /// The first error in the chain that is one of ours supplies the code and
    /// help text.
    pub fn from_error(err: &anyhow::Error) -> Self {
        let mut diag = Diagnostic::error(err.to_string());
        for cause in err.chain().skip(1) {
            diag = diag.with_context(cause.to_string());
        }

        match find_miette(err) {
            Some(inner) => diag.with_miette(inner),
            None => diag,
        }
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let severity = if color { "\x1b[1;31merror\x1b[0m" } else { "error" };

        match self.code {
            Some(ref code) => {
                output.push_str(&format!("{}[{}]: {}\n", severity, code, self.message))
            }
            None => output.push_str(&format!("{}: {}\n", severity, self.message)),
        }

        for ctx in &self.context {
            output.push_str(&format!("  caused by: {}\n", ctx));
        }

        let help = if color { "\x1b[1;32mhelp\x1b[0m" } else { "help" };
        for suggestion in &self.suggestions {
            output.push_str(&format!("{}: {}\n", help, suggestion));
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

fn find_miette(err: &anyhow::Error) -> Option<&dyn MietteDiagnostic> {
    err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<EvaluationError>() {
            return Some(e as &dyn MietteDiagnostic);
        }
        if let Some(e) = cause.downcast_ref::<BuildInvocationError>() {
            return Some(e as &dyn MietteDiagnostic);
        }
        if let Some(e) = cause.downcast_ref::<LayoutError>() {
            return Some(e as &dyn MietteDiagnostic);
        }
        if let Some(e) = cause.downcast_ref::<RecipeError>() {
            return Some(e as &dyn MietteDiagnostic);
        }
        if let Some(e) = cause.downcast_ref::<SettingsError>() {
            return Some(e as &dyn MietteDiagnostic);
        }
        None
    })
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::recipe::RecipeError;
    use std::path::PathBuf;
    use anyhow::Context;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::error("configure failed (exit code 1)")
            .with_context("CMake Error at CMakeLists.txt:3")
            .with_suggestion(suggestions::BUILD_FAILED);

        let output = diag.format(false);
        assert!(output.starts_with("error: configure failed"));
        assert!(output.contains("caused by: CMake Error"));
        assert!(output.contains("help: run `rigging build --verbose`"));
    }

    #[test]
    fn test_from_error_picks_up_help() {
        let err = anyhow::Error::new(RecipeError::NotFound {
            dir: PathBuf::from("/work"),
        });
        let diag = Diagnostic::from_error(&err);

        assert_eq!(diag.code.as_deref(), Some("rigging::recipe::not_found"));
        assert_eq!(diag.suggestions.len(), 1);
        assert!(diag.suggestions[0].contains("--recipe"));
        assert!(diag.format(false).starts_with("error[rigging::recipe::not_found]:"));
    }

    #[test]
    fn test_from_error_through_context() {
        let err: anyhow::Result<()> = Err(RecipeError::VersionSource {
            reason: "no marker for `patch`".to_string(),
        })
        .context("failed to load recipe");
        let diag = Diagnostic::from_error(&err.unwrap_err());

        assert_eq!(diag.message, "failed to load recipe");
        assert_eq!(diag.context.len(), 1);
        assert_eq!(diag.code.as_deref(), Some("rigging::recipe::version_source"));
    }

    #[test]
    fn test_plain_error() {
        let diag = Diagnostic::from_error(&anyhow::anyhow!("CMake not found"));
        assert!(diag.code.is_none());
        assert!(diag.suggestions.is_empty());
        assert_eq!(diag.format(false), "error: CMake not found\n");
    }
}
