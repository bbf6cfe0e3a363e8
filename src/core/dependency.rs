//! Dependency declarations.
//!
//! A recipe declares two independent dependency lists: `requires` (runtime
//! dependencies, visible to consumers of the built package) and
//! `build_requires` (tools and frameworks only needed while building or
//! testing). Names must be unique within a list, but the same package may
//! appear once in each list.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Which dependency list an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    Requires,
    BuildRequires,
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyKind::Requires => write!(f, "requires"),
            DependencyKind::BuildRequires => write!(f, "build_requires"),
        }
    }
}

/// Error validating a recipe's dependency declarations.
#[derive(Debug, Clone, PartialEq, Eq, Error, miette::Diagnostic)]
pub enum DependencyDeclarationError {
    #[error("duplicate dependency `{name}` in `{kind}`")]
    #[diagnostic(
        code(rigging::dependency::duplicate),
        help("declare each package once per list; the same package may appear in both `requires` and `build_requires`")
    )]
    Duplicate { kind: DependencyKind, name: String },

    #[error("invalid dependency reference `{reference}`")]
    #[diagnostic(
        code(rigging::dependency::invalid_reference),
        help("references are written as `name/version`, for example `glm/1.0.1`")
    )]
    InvalidReference { reference: String },
}

/// A reference to another package: `name/version`.
///
/// The version part is a constraint string passed through to generated
/// artifacts as written. Both parts end up inside CMake variable names and
/// quoted arguments, so neither may contain CMake syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DependencyReference {
    name: String,
    version: String,
}

impl DependencyReference {
    fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        DependencyReference {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Get the package name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the version constraint.
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl FromStr for DependencyReference {
    type Err = DependencyDeclarationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DependencyDeclarationError::InvalidReference {
            reference: s.to_string(),
        };

        let (name, version) = s.trim().split_once('/').ok_or_else(invalid)?;
        let (name, version) = (name.trim(), version.trim());
        if !is_valid_name(name) || !is_valid_version(version) {
            return Err(invalid());
        }

        Ok(DependencyReference::new(name, version))
    }
}

/// `[A-Za-z0-9_][A-Za-z0-9_.+-]*`
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphanumeric() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '+' | '-'))
}

fn is_valid_version(version: &str) -> bool {
    let forbidden = |c: char| {
        c.is_whitespace()
            || c.is_control()
            || matches!(c, '"' | '\\' | '$' | ';' | '(' | ')' | '#')
    };
    !version.is_empty() && !version.chars().any(forbidden)
}

impl fmt::Display for DependencyReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

/// The validated dependency lists of a recipe.
///
/// Immutable once constructed; declaration order is preserved because it
/// determines the content of generated artifacts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Declaration {
    requires: Vec<DependencyReference>,
    build_requires: Vec<DependencyReference>,
}

impl Declaration {
    /// Validate and build a declaration.
    pub fn new(
        requires: Vec<DependencyReference>,
        build_requires: Vec<DependencyReference>,
    ) -> Result<Self, DependencyDeclarationError> {
        check_unique(DependencyKind::Requires, &requires)?;
        check_unique(DependencyKind::BuildRequires, &build_requires)?;

        Ok(Declaration {
            requires,
            build_requires,
        })
    }

    /// Parse `name/version` strings and build a declaration.
    pub fn parse<R, B>(requires: R, build_requires: B) -> Result<Self, DependencyDeclarationError>
    where
        R: IntoIterator,
        R::Item: AsRef<str>,
        B: IntoIterator,
        B::Item: AsRef<str>,
    {
        let requires = parse_list(requires)?;
        let build_requires = parse_list(build_requires)?;
        Declaration::new(requires, build_requires)
    }

    /// Runtime dependencies in declaration order.
    pub fn requires(&self) -> impl ExactSizeIterator<Item = &DependencyReference> {
        self.requires.iter()
    }

    /// Build-time dependencies in declaration order.
    pub fn build_requires(&self) -> impl ExactSizeIterator<Item = &DependencyReference> {
        self.build_requires.iter()
    }

    /// Entries of one list.
    pub fn list(&self, kind: DependencyKind) -> &[DependencyReference] {
        match kind {
            DependencyKind::Requires => &self.requires,
            DependencyKind::BuildRequires => &self.build_requires,
        }
    }
}

fn parse_list<I>(items: I) -> Result<Vec<DependencyReference>, DependencyDeclarationError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    items.into_iter().map(|s| s.as_ref().parse()).collect()
}

fn check_unique(
    kind: DependencyKind,
    deps: &[DependencyReference],
) -> Result<(), DependencyDeclarationError> {
    for (i, dep) in deps.iter().enumerate() {
        if deps[..i].iter().any(|earlier| earlier.name == dep.name) {
            return Err(DependencyDeclarationError::Duplicate {
                kind,
                name: dep.name.clone(),
            });
        }
    }
    Ok(())
}
