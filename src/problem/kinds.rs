//! Stock problem types.

use super::Problem;
use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};

// ============================================================================
// LocalizedProblem
// ============================================================================

/// A problem that is nothing more than an already-rendered message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalizedProblem {
    message: String,
}

impl LocalizedProblem {
    /// Creates a problem from a rendered message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Problem for LocalizedProblem {
    fn message(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.message)
    }
}

impl fmt::Display for LocalizedProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<&str> for LocalizedProblem {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for LocalizedProblem {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

// ============================================================================
// FileProblem
// ============================================================================

/// A problem tied to a file, optionally at a specific line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileProblem {
    path: PathBuf,
    line: Option<u32>,
    message: String,
    origin: String,
}

impl FileProblem {
    /// Creates a problem about `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        let path = path.into();
        let origin = path.display().to_string();
        Self {
            path,
            line: None,
            message: message.into(),
            origin,
        }
    }

    /// Pins the problem to a 1-based line number.
    #[must_use]
    pub fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Wraps an I/O failure that happened while working with `path`.
    #[must_use]
    pub fn from_io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Self::new(path, err.to_string())
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the line, if one was recorded.
    #[must_use]
    pub fn line(&self) -> Option<u32> {
        self.line
    }
}

impl Problem for FileProblem {
    fn message(&self) -> Cow<'_, str> {
        match self.line {
            Some(line) => Cow::Owned(format!("{}:{line}: {}", self.origin, self.message)),
            None => Cow::Owned(format!("{}: {}", self.origin, self.message)),
        }
    }

    fn origin(&self) -> Option<&str> {
        Some(&self.origin)
    }
}

impl fmt::Display for FileProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Problem::message(self))
    }
}

// ============================================================================
// UnhandledErrorProblem
// ============================================================================

/// An error that escaped ordinary handling, carried as a problem.
#[derive(Debug)]
pub struct UnhandledErrorProblem {
    error: Box<dyn Error + Send + Sync>,
    type_name: &'static str,
}

impl UnhandledErrorProblem {
    /// Wraps an error value, remembering its type name.
    pub fn new<E>(error: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        Self {
            error: error.into(),
            type_name: std::any::type_name::<E>(),
        }
    }

    /// Returns the wrapped error.
    #[must_use]
    pub fn error(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.error.as_ref()
    }
}

impl Problem for UnhandledErrorProblem {
    fn message(&self) -> Cow<'_, str> {
        let rendered = self.error.to_string();
        if rendered.is_empty() {
            Cow::Borrowed(self.type_name)
        } else {
            Cow::Owned(rendered)
        }
    }
}

impl fmt::Display for UnhandledErrorProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Problem::message(self))
    }
}
