use std::{
    fmt::Display,
    ops::{Deref, DerefMut},
};

use cursor::Line;
use itertools::Itertools;

/// Sink for errors found while scanning or parsing.
///
/// The scanner and parser never print anything themselves; whoever drives them
/// decides where diagnostics end up.
pub trait Reporter {
    fn report(&mut self, line: Line, location: &str, message: &str);
}

#[derive(thiserror::Error, Clone, Debug, PartialEq)]
#[error("[line {line}] Error{location}: {message}")]
pub struct Diagnostic {
    pub line: Line,
    pub location: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(line: Line, location: impl ToString, message: impl ToString) -> Self {
        Self { line, location: location.to_string(), message: message.to_string() }
    }
}

/// Collects every diagnostic of a single scan/parse invocation.
#[derive(thiserror::Error, Clone, Debug, Default, PartialEq)]
pub struct Diagnostics(pub Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn had_error(&self) -> bool {
        !self.0.is_empty()
    }
}

impl Reporter for Diagnostics {
    fn report(&mut self, line: Line, location: &str, message: &str) {
        log::debug!("diagnostic at line {line}: {message}");
        self.0.push(Diagnostic::new(line, location, message));
    }
}

impl Deref for Diagnostics {
    type Target = Vec<Diagnostic>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Diagnostics {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join("\n"))
    }
}
