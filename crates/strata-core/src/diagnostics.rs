use crate::location::Location;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Error,
    /// Invariant violation; nothing after it can be trusted.
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
            Severity::Fatal => write!(f, "fatal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub location: Location,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location.is_known() {
            write!(f, "{}: {}: {}", self.location, self.severity, self.message)
        } else {
            write!(f, "{}: {}", self.severity, self.message)
        }
    }
}

/// Free-form diagnostics collected over one pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, severity: Severity, location: Location, message: impl Into<String>) {
        self.entries.push(Diagnostic {
            severity,
            message: message.into(),
            location,
        });
    }

    pub fn error(&mut self, location: Location, message: impl Into<String>) {
        self.report(Severity::Error, location, message);
    }

    pub fn warning(&mut self, location: Location, message: impl Into<String>) {
        self.report(Severity::Warning, location, message);
    }

    pub fn fatal(&mut self, location: Location, message: impl Into<String>) {
        self.report(Severity::Fatal, location, message);
    }

    pub fn error_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity >= Severity::Error)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn has_fatal(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Fatal)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_count_ignores_warnings() {
        let mut diags = Diagnostics::new();
        diags.warning(Location::Unknown, "unused");
        diags.error(Location::new(0, 3, 1), "bad type");
        diags.fatal(Location::Unknown, "decayed type");

        assert_eq!(diags.len(), 3);
        assert_eq!(diags.error_count(), 2);
        assert!(diags.has_fatal());
    }

    #[test]
    fn test_display_includes_location() {
        let mut diags = Diagnostics::new();
        diags.error(Location::new(1, 4, 2), "oops");
        let rendered = diags.iter().next().map(|d| d.to_string());
        assert_eq!(rendered.as_deref(), Some("loc(1:4:2): error: oops"));
    }
}
