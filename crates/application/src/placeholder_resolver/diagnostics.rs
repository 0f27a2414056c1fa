//! Diagnostics and the resolution report
//!
//! Resolution never fails. Whatever went wrong along the way is recorded
//! here so callers and tests can tell a clean substitution from a fallback,
//! a contained error, or a loop that hit its pass cap.

use stencil_domain::PlaceholderKind;

use crate::error::ApplicationError;

/// What happened to a placeholder that did not resolve cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// The referenced document was never fetched; a fallback was used.
    MissingDocument,
    /// The document exists but the path or query yielded nothing or `null`;
    /// a fallback was used.
    MissingValue,
    /// The placeholder could not be interpreted and was left as written.
    Malformed,
    /// The document source failed; the placeholder was left as written.
    DocumentUnavailable,
    /// A fixed-point loop ran out of passes while the text was still changing.
    PassLimitReached,
    /// A `{n}` placeholder had no URL segment and was left as written.
    MissingSegment,
}

/// One event recorded during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// What happened.
    pub kind: DiagnosticKind,
    /// Grammar of the placeholder concerned.
    pub grammar: PlaceholderKind,
    /// The placeholder text as it appeared in the template.
    pub placeholder: String,
    /// Human-readable detail.
    pub detail: String,
}

impl Diagnostic {
    /// Creates a diagnostic.
    #[must_use]
    pub fn new(
        kind: DiagnosticKind,
        grammar: PlaceholderKind,
        placeholder: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            grammar,
            placeholder: placeholder.into(),
            detail: detail.into(),
        }
    }

    /// Classifies a contained error.
    #[must_use]
    pub fn from_error(
        grammar: PlaceholderKind,
        placeholder: impl Into<String>,
        error: &ApplicationError,
    ) -> Self {
        let kind = match error {
            ApplicationError::DocumentUnavailable { .. } => DiagnosticKind::DocumentUnavailable,
            _ => DiagnosticKind::Malformed,
        };
        Self::new(kind, grammar, placeholder, error.to_string())
    }
}

/// Result of running a resolver or pipeline over a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The text after substitution.
    pub resolved: String,

    /// Everything that did not resolve cleanly, in the order it happened.
    pub diagnostics: Vec<Diagnostic>,

    /// False if a fixed-point loop stopped at its pass cap instead of
    /// reaching a text that no longer changes.
    pub converged: bool,
}

impl Resolution {
    /// Returns true if every placeholder resolved to a real value.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.converged && self.diagnostics.is_empty()
    }

    /// Returns true if a diagnostic of `kind` was recorded.
    #[must_use]
    pub fn has(&self, kind: DiagnosticKind) -> bool {
        self.diagnostics.iter().any(|d| d.kind == kind)
    }

    /// Returns the number of placeholders that were replaced by fallback text.
    #[must_use]
    pub fn fell_back_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.kind, DiagnosticKind::MissingDocument | DiagnosticKind::MissingValue))
            .count()
    }

    /// Consumes the report, keeping only the text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use stencil_domain::DomainError;

    #[test]
    fn test_clean_report() {
        let report = Resolution {
            resolved: "abc".to_string(),
            diagnostics: Vec::new(),
            converged: true,
        };
        assert!(report.is_clean());
        assert_eq!(report.into_string(), "abc");
    }

    #[test]
    fn test_from_error_classifies() {
        let unavailable = ApplicationError::DocumentUnavailable {
            index: 0,
            reason: "offline".to_string(),
        };
        let d = Diagnostic::from_error(PlaceholderKind::DataPath, "{reqs[0]['a']}", &unavailable);
        assert_eq!(d.kind, DiagnosticKind::DocumentUnavailable);
        assert_eq!(d.detail, "document 0 unavailable: offline");

        let malformed = ApplicationError::from(DomainError::InvalidDocumentIndex("9".repeat(30)));
        let d = Diagnostic::from_error(PlaceholderKind::Query, "{...}", &malformed);
        assert_eq!(d.kind, DiagnosticKind::Malformed);
    }

    #[test]
    fn test_fell_back_count() {
        let report = Resolution {
            resolved: String::new(),
            diagnostics: vec![
                Diagnostic::new(DiagnosticKind::MissingValue, PlaceholderKind::DataPath, "a", ""),
                Diagnostic::new(DiagnosticKind::Malformed, PlaceholderKind::Query, "b", ""),
                Diagnostic::new(DiagnosticKind::MissingDocument, PlaceholderKind::Query, "c", ""),
            ],
            converged: true,
        };
        assert_eq!(report.fell_back_count(), 2);
        assert!(report.has(DiagnosticKind::Malformed));
        assert!(!report.has(DiagnosticKind::PassLimitReached));
        assert!(!report.is_clean());
    }
}
