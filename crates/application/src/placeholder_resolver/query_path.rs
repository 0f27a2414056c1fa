//! Query-language pass: `{reqsJsonPath[i]['expr']['fallback']}`
//!
//! Expressions may themselves contain placeholders. Each expression is
//! resolved to a fixed point before it is evaluated, and the text as a whole
//! is re-scanned until a pass leaves it unchanged.

use stencil_domain::{DomainError, FallbackChain, PlaceholderKind, QueryRef, query};

use super::diagnostics::{Diagnostic, DiagnosticKind};
use super::engine::Session;
use super::parser::parse_query_paths;
use crate::error::ApplicationResult;

/// Deepest nesting of query placeholders inside one another's expressions.
const MAX_NESTING: usize = 32;

impl Session<'_> {
    /// Runs query passes until the text stops changing or the pass cap is hit.
    pub(super) fn query_fixed_point(&mut self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let max_passes = self.config.effective_max_passes();
        let mut current = text.to_string();

        for pass in 1..=max_passes {
            let next = self.query_pass(&current);
            if next == current {
                tracing::trace!(pass, "query placeholders settled");
                return next;
            }
            current = next;
        }

        if let Some(remaining) = parse_query_paths(&current).first() {
            let placeholder = current[remaining.span.clone()].to_string();
            self.mark_not_converged();
            self.report(Diagnostic::new(
                DiagnosticKind::PassLimitReached,
                PlaceholderKind::Query,
                placeholder,
                format!("text still changing after {max_passes} passes"),
            ));
        }
        current
    }

    fn query_pass(&mut self, text: &str) -> String {
        let references = parse_query_paths(text);
        if references.is_empty() {
            return text.to_string();
        }

        let mut result = String::with_capacity(text.len());
        let mut last_end = 0;

        for reference in &references {
            result.push_str(&text[last_end..reference.span.start]);
            let original = &text[reference.span.clone()];

            match self.resolve_query(reference, original) {
                Ok(value) => result.push_str(&value),
                Err(error) => {
                    self.report(Diagnostic::from_error(PlaceholderKind::Query, original, &error));
                    result.push_str(original);
                }
            }
            last_end = reference.span.end;
        }

        result.push_str(&text[last_end..]);
        result
    }

    fn resolve_query(&mut self, reference: &QueryRef<'_>, original: &str) -> ApplicationResult<String> {
        let (documents, config) = (self.documents, self.config);
        let index = reference.document_index()?;

        if self.nesting >= MAX_NESTING {
            return Err(DomainError::MalformedPlaceholder(format!(
                "query placeholders nested deeper than {MAX_NESTING} levels"
            ))
            .into());
        }
        self.nesting += 1;
        let mut expression = self.query_fixed_point(reference.expression);
        self.nesting -= 1;

        if let Some(replace_values) = self.replace_values {
            expression = self.positional_pass(&expression, replace_values);
        }

        let chain = FallbackChain::new(
            reference.fallback,
            self.custom_fallback,
            &config.default_fallback,
        );

        let Some(document) = documents.document(index)? else {
            self.report(Diagnostic::new(
                DiagnosticKind::MissingDocument,
                PlaceholderKind::Query,
                original,
                format!("document {index} has not been fetched"),
            ));
            return Ok(chain.for_missing_document());
        };

        let first = query::select_first(document, &expression).map_err(DomainError::from)?;
        if first.is_none_or(serde_json::Value::is_null) {
            self.report(Diagnostic::new(
                DiagnosticKind::MissingValue,
                PlaceholderKind::Query,
                original,
                format!("no match for {expression}"),
            ));
        }
        Ok(chain.for_query(first))
    }
}
