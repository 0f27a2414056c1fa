//! Data-path pass: `{reqs[i]['k1','k2']['fallback']}`

use stencil_domain::{DataPathRef, FallbackChain, Lookup, PlaceholderKind, deep_get};

use super::diagnostics::{Diagnostic, DiagnosticKind};
use super::engine::Session;
use super::parser::parse_data_paths;
use crate::error::ApplicationResult;

impl Session<'_> {
    /// Replaces every data-path placeholder in one left-to-right pass.
    pub(super) fn data_path_pass(&mut self, text: &str) -> String {
        let references = parse_data_paths(text);
        if references.is_empty() {
            return text.to_string();
        }

        let mut result = String::with_capacity(text.len());
        let mut last_end = 0;

        for reference in &references {
            result.push_str(&text[last_end..reference.span.start]);
            let original = &text[reference.span.clone()];

            match self.resolve_data_path(reference, original) {
                Ok(value) => result.push_str(&value),
                Err(error) => {
                    self.report(Diagnostic::from_error(
                        PlaceholderKind::DataPath,
                        original,
                        &error,
                    ));
                    result.push_str(original);
                }
            }
            last_end = reference.span.end;
        }

        result.push_str(&text[last_end..]);
        result
    }

    fn resolve_data_path(
        &mut self,
        reference: &DataPathRef<'_>,
        original: &str,
    ) -> ApplicationResult<String> {
        let (documents, config) = (self.documents, self.config);
        let index = reference.document_index()?;
        let document = documents.document(index)?;
        let lookup = deep_get(document, &reference.keys);

        if lookup.is_nullish() {
            let (kind, detail) = if document.is_none() {
                (
                    DiagnosticKind::MissingDocument,
                    format!("document {index} has not been fetched"),
                )
            } else if matches!(lookup, Lookup::Null) {
                (DiagnosticKind::MissingValue, "value is null".to_string())
            } else {
                (
                    DiagnosticKind::MissingValue,
                    format!("no value at {}", reference.keys.join(".")),
                )
            };
            self.report(Diagnostic::new(kind, PlaceholderKind::DataPath, original, detail));
        }

        let chain = FallbackChain::new(
            reference.fallback,
            self.custom_fallback,
            &config.default_fallback,
        );
        Ok(chain.for_data_path(lookup))
    }
}
