//! Placeholder resolution engine
//!
//! Runs the resolvers over a template in the fixed order each pipeline
//! prescribes and collects a [`Resolution`] report.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde_json::Value;
use stencil_domain::{PlaceholderKind, ReplaceValues, ResolverConfig};

use super::context::ResolutionContext;
use super::diagnostics::{Diagnostic, DiagnosticKind, Resolution};
use super::positional;
use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::DocumentSource;

/// Document source for the positional-only pipeline.
static NO_DOCUMENTS: BTreeMap<usize, Value> = BTreeMap::new();

/// Callback receiving each diagnostic as it is recorded.
pub type DiagnosticObserver = dyn Fn(&Diagnostic) + Send + Sync;

/// The placeholder resolution engine.
///
/// Holds configuration only; every call works on its own borrowed snapshot
/// of documents and URL segments, so one resolver can serve any number of
/// threads.
#[derive(Clone, Default)]
pub struct PlaceholderResolver {
    config: ResolverConfig,
    observer: Option<Arc<DiagnosticObserver>>,
}

impl PlaceholderResolver {
    /// Creates a resolver with the given configuration.
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            observer: None,
        }
    }

    /// Creates a resolver from a JSON configuration fragment such as
    /// `{"max_passes": 4}`. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::InvalidConfig`] if the fragment is not
    /// valid JSON or a field has the wrong type.
    pub fn from_config_json(json: &str) -> ApplicationResult<Self> {
        let config = ResolverConfig::from_json_str(json)
            .map_err(|e| ApplicationError::InvalidConfig(e.to_string()))?;
        Ok(Self::new(config))
    }

    /// Registers a callback that sees every diagnostic.
    #[must_use]
    pub fn with_observer(
        mut self,
        observer: impl Fn(&Diagnostic) + Send + Sync + 'static,
    ) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolves `{reqs[i][...keys]}` placeholders only.
    #[must_use]
    pub fn resolve_data_path(&self, text: &str, context: ResolutionContext<'_>) -> Resolution {
        self.run(context, |session| session.data_path_pass(text))
    }

    /// Resolves `{reqsJsonPath[i]['expr']}` placeholders only, repeating until
    /// the text settles or the pass cap is reached.
    ///
    /// When the context carries URL segments, `{n}` placeholders inside
    /// expressions are substituted before evaluation; `{n}` elsewhere in the
    /// text is left alone.
    #[must_use]
    pub fn resolve_query_path(&self, text: &str, context: ResolutionContext<'_>) -> Resolution {
        self.run(context, |session| session.query_fixed_point(text))
    }

    /// Replaces `{n}` placeholders with URL segments.
    ///
    /// Documents are never consulted.
    #[must_use]
    pub fn substitute_positional(&self, template: &str, replace_values: &ReplaceValues) -> Resolution {
        let context = ResolutionContext::new(&NO_DOCUMENTS).with_replace_values(replace_values);
        self.run(context, |session| session.positional_pass(template, replace_values))
    }

    /// Data path, then query language; positional placeholders are never
    /// touched, not even inside expressions.
    #[must_use]
    pub fn resolve_data_only(&self, text: &str, context: ResolutionContext<'_>) -> Resolution {
        let context = context.without_replace_values();
        self.run(context, |session| {
            let text = session.data_path_pass(text);
            session.query_fixed_point(&text)
        })
    }

    /// Data path, query language with URL segments inside expressions, then
    /// positional substitution over the whole text.
    ///
    /// Missing values fall back to inline fallbacks or the default text.
    #[must_use]
    pub fn resolve_all(
        &self,
        text: &str,
        replace_values: &ReplaceValues,
        documents: &dyn DocumentSource,
    ) -> Resolution {
        let context = ResolutionContext::new(documents).with_replace_values(replace_values);
        self.run(context, |session| {
            let text = session.data_path_pass(text);
            let text = session.query_fixed_point(&text);
            session.positional_pass(&text, replace_values)
        })
    }

    /// Full resolution for text written in a language that uses braces of
    /// its own, such as a metrics query with `{label="..."}` selectors.
    ///
    /// Only placeholders with the exact prefixes are rewritten, so the
    /// foreign brace syntax passes through untouched.
    #[must_use]
    pub fn resolve_foreign_query(
        &self,
        text: &str,
        replace_values: &ReplaceValues,
        documents: &dyn DocumentSource,
    ) -> Resolution {
        self.resolve_all(text, replace_values, documents)
    }

    fn run<'c>(
        &'c self,
        context: ResolutionContext<'c>,
        pipeline: impl FnOnce(&mut Session<'c>) -> String,
    ) -> Resolution {
        let mut session = Session::new(context, &self.config, self.observer.as_deref());
        let resolved = pipeline(&mut session);
        session.finish(resolved)
    }
}

impl std::fmt::Debug for PlaceholderResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaceholderResolver")
            .field("config", &self.config)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

/// State of one resolution call.
pub(super) struct Session<'c> {
    pub(super) documents: &'c dyn DocumentSource,
    pub(super) replace_values: Option<&'c ReplaceValues>,
    pub(super) custom_fallback: Option<&'c str>,
    pub(super) config: &'c ResolverConfig,
    /// How many query expressions enclose the one being resolved.
    pub(super) nesting: usize,
    observer: Option<&'c DiagnosticObserver>,
    diagnostics: Vec<Diagnostic>,
    reported: HashSet<(DiagnosticKind, String)>,
    converged: bool,
}

impl<'c> Session<'c> {
    pub(super) fn new(
        context: ResolutionContext<'c>,
        config: &'c ResolverConfig,
        observer: Option<&'c DiagnosticObserver>,
    ) -> Self {
        Self {
            documents: context.documents(),
            replace_values: context.replace_values(),
            custom_fallback: context.custom_fallback(),
            config,
            nesting: 0,
            observer,
            diagnostics: Vec::new(),
            reported: HashSet::new(),
            converged: true,
        }
    }

    /// Records a diagnostic once, however many passes run into it.
    pub(super) fn report(&mut self, diagnostic: Diagnostic) {
        if !self
            .reported
            .insert((diagnostic.kind, diagnostic.placeholder.clone()))
        {
            return;
        }

        match diagnostic.kind {
            DiagnosticKind::PassLimitReached => tracing::warn!(
                placeholder = %diagnostic.placeholder,
                detail = %diagnostic.detail,
                "resolution stopped at pass limit"
            ),
            DiagnosticKind::Malformed
            | DiagnosticKind::DocumentUnavailable
            | DiagnosticKind::MissingSegment => tracing::debug!(
                grammar = %diagnostic.grammar,
                placeholder = %diagnostic.placeholder,
                detail = %diagnostic.detail,
                "placeholder left unresolved"
            ),
            DiagnosticKind::MissingDocument | DiagnosticKind::MissingValue => tracing::trace!(
                grammar = %diagnostic.grammar,
                placeholder = %diagnostic.placeholder,
                "placeholder fell back"
            ),
        }

        if let Some(observer) = self.observer {
            observer(&diagnostic);
        }
        self.diagnostics.push(diagnostic);
    }

    /// Substitutes `{n}` placeholders, reporting those without a segment.
    pub(super) fn positional_pass(&mut self, text: &str, replace_values: &ReplaceValues) -> String {
        let mut missing = Vec::new();
        let resolved = positional::substitute(text, replace_values, |placeholder| {
            missing.push(placeholder.to_string());
        });
        for placeholder in missing {
            self.report(Diagnostic::new(
                DiagnosticKind::MissingSegment,
                PlaceholderKind::Positional,
                placeholder,
                "no URL segment at this position",
            ));
        }
        resolved
    }

    pub(super) const fn mark_not_converged(&mut self) {
        self.converged = false;
    }

    pub(super) fn finish(self, resolved: String) -> Resolution {
        Resolution {
            resolved,
            diagnostics: self.diagnostics,
            converged: self.converged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Mutex;
    use stencil_domain::Documents;

    fn documents() -> Documents {
        Documents::from_values([
            json!({"metadata": {"name": "web"}, "spec": {"replicas": 3}}),
            json!({"items": [{"name": "a"}, {"name": "b"}]}),
        ])
    }

    #[test]
    fn test_resolve_all_mixes_every_grammar() {
        let resolver = PlaceholderResolver::default();
        let docs = documents();
        let segments = ReplaceValues::from_path("/ns/prod");

        let result = resolver.resolve_all(
            "{2}/{reqs[0]['metadata','name']} x{reqsJsonPath[0]['.spec.replicas']}",
            &segments,
            &docs,
        );
        assert_eq!(result.resolved, "prod/web x3");
        assert!(result.is_clean());
    }

    #[test]
    fn test_data_only_keeps_positionals() {
        let resolver = PlaceholderResolver::default();
        let docs = documents();
        let segments = ReplaceValues::from_segments(["zero"]);
        let context = ResolutionContext::new(&docs).with_replace_values(&segments);

        let result = resolver.resolve_data_only(
            r#"{"n": "{reqs[0]['metadata','name']}", "p": "{0}", "q": "{reqsJsonPath[1]['.items[{0}].name']['none']}"}"#,
            context,
        );
        assert_eq!(
            result.resolved,
            r#"{"n": "web", "p": "{0}", "q": "{reqsJsonPath[1]['.items[{0}].name']['none']}"}"#
        );
        assert!(result.has(DiagnosticKind::Malformed));
    }

    #[test]
    fn test_observer_sees_diagnostics() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let resolver = PlaceholderResolver::default().with_observer(move |d| {
            sink.lock().unwrap().push(d.kind);
        });
        let docs = documents();

        let result = resolver.resolve_data_path(
            "{reqs[0]['missing']} {reqs[7]['a']}",
            ResolutionContext::new(&docs),
        );
        assert_eq!(
            result.resolved,
            "Undefined with no fallback Undefined with no fallback"
        );
        assert_eq!(
            *seen.lock().unwrap(),
            vec![DiagnosticKind::MissingValue, DiagnosticKind::MissingDocument]
        );
    }

    #[test]
    fn test_configured_default_fallback() {
        let resolver = PlaceholderResolver::new(ResolverConfig::default().with_default_fallback("-"));
        let docs = documents();
        let result = resolver.resolve_query_path("{reqsJsonPath[0]['.nope']}", ResolutionContext::new(&docs));
        assert_eq!(result.resolved, "-");
        assert_eq!(result.fell_back_count(), 1);
    }

    #[test]
    fn test_from_config_json() {
        let resolver = PlaceholderResolver::from_config_json(r#"{"max_passes": 3}"#).unwrap();
        assert_eq!(resolver.config().max_passes, 3);
        assert_eq!(resolver.config().default_fallback, "Undefined with no fallback");

        let err = PlaceholderResolver::from_config_json("{max_passes").unwrap_err();
        assert!(matches!(err, ApplicationError::InvalidConfig(_)));
    }

    #[test]
    fn test_positional_reports_missing_segments() {
        let resolver = PlaceholderResolver::default();
        let segments = ReplaceValues::from_path("/a");

        let result = resolver.substitute_positional("{1}/{4}/{4}", &segments);
        assert_eq!(result.resolved, "a/{4}/{4}");
        assert_eq!(
            result.diagnostics,
            vec![Diagnostic::new(
                DiagnosticKind::MissingSegment,
                PlaceholderKind::Positional,
                "{4}",
                "no URL segment at this position",
            )]
        );
        assert_eq!(result.fell_back_count(), 0);
    }

    #[test]
    fn test_repeated_placeholder_reported_once() {
        let resolver = PlaceholderResolver::default();
        let docs = documents();
        let template = "{reqs[0]['nope']}".repeat(500);

        let result = resolver.resolve_data_path(&template, ResolutionContext::new(&docs));
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::MissingValue);
    }

    #[test]
    fn test_empty_text() {
        let resolver = PlaceholderResolver::default();
        let docs = documents();
        assert_eq!(resolver.resolve_data_path("", ResolutionContext::new(&docs)).resolved, "");
        assert_eq!(resolver.resolve_query_path("", ResolutionContext::new(&docs)).resolved, "");
        assert_eq!(resolver.resolve_all("", &ReplaceValues::new(), &docs).resolved, "");
    }
}
