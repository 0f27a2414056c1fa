//! Placeholder resolution module
//!
//! Finds `{reqs[...]}`, `{reqsJsonPath[...]}` and `{n}` placeholders in a
//! template and substitutes values from fetched documents and URL segments.
//!
//! # Usage
//!
//! ```
//! use serde_json::json;
//! use stencil_application::placeholder_resolver::{PlaceholderResolver, ResolutionContext};
//! use stencil_domain::Documents;
//!
//! let documents = Documents::from_values([json!({"spec": {"replicas": 3}})]);
//! let resolver = PlaceholderResolver::default();
//!
//! let result = resolver.resolve_data_path(
//!     "replicas={reqs[0]['spec','replicas']}",
//!     ResolutionContext::new(&documents),
//! );
//! assert_eq!(result.resolved, "replicas=3");
//! assert!(result.is_clean());
//! ```

mod data_path;
mod positional;
mod query_path;

pub mod context;
pub mod diagnostics;
pub mod engine;
pub mod parser;

pub use context::ResolutionContext;
pub use diagnostics::{Diagnostic, DiagnosticKind, Resolution};
pub use engine::{DiagnosticObserver, PlaceholderResolver};
pub use parser::{
    extract_document_indexes, has_placeholders, parse_data_paths, parse_positionals,
    parse_query_paths,
};
