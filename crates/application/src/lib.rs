//! Stencil Application - Placeholder resolution
//!
//! This crate resolves the three placeholder grammars against fetched
//! documents and URL segments. Documents are read through the
//! [`DocumentSource`] port; everything else is pure string processing.
//!
//! - [`placeholder_resolver`]: scanning, the resolver engine and diagnostics
//! - [`pipeline`]: one-call entry points returning plain text
//! - [`value_tree`]: resolution over JSON values

pub mod error;
pub mod pipeline;
pub mod placeholder_resolver;
pub mod ports;
pub mod value_tree;

pub use error::{ApplicationError, ApplicationResult};
pub use pipeline::{
    resolve_all, resolve_data_only, resolve_data_path, resolve_foreign_query,
    resolve_query_path, substitute_positional,
};
pub use placeholder_resolver::{
    Diagnostic, DiagnosticKind, PlaceholderResolver, Resolution, ResolutionContext,
};
pub use ports::DocumentSource;
pub use value_tree::{render_value, render_value_data_only};
