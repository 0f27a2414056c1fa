//! Stencil Domain - Core types of the placeholder engine
//!
//! This crate defines the data the engine reads (fetched documents and URL
//! segments), the rules for turning looked-up values into text, and the
//! path-query language. All types here are pure Rust with no I/O.

pub mod config;
pub mod display;
pub mod document;
pub mod error;
pub mod fallback;
pub mod placeholder;
pub mod query;
pub mod replace_values;

pub use config::{DEFAULT_MAX_PASSES, ResolverConfig};
pub use display::to_display_string;
pub use document::{Documents, Lookup, deep_get};
pub use error::{DomainError, DomainResult};
pub use fallback::{DEFAULT_FALLBACK, FallbackChain};
pub use placeholder::{DataPathRef, PlaceholderKind, PositionalRef, QueryRef, parse_index};
pub use query::{JsonPath, QueryError};
pub use replace_values::ReplaceValues;
