//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the resolution core and the layers
//! that feed it. The data-fetching layer plugs in through [`DocumentSource`].

mod document_source;

pub use document_source::DocumentSource;
