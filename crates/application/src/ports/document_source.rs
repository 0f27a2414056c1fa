//! Document source port

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;
use stencil_domain::Documents;

use crate::error::ApplicationResult;

/// Port through which the resolvers read fetched documents.
///
/// `Ok(None)` means the document was never fetched and feeds the fallback
/// chain. An `Err` means the source itself failed; the placeholder that
/// asked for the document is left untouched.
pub trait DocumentSource {
    /// Returns the document at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::DocumentUnavailable`](crate::ApplicationError::DocumentUnavailable)
    /// when the source cannot serve the document.
    fn document(&self, index: usize) -> ApplicationResult<Option<&Value>>;
}

impl DocumentSource for Documents {
    fn document(&self, index: usize) -> ApplicationResult<Option<&Value>> {
        Ok(self.get(index))
    }
}

impl DocumentSource for BTreeMap<usize, Value> {
    fn document(&self, index: usize) -> ApplicationResult<Option<&Value>> {
        Ok(self.get(&index))
    }
}

impl<S: std::hash::BuildHasher> DocumentSource for HashMap<usize, Value, S> {
    fn document(&self, index: usize) -> ApplicationResult<Option<&Value>> {
        Ok(self.get(&index))
    }
}
