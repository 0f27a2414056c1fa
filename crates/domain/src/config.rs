//! Resolver configuration

use serde::{Deserialize, Serialize};

use crate::fallback::DEFAULT_FALLBACK;

/// Default cap on fixed-point passes over query-language placeholders.
pub const DEFAULT_MAX_PASSES: usize = 10;

/// Tunables of the placeholder engine.
///
/// # Example
///
/// ```
/// use stencil_domain::ResolverConfig;
///
/// let config = ResolverConfig::from_json_str(r#"{"max_passes": 3}"#).unwrap();
/// assert_eq!(config.max_passes, 3);
/// assert_eq!(config.default_fallback, "Undefined with no fallback");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Upper bound on re-resolution passes of a fixed-point loop.
    pub max_passes: usize,

    /// Text substituted when a value is missing and no fallback is given.
    pub default_fallback: String,
}

impl ResolverConfig {
    /// Parses a configuration fragment. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns the deserialization error if `json` is not a valid fragment.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Sets the pass cap.
    #[must_use]
    pub const fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Sets the default fallback text.
    #[must_use]
    pub fn with_default_fallback(mut self, text: impl Into<String>) -> Self {
        self.default_fallback = text.into();
        self
    }

    /// The pass cap actually used; a loop always runs at least once.
    #[must_use]
    pub fn effective_max_passes(&self) -> usize {
        self.max_passes.max(1)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
            default_fallback: DEFAULT_FALLBACK.to_string(),
        }
    }
}
