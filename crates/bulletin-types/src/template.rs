//! Pre-curated templates keyed by domain or vendor fingerprint.

use serde::{Deserialize, Serialize};

use crate::selector::SelectorSet;

/// A named, curated selector set.
///
/// Domain templates carry no indicators and match on the hostname key they
/// are registered under. System templates match when at least half of their
/// `indicators` appear as substrings of the lowercased page HTML or URL,
/// the trace artifacts of shared vendor board platforms (script URLs,
/// inline comments, class names).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// Human-readable template name, used in diagnostics.
    pub name: String,
    /// Fingerprint substrings for system templates; empty for domain templates.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indicators: Vec<String>,
    /// The selector set applied when the template matches.
    pub selectors: SelectorSet,
}

/// Which registry bucket produced a template match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateSource {
    /// Matched on hostname equality or suffix.
    Domain,
    /// Matched on vendor fingerprint indicators.
    System,
}

/// A validated template match returned by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMatch {
    pub template: Template,
    pub source: TemplateSource,
}

impl Template {
    /// Create a domain template.
    pub fn for_domain(name: impl Into<String>, selectors: SelectorSet) -> Self {
        Self {
            name: name.into(),
            indicators: Vec::new(),
            selectors,
        }
    }

    /// Create a system template with fingerprint indicators.
    pub fn for_system(
        name: impl Into<String>,
        indicators: Vec<String>,
        selectors: SelectorSet,
    ) -> Self {
        Self {
            name: name.into(),
            indicators,
            selectors,
        }
    }
}
