//! Heuristic detection results.

use serde::{Deserialize, Serialize};

use crate::selector::SelectorSet;

/// Outcome of a pattern-detection pass over one document.
///
/// `confidence` is in `[0, 1]` and is computed against the actual DOM after
/// selector synthesis; the cascade only acts on results at or above its
/// acceptance threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub confidence: f64,
    pub selectors: SelectorSet,
    pub diagnostics: DetectionDiagnostics,
}

/// Measurements taken while scoring a synthesized selector set.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectionDiagnostics {
    /// Elements matched by the item selector inside the container.
    pub item_count: usize,
    /// Fraction of the first five items whose title selector yielded text.
    pub title_hit_rate: f64,
    /// Fraction of the first five items whose date selector matched a date.
    pub date_hit_rate: f64,
}

impl Detection {
    /// Whether this detection clears the given acceptance threshold.
    pub fn accepted(&self, min_confidence: f64) -> bool {
        self.confidence >= min_confidence
    }
}
