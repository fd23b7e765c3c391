//! The notice record emitted by every extraction strategy.

use serde::{Deserialize, Serialize};

/// A single board posting.
///
/// Every `Notice` handed out by the engine satisfies the output invariants:
/// the title is normalized non-empty text within the configured length
/// bounds, `date` (when present) is a zero-padded `YYYY-MM-DD` calendar
/// date, and `link` (when present) is an absolute http(s) URL. Rows that
/// cannot meet these constraints are dropped during validation rather than
/// repaired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Normalized posting title.
    pub title: String,
    /// Posting date as `YYYY-MM-DD`, when the row carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Absolute detail-page URL, when the row carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Notice {
    /// Create a notice from already-normalized parts.
    pub fn new(title: impl Into<String>, date: Option<String>, link: Option<String>) -> Self {
        Self {
            title: title.into(),
            date,
            link,
        }
    }

    /// Check the title length bounds used by row validation.
    pub fn title_in_bounds(&self, min: usize, max: usize) -> bool {
        let len = self.title.chars().count();
        len >= min && len <= max
    }
}
