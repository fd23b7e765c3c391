//! Per-URL crawl results and method tags.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::notice::Notice;

/// The strategy that produced a successful extraction.
///
/// The serialized tags are part of the external contract and are consumed by
/// the run report and the persistence layer, so they stay stable even where
/// the internal naming moved on (`selenium` tags the headless fallback).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// A registry template validated against the document.
    Template,
    /// Heuristic pattern detection on the static DOM.
    AutoDetect,
    /// One of the built-in generic selector sets.
    Custom,
    /// Re-detection on a headless-rendered DOM.
    #[serde(rename = "selenium")]
    Headless,
}

impl ExtractionMethod {
    /// Stable string tag, identical to the serialized form.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Template => "template",
            Self::AutoDetect => "auto_detect",
            Self::Custom => "custom",
            Self::Headless => "selenium",
        }
    }
}

/// Structured outcome of one `extract` call.
///
/// The engine never raises: faults surface here as `success == false` with
/// the original message in `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlResult {
    pub success: bool,
    #[serde(default)]
    pub notices: Vec<Notice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<ExtractionMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl CrawlResult {
    /// A successful result carrying validated notices.
    pub fn ok(notices: Vec<Notice>, method: ExtractionMethod) -> Self {
        Self {
            success: true,
            notices,
            method: Some(method),
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// A failed result carrying the fault message.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            notices: Vec::new(),
            method: None,
            error: Some(error.into()),
            timestamp: Utc::now(),
        }
    }
}
