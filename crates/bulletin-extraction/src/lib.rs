//! # Bulletin Extraction
//!
//! The extraction core: given an HTML document and its URL, locate the
//! repeating notice-row structure and return validated `{title, date, link}`
//! records. Three strategies feed a ranked cascade (curated templates,
//! heuristic pattern detection, and generic board patterns) with an
//! optional headless-rendered retry behind the [`DomRenderer`] seam.
//!
//! ## Organization
//!
//! - `engine`: the per-URL cascade, validation, and method statistics
//! - `templates`: the template registry (domain, vendor fingerprint, generic)
//! - `detect`: the heuristic pattern detector
//! - `selectors`: selector-set execution against a parsed document
//! - `generic`: the fixed list of common board patterns
//! - `dom`: small scraper helpers shared by the above

pub mod detect;
pub mod dom;
pub mod engine;
pub mod generic;
pub mod selectors;
pub mod templates;

pub use detect::PatternDetector;
pub use engine::{
    DomRenderer, ExtractionEngine, MethodStats, MethodStatsSnapshot, ALL_METHODS_FAILED,
};
pub use generic::generic_selector_sets;
pub use selectors::execute_selector_set;
pub use templates::{RegistryStats, TemplateRegistry, TemplateSuggestion};
