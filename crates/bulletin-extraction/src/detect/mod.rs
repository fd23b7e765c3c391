//! Heuristic pattern detection: infer a selector set for an unknown board
//! from a single document.
//!
//! The detector works in four phases. Date-bearing leaves anchor the search
//! (phase A), their row containers are profiled (phase B) and clustered by
//! structural similarity (phase C), and the winning cluster's representative
//! is turned into a selector quadruple whose confidence is then measured
//! against the actual DOM (phase D). No state survives a call.

mod cluster;
mod features;

use scraper::{ElementRef, Html};
use tracing::{debug, trace};

use bulletin_config::{CompiledPatterns, DetectionSettings};
use bulletin_types::{Detection, DetectionDiagnostics, SelectorSet};

use crate::dom::{
    container_prefix, css_safe, element_text, parent_element, parse_selector_lenient, select_first,
};

pub use cluster::{cluster_representatives, score_row, similarity};
pub use features::{css_path, find_date_containers, Candidate, RowFeatures};

/// Fallback selectors used when a row yields no usable candidates.
const TITLE_FALLBACK: &str = "a, .title, .subject, td:nth-child(2), td:nth-child(3)";
const DATE_FALLBACK: &str = ".date, .regdate, .time, td:last-child, td:nth-last-child(2)";
const LINK_FALLBACK: &str = "a";

/// Class fragments worth keeping in a synthesized item selector.
const ITEM_CLASS_HINTS: &[&str] = &["item", "row", "notice", "board", "list"];

/// The heuristic detector. Patterns are compiled once at construction.
#[derive(Debug, Clone)]
pub struct PatternDetector {
    settings: DetectionSettings,
    patterns: CompiledPatterns,
}

impl PatternDetector {
    pub fn new(settings: DetectionSettings, patterns: CompiledPatterns) -> Self {
        Self { settings, patterns }
    }

    /// Infer a selector set for the document's notice list.
    ///
    /// Returns `None` when no candidate structure exists at all; otherwise
    /// the detection carries a confidence in `[0, 1]` that the caller
    /// compares against its acceptance threshold.
    pub fn detect(&self, document: &Html) -> Option<Detection> {
        let containers = find_date_containers(document, &self.patterns);
        if containers.len() < self.settings.min_notices {
            trace!(
                containers = containers.len(),
                "too few date-bearing rows for detection"
            );
            return None;
        }

        let rows: Vec<RowFeatures<'_>> = containers
            .iter()
            .map(|el| RowFeatures::analyze(*el, &self.patterns))
            .collect();

        let representatives =
            cluster_representatives(&rows, self.settings.similarity_threshold);

        // First strictly-better score wins, so on ties the larger cluster
        // (earlier in the list) keeps the seat.
        let mut best: Option<(&RowFeatures<'_>, f64)> = None;
        for row in &representatives {
            let score = score_row(row, &self.patterns);
            if score > best.map(|(_, s)| s).unwrap_or(0.0) {
                best = Some((*row, score));
            }
        }
        let best = best?;

        let selectors = self.synthesize(best.0);
        let (confidence, diagnostics) = self.score_against_dom(document, &selectors);

        debug!(
            confidence,
            item_count = diagnostics.item_count,
            container = selectors.container.as_deref().unwrap_or(""),
            item = %selectors.item,
            "pattern detection finished"
        );

        Some(Detection {
            confidence,
            selectors,
            diagnostics,
        })
    }

    /// Build the final selector quadruple from the winning row.
    fn synthesize(&self, row: &RowFeatures<'_>) -> SelectorSet {
        let container = find_list_container(row.element);
        let container_selector = container.map(container_prefix);

        let mut item_selector = row.tag.clone();
        let meaningful: Vec<&String> = row
            .classes
            .iter()
            .filter(|class| {
                let lower = class.to_lowercase();
                css_safe(class) && ITEM_CLASS_HINTS.iter().any(|hint| lower.contains(hint))
            })
            .collect();
        for class in meaningful {
            item_selector.push('.');
            item_selector.push_str(class);
        }

        let title = row
            .title_candidates
            .iter()
            .max_by_key(|c| c.text_length)
            .map(|c| c.selector.clone())
            .unwrap_or_else(|| TITLE_FALLBACK.to_string());
        let date = row
            .date_candidates
            .first()
            .map(|c| c.selector.clone())
            .unwrap_or_else(|| DATE_FALLBACK.to_string());
        let link = row
            .link_candidates
            .first()
            .map(|c| c.selector.clone())
            .unwrap_or_else(|| LINK_FALLBACK.to_string());

        let mut set = SelectorSet::new(item_selector, title, date, link);
        if let Some(container_selector) = container_selector {
            set = set.with_container(container_selector);
        }
        set
    }

    /// Measure the synthesized selectors against the document.
    ///
    /// Zero when the container does not resolve; a 0.3 floor when the item
    /// count is below the minimum; otherwise a blend of item count, title
    /// hit rate, and date hit rate over the first five rows.
    fn score_against_dom(
        &self,
        document: &Html,
        selectors: &SelectorSet,
    ) -> (f64, DetectionDiagnostics) {
        let mut diagnostics = DetectionDiagnostics::default();

        let Some(container) = selectors
            .container
            .as_deref()
            .and_then(parse_selector_lenient)
            .and_then(|sel| document.select(&sel).next())
        else {
            return (0.0, diagnostics);
        };
        let Some(item_selector) = parse_selector_lenient(&selectors.item) else {
            return (0.0, diagnostics);
        };

        let items: Vec<ElementRef<'_>> = container.select(&item_selector).collect();
        diagnostics.item_count = items.len();
        if items.len() < self.settings.min_notices {
            return (0.3, diagnostics);
        }

        let sample = &items[..items.len().min(5)];
        let title_selector = parse_selector_lenient(&selectors.title);
        let date_selector = parse_selector_lenient(&selectors.date);

        let title_hits = sample
            .iter()
            .filter(|item| {
                title_selector
                    .as_ref()
                    .and_then(|sel| select_first(**item, sel))
                    .map(|el| element_text(el).chars().count() > 5)
                    .unwrap_or(false)
            })
            .count();
        let date_hits = sample
            .iter()
            .filter(|item| {
                date_selector
                    .as_ref()
                    .and_then(|sel| select_first(**item, sel))
                    .map(|el| self.patterns.contains_date(&element_text(el)))
                    .unwrap_or(false)
            })
            .count();

        diagnostics.title_hit_rate = title_hits as f64 / sample.len() as f64;
        diagnostics.date_hit_rate = date_hits as f64 / sample.len() as f64;

        let confidence = 0.4 * (items.len() as f64 / 10.0).min(1.0)
            + 0.4 * diagnostics.title_hit_rate
            + 0.2 * diagnostics.date_hit_rate;

        (confidence.min(1.0), diagnostics)
    }
}

/// Nearest ancestor holding at least three same-tag children of the item,
/// which becomes the list container the item selector is scoped to.
fn find_list_container(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    let tag = element.value().name();
    let mut current = parent_element(element);

    while let Some(candidate) = current {
        let same_tag_children = candidate
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|e| e.value().name() == tag)
            .count();
        if same_tag_children >= 3 {
            return Some(candidate);
        }
        if matches!(candidate.value().name(), "body" | "html") {
            break;
        }
        current = parent_element(candidate);
    }

    parent_element(element)
}
