//! Date-leaf discovery and per-container feature extraction (the first two
//! detection phases).

use std::collections::HashSet;

use scraper::{ElementRef, Html};

use bulletin_config::CompiledPatterns;

use crate::dom::{class_id_text, classes_of, css_safe, element_text, parent_element};

/// Class/id fragments hinting at a date cell.
const DATE_HINTS: &[&str] = &["date", "time", "regist", "write", "post"];

/// Class/id fragments hinting that a `div` is a board row.
const CONTAINER_HINTS: &[&str] = &[
    "item", "notice", "board", "list", "row", "article", "post", "entry", "content",
];

/// Tags considered when enumerating title/date/link candidates inside a row.
const CANDIDATE_TAGS: &[&str] = &["td", "div", "span", "a", "strong", "em"];

/// How far up the tree a date leaf may look for its row container.
const MAX_ANCESTOR_WALK: usize = 5;

/// A title/date/link candidate inside a row, addressed by a synthesized
/// selector relative to the row element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub selector: String,
    pub text_length: usize,
    pub position: usize,
}

/// Structural features of one candidate row container.
#[derive(Debug, Clone)]
pub struct RowFeatures<'a> {
    pub element: ElementRef<'a>,
    pub tag: String,
    pub classes: Vec<String>,
    pub parent_tag: Option<String>,
    pub parent_classes: Vec<String>,
    /// Same-tag siblings on either side, excluding the element itself.
    pub sibling_count: usize,
    pub has_link: bool,
    pub text: String,
    pub text_length: usize,
    pub child_tags: Vec<String>,
    /// Index among the parent's same-tag children.
    pub position: usize,
    pub title_candidates: Vec<Candidate>,
    pub date_candidates: Vec<Candidate>,
    pub link_candidates: Vec<Candidate>,
}

/// Phase A: find the row containers that hold a date-bearing leaf.
///
/// Two sweeps feed the result: text nodes matching a configured date
/// pattern, and elements whose class or id hints at a date cell and whose
/// text confirms it. Each hit walks up to its nearest row-like ancestor;
/// containers are deduplicated in document order.
pub fn find_date_containers<'a>(
    document: &'a Html,
    patterns: &CompiledPatterns,
) -> Vec<ElementRef<'a>> {
    let mut seen = HashSet::new();
    let mut containers = Vec::new();

    for node in document.tree.root().descendants() {
        if let Some(text) = node.value().as_text() {
            if patterns.contains_date(&text.text) {
                if let Some(parent) = node.parent().and_then(ElementRef::wrap) {
                    if let Some(container) = row_container(parent) {
                        if seen.insert(container.id()) {
                            containers.push(container);
                        }
                    }
                }
            }
        }
    }

    for node in document.tree.root().descendants() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };
        let hint_text = class_id_text(element);
        if !DATE_HINTS.iter().any(|h| hint_text.contains(h)) {
            continue;
        }
        if !patterns.contains_date(&element_text(element)) {
            continue;
        }
        if let Some(container) = row_container(element) {
            if seen.insert(container.id()) {
                containers.push(container);
            }
        }
    }

    containers
}

/// Walk up from a date leaf to the nearest row-like ancestor: a `tr`, `li`,
/// `article`, or `section`, or a `div` whose class/id marks it as a board
/// row. Falls back to the leaf itself when it is already row-shaped.
fn row_container(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    let mut current = element;
    for _ in 0..MAX_ANCESTOR_WALK {
        let tag = current.value().name();
        if matches!(tag, "tr" | "li" | "article" | "section") {
            return Some(current);
        }
        if tag == "div" && is_item_container(current) {
            return Some(current);
        }
        match parent_element(current) {
            Some(parent) => current = parent,
            None => break,
        }
    }

    if matches!(element.value().name(), "tr" | "li" | "div") {
        Some(element)
    } else {
        None
    }
}

fn is_item_container(element: ElementRef<'_>) -> bool {
    let hint_text = class_id_text(element);
    CONTAINER_HINTS.iter().any(|h| hint_text.contains(h))
}

impl<'a> RowFeatures<'a> {
    /// Phase B: record the container's structural features and enumerate
    /// its title/date/link candidates.
    pub fn analyze(element: ElementRef<'a>, patterns: &CompiledPatterns) -> Self {
        let tag = element.value().name().to_string();
        let parent = parent_element(element);

        let sibling_count = element
            .prev_siblings()
            .chain(element.next_siblings())
            .filter_map(ElementRef::wrap)
            .filter(|e| e.value().name() == tag)
            .count();

        let position = parent
            .map(|p| {
                p.children()
                    .filter_map(ElementRef::wrap)
                    .filter(|e| e.value().name() == tag)
                    .take_while(|e| e.id() != element.id())
                    .count()
            })
            .unwrap_or(0);

        let text = element_text(element);
        let text_length = text.chars().count();

        let child_tags = element
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .map(|e| e.value().name().to_string())
            .collect();

        let mut features = Self {
            element,
            tag,
            classes: classes_of(element),
            parent_tag: parent.map(|p| p.value().name().to_string()),
            parent_classes: parent.map(classes_of).unwrap_or_default(),
            sibling_count,
            has_link: has_descendant_anchor(element),
            text,
            text_length,
            child_tags,
            position,
            title_candidates: Vec::new(),
            date_candidates: Vec::new(),
            link_candidates: Vec::new(),
        };
        features.collect_candidates(patterns);
        features
    }

    fn collect_candidates(&mut self, patterns: &CompiledPatterns) {
        let descendants = self
            .element
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .filter(|e| CANDIDATE_TAGS.contains(&e.value().name()));

        for (position, child) in descendants.enumerate() {
            let text = element_text(child);
            let text_length = text.chars().count();
            let selector = css_path(child, self.element);
            if selector.is_empty() {
                continue;
            }
            let is_date = patterns.contains_date(&text);

            if is_date {
                self.date_candidates.push(Candidate {
                    selector: selector.clone(),
                    text_length,
                    position,
                });
            }
            if child.value().name() == "a" || has_descendant_anchor(child) {
                self.link_candidates.push(Candidate {
                    selector: selector.clone(),
                    text_length,
                    position,
                });
            }
            if text_length > 10 && !is_date {
                self.title_candidates.push(Candidate {
                    selector,
                    text_length,
                    position,
                });
            }
        }
    }
}

fn has_descendant_anchor(element: ElementRef<'_>) -> bool {
    element
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(|e| e.value().name() == "a")
}

/// Synthesize a CSS path from `container` down to `element`, recording the
/// tag, its usable classes, and `:nth-child(k)` wherever sibling groups need
/// disambiguation.
pub fn css_path(element: ElementRef<'_>, container: ElementRef<'_>) -> String {
    if element.id() == container.id() {
        return String::new();
    }

    let mut parts = Vec::new();
    let mut current = element;
    loop {
        let mut part = current.value().name().to_string();
        let classes: Vec<String> = classes_of(current)
            .into_iter()
            .filter(|c| css_safe(c))
            .collect();
        if !classes.is_empty() {
            part.push('.');
            part.push_str(&classes.join("."));
        }

        let parent = parent_element(current);
        if let Some(parent) = parent {
            let same_tag = parent
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|e| e.value().name() == current.value().name())
                .count();
            if same_tag > 1 {
                let nth = parent
                    .children()
                    .filter_map(ElementRef::wrap)
                    .take_while(|e| e.id() != current.id())
                    .count()
                    + 1;
                part.push_str(&format!(":nth-child({nth})"));
            }
        }
        parts.push(part);

        match parent {
            Some(p) if p.id() == container.id() => break,
            Some(p) => current = p,
            None => break,
        }
    }

    parts.reverse();
    parts.join(" > ")
}
